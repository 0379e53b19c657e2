use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Permission name to level (`"read"`, `"write"`, ...). GitHub validates the
/// values; the client passes them through untouched.
pub type Permissions = BTreeMap<String, String>;

#[derive(Debug, Deserialize)]
pub struct Installation {
    pub id: u64,
}

#[derive(Serialize)]
pub(crate) struct CreateAccessTokenBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<&'a Permissions>,
}

#[derive(Deserialize)]
pub struct InstallationAccessToken {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for InstallationAccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallationAccessToken")
            .field("token", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}
