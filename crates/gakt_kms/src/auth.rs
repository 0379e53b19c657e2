use super::error::Error;
use secstr::SecUtf8;
use serde::Deserialize;
use tracing::debug;

const ACCESS_TOKEN_ENVS: &[&str] = &["GOOGLE_OAUTH_ACCESS_TOKEN", "CLOUDSDK_AUTH_ACCESS_TOKEN"];
const METADATA_HOST_ENV: &str = "GCE_METADATA_HOST";
const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";
const METADATA_SERVICE: &str = "metadata server";

/// Where the OAuth access token for Cloud KMS calls comes from.
#[derive(Debug)]
pub enum TokenSource {
    /// A token minted elsewhere, e.g. by a workload identity federation step.
    Static(SecUtf8),
    /// The GCE/GKE metadata server of the machine the job runs on.
    MetadataServer { host: String },
}

#[derive(Deserialize)]
struct MetadataToken {
    access_token: String,
}

impl TokenSource {
    pub fn from_env(explicit: Option<SecUtf8>) -> TokenSource {
        TokenSource::from_lookup(explicit, |name| std::env::var(name).ok())
    }

    /// An explicit token wins over the well-known environment variables,
    /// which win over the metadata server.
    pub fn from_lookup<F>(explicit: Option<SecUtf8>, lookup: F) -> TokenSource
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = explicit.or_else(|| {
            ACCESS_TOKEN_ENVS
                .iter()
                .filter_map(|&name| lookup(name))
                .find(|value| !value.is_empty())
                .map(SecUtf8::from)
        });

        match token {
            Some(token) => TokenSource::Static(token),
            None => TokenSource::MetadataServer {
                host: lookup(METADATA_HOST_ENV)
                    .filter(|host| !host.is_empty())
                    .unwrap_or_else(|| DEFAULT_METADATA_HOST.to_owned()),
            },
        }
    }

    pub(crate) async fn access_token(&self, client: &reqwest::Client) -> Result<SecUtf8, Error> {
        match self {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::MetadataServer { host } => {
                let raw_url = format!(
                    "http://{host}/computeMetadata/v1/instance/service-accounts/default/token",
                    host = host
                );
                debug!(%raw_url, "fetching access token from metadata server");

                let res = client
                    .get(&raw_url)
                    .header("Metadata-Flavor", "Google")
                    .send()
                    .await
                    .map_err(Error::http(METADATA_SERVICE))?;
                let status = res.status();
                if !status.is_success() {
                    let message = res.text().await.unwrap_or_default();
                    return Err(Error::Status {
                        service: METADATA_SERVICE,
                        status,
                        message,
                    });
                }

                let token: MetadataToken = res.json().await.map_err(Error::http(METADATA_SERVICE))?;
                Ok(SecUtf8::from(token.access_token))
            }
        }
    }
}
