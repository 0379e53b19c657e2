use super::error::Error;
use chrono::{DateTime, Utc};
use gakt_github::apps::CompactJwt;
use gakt_github::{Client, Permissions};
use secstr::SecUtf8;

/// An installation access token. Only the execution environment's secret
/// output ever sees the value.
#[derive(Debug)]
pub struct InstallationToken {
    token: SecUtf8,
    pub expires_at: Option<DateTime<Utc>>,
}

impl InstallationToken {
    pub fn unsecure(&self) -> &str {
        self.token.unsecure()
    }
}

pub async fn exchange(
    github: &Client,
    jwt: &CompactJwt,
    installation_id: u64,
    permissions: Option<&Permissions>,
) -> Result<InstallationToken, Error> {
    let access_token = github
        .create_installation_access_token(jwt, installation_id, permissions)
        .await
        .map_err(Error::Exchange)?;

    Ok(InstallationToken {
        token: SecUtf8::from(access_token.token),
        expires_at: access_token.expires_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use gakt_github::apps::{Claims, SigningInput, HEADER};
    use httpmock::prelude::*;
    use serde_json::json;
    use url::Url;

    fn test_jwt() -> CompactJwt {
        SigningInput::new(&HEADER, &Claims::new("1", 1_000_000_000))
            .unwrap()
            .assemble(b"S")
            .unwrap()
    }

    fn github_for(server: &MockServer) -> Client {
        Client::new(&Url::parse(&server.base_url()).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn returns_token_verbatim() {
        let server = MockServer::start_async().await;
        let jwt = test_jwt();
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/app/installations/5/access_tokens")
                    .header("authorization", format!("Bearer {}", jwt.as_str()))
                    .json_body(json!({ "permissions": { "metadata": "read" } }));
                then.status(201).json_body(json!({
                    "token": "ghs_xxx",
                    "expires_at": "2026-10-16T13:00:00Z",
                    "permissions": { "metadata": "read" }
                }));
            })
            .await;

        let mut permissions = Permissions::new();
        permissions.insert("metadata".to_owned(), "read".to_owned());
        let token = exchange(&github_for(&server), &jwt, 5, Some(&permissions))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!("ghs_xxx", token.unsecure());
        assert!(token.expires_at.is_some());
        assert!(!format!("{:?}", token).contains("ghs_xxx"));
    }

    #[tokio::test]
    async fn api_failure_is_an_exchange_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/app/installations/5/access_tokens");
                then.status(422).json_body(json!({
                    "message": "The permissions requested are not granted to this installation."
                }));
            })
            .await;

        let err = exchange(&github_for(&server), &test_jwt(), 5, None)
            .await
            .unwrap_err();

        assert_eq!(ErrorKind::Exchange, err.kind());
        assert_eq!(
            "could not create installation access token: GitHub responded with 422 Unprocessable Entity: \
             The permissions requested are not granted to this installation.",
            err.chain()
        );
    }
}
