use async_trait::async_trait;
use gakt_github::apps::{BoxError, Signer};
use gakt_kms::CryptoKeyVersionName;

/// Signs app JWTs with an asymmetric Cloud KMS key version.
pub struct KmsSigner {
    client: gakt_kms::Client,
    key_version: CryptoKeyVersionName,
}

impl KmsSigner {
    pub fn new(client: gakt_kms::Client, key_version: CryptoKeyVersionName) -> KmsSigner {
        KmsSigner {
            client,
            key_version,
        }
    }
}

#[async_trait]
impl Signer for KmsSigner {
    async fn sign(&self, digest: &[u8; 32]) -> Result<Vec<u8>, BoxError> {
        let signature = self
            .client
            .asymmetric_sign(&self.key_version, digest)
            .await?;
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gakt_kms::TokenSource;
    use httpmock::prelude::*;
    use secstr::SecUtf8;
    use serde_json::json;

    fn signer_for(server: &MockServer) -> KmsSigner {
        let client = gakt_kms::Client::with_endpoint(
            &server.base_url(),
            TokenSource::Static(SecUtf8::from("ya29.test")),
        )
        .unwrap();
        let key_version =
            CryptoKeyVersionName::new("my-project", "global", "github", "app-key", "2").unwrap();
        KmsSigner::new(client, key_version)
    }

    #[tokio::test]
    async fn signs_with_bound_key_version() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path(
                    "/v1/projects/my-project/locations/global/keyRings/github/cryptoKeys/app-key/cryptoKeyVersions/2:asymmetricSign",
                );
                then.status(200).json_body(json!({ "signature": "Uw==" }));
            })
            .await;

        let signature = signer_for(&server).sign(&[7; 32]).await.unwrap();

        mock.assert_async().await;
        assert_eq!(b"S".to_vec(), signature);
    }

    #[tokio::test]
    async fn missing_signature_surfaces_kms_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({}));
            })
            .await;

        let err = signer_for(&server).sign(&[7; 32]).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<gakt_kms::Error>(),
            Some(gakt_kms::Error::MissingSignature)
        ));
    }
}
