use super::auth::TokenSource;
use super::error::Error;
use super::name::CryptoKeyVersionName;
use super::{BASE_URL, USER_AGENT};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{field, info_span, Instrument, Span};

const KMS_SERVICE: &str = "Cloud KMS";

#[derive(Serialize)]
struct AsymmetricSignRequest {
    digest: Sha256Digest,
}

#[derive(Serialize)]
struct Sha256Digest {
    sha256: String,
}

#[derive(Deserialize)]
struct AsymmetricSignResponse {
    signature: Option<String>,
}

#[derive(Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Deserialize)]
struct GoogleError {
    message: String,
}

pub struct Client {
    client: reqwest::Client,
    endpoint: String,
    token_source: TokenSource,
}

impl Client {
    pub fn new(token_source: TokenSource) -> Result<Client, Error> {
        Client::with_endpoint(BASE_URL, token_source)
    }

    pub fn with_endpoint(endpoint: &str, token_source: TokenSource) -> Result<Client, Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(Error::http(KMS_SERVICE))?;

        Ok(Client {
            client,
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            token_source,
        })
    }

    /// Signs a pre-computed SHA-256 digest with the given key version and
    /// returns the raw signature bytes.
    pub async fn asymmetric_sign(
        &self,
        name: &CryptoKeyVersionName,
        digest: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let access_token = self.token_source.access_token(&self.client).await?;

        let raw_url = format!(
            "{endpoint}/v1/{name}:asymmetricSign",
            endpoint = self.endpoint,
            name = name
        );
        let url = Url::parse(&raw_url).map_err(|err| Error::Url(err.to_string()))?;
        let body = AsymmetricSignRequest {
            digest: Sha256Digest {
                sha256: STANDARD.encode(digest),
            },
        };

        let span = info_span!(
            "kms request",
            kms.key_version = %name,
            http.status_code = field::Empty,
        );

        let response: AsymmetricSignResponse = async {
            let res = self
                .client
                .post(url)
                .bearer_auth(access_token.unsecure())
                .json(&body)
                .send()
                .await
                .map_err(Error::http(KMS_SERVICE))?;
            let status = res.status();
            Span::current().record("http.status_code", status.as_u16());

            if !status.is_success() {
                let message = match res.json::<GoogleErrorBody>().await {
                    Ok(body) => body.error.message,
                    Err(_) => status.canonical_reason().unwrap_or("unknown").to_owned(),
                };
                return Err(Error::Status {
                    service: KMS_SERVICE,
                    status,
                    message,
                });
            }

            res.json().await.map_err(Error::http(KMS_SERVICE))
        }
        .instrument(span)
        .await?;

        match response.signature {
            Some(signature) if !signature.is_empty() => Ok(STANDARD.decode(signature)?),
            _ => Err(Error::MissingSignature),
        }
    }
}
