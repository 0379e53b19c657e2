use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("request to {service} failed")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} responded with {status}: {message}")]
    Status {
        service: &'static str,
        status: StatusCode,
        message: String,
    },
    #[error("invalid url: {0}")]
    Url(String),
    #[error("invalid key version component {0:?}")]
    InvalidName(String),
    #[error("signature is not valid base64")]
    Decode(#[from] base64::DecodeError),
    #[error("Cloud KMS did not return a signature")]
    MissingSignature,
}

impl Error {
    pub(crate) fn http(service: &'static str) -> impl FnOnce(reqwest::Error) -> Error {
        move |source| Error::Http { service, source }
    }
}
