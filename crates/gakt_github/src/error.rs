use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("request to GitHub failed")]
    Http(#[from] reqwest::Error),
    #[error("GitHub responded with {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("invalid GitHub API url: {0}")]
    Url(String),
}
