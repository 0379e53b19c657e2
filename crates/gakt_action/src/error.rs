use super::config::ConfigError;
use gakt_github::apps::JwtError;
use std::error::Error as StdError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Signing,
    Resolution,
    Exchange,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error("could not sign app JWT")]
    Signing(#[from] JwtError),
    #[error("could not get repo installation for {owner}/{repo}; is the app installed on this repo?")]
    Resolution {
        owner: String,
        repo: String,
        #[source]
        source: gakt_github::Error,
    },
    #[error("could not create installation access token")]
    Exchange(#[source] gakt_github::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::Signing(_) => ErrorKind::Signing,
            Error::Resolution { .. } => ErrorKind::Resolution,
            Error::Exchange(_) => ErrorKind::Exchange,
        }
    }

    /// The message followed by every cause down to the innermost one.
    pub fn chain(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}
