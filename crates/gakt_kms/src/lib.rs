mod auth;
mod client;
mod error;
mod name;

pub use auth::TokenSource;
pub use client::Client;
pub use error::Error;
pub use name::CryptoKeyVersionName;

pub const BASE_URL: &str = "https://cloudkms.googleapis.com";
pub const USER_AGENT: &str = concat!("github-app-kms-token/", env!("CARGO_PKG_VERSION"));
