pub mod apps;
mod call;
mod client;
mod error;
mod models;

pub use client::Client;
pub use error::Error;
pub use models::*;

pub const USER_AGENT: &str = concat!("github-app-kms-token/", env!("CARGO_PKG_VERSION"));
pub const API_VERSION: &str = "2022-11-28";
