//! GitHub App JSON Web Tokens whose signature comes from a remote signer.
//!
//! The token is assembled by hand instead of through a JWT library because the
//! private key never leaves the signing service: only the SHA-256 digest of the
//! signing input is sent out, and the raw RS256 signature comes back.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::{SystemTime, SystemTimeError};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Lifetime of an app JWT. GitHub allows up to 10 minutes; the token is only
/// used for the next two requests.
pub const VALIDITY_SECS: u64 = 30;

pub const HEADER: Header = Header {
    alg: "RS256",
    typ: "JWT",
};

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("app id must not be empty")]
    EmptyIssuer,
    #[error("system clock is before the unix epoch")]
    Clock(#[from] SystemTimeError),
    #[error("could not serialize JWT segment")]
    Json(#[from] serde_json::Error),
    #[error("signer failed")]
    Signer(#[source] BoxError),
    #[error("signer did not return a signature")]
    EmptySignature,
}

/// Produces RSASSA-PKCS1-v1_5 signatures over a SHA-256 digest with a key the
/// implementation has been bound to.
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign(&self, digest: &[u8; 32]) -> Result<Vec<u8>, BoxError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    alg: &'static str,
    typ: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claims<'a> {
    // GitHub App's identifier
    iss: &'a str,
    // Issued at time
    iat: u64,
    // JWT expiration time
    exp: u64,
}

impl<'a> Claims<'a> {
    pub fn new(app_id: &'a str, issued_at: u64) -> Claims<'a> {
        Claims {
            iss: app_id,
            iat: issued_at,
            exp: issued_at.saturating_add(VALIDITY_SECS),
        }
    }

    pub fn issued_at(&self) -> u64 {
        self.iat
    }

    pub fn expires_at(&self) -> u64 {
        self.exp
    }
}

/// `base64url(header) "." base64url(claims)`, the bytes the signature covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningInput(String);

impl SigningInput {
    pub fn new(header: &Header, claims: &Claims<'_>) -> Result<SigningInput, JwtError> {
        if claims.iss.is_empty() {
            return Err(JwtError::EmptyIssuer);
        }

        let header = URL_SAFE_NO_PAD.encode(serde_json::to_vec(header)?);
        let claims = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
        Ok(SigningInput(format!("{}.{}", header, claims)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn digest(&self) -> [u8; 32] {
        Sha256::digest(self.as_bytes()).into()
    }

    pub fn assemble(self, signature: &[u8]) -> Result<CompactJwt, JwtError> {
        if signature.is_empty() {
            return Err(JwtError::EmptySignature);
        }

        let SigningInput(mut jwt) = self;
        jwt.push('.');
        jwt.push_str(&URL_SAFE_NO_PAD.encode(signature));
        Ok(CompactJwt(jwt))
    }
}

/// A signed app JWT in compact serialization.
#[derive(Clone, PartialEq, Eq)]
pub struct CompactJwt(String);

impl CompactJwt {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CompactJwt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CompactJwt(***)")
    }
}

pub fn issued_now() -> Result<u64, JwtError> {
    Ok(SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)?
        .as_secs())
}
