use super::error::Error;
use super::exchange::{exchange, InstallationToken};
use super::installation::{resolve, InstallationTarget};
use gakt_github::apps::{Claims, CompactJwt, JwtError, Signer, SigningInput, HEADER};
use gakt_github::{Client, Permissions};
use gakt_tracing::{debug, info};
use std::fmt;

#[derive(Debug)]
pub struct TokenRequest {
    pub app_id: String,
    pub target: InstallationTarget,
    pub permissions: Option<Permissions>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    ClaimsBuilt,
    SigningInputComputed,
    Signed,
    Bypassed,
    Resolving,
    Resolved,
    Exchanging,
    Success,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::ClaimsBuilt => "claims_built",
            Stage::SigningInputComputed => "signing_input_computed",
            Stage::Signed => "signed",
            Stage::Bypassed => "bypassed",
            Stage::Resolving => "resolving",
            Stage::Resolved => "resolved",
            Stage::Exchanging => "exchanging",
            Stage::Success => "success",
        };
        f.write_str(name)
    }
}

fn enter(stage: Stage) {
    debug!(%stage, "token pipeline");
}

pub async fn sign_app_jwt<S: Signer + ?Sized>(
    app_id: &str,
    issued_at: u64,
    signer: &S,
) -> Result<CompactJwt, JwtError> {
    let claims = Claims::new(app_id, issued_at);
    enter(Stage::ClaimsBuilt);

    let input = SigningInput::new(&HEADER, &claims)?;
    enter(Stage::SigningInputComputed);

    let signature = signer
        .sign(&input.digest())
        .await
        .map_err(JwtError::Signer)?;
    let jwt = input.assemble(&signature)?;
    enter(Stage::Signed);
    debug!(
        iat = claims.issued_at(),
        exp = claims.expires_at(),
        "signed app JWT"
    );

    Ok(jwt)
}

/// Runs the whole issuance: sign an app JWT, find the installation and
/// exchange the JWT for an installation access token. Nothing is retried; the
/// first failure ends the run.
pub async fn issue_token<S: Signer + ?Sized>(
    signer: &S,
    github: &Client,
    request: &TokenRequest,
    issued_at: u64,
) -> Result<InstallationToken, Error> {
    enter(Stage::Start);
    request.target.ensure_resolvable()?;

    let jwt = sign_app_jwt(&request.app_id, issued_at, signer).await?;

    if request.target.is_explicit() {
        enter(Stage::Bypassed);
    } else {
        enter(Stage::Resolving);
    }
    let installation_id = resolve(github, &jwt, &request.target).await?;
    if !request.target.is_explicit() {
        enter(Stage::Resolved);
    }

    enter(Stage::Exchanging);
    let token = exchange(
        github,
        &jwt,
        installation_id,
        request.permissions.as_ref(),
    )
    .await?;
    enter(Stage::Success);

    match token.expires_at {
        Some(expires_at) => info!(
            installation.id = installation_id,
            %expires_at,
            "created installation access token"
        ),
        None => info!(
            installation.id = installation_id,
            "created installation access token"
        ),
    }

    Ok(token)
}
