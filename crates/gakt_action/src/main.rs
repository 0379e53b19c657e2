mod actions;
mod config;
mod error;
mod exchange;
mod installation;
mod pipeline;
mod signer;

use actions::GitHubActions;
use config::{Config, ConfigError};
use error::Error;
use gakt_github::apps::{issued_now, Signer};
use gakt_kms::TokenSource;
use gakt_tracing::{error, info_span, Instrument};
use pipeline::{issue_token, TokenRequest};
use signer::KmsSigner;
use std::io::Write;
use std::process::ExitCode;

async fn run<W: Write>(config: Config, actions: &mut GitHubActions<W>) -> Result<(), Error> {
    let token_source = TokenSource::from_env(config.gcp_access_token);
    let kms_client = gakt_kms::Client::new(token_source)
        .map_err(|err| ConfigError::Client("Cloud KMS", err.into()))?;
    let signer = KmsSigner::new(kms_client, config.key_version);
    let github = gakt_github::Client::new(&config.github_api_url)
        .map_err(|err| ConfigError::Client("GitHub", err.into()))?;

    let request = TokenRequest {
        app_id: config.app_id,
        target: config.target,
        permissions: config.permissions,
    };
    run_with(&signer, &github, &request, issued_now()?, actions).await
}

/// Issues the token and hands it to the runner. Nothing reaches the step
/// output unless the whole pipeline succeeded.
async fn run_with<S, W>(
    signer: &S,
    github: &gakt_github::Client,
    request: &TokenRequest,
    issued_at: u64,
    actions: &mut GitHubActions<W>,
) -> Result<(), Error>
where
    S: Signer + ?Sized,
    W: Write,
{
    let token = issue_token(signer, github, request, issued_at).await?;

    // The runner has to learn the mask before the value shows up anywhere.
    actions.set_secret(token.unsecure()).map_err(ConfigError::Output)?;
    actions.set_output("token", token.unsecure()).map_err(ConfigError::Output)?;
    if let Err(err) = actions.info("Token generated successfully!") {
        error!(error = %err, "could not write to stdout");
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let mut actions = GitHubActions::from_env();

    let res = match config::load() {
        Ok(config) => {
            gakt_tracing::setup(gakt_tracing::Config {
                service_name: "gakt_action",
                debug: config.debug,
            });

            let span = info_span!("issue installation token", app.id = %config.app_id);
            run(config, &mut actions).instrument(span).await
        }
        Err(err) => Err(Error::from(err)),
    };

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(kind = ?err.kind(), "issuing installation token failed");
            if let Err(write_err) = actions.set_failed(&err.chain()) {
                eprintln!("{}: {}", err.chain(), write_err);
            }
            ExitCode::FAILURE
        }
    }
}
