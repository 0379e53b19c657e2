use super::config::ConfigError;
use super::error::Error;
use gakt_github::apps::CompactJwt;
use gakt_github::Client;
use gakt_tracing::{debug, info};

/// Which installation the token is minted for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallationTarget {
    Id(u64),
    Repository { owner: String, repo: String },
}

impl InstallationTarget {
    /// An explicit id wins; otherwise `repository` must be `owner/name`.
    pub fn from_inputs(
        installation_id: Option<u64>,
        repository: Option<&str>,
    ) -> Result<InstallationTarget, ConfigError> {
        if let Some(id) = installation_id {
            return Ok(InstallationTarget::Id(id));
        }

        let repository = match repository.map(str::trim).filter(|value| !value.is_empty()) {
            Some(repository) => repository,
            None => return Err(ConfigError::MissingTarget),
        };
        let invalid = || ConfigError::InvalidRepository(repository.to_owned());
        let (owner, repo) = repository.split_once('/').ok_or_else(invalid)?;
        let (owner, repo) = (owner.trim(), repo.trim());
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(invalid());
        }

        Ok(InstallationTarget::Repository {
            owner: owner.to_owned(),
            repo: repo.to_owned(),
        })
    }

    pub fn ensure_resolvable(&self) -> Result<(), ConfigError> {
        match self {
            InstallationTarget::Id(_) => Ok(()),
            InstallationTarget::Repository { owner, repo } => {
                if owner.is_empty() || repo.is_empty() {
                    Err(ConfigError::MissingTarget)
                } else {
                    Ok(())
                }
            }
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, InstallationTarget::Id(_))
    }
}

pub async fn resolve(
    github: &Client,
    jwt: &CompactJwt,
    target: &InstallationTarget,
) -> Result<u64, Error> {
    target.ensure_resolvable()?;

    match target {
        InstallationTarget::Id(id) => {
            debug!(installation.id = id, "using installation id from input");
            Ok(*id)
        }
        InstallationTarget::Repository { owner, repo } => {
            info!(%owner, %repo, "looking up repo installation");
            let installation = github
                .get_repo_installation(jwt, owner, repo)
                .await
                .map_err(|source| Error::Resolution {
                    owner: owner.clone(),
                    repo: repo.clone(),
                    source,
                })?;
            debug!(installation.id = installation.id, "found repo installation");
            Ok(installation.id)
        }
    }
}
