use super::installation::InstallationTarget;
use gakt_github::apps::BoxError;
use gakt_github::Permissions;
use gakt_kms::CryptoKeyVersionName;
use secstr::SecUtf8;
use std::io;
use std::num::{NonZeroU64, ParseIntError};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("input required and not supplied: {0}")]
    MissingInput(&'static str),
    #[error("installation_id must be a positive integer, got {value:?}")]
    InvalidInstallationId {
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("permissions must be a JSON object mapping permission names to levels")]
    InvalidPermissions(#[source] serde_json::Error),
    #[error("github_api_url {value:?} is not a valid url")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid Cloud KMS key version")]
    InvalidKeyVersion(#[source] gakt_kms::Error),
    #[error("either installation_id or repository must be specified")]
    MissingTarget,
    #[error("repository must be given as owner/name, got {0:?}")]
    InvalidRepository(String),
    #[error("could not set up {0} client")]
    Client(&'static str, #[source] BoxError),
    #[error("could not write step output")]
    Output(#[source] io::Error),
}

#[derive(Debug)]
pub struct Config {
    pub key_version: CryptoKeyVersionName,
    pub gcp_access_token: Option<SecUtf8>,
    pub app_id: String,
    pub target: InstallationTarget,
    pub permissions: Option<Permissions>,
    pub github_api_url: Url,
    pub debug: bool,
}

/// Reads inputs the way the runner passes them: `INPUT_<NAME>` upper-cased,
/// surrounding whitespace trimmed, empty meaning unset.
struct Inputs<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Inputs<F> {
    fn optional(&self, name: &str) -> Option<String> {
        let env_name = format!("INPUT_{}", name.replace(' ', "_").to_uppercase());
        (self.lookup)(&env_name)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::MissingInput(name))
    }
}

pub fn load() -> Result<Config, ConfigError> {
    Config::from_lookup(|name| std::env::var(name).ok())
}

impl Config {
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let debug = lookup("RUNNER_DEBUG").map_or(false, |value| value == "1");
        let inputs = Inputs { lookup };

        let key_version = CryptoKeyVersionName::new(
            &inputs.required("gcp_kms_project_id")?,
            &inputs.required("gcp_kms_location")?,
            &inputs.required("gcp_kms_key_ring")?,
            &inputs.required("gcp_kms_key_name")?,
            &inputs.required("gcp_kms_key_version")?,
        )
        .map_err(ConfigError::InvalidKeyVersion)?;

        let app_id = inputs.required("app_id")?;

        let installation_id = inputs
            .optional("installation_id")
            .map(|value| match value.parse::<NonZeroU64>() {
                Ok(id) => Ok(id.get()),
                Err(source) => Err(ConfigError::InvalidInstallationId { value, source }),
            })
            .transpose()?;
        let repository = inputs.optional("repository");
        let target = InstallationTarget::from_inputs(installation_id, repository.as_deref())?;

        let permissions = inputs
            .optional("permissions")
            .map(|value| serde_json::from_str::<Permissions>(&value))
            .transpose()
            .map_err(ConfigError::InvalidPermissions)?;

        let github_api_url = inputs.required("github_api_url")?;
        let github_api_url = Url::parse(&github_api_url).map_err(|source| {
            ConfigError::InvalidUrl {
                value: github_api_url.clone(),
                source,
            }
        })?;

        Ok(Config {
            key_version,
            gcp_access_token: inputs.optional("gcp_access_token").map(SecUtf8::from),
            app_id,
            target,
            permissions,
            github_api_url,
            debug,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const KMS_INPUTS: &[(&str, &str)] = &[
        ("INPUT_GCP_KMS_PROJECT_ID", "my-project"),
        ("INPUT_GCP_KMS_LOCATION", "global"),
        ("INPUT_GCP_KMS_KEY_RING", "github"),
        ("INPUT_GCP_KMS_KEY_NAME", "app-key"),
        ("INPUT_GCP_KMS_KEY_VERSION", "1"),
        ("INPUT_APP_ID", "1234"),
        ("INPUT_GITHUB_API_URL", "https://api.github.com"),
    ];

    // `extra` entries override the defaults above.
    fn load_with(extra: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = KMS_INPUTS
            .iter()
            .chain(extra.iter())
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn explicit_installation_id() {
        let config = load_with(&[("INPUT_INSTALLATION_ID", " 5 ")]).unwrap();
        assert_eq!(InstallationTarget::Id(5), config.target);
        assert_eq!("1234", config.app_id);
        assert_eq!(
            "projects/my-project/locations/global/keyRings/github/cryptoKeys/app-key/cryptoKeyVersions/1",
            config.key_version.to_string()
        );
        assert!(config.permissions.is_none());
        assert!(config.gcp_access_token.is_none());
        assert!(!config.debug);
    }

    #[test]
    fn installation_id_wins_over_repository() {
        let config = load_with(&[
            ("INPUT_INSTALLATION_ID", "5"),
            ("INPUT_REPOSITORY", "octo-org/hello-world"),
        ])
        .unwrap();
        assert_eq!(InstallationTarget::Id(5), config.target);
    }

    #[test]
    fn repository_target() {
        let config = load_with(&[("INPUT_REPOSITORY", "octo-org/hello-world")]).unwrap();
        assert_eq!(
            InstallationTarget::Repository {
                owner: "octo-org".to_owned(),
                repo: "hello-world".to_owned(),
            },
            config.target
        );
    }

    #[test]
    fn missing_target_fails() {
        for extra in &[vec![], vec![("INPUT_REPOSITORY", "  ")]] {
            let err = load_with(extra).unwrap_err();
            assert!(matches!(err, ConfigError::MissingTarget), "{:?}", extra);
        }
    }

    #[test]
    fn malformed_repository_is_named_in_error() {
        for value in &["octo-org", "/hello-world", "octo-org/", "octo-org/hello/world"] {
            let err = load_with(&[("INPUT_REPOSITORY", *value)]).unwrap_err();
            match &err {
                ConfigError::InvalidRepository(actual) => assert_eq!(*value, actual.as_str()),
                other => panic!("unexpected error: {:?}", other),
            }
            assert_eq!(
                format!("repository must be given as owner/name, got {:?}", value),
                err.to_string()
            );
        }
    }

    #[test]
    fn invalid_installation_id_fails() {
        for value in &["abc", "0", "-3"] {
            let err = load_with(&[("INPUT_INSTALLATION_ID", *value)]).unwrap_err();
            match err {
                ConfigError::InvalidInstallationId { value: actual, .. } => {
                    assert_eq!(*value, actual)
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    #[test]
    fn permissions_are_parsed() {
        let config = load_with(&[
            ("INPUT_INSTALLATION_ID", "5"),
            ("INPUT_PERMISSIONS", r#"{"contents":"read","pull_requests":"write"}"#),
        ])
        .unwrap();
        let permissions = config.permissions.unwrap();
        assert_eq!(2, permissions.len());
        assert_eq!("read", permissions["contents"]);
        assert_eq!("write", permissions["pull_requests"]);
    }

    #[test]
    fn malformed_permissions_fail() {
        for value in &[r#"{"contents":1}"#, r#"["contents"]"#, "contents: read"] {
            let err = load_with(&[("INPUT_INSTALLATION_ID", "5"), ("INPUT_PERMISSIONS", *value)])
                .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidPermissions(_)), "{}", value);
        }
    }

    #[test]
    fn missing_required_input_is_named() {
        let vars: HashMap<&str, &str> = KMS_INPUTS
            .iter()
            .cloned()
            .filter(|(name, _)| *name != "INPUT_APP_ID")
            .collect();
        let err = Config::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap_err();
        assert_eq!("input required and not supplied: app_id", err.to_string());
    }

    #[test]
    fn invalid_api_url_fails() {
        let err = load_with(&[
            ("INPUT_INSTALLATION_ID", "5"),
            ("INPUT_GITHUB_API_URL", "not a url"),
        ]);
        assert!(matches!(err, Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn runner_debug_and_access_token() {
        let config = load_with(&[
            ("INPUT_INSTALLATION_ID", "5"),
            ("INPUT_GCP_ACCESS_TOKEN", "ya29.token"),
            ("RUNNER_DEBUG", "1"),
        ])
        .unwrap();
        assert!(config.debug);
        assert_eq!("ya29.token", config.gcp_access_token.unwrap().unsecure());
    }
}
