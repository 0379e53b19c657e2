use super::error::Error;
use std::fmt;

/// Resource name of a single Cloud KMS key version, rendered as
/// `projects/{project}/locations/{location}/keyRings/{key_ring}/cryptoKeys/{crypto_key}/cryptoKeyVersions/{version}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoKeyVersionName {
    project: String,
    location: String,
    key_ring: String,
    crypto_key: String,
    version: String,
}

impl CryptoKeyVersionName {
    pub fn new(
        project: &str,
        location: &str,
        key_ring: &str,
        crypto_key: &str,
        version: &str,
    ) -> Result<CryptoKeyVersionName, Error> {
        for component in &[project, location, key_ring, crypto_key, version] {
            if component.is_empty() || component.contains('/') {
                return Err(Error::InvalidName((*component).to_owned()));
            }
        }

        Ok(CryptoKeyVersionName {
            project: project.to_owned(),
            location: location.to_owned(),
            key_ring: key_ring.to_owned(),
            crypto_key: crypto_key.to_owned(),
            version: version.to_owned(),
        })
    }
}

impl fmt::Display for CryptoKeyVersionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "projects/{}/locations/{}/keyRings/{}/cryptoKeys/{}/cryptoKeyVersions/{}",
            self.project, self.location, self.key_ring, self.crypto_key, self.version
        )
    }
}
