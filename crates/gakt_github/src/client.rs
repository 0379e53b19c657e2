use super::apps::CompactJwt;
use super::call;
use super::error::Error;
use super::models::*;
use super::USER_AGENT;
use reqwest::Url;

/// GitHub REST client authenticated as the app itself. The JWT is passed per
/// call since it only lives for a few seconds.
pub struct Client {
    client: reqwest::Client,
    base_url: Url,
}

impl Client {
    /// `base_url` is the API root, e.g. `https://api.github.com` or
    /// `https://github.example.com/api/v3`.
    pub fn new(base_url: &Url) -> Result<Client, Error> {
        if base_url.cannot_be_a_base() {
            return Err(Error::Url(base_url.to_string()));
        }

        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Client {
            client,
            base_url: base_url.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn get_repo_installation(
        &self,
        jwt: &CompactJwt,
        owner: &str,
        repo: &str,
    ) -> Result<Installation, Error> {
        let url = self.endpoint(&["repos", owner, repo, "installation"])?;
        call::get(&self.client, url, jwt.as_str()).await
    }

    pub async fn create_installation_access_token(
        &self,
        jwt: &CompactJwt,
        installation_id: u64,
        permissions: Option<&Permissions>,
    ) -> Result<InstallationAccessToken, Error> {
        let installation_id = installation_id.to_string();
        let url = self.endpoint(&["app", "installations", &installation_id, "access_tokens"])?;
        let body = CreateAccessTokenBody { permissions };
        call::post(&self.client, url, jwt.as_str(), &body).await
    }
}
