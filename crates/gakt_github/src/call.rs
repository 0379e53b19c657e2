use super::error::Error;
use super::models::ErrorBody;
use super::API_VERSION;
use reqwest::header::ACCEPT;
use reqwest::{Client, Request, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{field, info_span, Instrument, Span};

pub const GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";

async fn call_api<T: DeserializeOwned>(client: &Client, request: Request) -> Result<T, Error> {
    let span = info_span!(
        "github request",
        http.method = %request.method(),
        http.url = %request.url(),
        http.status_code = field::Empty,
    );

    async move {
        let res = client.execute(request).await?;
        let status = res.status();
        Span::current().record("http.status_code", status.as_u16());

        if !status.is_success() {
            // GitHub puts a human readable reason into `message`; fall back to
            // the status text for proxies that answer with HTML.
            let message = match res.json::<ErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => status.canonical_reason().unwrap_or("unknown").to_owned(),
            };
            return Err(Error::Status { status, message });
        }

        Ok(res.json().await?)
    }
    .instrument(span)
    .await
}

fn with_app_auth(builder: RequestBuilder, jwt: &str) -> RequestBuilder {
    builder
        .bearer_auth(jwt)
        .header(ACCEPT, GITHUB_JSON)
        .header(API_VERSION_HEADER, API_VERSION)
}

pub async fn get<T: DeserializeOwned>(client: &Client, url: Url, jwt: &str) -> Result<T, Error> {
    let request = with_app_auth(client.get(url), jwt).build()?;
    call_api(client, request).await
}

pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
    client: &Client,
    url: Url,
    jwt: &str,
    body: &B,
) -> Result<T, Error> {
    let request = with_app_auth(client.post(url), jwt).json(body).build()?;
    call_api(client, request).await
}
