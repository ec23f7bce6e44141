//! Typed HTTP client for the KitLog API plus the client-side flows built on it.
//!
//! Every call attaches the bearer token from the client's own
//! [`TokenSource`], so several clients with different credentials can live in
//! one process.

use reqwest::{Method, RequestBuilder, Url};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;

use crate::handlers::shared::ApiResponse;

pub mod access_view;
pub mod account;
pub mod bootstrap;
pub mod equipment;
pub mod error;
pub mod team_context;
pub mod teams;
pub mod token;

pub use access_view::AccessView;
pub use bootstrap::{BootstrapState, TeamBootstrap};
pub use error::{ClientError, Result};
pub use team_context::TeamContext;
pub use token::{AuthSession, NoToken, StaticToken, TokenSource};

#[derive(Clone)]
pub struct KitLogClient {
    base_url: Url,
    http_client: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
}

impl KitLogClient {
    /// `base_url` is the server root, e.g. `http://localhost:8000`.
    pub fn new(base_url: &str, tokens: Arc<dyn TokenSource>) -> Result<Self> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!(
                "{} cannot be used as a base URL",
                base_url
            )));
        }

        Ok(Self {
            base_url,
            http_client: reqwest::Client::new(),
            tokens,
        })
    }

    pub fn anonymous(base_url: &str) -> Result<Self> {
        Self::new(base_url, Arc::new(NoToken))
    }

    pub fn for_session(base_url: &str, session: &AuthSession) -> Result<Self> {
        Self::new(base_url, Arc::new(session.clone()))
    }

    /// Same server, different credentials.
    pub fn with_tokens(&self, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            base_url: self.base_url.clone(),
            http_client: self.http_client.clone(),
            tokens,
        }
    }

    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn api_url(&self, segments: &[&str]) -> Result<Url> {
        let mut all = Vec::with_capacity(segments.len() + 2);
        all.extend_from_slice(&["api", "v1"]);
        all.extend_from_slice(segments);
        self.url(&all)
    }

    pub(crate) async fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut builder = self
            .http_client
            .request(method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(token) = self.tokens.access_token().await {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send and unwrap the `data` of the API envelope.
    pub(crate) async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let envelope = self.send_envelope::<T>(builder).await?;
        envelope
            .data
            .ok_or_else(|| ClientError::Decode("response carried no data".to_string()))
    }

    /// Send a call whose envelope carries only a message.
    pub(crate) async fn send_unit(&self, builder: RequestBuilder) -> Result<()> {
        self.send_envelope::<serde_json::Value>(builder).await?;
        Ok(())
    }

    async fn send_envelope<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<ApiResponse<T>> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ApiResponse<serde_json::Value>>()
                .await
                .ok()
                .and_then(|body| body.message);
            log::debug!("API call failed with {}: {:?}", status, message);
            return Err(ClientError::Api {
                status: status.as_u16(),
                status_text: status
                    .canonical_reason()
                    .unwrap_or("Unknown Status")
                    .to_string(),
                message,
            });
        }

        response
            .json::<ApiResponse<T>>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let builder = self.request(Method::GET, url).await;
        self.send(builder).await
    }

    pub(crate) async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T> {
        let builder = self.request(Method::POST, url).await.json(body);
        self.send(builder).await
    }

    pub(crate) async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T> {
        let builder = self.request(Method::PUT, url).await.json(body);
        self.send(builder).await
    }

    pub(crate) async fn delete(&self, url: Url) -> Result<()> {
        let builder = self.request(Method::DELETE, url).await;
        self.send_unit(builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_urls_are_built_from_segments() {
        let client = KitLogClient::anonymous("http://localhost:8000").unwrap();
        assert_eq!(
            client.api_url(&["equipment", "7"]).unwrap().as_str(),
            "http://localhost:8000/api/v1/equipment/7"
        );

        let client = KitLogClient::anonymous("http://localhost:8000/").unwrap();
        assert_eq!(
            client.url(&["api", "collect-email"]).unwrap().as_str(),
            "http://localhost:8000/api/collect-email"
        );
    }

    #[test]
    fn user_ids_are_escaped_as_one_segment() {
        let client = KitLogClient::anonymous("http://localhost:8000").unwrap();
        let url = client.api_url(&["users", "oauth2/abc", "teams"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/v1/users/oauth2%2Fabc/teams"
        );
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(matches!(
            KitLogClient::anonymous("mailto:crew@example.com"),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(KitLogClient::anonymous("not a url").is_err());
    }
}
