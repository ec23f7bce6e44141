use reqwest::Method;
use serde::Deserialize;

use crate::access::{AccessRequirement, GateResponse, RoleResolution};
use crate::client::{ClientError, KitLogClient, Result};
use crate::database::models::{
    CollectEmailInput, CreateSignupInput, EmailSignup, SignupCount, User,
};

#[derive(Debug, Deserialize)]
struct CollectEmailReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

impl KitLogClient {
    /// Sync the signed-in user and return their stored profile.
    pub async fn me(&self) -> Result<User> {
        self.get(self.api_url(&["auth", "me"])?).await
    }

    pub async fn complete_onboarding(&self) -> Result<User> {
        self.post(
            self.api_url(&["auth", "me", "onboarding"])?,
            &serde_json::json!({}),
        )
        .await
    }

    pub async fn access(&self) -> Result<RoleResolution> {
        self.get(self.api_url(&["access"])?).await
    }

    pub async fn check_access(&self, requirement: &AccessRequirement) -> Result<GateResponse> {
        self.post(self.api_url(&["access", "check"])?, requirement)
            .await
    }

    pub async fn create_signup(&self, input: &CreateSignupInput) -> Result<EmailSignup> {
        self.post(self.api_url(&["signups"])?, input).await
    }

    pub async fn list_signups(&self, skip: i64, limit: i64) -> Result<Vec<EmailSignup>> {
        let url = self.api_url(&["signups"])?;
        let builder = self
            .request(Method::GET, url)
            .await
            .query(&[("skip", skip), ("limit", limit)]);
        self.send(builder).await
    }

    pub async fn signup_count(&self) -> Result<i64> {
        let count: SignupCount = self.get(self.api_url(&["signups", "count"])?).await?;
        Ok(count.count)
    }

    /// Landing-page collector. Its replies are bare `{success}` / `{error}`
    /// objects rather than the API envelope.
    pub async fn collect_email(&self, email: &str) -> Result<()> {
        let url = self.url(&["api", "collect-email"])?;
        let body = CollectEmailInput {
            email: Some(email.to_string()),
        };
        let response = self.request(Method::POST, url).await.json(&body).send().await?;
        let status = response.status();
        let reply = response.json::<CollectEmailReply>().await.ok();

        if status.is_success() && reply.as_ref().is_some_and(|r| r.success) {
            return Ok(());
        }

        Err(ClientError::Api {
            status: status.as_u16(),
            status_text: status
                .canonical_reason()
                .unwrap_or("Unknown Status")
                .to_string(),
            message: reply.and_then(|r| r.error),
        })
    }
}
