use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SIGNUP_SOURCE: &str = "landing_page";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EmailSignup {
    pub id: i64,
    pub name: Option<String>,
    pub email: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSignupInput {
    pub email: String,
    pub name: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupCount {
    pub count: i64,
}

/// Body of the landing-page email collector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectEmailInput {
    #[serde(default)]
    pub email: Option<String>,
}
