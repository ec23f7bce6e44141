use anyhow::Result;
use std::env;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173,http://localhost:8080";
const DEFAULT_SUPERADMIN_EMAILS: &str = "imarey96@gmail.com,abaq123@gmail.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub auth0_domain: Option<String>,
    pub auth0_client_id: Option<String>,
    pub auth0_audience: Option<String>,
    pub auth0_callback_url: String,
    pub superadmin_emails: Vec<String>,
    pub subscription_source: String,
    pub signup_sheet_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_env_only()
    }

    /// Load configuration from environment variables only (without loading .env files)
    /// This is useful for testing where you want to control the environment directly
    pub fn from_env_only() -> Result<Self> {
        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./kitlog.db".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            cors_origins: split_list(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
            ),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                "kitlog-development-secret-change-this-in-production".to_string()
            }),
            auth0_domain: non_empty_var("AUTH0_DOMAIN"),
            auth0_client_id: non_empty_var("AUTH0_CLIENT_ID"),
            auth0_audience: non_empty_var("AUTH0_AUDIENCE"),
            auth0_callback_url: env::var("AUTH0_CALLBACK_URL")
                .unwrap_or_else(|_| "http://localhost:5173/callback".to_string()),
            superadmin_emails: split_list(
                &env::var("SUPERADMIN_EMAILS")
                    .unwrap_or_else(|_| DEFAULT_SUPERADMIN_EMAILS.to_string()),
            ),
            subscription_source: env::var("SUBSCRIPTION_SOURCE")
                .unwrap_or_else(|_| "none".to_string()),
            signup_sheet_path: env::var("SIGNUP_SHEET_PATH")
                .unwrap_or_else(|_| "./signups.csv".to_string()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// True when bearer tokens are verified against the identity provider's JWKS
    /// instead of the shared development secret.
    pub fn uses_oidc(&self) -> bool {
        self.auth0_domain.is_some()
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| item.to_string())
        .collect()
}
