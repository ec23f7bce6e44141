use anyhow::{anyhow, Result};
use rand::{distr::Alphanumeric, Rng};
use reqwest::Url;

use crate::config::Config;

/// Builds redirect URLs for the hosted login and logout pages.
#[derive(Debug, Clone)]
pub struct IdentityProvider {
    domain: Option<String>,
    client_id: Option<String>,
    audience: Option<String>,
    callback_url: String,
}

impl IdentityProvider {
    pub fn new(
        domain: Option<String>,
        client_id: Option<String>,
        audience: Option<String>,
        callback_url: String,
    ) -> Self {
        Self {
            domain: domain.map(|d| normalize_domain(&d)),
            client_id,
            audience,
            callback_url,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.auth0_domain.clone(),
            config.auth0_client_id.clone(),
            config.auth0_audience.clone(),
            config.auth0_callback_url.clone(),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.domain.is_some() && self.client_id.is_some()
    }

    fn endpoint(&self, path: &str) -> Result<(Url, &str)> {
        let domain = self
            .domain
            .as_deref()
            .ok_or_else(|| anyhow!("Identity provider domain is not configured"))?;
        let client_id = self
            .client_id
            .as_deref()
            .ok_or_else(|| anyhow!("Identity provider client id is not configured"))?;

        let url = Url::parse(&format!("https://{}{}", domain, path))?;
        Ok((url, client_id))
    }

    /// Authorization-code login URL carrying `state` for CSRF protection.
    pub fn login_url(&self, state: &str) -> Result<Url> {
        let (mut url, client_id) = self.endpoint("/authorize")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", client_id)
                .append_pair("redirect_uri", &self.callback_url)
                .append_pair("scope", "openid profile email")
                .append_pair("state", state);
            if let Some(ref audience) = self.audience {
                query.append_pair("audience", audience);
            }
        }
        Ok(url)
    }

    pub fn logout_url(&self, return_to: &str) -> Result<Url> {
        let (mut url, client_id) = self.endpoint("/v2/logout")?;
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("returnTo", return_to);
        Ok(url)
    }
}

pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Accepts `tenant.auth0.com`, `https://tenant.auth0.com/` and similar.
pub fn normalize_domain(domain: &str) -> String {
    domain
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> IdentityProvider {
        IdentityProvider::new(
            Some("https://kitlog.us.auth0.com/".to_string()),
            Some("client-123".to_string()),
            Some("https://api.kitlog.io".to_string()),
            "http://localhost:5173/callback".to_string(),
        )
    }

    #[test]
    fn login_url_carries_code_flow_parameters() {
        let url = provider().login_url("xyz").unwrap();
        assert_eq!(url.host_str(), Some("kitlog.us.auth0.com"));
        assert_eq!(url.path(), "/authorize");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("response_type".into(), "code".into())));
        assert!(pairs.contains(&("client_id".into(), "client-123".into())));
        assert!(pairs.contains(&("state".into(), "xyz".into())));
        assert!(pairs.contains(&("audience".into(), "https://api.kitlog.io".into())));
        assert!(pairs.contains(&(
            "redirect_uri".into(),
            "http://localhost:5173/callback".into()
        )));
    }

    #[test]
    fn logout_url_returns_to_origin() {
        let url = provider().logout_url("http://localhost:5173").unwrap();
        assert_eq!(url.path(), "/v2/logout");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("returnTo".into(), "http://localhost:5173".into())));
    }

    #[test]
    fn unconfigured_provider_refuses_to_build_urls() {
        let provider =
            IdentityProvider::new(None, None, None, "http://localhost:5173/callback".to_string());
        assert!(!provider.is_configured());
        assert!(provider.login_url("abc").is_err());
    }

    #[test]
    fn generated_state_is_alphanumeric() {
        let state = generate_state();
        assert_eq!(state.len(), 32);
        assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(state, generate_state());
    }
}
