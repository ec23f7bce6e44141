use async_trait::async_trait;
use std::sync::Arc;

use crate::auth::Identity;

/// Supplies the bearer token for outgoing API calls. `None` sends the
/// request unauthenticated.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Option<String>;
}

/// A fixed token, e.g. one obtained out of band.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoToken;

#[async_trait]
impl TokenSource for NoToken {
    async fn access_token(&self) -> Option<String> {
        None
    }
}

/// What the application knows about the signed-in user.
#[derive(Clone)]
pub struct AuthSession {
    pub identity: Option<Identity>,
    pub is_loading: bool,
    tokens: Arc<dyn TokenSource>,
}

impl AuthSession {
    pub fn anonymous() -> Self {
        Self {
            identity: None,
            is_loading: false,
            tokens: Arc::new(NoToken),
        }
    }

    /// The identity provider has not reported back yet.
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::anonymous()
        }
    }

    pub fn signed_in(identity: Identity, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            identity: Some(identity),
            is_loading: false,
            tokens,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Id of the signed-in user, if there is one and it is non-empty.
    pub fn user_id(&self) -> Option<&str> {
        self.identity
            .as_ref()
            .map(|identity| identity.id.as_str())
            .filter(|id| !id.trim().is_empty())
    }
}

#[async_trait]
impl TokenSource for AuthSession {
    async fn access_token(&self) -> Option<String> {
        if !self.is_authenticated() {
            return None;
        }
        let token = self.tokens.access_token().await;
        if token.is_none() {
            log::warn!("Could not obtain an access token, sending the request without one");
        }
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn anonymous_session_sends_no_token() {
        assert_eq!(AuthSession::anonymous().access_token().await, None);
        assert_eq!(NoToken.access_token().await, None);
    }

    #[tokio::test]
    async fn signed_in_session_delegates_to_its_source() {
        let identity = Identity {
            id: "auth0|t".to_string(),
            email: None,
            name: None,
            picture: None,
            email_verified: false,
        };
        let session = AuthSession::signed_in(identity, Arc::new(StaticToken("tok".to_string())));

        assert!(session.is_authenticated());
        assert_eq!(session.user_id(), Some("auth0|t"));
        assert_eq!(session.access_token().await.as_deref(), Some("tok"));
    }

    #[test]
    fn blank_user_id_is_not_usable() {
        let identity = Identity {
            id: " ".to_string(),
            email: None,
            name: None,
            picture: None,
            email_verified: false,
        };
        let session = AuthSession::signed_in(identity, Arc::new(NoToken));
        assert!(session.is_authenticated());
        assert_eq!(session.user_id(), None);
    }
}
