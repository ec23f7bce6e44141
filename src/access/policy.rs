use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::access::role::{Role, RoleResolution};
use crate::auth::Identity;
use crate::config::Config;
use crate::database::repositories::TeamRepository;

/// Answers whether an identity holds a paid subscription.
#[async_trait]
pub trait SubscriptionCheck: Send + Sync {
    async fn has_paid_subscription(&self, identity: &Identity) -> Result<bool>;
}

/// No payment integration exists yet, so nobody is paid.
#[derive(Debug, Clone, Default)]
pub struct NoPaidSubscriptions;

#[async_trait]
impl SubscriptionCheck for NoPaidSubscriptions {
    async fn has_paid_subscription(&self, _identity: &Identity) -> Result<bool> {
        Ok(false)
    }
}

/// Paid when the identity belongs to an active team on the paid plan.
#[derive(Clone)]
pub struct TeamSubscriptionCheck {
    team_repository: TeamRepository,
}

impl TeamSubscriptionCheck {
    pub fn new(team_repository: TeamRepository) -> Self {
        Self { team_repository }
    }
}

#[async_trait]
impl SubscriptionCheck for TeamSubscriptionCheck {
    async fn has_paid_subscription(&self, identity: &Identity) -> Result<bool> {
        self.team_repository.user_has_paid_team(&identity.id).await
    }
}

/// Maps identities to roles.
///
/// The superadmin allow-list comes from configuration and is compared
/// case-insensitively. Resolution is total: a failing subscription lookup
/// degrades to `free` rather than surfacing an error.
#[derive(Clone)]
pub struct RolePolicy {
    superadmin_emails: Vec<String>,
    subscription: Arc<dyn SubscriptionCheck>,
}

impl RolePolicy {
    pub fn new(superadmin_emails: Vec<String>, subscription: Arc<dyn SubscriptionCheck>) -> Self {
        Self {
            superadmin_emails: superadmin_emails
                .into_iter()
                .map(|email| normalize_email(&email))
                .filter(|email| !email.is_empty())
                .collect(),
            subscription,
        }
    }

    /// Build the policy described by the configuration. `SUBSCRIPTION_SOURCE=teams`
    /// switches the paid check to team plans; anything else keeps the stub.
    pub fn from_config(config: &Config, team_repository: TeamRepository) -> Self {
        let subscription: Arc<dyn SubscriptionCheck> = match config.subscription_source.as_str() {
            "teams" => Arc::new(TeamSubscriptionCheck::new(team_repository)),
            "none" => Arc::new(NoPaidSubscriptions),
            other => {
                log::warn!(
                    "Unknown SUBSCRIPTION_SOURCE '{}', treating every user as unpaid",
                    other
                );
                Arc::new(NoPaidSubscriptions)
            }
        };

        Self::new(config.superadmin_emails.clone(), subscription)
    }

    pub fn is_superadmin_email(&self, email: &str) -> bool {
        let email = normalize_email(email);
        !email.is_empty() && self.superadmin_emails.contains(&email)
    }

    pub async fn resolve(&self, identity: Option<&Identity>) -> RoleResolution {
        let Some(identity) = identity else {
            return RoleResolution::unauthenticated();
        };

        if identity
            .email
            .as_deref()
            .is_some_and(|email| self.is_superadmin_email(email))
        {
            return RoleResolution::for_role(Role::Superadmin);
        }

        let paid = match self.subscription.has_paid_subscription(identity).await {
            Ok(paid) => paid,
            Err(e) => {
                log::warn!(
                    "Subscription lookup failed for user {}, resolving as free: {}",
                    identity.id,
                    e
                );
                false
            }
        };

        RoleResolution::for_role(if paid { Role::Paid } else { Role::Free })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
