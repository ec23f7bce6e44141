use crate::auth::Identity;
use crate::database::models::TeamMembership;
use crate::database::repositories::{DefaultTeamSpec, TeamRepository};
use crate::error::AppError;

const FALLBACK_TEAM_OWNER: &str = "My Team";
const DEFAULT_TEAM_DESCRIPTION: &str = "Your personal team";

#[derive(Clone)]
pub struct TeamService {
    repository: TeamRepository,
}

impl TeamService {
    pub fn new(repository: TeamRepository) -> Self {
        Self { repository }
    }

    /// Name and description for the personal team of `identity`.
    pub fn default_team_spec(identity: &Identity) -> DefaultTeamSpec {
        let name = match identity.display_name() {
            Some(owner) => format!("{}'s Team", owner.trim()),
            None => FALLBACK_TEAM_OWNER.to_string(),
        };

        DefaultTeamSpec {
            name,
            description: DEFAULT_TEAM_DESCRIPTION.to_string(),
        }
    }

    /// Memberships of `identity`, creating their personal team first when they
    /// have none. Safe to call repeatedly and concurrently.
    pub async fn ensure_default_team(
        &self,
        identity: &Identity,
    ) -> Result<Vec<TeamMembership>, AppError> {
        if identity.id.trim().is_empty() {
            return Err(AppError::BadRequest("User id is required".to_string()));
        }

        let spec = Self::default_team_spec(identity);
        let memberships = self
            .repository
            .ensure_default_team(identity, &spec)
            .await
            .map_err(|e| {
                log::error!("Failed to ensure default team for {}: {}", identity.id, e);
                AppError::DatabaseError(e)
            })?;

        log::debug!(
            "User {} has {} team membership(s)",
            identity.id,
            memberships.len()
        );
        Ok(memberships)
    }
}
