use crate::client::{AuthSession, KitLogClient, Result};
use crate::database::models::{TeamMembership, TeamRole};

/// The team the user is currently working in, chosen from their memberships.
pub struct TeamContext {
    client: KitLogClient,
    teams: Vec<TeamMembership>,
    current: Option<TeamMembership>,
}

impl TeamContext {
    pub fn new(client: KitLogClient) -> Self {
        Self {
            client,
            teams: Vec::new(),
            current: None,
        }
    }

    /// Start from already-fetched memberships, selecting the default team.
    pub fn from_memberships(client: KitLogClient, teams: Vec<TeamMembership>) -> Self {
        let current = default_selection(&teams);
        Self {
            client,
            teams,
            current,
        }
    }

    pub fn teams(&self) -> &[TeamMembership] {
        &self.teams
    }

    pub fn current_team(&self) -> Option<&TeamMembership> {
        self.current.as_ref()
    }

    pub fn has_teams(&self) -> bool {
        !self.teams.is_empty()
    }

    pub fn switch_team(&mut self, team: TeamMembership) {
        self.current = Some(team);
    }

    /// Fetch memberships and select the default team.
    pub async fn load(&mut self, session: &AuthSession) -> Result<()> {
        let Some(user_id) = session.user_id() else {
            return Ok(());
        };

        self.teams = self.client.user_teams(user_id).await?;
        self.current = default_selection(&self.teams);
        Ok(())
    }

    /// Re-fetch memberships, keeping the current team selected if it is still
    /// among them.
    pub async fn refresh(&mut self, session: &AuthSession) -> Result<()> {
        let Some(user_id) = session.user_id() else {
            return Ok(());
        };

        self.teams = self.client.user_teams(user_id).await?;
        self.current = match self.current.take() {
            Some(current) => self
                .teams
                .iter()
                .find(|t| t.id == current.id)
                .or_else(|| self.teams.first())
                .cloned(),
            None => default_selection(&self.teams),
        };
        Ok(())
    }

    pub fn is_owner(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|t| t.role == TeamRole::Owner)
    }

    pub fn is_admin(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|t| t.role.can_manage_team())
    }
}

fn default_selection(teams: &[TeamMembership]) -> Option<TeamMembership> {
    teams
        .iter()
        .find(|t| t.role == TeamRole::Owner)
        .or_else(|| teams.first())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn membership(id: i64, team_id: i64, role: TeamRole) -> TeamMembership {
        TeamMembership {
            id,
            team_id,
            user_id: "auth0|ctx".to_string(),
            role,
            user_name: None,
            user_email: None,
            joined_at: Utc::now(),
            team_name: Some(format!("Team {}", team_id)),
            team_description: None,
        }
    }

    fn client() -> KitLogClient {
        KitLogClient::anonymous("http://localhost:8000").unwrap()
    }

    #[test]
    fn owned_team_is_selected_first() {
        let ctx = TeamContext::from_memberships(
            client(),
            vec![
                membership(1, 10, TeamRole::Member),
                membership(2, 20, TeamRole::Owner),
            ],
        );
        assert_eq!(ctx.current_team().map(|t| t.team_id), Some(20));
        assert!(ctx.is_owner());
        assert!(ctx.is_admin());
    }

    #[test]
    fn falls_back_to_first_team() {
        let mut ctx = TeamContext::from_memberships(
            client(),
            vec![
                membership(1, 10, TeamRole::Member),
                membership(2, 20, TeamRole::Admin),
            ],
        );
        assert_eq!(ctx.current_team().map(|t| t.team_id), Some(10));
        assert!(!ctx.is_owner());
        assert!(!ctx.is_admin());

        ctx.switch_team(membership(2, 20, TeamRole::Admin));
        assert!(ctx.is_admin());
        assert!(!ctx.is_owner());
    }

    #[test]
    fn empty_context_has_no_selection() {
        let ctx = TeamContext::from_memberships(client(), Vec::new());
        assert!(!ctx.has_teams());
        assert!(ctx.current_team().is_none());
        assert!(!ctx.is_admin());
    }
}
