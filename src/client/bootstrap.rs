use std::sync::Arc;

use crate::client::{AuthSession, KitLogClient, Result};
use crate::database::models::{CreateTeamInput, Team, TeamMembership, TeamRole};

pub const SETUP_FAILED_MESSAGE: &str = "Failed to set up team. Please try again.";
pub const CREATE_FAILED_MESSAGE: &str = "Failed to create team. Please try again.";

/// Observable state of the team bootstrap flow.
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapState {
    pub memberships: Vec<TeamMembership>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for BootstrapState {
    fn default() -> Self {
        Self {
            memberships: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

/// Makes sure a signed-in user ends up with at least one team.
///
/// Team creation for a brand-new user is delegated to the server's
/// ensure-default-team operation, so concurrent resolvers converge on a
/// single personal team.
pub struct TeamBootstrap {
    client: KitLogClient,
    session: Option<AuthSession>,
    state: BootstrapState,
}

impl TeamBootstrap {
    pub fn new(client: KitLogClient) -> Self {
        Self {
            client,
            session: None,
            state: BootstrapState::default(),
        }
    }

    pub fn state(&self) -> &BootstrapState {
        &self.state
    }

    pub fn memberships(&self) -> &[TeamMembership] {
        &self.state.memberships
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn has_team(&self) -> bool {
        !self.state.memberships.is_empty()
    }

    /// First owned team, otherwise the first team.
    pub fn default_team(&self) -> Option<&TeamMembership> {
        self.state
            .memberships
            .iter()
            .find(|m| m.role == TeamRole::Owner)
            .or_else(|| self.state.memberships.first())
    }

    /// Run the flow for `session`, sending its credentials. A session that is
    /// still loading is left alone; an anonymous session or one without a
    /// user id ends the flow with no teams.
    pub async fn resolve(&mut self, session: &AuthSession) {
        if session.is_loading {
            return;
        }
        self.client = self.client.with_tokens(Arc::new(session.clone()));
        self.session = Some(session.clone());

        let Some(user_id) = session.user_id().map(str::to_string) else {
            self.state = BootstrapState {
                memberships: Vec::new(),
                loading: false,
                error: None,
            };
            return;
        };

        self.state.loading = true;
        self.state.error = None;

        if let Err(e) = self.run(&user_id).await {
            log::warn!("Team bootstrap failed for {}: {}", user_id, e);
            self.state.error = Some(SETUP_FAILED_MESSAGE.to_string());
        }
        self.state.loading = false;
    }

    /// Re-run the flow for the last resolved session.
    pub async fn refetch(&mut self) {
        if let Some(session) = self.session.clone() {
            self.resolve(&session).await;
        }
    }

    async fn run(&mut self, user_id: &str) -> Result<()> {
        let memberships = self.client.user_teams(user_id).await?;
        if !memberships.is_empty() {
            self.state.memberships = memberships;
            return Ok(());
        }
        self.state.memberships = memberships;

        log::info!("No teams for {}, creating the default team", user_id);
        self.client.ensure_default_team(user_id).await?;

        self.state.memberships = self.client.user_teams(user_id).await?;
        Ok(())
    }

    /// Create an additional team owned by the signed-in user and refresh the
    /// membership list.
    pub async fn create_team(&mut self, input: &CreateTeamInput) -> Result<Team> {
        self.state.loading = true;
        self.state.error = None;

        let result = self.create_and_refetch(input).await;
        if let Err(ref e) = result {
            log::warn!("Team creation failed: {}", e);
            self.state.error = Some(CREATE_FAILED_MESSAGE.to_string());
        }
        self.state.loading = false;
        result
    }

    async fn create_and_refetch(&mut self, input: &CreateTeamInput) -> Result<Team> {
        let team = self.client.create_team(input).await?;

        if let Some(user_id) = self.session.as_ref().and_then(|s| s.user_id()) {
            let user_id = user_id.to_string();
            self.state.memberships = self.client.user_teams(&user_id).await?;
        }
        Ok(team)
    }
}
