use crate::client::{KitLogClient, Result};
use crate::database::models::{
    AddTeamMemberInput, CreateTeamInput, Team, TeamMembership, TeamWithMembers, UpdateTeamInput,
    UpdateTeamMemberInput,
};

impl KitLogClient {
    /// The server makes the caller the owner of the new team.
    pub async fn create_team(&self, input: &CreateTeamInput) -> Result<Team> {
        self.post(self.api_url(&["teams"])?, input).await
    }

    pub async fn list_teams(&self) -> Result<Vec<Team>> {
        self.get(self.api_url(&["teams"])?).await
    }

    pub async fn get_team(&self, team_id: i64) -> Result<TeamWithMembers> {
        self.get(self.api_url(&["teams", &team_id.to_string()])?)
            .await
    }

    pub async fn update_team(&self, team_id: i64, input: &UpdateTeamInput) -> Result<Team> {
        self.put(self.api_url(&["teams", &team_id.to_string()])?, input)
            .await
    }

    pub async fn delete_team(&self, team_id: i64) -> Result<()> {
        self.delete(self.api_url(&["teams", &team_id.to_string()])?)
            .await
    }

    pub async fn add_team_member(
        &self,
        team_id: i64,
        input: &AddTeamMemberInput,
    ) -> Result<TeamMembership> {
        self.post(
            self.api_url(&["teams", &team_id.to_string(), "members"])?,
            input,
        )
        .await
    }

    pub async fn list_team_members(&self, team_id: i64) -> Result<Vec<TeamMembership>> {
        self.get(self.api_url(&["teams", &team_id.to_string(), "members"])?)
            .await
    }

    pub async fn get_team_member(&self, team_id: i64, user_id: &str) -> Result<TeamMembership> {
        self.get(self.api_url(&["teams", &team_id.to_string(), "members", user_id])?)
            .await
    }

    pub async fn update_team_member(
        &self,
        team_id: i64,
        user_id: &str,
        input: &UpdateTeamMemberInput,
    ) -> Result<TeamMembership> {
        self.put(
            self.api_url(&["teams", &team_id.to_string(), "members", user_id])?,
            input,
        )
        .await
    }

    pub async fn remove_team_member(&self, team_id: i64, user_id: &str) -> Result<()> {
        self.delete(self.api_url(&["teams", &team_id.to_string(), "members", user_id])?)
            .await
    }

    pub async fn user_teams(&self, user_id: &str) -> Result<Vec<TeamMembership>> {
        self.get(self.api_url(&["users", user_id, "teams"])?).await
    }

    /// Idempotent server-side bootstrap of the user's personal team.
    pub async fn ensure_default_team(&self, user_id: &str) -> Result<Vec<TeamMembership>> {
        self.post(
            self.api_url(&["users", user_id, "teams", "default"])?,
            &serde_json::json!({}),
        )
        .await
    }
}
