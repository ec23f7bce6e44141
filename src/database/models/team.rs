use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
    #[serde(rename_all = "lowercase")]
    pub enum SubscriptionType {
        #[default]
        Free => "free",
        Paid => "paid",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
    #[serde(rename_all = "lowercase")]
    pub enum TeamRole {
        Owner => "owner",
        Admin => "admin",
        #[default]
        Member => "member",
    }
}

impl TeamRole {
    /// Owners and admins may edit the team and its roster.
    pub fn can_manage_team(&self) -> bool {
        matches!(self, TeamRole::Owner | TeamRole::Admin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub subscription_type: SubscriptionType,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamInput {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub subscription_type: SubscriptionType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub subscription_type: Option<SubscriptionType>,
}

/// Binds a user to a team with a role. Carries the team's name for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeamMembership {
    pub id: i64,
    pub team_id: i64,
    pub user_id: String,
    pub role: TeamRole,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub team_name: Option<String>,
    pub team_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTeamMemberInput {
    pub user_id: String,
    #[serde(default)]
    pub role: TeamRole,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamMemberInput {
    pub role: TeamRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamWithMembers {
    #[serde(flatten)]
    pub team: Team,
    pub members: Vec<TeamMembership>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_role_parses_case_insensitively() {
        assert_eq!("OWNER".parse::<TeamRole>().unwrap(), TeamRole::Owner);
        assert!("viewer".parse::<TeamRole>().is_err());
        assert_eq!(TeamRole::Admin.to_string(), "admin");
    }

    #[test]
    fn only_owners_and_admins_manage_teams() {
        assert!(TeamRole::Owner.can_manage_team());
        assert!(TeamRole::Admin.can_manage_team());
        assert!(!TeamRole::Member.can_manage_team());
    }

    #[test]
    fn create_input_defaults_to_free_plan() {
        let input: CreateTeamInput = serde_json::from_str(r#"{"name": "Grip Dept"}"#).unwrap();
        assert_eq!(input.subscription_type, SubscriptionType::Free);
        assert_eq!(input.description, None);
    }

    #[test]
    fn member_input_defaults_to_member_role() {
        let input: AddTeamMemberInput =
            serde_json::from_str(r#"{"userId": "auth0|42"}"#).unwrap();
        assert_eq!(input.role, TeamRole::Member);
    }
}
