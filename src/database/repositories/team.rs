use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::auth::Identity;
use crate::database::models::{
    AddTeamMemberInput, CreateTeamInput, SubscriptionType, Team, TeamMembership, TeamRole,
    UpdateTeamInput,
};

const TEAM_COLUMNS: &str = r#"
    id,
    name,
    description,
    subscription_type,
    is_active,
    created_at,
    updated_at
"#;

const MEMBERSHIP_SELECT: &str = r#"
    SELECT
        tm.id,
        tm.team_id,
        tm.user_id,
        tm.role,
        tm.user_name,
        tm.user_email,
        tm.joined_at,
        t.name AS team_name,
        t.description AS team_description
    FROM
        team_memberships tm
        INNER JOIN teams t ON t.id = tm.team_id
"#;

/// Name and description given to a user's auto-created personal team.
#[derive(Debug, Clone)]
pub struct DefaultTeamSpec {
    pub name: String,
    pub description: String,
}

#[derive(Clone)]
pub struct TeamRepository {
    pool: SqlitePool,
}

impl TeamRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a team and make `owner` its owner in one transaction.
    pub async fn create_team_with_owner(
        &self,
        input: &CreateTeamInput,
        owner: &Identity,
    ) -> Result<Team, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let team = sqlx::query_as::<_, Team>(&format!(
            r#"
            INSERT INTO
                teams (name, description, subscription_type, is_active, created_at, updated_at)
            VALUES
                (?, ?, ?, 1, ?, ?)
            RETURNING {}
            "#,
            TEAM_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.subscription_type)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        insert_owner_membership(&mut tx, team.id, owner).await?;

        tx.commit().await?;
        Ok(team)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Team>, sqlx::Error> {
        sqlx::query_as::<_, Team>(&format!(
            "SELECT {} FROM teams WHERE id = ? AND is_active = 1",
            TEAM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list_active(&self) -> Result<Vec<Team>, sqlx::Error> {
        sqlx::query_as::<_, Team>(&format!(
            "SELECT {} FROM teams WHERE is_active = 1 ORDER BY name",
            TEAM_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn update_team(
        &self,
        id: i64,
        input: &UpdateTeamInput,
    ) -> Result<Option<Team>, sqlx::Error> {
        sqlx::query_as::<_, Team>(&format!(
            r#"
            UPDATE
                teams
            SET
                name = COALESCE(?, name),
                description = COALESCE(?, description),
                subscription_type = COALESCE(?, subscription_type),
                updated_at = ?
            WHERE
                id = ?
                AND is_active = 1
            RETURNING {}
            "#,
            TEAM_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.subscription_type)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Soft delete. Also releases the personal-team key so a fresh default
    /// team can be created for its owner later.
    pub async fn deactivate_team(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE
                teams
            SET
                is_active = 0,
                default_owner_id = NULL,
                updated_at = ?
            WHERE
                id = ?
                AND is_active = 1
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn get_membership(
        &self,
        team_id: i64,
        user_id: &str,
    ) -> Result<Option<TeamMembership>, sqlx::Error> {
        sqlx::query_as::<_, TeamMembership>(&format!(
            "{} WHERE tm.team_id = ? AND tm.user_id = ?",
            MEMBERSHIP_SELECT
        ))
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn add_member(
        &self,
        team_id: i64,
        input: &AddTeamMemberInput,
    ) -> Result<TeamMembership, sqlx::Error> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO
                team_memberships (team_id, user_id, role, user_name, user_email, joined_at)
            VALUES
                (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(team_id)
        .bind(&input.user_id)
        .bind(input.role)
        .bind(&input.user_name)
        .bind(&input.user_email)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        self.membership_by_id(id).await
    }

    async fn membership_by_id(&self, id: i64) -> Result<TeamMembership, sqlx::Error> {
        sqlx::query_as::<_, TeamMembership>(&format!("{} WHERE tm.id = ?", MEMBERSHIP_SELECT))
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn list_members(&self, team_id: i64) -> Result<Vec<TeamMembership>, sqlx::Error> {
        sqlx::query_as::<_, TeamMembership>(&format!(
            "{} WHERE tm.team_id = ? ORDER BY tm.joined_at, tm.id",
            MEMBERSHIP_SELECT
        ))
        .bind(team_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn update_member_role(
        &self,
        team_id: i64,
        user_id: &str,
        role: TeamRole,
    ) -> Result<Option<TeamMembership>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE team_memberships SET role = ? WHERE team_id = ? AND user_id = ?",
        )
        .bind(role)
        .bind(team_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_membership(team_id, user_id).await
    }

    pub async fn remove_member(&self, team_id: i64, user_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM team_memberships WHERE team_id = ? AND user_id = ?")
            .bind(team_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_owners(&self, team_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM team_memberships WHERE team_id = ? AND role = ?",
        )
        .bind(team_id)
        .bind(TeamRole::Owner)
        .fetch_one(&self.pool)
        .await
    }

    /// Memberships of `user_id` in active teams, owned teams first.
    pub async fn memberships_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<TeamMembership>, sqlx::Error> {
        sqlx::query_as::<_, TeamMembership>(&memberships_for_user_sql())
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn user_has_paid_team(&self, user_id: &str) -> anyhow::Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT
                COUNT(*)
            FROM
                team_memberships tm
                INNER JOIN teams t ON t.id = tm.team_id
            WHERE
                tm.user_id = ?
                AND t.is_active = 1
                AND t.subscription_type = ?
            "#,
        )
        .bind(user_id)
        .bind(SubscriptionType::Paid)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Give `owner` a personal team unless they already belong to one.
    ///
    /// Runs as a single transaction whose first statement is a write, so
    /// concurrent callers serialize on the write lock. A personal team the
    /// owner no longer belongs to gives up its key first; the owner is only
    /// ever added to a team created here, never to an existing one.
    pub async fn ensure_default_team(
        &self,
        owner: &Identity,
        spec: &DefaultTeamSpec,
    ) -> Result<Vec<TeamMembership>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let released = sqlx::query(
            r#"
            UPDATE
                teams
            SET
                default_owner_id = NULL,
                updated_at = ?
            WHERE
                default_owner_id = ?
                AND id NOT IN (
                    SELECT
                        team_id
                    FROM
                        team_memberships
                    WHERE
                        user_id = ?
                )
            "#,
        )
        .bind(now)
        .bind(&owner.id)
        .bind(&owner.id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if released > 0 {
            log::info!("Released personal team key of former owner {}", owner.id);
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO
                teams (name, description, subscription_type, is_active, default_owner_id, created_at, updated_at)
            SELECT
                ?, ?, ?, 1, ?, ?, ?
            WHERE
                NOT EXISTS (
                    SELECT
                        1
                    FROM
                        team_memberships tm
                        INNER JOIN teams t ON t.id = tm.team_id
                    WHERE
                        tm.user_id = ?
                        AND t.is_active = 1
                )
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&spec.name)
        .bind(&spec.description)
        .bind(SubscriptionType::Free)
        .bind(&owner.id)
        .bind(now)
        .bind(now)
        .bind(&owner.id)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() > 0 {
            let team_id = inserted.last_insert_rowid();
            insert_owner_membership(&mut tx, team_id, owner).await?;
            log::info!("Created default team {} for user {}", team_id, owner.id);
        }

        let memberships = sqlx::query_as::<_, TeamMembership>(&memberships_for_user_sql())
            .bind(&owner.id)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(memberships)
    }
}

fn memberships_for_user_sql() -> String {
    format!(
        r#"{}
        WHERE
            tm.user_id = ?
            AND t.is_active = 1
        ORDER BY
            CASE tm.role WHEN 'owner' THEN 0 ELSE 1 END,
            tm.joined_at,
            tm.id
        "#,
        MEMBERSHIP_SELECT
    )
}

async fn insert_owner_membership(
    tx: &mut Transaction<'_, Sqlite>,
    team_id: i64,
    owner: &Identity,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO
            team_memberships (team_id, user_id, role, user_name, user_email, joined_at)
        VALUES
            (?, ?, ?, ?, ?, ?)
        ON CONFLICT (team_id, user_id) DO NOTHING
        "#,
    )
    .bind(team_id)
    .bind(&owner.id)
    .bind(TeamRole::Owner)
    .bind(owner.display_name())
    .bind(&owner.email)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;

    Ok(())
}
