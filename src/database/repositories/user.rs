use chrono::Utc;
use sqlx::SqlitePool;

use crate::auth::Identity;
use crate::database::models::User;

const USER_COLUMNS: &str = r#"
    id,
    email,
    name,
    picture,
    email_verified,
    is_active,
    has_completed_onboarding,
    last_login,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or refresh the local copy of an authenticated user and stamp
    /// `last_login`. Profile fields missing from the token keep their stored value.
    pub async fn upsert_from_identity(&self, identity: &Identity) -> Result<User, sqlx::Error> {
        let now = Utc::now();

        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO
                users (id, email, name, picture, email_verified, last_login, created_at, updated_at)
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE
            SET
                email = COALESCE(excluded.email, users.email),
                name = COALESCE(excluded.name, users.name),
                picture = COALESCE(excluded.picture, users.picture),
                email_verified = excluded.email_verified,
                last_login = excluded.last_login,
                updated_at = excluded.updated_at
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&identity.id)
        .bind(&identity.email)
        .bind(&identity.name)
        .bind(&identity.picture)
        .bind(identity.email_verified)
        .bind(now)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn mark_onboarding_complete(&self, id: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE
                users
            SET
                has_completed_onboarding = 1,
                updated_at = ?
            WHERE
                id = ?
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}
