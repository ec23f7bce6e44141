use chrono::Utc;
use sqlx::SqlitePool;

use crate::database::models::{CreateSignupInput, EmailSignup, DEFAULT_SIGNUP_SOURCE};

#[derive(Clone)]
pub struct SignupRepository {
    pool: SqlitePool,
}

impl SignupRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: &CreateSignupInput) -> Result<EmailSignup, sqlx::Error> {
        let source = input
            .source
            .as_deref()
            .filter(|source| !source.trim().is_empty())
            .unwrap_or(DEFAULT_SIGNUP_SOURCE);

        sqlx::query_as::<_, EmailSignup>(
            r#"
            INSERT INTO
                email_signups (name, email, source, created_at)
            VALUES
                (?, ?, ?, ?)
            RETURNING id, name, email, source, created_at
            "#,
        )
        .bind(&input.name)
        .bind(input.email.trim())
        .bind(source)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<EmailSignup>, sqlx::Error> {
        sqlx::query_as::<_, EmailSignup>(
            "SELECT id, name, email, source, created_at FROM email_signups WHERE email = ?",
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list(&self, offset: i64, limit: i64) -> Result<Vec<EmailSignup>, sqlx::Error> {
        sqlx::query_as::<_, EmailSignup>(
            r#"
            SELECT
                id,
                name,
                email,
                source,
                created_at
            FROM
                email_signups
            ORDER BY
                created_at DESC,
                id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM email_signups")
            .fetch_one(&self.pool)
            .await
    }
}
