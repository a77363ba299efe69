use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::User;

const USER_COLUMNS: &str = "id, first_name, last_name, email, password_hash, role_id, \
                            is_admin, is_active, is_deleted, created_at";

impl User {
    /// Find a loginable user by email: active and not soft-deleted.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND is_active AND NOT is_deleted",
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Live row lookup used by the token verifier on every protected request.
    pub async fn find_active_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND is_active AND NOT is_deleted",
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Whether any row (active or not) already holds this email.
    pub async fn email_taken(
        db: &PgPool,
        email: &str,
        exclude_id: Option<i64>,
    ) -> anyhow::Result<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND id <> COALESCE($2, -1))",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(db)
        .await?;
        Ok(taken)
    }

    pub async fn create(
        db: &PgPool,
        first_name: &str,
        last_name: &str,
        email: &str,
        password_hash: &str,
        role_id: i64,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (first_name, last_name, email, password_hash, role_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}",
        ))
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(password_hash)
        .bind(role_id)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Update email and/or password hash; untouched fields keep their value.
    pub async fn update_profile(
        db: &PgPool,
        id: i64,
        email: Option<&str>,
        password_hash: Option<&str>,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users \
             SET email = COALESCE($2, email), password_hash = COALESCE($3, password_hash) \
             WHERE id = $1 AND NOT is_deleted \
             RETURNING {USER_COLUMNS}",
        ))
        .bind(id)
        .bind(email)
        .bind(password_hash)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn list_active(db: &PgPool) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE is_active AND NOT is_deleted \
             ORDER BY id",
        ))
        .fetch_all(db)
        .await?;
        Ok(users)
    }
}

/// Record a refresh token id as revoked until its natural expiry.
pub async fn revoke_token(db: &PgPool, jti: Uuid, expires_at: OffsetDateTime) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO revoked_tokens (jti, expires_at) VALUES ($1, $2) ON CONFLICT DO NOTHING")
        .bind(jti)
        .bind(expires_at)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn is_token_revoked(db: &PgPool, jti: Uuid) -> anyhow::Result<bool> {
    let revoked =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $1)")
            .bind(jti)
            .fetch_one(db)
            .await?;
    Ok(revoked)
}
