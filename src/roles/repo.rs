use serde_json::Value;
use sqlx::PgPool;

use crate::roles::repo_types::Role;

const ROLE_COLUMNS: &str = "id, title, permissions, is_deleted, created_at";

impl Role {
    pub async fn find_active(db: &PgPool, id: i64) -> anyhow::Result<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles WHERE id = $1 AND NOT is_deleted",
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(role)
    }

    pub async fn list_active(db: &PgPool) -> anyhow::Result<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles WHERE NOT is_deleted ORDER BY id",
        ))
        .fetch_all(db)
        .await?;
        Ok(roles)
    }

    pub async fn create(db: &PgPool, title: &str, permissions: &Value) -> anyhow::Result<Role> {
        let role = sqlx::query_as::<_, Role>(&format!(
            "INSERT INTO roles (title, permissions) VALUES ($1, $2) RETURNING {ROLE_COLUMNS}",
        ))
        .bind(title)
        .bind(permissions)
        .fetch_one(db)
        .await?;
        Ok(role)
    }

    pub async fn update(
        db: &PgPool,
        id: i64,
        title: Option<&str>,
        permissions: Option<&Value>,
    ) -> anyhow::Result<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(&format!(
            "UPDATE roles \
             SET title = COALESCE($2, title), permissions = COALESCE($3, permissions) \
             WHERE id = $1 AND NOT is_deleted \
             RETURNING {ROLE_COLUMNS}",
        ))
        .bind(id)
        .bind(title)
        .bind(permissions)
        .fetch_optional(db)
        .await?;
        Ok(role)
    }

    pub async fn soft_delete(db: &PgPool, id: i64) -> anyhow::Result<bool> {
        let result =
            sqlx::query("UPDATE roles SET is_deleted = TRUE WHERE id = $1 AND NOT is_deleted")
                .bind(id)
                .execute(db)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
