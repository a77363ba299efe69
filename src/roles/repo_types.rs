use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Role record in the database. `permissions` is the raw JSONB blob; decode
/// it through `PermissionSet` before trusting it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: i64,
    pub title: String,
    pub permissions: serde_json::Value,
    pub is_deleted: bool,
    pub created_at: OffsetDateTime,
}
