use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database. Rows are never physically deleted; removal
/// flips `is_deleted`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role_id: i64,
    pub is_admin: bool,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: OffsetDateTime,
}
