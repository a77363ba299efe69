use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::authz::permissions::PermissionSet;
use crate::roles::repo_types::Role;

/// Request body for role creation.
#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub title: String,
    pub permissions: Option<Value>,
}

/// Request body for role updates; absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub title: Option<String>,
    pub permissions: Option<Value>,
}

/// Role as returned to admins. Permissions are re-emitted as a normalized
/// boolean map regardless of how the stored blob spells its flags.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub id: i64,
    pub title: String,
    pub permissions: Value,
    pub created_at: OffsetDateTime,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            id: role.id,
            title: role.title,
            permissions: PermissionSet::from_value(&role.permissions).to_value(),
            created_at: role.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn role_with(permissions: Value) -> Role {
        Role {
            id: 5,
            title: "Project Manager".into(),
            permissions,
            is_deleted: false,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn response_normalizes_legacy_flags() {
        let response = RoleResponse::from(role_with(json!({"can_view_reports": "1"})));
        assert_eq!(response.permissions, json!({"can_view_reports": true}));
    }

    #[test]
    fn response_empties_malformed_blob() {
        let response = RoleResponse::from(role_with(json!(["broken"])));
        assert_eq!(response.permissions, json!({}));
    }
}
