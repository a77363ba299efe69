//! Authorization: one `Authorizer` seam with two interchangeable strategies,
//! a fine-grained permission check and a coarse role-id check.

pub mod gate;
pub mod permissions;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use crate::auth::extractors::Identity;
use crate::error::AppError;
use crate::roles::repo_types::Role;
use self::permissions::PermissionSet;

/// Reserved role ids the coarse gate depends on; seeded by the migrations.
pub const ADMIN_ROLE_ID: i64 = 1;
pub const STAFF_ROLE_ID: i64 = 2;

pub const PERM_MANAGE_ROLES: &str = "can_manage_roles";

/// Named coarse roles and their fixed id convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleName {
    Admin,
    Staff,
}

impl RoleName {
    pub fn role_id(self) -> i64 {
        match self {
            RoleName::Admin => ADMIN_ROLE_ID,
            RoleName::Staff => STAFF_ROLE_ID,
        }
    }
}

/// The single question every gate answers. Routes depend on this trait, not
/// on either concrete strategy.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn can_perform(&self, identity: &Identity, db: &PgPool) -> Result<bool, AppError>;
}

/// Fine-grained strategy: admins bypass unconditionally, everyone else needs
/// the named permission enabled in their current role.
#[derive(Clone)]
pub struct PermissionPolicy {
    pub permission: &'static str,
}

impl PermissionPolicy {
    /// Pure decision over an already-fetched permission blob.
    fn decide(&self, is_admin: bool, permissions: &Value) -> bool {
        if is_admin {
            return true;
        }
        PermissionSet::from_value(permissions).allows(self.permission)
    }
}

#[async_trait]
impl Authorizer for PermissionPolicy {
    async fn can_perform(&self, identity: &Identity, db: &PgPool) -> Result<bool, AppError> {
        if identity.is_admin {
            return Ok(true);
        }
        // Resolved from the current role row at check time, never cached on
        // the user.
        let Some(role) = Role::find_active(db, identity.role_id).await? else {
            return Ok(false);
        };
        Ok(self.decide(identity.is_admin, &role.permissions))
    }
}

/// Coarse strategy: the caller's role id must match one of the allowed
/// reserved ids. No admin-flag bypass here; the flag belongs to the
/// fine-grained gate.
#[derive(Clone)]
pub struct RolePolicy {
    pub allowed: &'static [RoleName],
}

#[async_trait]
impl Authorizer for RolePolicy {
    async fn can_perform(&self, identity: &Identity, _db: &PgPool) -> Result<bool, AppError> {
        Ok(self
            .allowed
            .iter()
            .any(|role| role.role_id() == identity.role_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use serde_json::json;

    fn identity(role_id: i64, is_admin: bool) -> Identity {
        Identity {
            id: 1,
            email: "a@b.com".into(),
            role_id,
            is_admin,
        }
    }

    #[tokio::test]
    async fn admin_bypasses_permission_policy_without_a_query() {
        // Lazy pool: the test fails if the policy ever touches the database.
        let state = AppState::fake();
        let policy = PermissionPolicy {
            permission: "can_manage_all_projects",
        };
        let allowed = policy
            .can_perform(&identity(99, true), &state.db)
            .await
            .expect("check should succeed");
        assert!(allowed);
    }

    #[test]
    fn permission_decision_requires_exact_flag() {
        let policy = PermissionPolicy {
            permission: "can_view_reports",
        };
        assert!(policy.decide(false, &json!({"can_view_reports": "1"})));
        assert!(policy.decide(false, &json!({"can_view_reports": true})));
        assert!(!policy.decide(false, &json!({"can_view_reports": "0"})));
        assert!(!policy.decide(false, &json!({"something_else": "1"})));
        assert!(!policy.decide(false, &json!({})));
    }

    #[test]
    fn permission_decision_fails_closed_on_malformed_blob() {
        let policy = PermissionPolicy {
            permission: "can_view_reports",
        };
        assert!(!policy.decide(false, &json!("not a map")));
        assert!(!policy.decide(false, &json!({"can_view_reports": 1})));
        // Admin bypass holds even over garbage.
        assert!(policy.decide(true, &json!("not a map")));
    }

    #[tokio::test]
    async fn role_policy_matches_reserved_ids() {
        let state = AppState::fake();
        let policy = RolePolicy {
            allowed: &[RoleName::Admin, RoleName::Staff],
        };
        assert!(policy
            .can_perform(&identity(ADMIN_ROLE_ID, false), &state.db)
            .await
            .unwrap());
        assert!(policy
            .can_perform(&identity(STAFF_ROLE_ID, false), &state.db)
            .await
            .unwrap());
        assert!(!policy
            .can_perform(&identity(57, false), &state.db)
            .await
            .unwrap());

        let admin_only = RolePolicy {
            allowed: &[RoleName::Admin],
        };
        assert!(!admin_only
            .can_perform(&identity(STAFF_ROLE_ID, false), &state.db)
            .await
            .unwrap());
    }
}
