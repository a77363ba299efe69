use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, put},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde_json::Value;
use tracing::{info, instrument};

use crate::{
    authz::{
        gate::{authorize, GateState},
        permissions::PermissionSet,
        PermissionPolicy, PERM_MANAGE_ROLES,
    },
    error::AppError,
    roles::{
        dto::{CreateRoleRequest, RoleResponse, UpdateRoleRequest},
        repo_types::Role,
    },
    state::AppState,
};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/roles", get(list_roles).post(create_role))
        .route("/roles/:id", put(update_role).delete(delete_role))
        .route_layer(middleware::from_fn_with_state(
            GateState::new(
                state,
                PermissionPolicy {
                    permission: PERM_MANAGE_ROLES,
                },
            ),
            authorize::<PermissionPolicy>,
        ))
}

/// Validate an incoming permissions payload and normalize it to booleans
/// before it ever reaches the database.
fn normalize_permissions(raw: Option<Value>) -> Result<Option<Value>, AppError> {
    match raw {
        None => Ok(None),
        Some(value) => PermissionSet::try_from_value(&value)
            .map(|set| Some(set.to_value()))
            .ok_or_else(|| AppError::Validation("Invalid permissions".into())),
    }
}

#[instrument(skip(state))]
pub async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<RoleResponse>>, AppError> {
    let roles = Role::list_active(&state.db).await?;
    Ok(Json(roles.into_iter().map(RoleResponse::from).collect()))
}

#[instrument(skip_all)]
pub async fn create_role(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateRoleRequest>, AppError>,
) -> Result<(StatusCode, Json<RoleResponse>), AppError> {
    let title = payload.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".into()));
    }
    let permissions =
        normalize_permissions(payload.permissions)?.unwrap_or_else(|| serde_json::json!({}));

    let role = Role::create(&state.db, title, &permissions).await?;
    info!(role_id = role.id, title = %role.title, "role created");
    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

#[instrument(skip_all, fields(role_id = id))]
pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateRoleRequest>, AppError>,
) -> Result<Json<RoleResponse>, AppError> {
    let title = match &payload.title {
        Some(raw) => {
            let title = raw.trim();
            if title.is_empty() {
                return Err(AppError::Validation("Title is required".into()));
            }
            Some(title.to_string())
        }
        None => None,
    };
    let permissions = normalize_permissions(payload.permissions)?;

    let role = Role::update(&state.db, id, title.as_deref(), permissions.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("Role not found".into()))?;

    info!(role_id = role.id, "role updated");
    Ok(Json(RoleResponse::from(role)))
}

#[instrument(skip(state))]
pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !Role::soft_delete(&state.db, id).await? {
        return Err(AppError::NotFound("Role not found".into()));
    }
    info!(role_id = id, "role soft-deleted");
    Ok(Json(serde_json::json!({ "message": "Role deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_accepts_well_formed_maps() {
        let out = normalize_permissions(Some(json!({"a": "1", "b": false})))
            .expect("well-formed map should pass");
        assert_eq!(out, Some(json!({"a": true, "b": false})));
    }

    #[test]
    fn normalize_rejects_malformed_payloads() {
        assert!(normalize_permissions(Some(json!("nope"))).is_err());
        assert!(normalize_permissions(Some(json!({"a": 3}))).is_err());
    }

    #[test]
    fn normalize_passes_absent_through() {
        assert_eq!(normalize_permissions(None).unwrap(), None);
    }
}
