use axum::{extract::State, middleware, routing::get, Json, Router};
use serde::Serialize;
use tracing::instrument;

use crate::{
    auth::repo_types::User,
    authz::{
        gate::{authorize, GateState},
        RoleName, RolePolicy,
    },
    error::AppError,
    state::AppState,
};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route_layer(middleware::from_fn_with_state(
            GateState::new(
                state,
                RolePolicy {
                    allowed: &[RoleName::Admin, RoleName::Staff],
                },
            ),
            authorize::<RolePolicy>,
        ))
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role_id: i64,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role_id: user.role_id,
        }
    }
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserSummary>>, AppError> {
    let users = User::list_active(&state.db).await?;
    Ok(Json(users.into_iter().map(UserSummary::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn summary_omits_password_hash() {
        let user = User {
            id: 3,
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@b.com".into(),
            password_hash: "hash".into(),
            role_id: 2,
            is_admin: false,
            is_active: true,
            is_deleted: false,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&UserSummary::from(user)).unwrap();
        assert!(!json.contains("hash"));
        assert!(json.contains("a@b.com"));
    }
}
