use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    Extension,
};
use tracing::warn;

use crate::auth::extractors::Identity;
use crate::authz::Authorizer;
use crate::error::AppError;
use crate::state::AppState;

/// State bundle for a gated route: the shared app state plus the policy the
/// gate consults.
#[derive(Clone)]
pub struct GateState<P> {
    pub app: AppState,
    pub policy: P,
}

impl<P> GateState<P> {
    pub fn new(app: AppState, policy: P) -> Self {
        Self { app, policy }
    }
}

/// Route-layer middleware over any `Authorizer`. Runs after `authenticate`
/// has attached the caller's identity; a failed policy lookup denies rather
/// than crashing the request pipeline.
pub async fn authorize<P>(
    State(gate): State<GateState<P>>,
    Extension(identity): Extension<Identity>,
    req: Request,
    next: Next,
) -> Result<Response, AppError>
where
    P: Authorizer + Clone + 'static,
{
    if gate.policy.can_perform(&identity, &gate.app.db).await? {
        Ok(next.run(req).await)
    } else {
        warn!(user_id = identity.id, role_id = identity.role_id, "authorization denied");
        Err(AppError::Forbidden)
    }
}
