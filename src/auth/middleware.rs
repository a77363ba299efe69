use axum::{
    extract::{FromRef, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::auth::claims::JwtKeys;
use crate::auth::extractors::Identity;
use crate::auth::repo_types::User;
use crate::error::AppError;
use crate::state::AppState;

/// Request gate for every protected route. Verifies the bearer access token,
/// then re-fetches the user row: the live row, not the claims, decides role
/// and admin status downstream.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| AppError::unauthenticated("Missing Authorization header"))?;

    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_access(&token).map_err(|e| {
        warn!(error = %e, "access token rejected");
        AppError::unauthenticated(e.to_string())
    })?;

    let user = User::find_active_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| {
            warn!(user_id = claims.sub, "token for missing or inactive user");
            AppError::unauthenticated("User not found")
        })?;

    req.extensions_mut().insert(Identity::from(&user));
    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth = headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(value).unwrap(),
        );
        headers
    }

    #[test]
    fn bearer_token_strips_scheme() {
        assert_eq!(
            bearer_token(&headers_with("Bearer abc.def.ghi")),
            Some("abc.def.ghi".to_string())
        );
        assert_eq!(
            bearer_token(&headers_with("bearer abc")),
            Some("abc".to_string())
        );
    }

    #[test]
    fn bearer_token_rejects_other_schemes() {
        assert_eq!(bearer_token(&headers_with("Basic dXNlcg==")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
