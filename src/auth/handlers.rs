use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use axum_extra::extract::{
    cookie::{Cookie, CookieJar, SameSite},
    WithRejection,
};
use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        claims::JwtKeys,
        dto::{
            AuthResponse, LoginRequest, PublicUser, RefreshResponse, RegisterRequest,
            RegisterResponse, UpdateProfileRequest,
        },
        extractors::{CurrentUser, Identity},
        password::{hash_password, verify_password},
        repo,
        repo_types::User,
    },
    authz::STAFF_ROLE_ID,
    error::AppError,
    state::AppState,
};

const REFRESH_COOKIE: &str = "refreshToken";

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/logout", post(logout))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/update-profile", put(update_profile))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn refresh_cookie(token: String, ttl: std::time::Duration) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::seconds(ttl.as_secs() as i64))
        .build()
}

#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(mut payload), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    payload.email = payload.email.trim().to_lowercase();

    if payload.first_name.trim().is_empty() || payload.last_name.trim().is_empty() {
        return Err(AppError::Validation("Missing required fields".into()));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(AppError::Validation("Password too short".into()));
    }

    if User::email_taken(&state.db, &payload.email, None).await? {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::Conflict("Email already exists".into()));
    }

    let hash = hash_password(&payload.password)?;
    let role_id = payload.role_id.unwrap_or(STAFF_ROLE_ID);
    // The pre-check above races with concurrent registration; the UNIQUE
    // constraint is the authority.
    let user = User::create(
        &state.db,
        payload.first_name.trim(),
        payload.last_name.trim(),
        &payload.email,
        &hash,
        role_id,
    )
    .await
    .map_err(|e| AppError::or_conflict(e, "Email already exists"))?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse { user_id: user.id }),
    ))
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(mut payload), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        return Err(AppError::Validation("Invalid email".into()));
    }

    // One generic message for unknown email and wrong password alike.
    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            AppError::unauthenticated("Invalid email or password")
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::unauthenticated("Invalid email or password"));
    }

    let keys = JwtKeys::from_ref(&state);
    let identity = Identity::from(&user);
    let access_token = keys.sign_access(&identity)?;
    let refresh_token = keys.sign_refresh(&identity)?;

    let jar = jar.add(refresh_cookie(refresh_token, keys.refresh_ttl));

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok((
        jar,
        Json(AuthResponse {
            access_token,
            user: PublicUser {
                id: user.id,
                email: user.email,
                role_id: user.role_id,
                is_admin: user.is_admin,
            },
        }),
    ))
}

#[instrument(skip(state, jar))]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<RefreshResponse>, AppError> {
    let cookie = jar
        .get(REFRESH_COOKIE)
        .ok_or_else(|| AppError::unauthenticated("Unauthorized, no refresh token"))?;

    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(cookie.value())
        .map_err(|e| AppError::unauthenticated(e.to_string()))?;

    if repo::is_token_revoked(&state.db, claims.jti).await? {
        warn!(user_id = claims.sub, "revoked refresh token presented");
        return Err(AppError::unauthenticated("Refresh token revoked"));
    }

    // Mint the new access token from the live row, not the stale claims.
    let user = User::find_active_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| AppError::unauthenticated("User not found"))?;

    let access_token = keys.sign_access(&Identity::from(&user))?;
    info!(user_id = user.id, "access token refreshed");
    Ok(Json(RefreshResponse { access_token }))
}

#[instrument(skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<serde_json::Value>), AppError> {
    if let Some(cookie) = jar.get(REFRESH_COOKIE) {
        let keys = JwtKeys::from_ref(&state);
        if let Ok(claims) = keys.verify_refresh(cookie.value()) {
            let expires_at = OffsetDateTime::from_unix_timestamp(claims.exp as i64)
                .unwrap_or_else(|_| OffsetDateTime::now_utc());
            repo::revoke_token(&state.db, claims.jti, expires_at).await?;
            info!(user_id = claims.sub, "refresh token revoked");
        }
    }

    let jar = jar.remove(Cookie::build(REFRESH_COOKIE).path("/").build());
    Ok((jar, Json(serde_json::json!({ "message": "Logged out" }))))
}

#[instrument(skip_all, fields(user_id = identity.id))]
pub async fn me(CurrentUser(identity): CurrentUser) -> Json<PublicUser> {
    Json(PublicUser {
        id: identity.id,
        email: identity.email,
        role_id: identity.role_id,
        is_admin: identity.is_admin,
    })
}

#[instrument(skip_all, fields(user_id = identity.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateProfileRequest>, AppError>,
) -> Result<Json<PublicUser>, AppError> {
    if payload.email.is_none() && payload.password.is_none() {
        return Err(AppError::Validation("Nothing to update".into()));
    }

    let email = match payload.email {
        Some(raw) => {
            let email = raw.trim().to_lowercase();
            if !is_valid_email(&email) {
                return Err(AppError::Validation("Invalid email".into()));
            }
            if User::email_taken(&state.db, &email, Some(identity.id)).await? {
                return Err(AppError::Conflict("Email already exists".into()));
            }
            Some(email)
        }
        None => None,
    };

    // A password change always lands on the current scheme, migrating
    // legacy-digest users forward.
    let password_hash = match payload.password {
        Some(plain) => {
            if plain.len() < 8 {
                return Err(AppError::Validation("Password too short".into()));
            }
            Some(hash_password(&plain)?)
        }
        None => None,
    };

    let user = User::update_profile(
        &state.db,
        identity.id,
        email.as_deref(),
        password_hash.as_deref(),
    )
    .await
    .map_err(|e| AppError::or_conflict(e, "Email already exists"))?
    .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    info!(user_id = user.id, "profile updated");
    Ok(Json(PublicUser {
        id: user.id,
        email: user.email,
        role_id: user.role_id,
        is_admin: user.is_admin,
    }))
}
