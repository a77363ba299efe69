use serde::{Deserialize, Serialize};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role_id: Option<i64>,
}

/// Response after registration.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    #[serde(rename = "userId")]
    pub user_id: i64,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response after login. The refresh token is intentionally absent: it
/// travels only in the http-only cookie.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    pub user: PublicUser,
}

/// Response after a token refresh.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

/// Request body for profile updates; absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub role_id: i64,
    pub is_admin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_response_never_carries_refresh_token() {
        let response = AuthResponse {
            access_token: "token".into(),
            user: PublicUser {
                id: 7,
                email: "a@b.com".into(),
                role_id: 2,
                is_admin: false,
            },
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("accessToken"));
        assert!(!json.contains("refresh"));
    }

    #[test]
    fn register_response_uses_user_id_wire_name() {
        let json = serde_json::to_string(&RegisterResponse { user_id: 12 }).unwrap();
        assert_eq!(json, r#"{"userId":12}"#);
    }

    #[test]
    fn public_user_serialization() {
        let user = PublicUser {
            id: 7,
            email: "test@example.com".into(),
            role_id: 1,
            is_admin: true,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("\"is_admin\":true"));
    }
}
