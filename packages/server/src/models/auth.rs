use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Usernames appear in attempt listings and blob audit logs, so they are
/// kept short and limited to URL-safe characters.
pub const USERNAME_MAX_CHARS: usize = 32;
pub const PASSWORD_MIN_BYTES: usize = 8;
pub const PASSWORD_MAX_BYTES: usize = 128;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Desired username, 1-32 letters, digits, or underscores.
    #[schema(example = "mira_santos")]
    pub username: String,
    /// Password, 8-128 bytes.
    #[schema(example = "rhubarb-stapler-41")]
    pub password: String,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    let username = payload.username.trim();
    if username.is_empty() || username.chars().count() > USERNAME_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "Username must be 1-{USERNAME_MAX_CHARS} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AppError::Validation(
            "Username may only contain letters, digits, and underscores".into(),
        ));
    }
    let len = payload.password.len();
    if len < PASSWORD_MIN_BYTES || len > PASSWORD_MAX_BYTES {
        return Err(AppError::Validation(format!(
            "Password must be {PASSWORD_MIN_BYTES}-{PASSWORD_MAX_BYTES} characters"
        )));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "mira_santos")]
    pub username: String,
    #[schema(example = "rhubarb-stapler-41")]
    pub password: String,
}

/// Login only checks for presence; credential shape is enforced at
/// registration, and a mismatch either way ends as `INVALID_CREDENTIALS`.
pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::Validation("Username is required".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password is required".into()));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RegisterResponse {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "mira_santos")]
    pub username: String,
}

impl From<crate::entity::user::Model> for RegisterResponse {
    fn from(user: crate::entity::user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// Bearer token to send in the `Authorization` header.
    #[schema(example = "eyJhbGciOiJIUzI1NiJ9...")]
    pub token: String,
    #[schema(example = "mira_santos")]
    pub username: String,
}

/// Profile of the caller, resolved from the bearer token.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "mira_santos")]
    pub username: String,
}
