use std::sync::Arc;

use axum::{http::StatusCode, Extension, Json};
use findmystuff_storage::user::{UserCreateRequest, UserStore};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::{
    password::{hash_password, verify_password},
    types::{AppError, ValidatedJson},
};

const REGISTER_MISSING_FIELDS: &str = "All fields are required";
const LOGIN_MISSING_FIELDS: &str = "Email and password required";

#[derive(Debug, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name of the new user
    #[validate(length(min = 1, message = "All fields are required"))]
    pub full_name: Option<String>,
    /// Email, used as the login name
    #[validate(length(min = 1, message = "All fields are required"))]
    pub email: Option<String>,
    /// Plaintext password, stored only as a salted hash
    #[validate(length(min = 1, message = "All fields are required"))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email and password required"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Email and password required"))]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Public part of a user record
#[derive(Debug, Serialize, JsonSchema)]
pub struct UserProfile {
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub user: UserProfile,
}

/// Registers a new user
///
/// Hashes the password with a random salt and stores the user keyed by email.
///
/// # Errors
///
/// - `400 BAD_REQUEST` - A field is missing or empty
/// - `409 CONFLICT` - The email is already registered
/// - `500 INTERNAL_SERVER_ERROR` - Hashing or the store failed
#[instrument(skip_all)]
pub async fn register(
    Extension(user_store): Extension<Arc<dyn UserStore>>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let (Some(full_name), Some(email), Some(password)) =
        (payload.full_name, payload.email, payload.password)
    else {
        return Err(AppError::validation(REGISTER_MISSING_FIELDS));
    };

    let password_hash = hash_password(&password).map_err(|e| {
        tracing::error!("Password hashing failed: {e}");
        AppError::server("internal_error", "Server error")
    })?;

    let user = user_store
        .create(UserCreateRequest {
            full_name,
            email,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            success: true,
            message: "User registered successfully".to_string(),
        }),
    ))
}

/// Checks an email and password pair
///
/// No session or token is issued; the response only echoes the profile.
///
/// # Errors
///
/// - `400 BAD_REQUEST` - Email or password missing
/// - `404 NOT_FOUND` - No user with this email
/// - `401 UNAUTHORIZED` - Password does not match
/// - `500 INTERNAL_SERVER_ERROR` - The store failed or the stored hash is unreadable
#[instrument(skip_all)]
pub async fn login(
    Extension(user_store): Extension<Arc<dyn UserStore>>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(AppError::validation(LOGIN_MISSING_FIELDS));
    };

    let user = user_store
        .get_by_email(&email)
        .await?
        .ok_or_else(|| AppError::new(StatusCode::NOT_FOUND, "user_not_found", "User not found"))?;

    let password_matches = verify_password(&password, &user.password_hash).map_err(|e| {
        tracing::error!(user_id = %user.id, "Stored password hash is unreadable: {e}");
        AppError::server("internal_error", "Server error")
    })?;

    if !password_matches {
        return Err(AppError::new(
            StatusCode::UNAUTHORIZED,
            "incorrect_password",
            "Incorrect password",
        ));
    }

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        user: UserProfile {
            full_name: user.full_name,
            email: user.email,
        },
    }))
}
