//! Universal error handling for the API

use std::borrow::Cow;

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use findmystuff_storage::{item::ItemStorageError, user::UserStorageError};
use schemars::JsonSchema;
use serde::Serialize;

use crate::media_storage::BucketError;

/// API error response envelope the web client expects
#[derive(Debug, Serialize, JsonSchema)]
pub struct ApiErrorResponse {
    /// Always `false` for errors
    pub success: bool,
    /// Machine-readable error code
    pub code: &'static str,
    /// Human-readable error message
    pub message: Cow<'static, str>,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, msg: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                success: false,
                code,
                message: msg.into(),
            },
        }
    }

    /// 400 for missing or malformed input
    #[must_use]
    pub fn validation(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", msg)
    }

    /// 500 for faults in a dependency or the handler itself
    #[must_use]
    pub fn server(code: &'static str, msg: &'static str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, msg)
    }

    /// HTTP status of the error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Human-readable message of the error
    #[must_use]
    pub fn message(&self) -> &str {
        &self.inner.message
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.code,
                self.inner.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.code,
                self.inner.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert user storage errors to application errors
impl From<UserStorageError> for AppError {
    fn from(err: UserStorageError) -> Self {
        match &err {
            UserStorageError::UserExists => Self::new(
                StatusCode::CONFLICT,
                "already_exists",
                "Email already registered",
            ),
            _ => {
                tracing::error!("User storage error: {err}");
                Self::server("internal_error", "Server error")
            }
        }
    }
}

/// Convert item catalog errors to application errors
impl From<ItemStorageError> for AppError {
    fn from(err: ItemStorageError) -> Self {
        tracing::error!("Item storage error: {err}");
        Self::server("internal_error", "Server error")
    }
}

/// Convert bucket errors to application errors
impl From<BucketError> for AppError {
    fn from(err: BucketError) -> Self {
        use BucketError::{AwsError, ConfigError, S3Error, UpstreamError};

        match &err {
            UpstreamError(msg) => tracing::error!("S3 upstream error: {msg}"),
            S3Error(msg) | AwsError(msg) => tracing::error!("S3/AWS error: {msg}"),
            ConfigError(msg) => tracing::error!("Configuration error: {msg}"),
        }

        Self::server("upload_failed", "Image upload failed")
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }
}
