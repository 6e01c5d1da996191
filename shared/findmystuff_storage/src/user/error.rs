//! Error types for user storage operations

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{get_item::GetItemError, put_item::PutItemError, scan::ScanError};
use thiserror::Error;

/// Result type for user storage operations
pub type UserStorageResult<T> = Result<T, UserStorageError>;

/// Errors that can occur during user storage operations
#[derive(Error, Debug)]
pub enum UserStorageError {
    /// Failed to insert user into Dynamo DB
    #[error("Failed to insert user into DynamoDB: {0}")]
    DynamoDbPutError(#[from] SdkError<PutItemError>),

    /// Failed to get user from Dynamo DB
    #[error("Failed to get user from DynamoDB: {0}")]
    DynamoDbGetError(#[from] SdkError<GetItemError>),

    /// Failed to scan users in Dynamo DB
    #[error("Failed to scan users in DynamoDB: {0}")]
    DynamoDbScanError(#[from] SdkError<ScanError>),

    /// A user with this email is already registered
    #[error("User already exists")]
    UserExists,

    /// Serialization error for `serde_dynamo`
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The store could not be reached
    #[error("User store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<serde_dynamo::Error> for UserStorageError {
    fn from(err: serde_dynamo::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
