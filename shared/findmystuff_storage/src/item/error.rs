//! Error types for item catalog operations

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{put_item::PutItemError, query::QueryError, scan::ScanError};
use thiserror::Error;

/// Result type alias for item catalog operations
pub type ItemStorageResult<T> = Result<T, ItemStorageError>;

/// Storage error types for item catalog operations
#[derive(Debug, Error)]
pub enum ItemStorageError {
    /// Failed to insert item into `DynamoDB`
    #[error("Failed to insert item into DynamoDB: {0:?}")]
    DynamoDbPutError(#[from] SdkError<PutItemError>),

    /// Failed to query items from `DynamoDB`
    #[error("Failed to query items from DynamoDB: {0:?}")]
    DynamoDbQueryError(#[from] SdkError<QueryError>),

    /// Failed to scan items in `DynamoDB`
    #[error("Failed to scan items in DynamoDB: {0:?}")]
    DynamoDbScanError(#[from] SdkError<ScanError>),

    /// Failed to parse item from `DynamoDB` item
    #[error("Failed to parse item: {0}")]
    SerializationError(String),

    /// The catalog could not be reached
    #[error("Item catalog unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<serde_dynamo::Error> for ItemStorageError {
    fn from(err: serde_dynamo::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
