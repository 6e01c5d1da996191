//! Credential store integration using Dynamo DB
//!
//! Users are keyed by email, so registering the same email twice is rejected by
//! a conditional write rather than a read-then-write check.

mod error;

use std::sync::Arc;

use aws_sdk_dynamodb::{error::SdkError, types::AttributeValue, Client as DynamoDbClient};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_dynamo::{from_items, to_item};
use strum::Display;

pub use error::{UserStorageError, UserStorageResult};

/// Attribute names for the users table
#[derive(Debug, Clone, Display)]
#[strum(serialize_all = "snake_case")]
pub enum UserAttribute {
    /// Store-generated user ID
    Id,
    /// Display name given at registration
    FullName,
    /// Email (Primary Key)
    Email,
    /// Argon2 PHC string
    PasswordHash,
    /// Creation timestamp in microseconds
    CreatedAt,
}

/// User record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-generated ID (UUID v4)
    pub id: String,
    /// Display name
    pub full_name: String,
    /// Email (Primary Key)
    pub email: String,
    /// Salted password hash, never the plaintext
    pub password_hash: String,
    /// Unix timestamp in microseconds, used to find the latest registration
    pub created_at: i64,
}

/// Request to create a new user
#[derive(Debug, Clone)]
pub struct UserCreateRequest {
    /// Display name
    pub full_name: String,
    /// Email, must not be registered yet
    pub email: String,
    /// Already hashed password
    pub password_hash: String,
}

/// Operations the backend needs from the credential store
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Creates a user with a generated ID
    ///
    /// # Errors
    ///
    /// Returns `UserStorageError::UserExists` if the email is already registered
    async fn create(&self, request: UserCreateRequest) -> UserStorageResult<User>;

    /// Finds a user by email
    ///
    /// # Errors
    ///
    /// Returns `UserStorageError` if the store operation fails
    async fn get_by_email(&self, email: &str) -> UserStorageResult<Option<User>>;

    /// Returns the most recently created user, if any
    ///
    /// # Errors
    ///
    /// Returns `UserStorageError` if the store operation fails
    async fn get_latest(&self) -> UserStorageResult<Option<User>>;
}

/// User storage client for Dynamo DB operations
pub struct UserStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
}

impl UserStorage {
    /// Creates a new user storage client
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured Dynamo DB client
    /// * `table_name` - Dynamo DB table name for users
    #[must_use]
    pub const fn new(dynamodb_client: Arc<DynamoDbClient>, table_name: String) -> Self {
        Self {
            dynamodb_client,
            table_name,
        }
    }
}

/// Whether `candidate` was created after `current`, ties broken by ID
pub(crate) fn is_newer(candidate: &User, current: Option<&User>) -> bool {
    current.map_or(true, |current| {
        (candidate.created_at, &candidate.id) > (current.created_at, &current.id)
    })
}

#[async_trait::async_trait]
impl UserStore for UserStorage {
    async fn create(&self, request: UserCreateRequest) -> UserStorageResult<User> {
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            full_name: request.full_name,
            email: request.email,
            password_hash: request.password_hash,
            created_at: Utc::now().timestamp_micros(),
        };

        let item = to_item(&user)?;

        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(#pk)")
            .expression_attribute_names("#pk", UserAttribute::Email.to_string())
            .send()
            .await
            .map_err(|err| {
                if matches!(
                    err,
                    SdkError::ServiceError(ref svc) if svc.err().is_conditional_check_failed_exception()
                ) {
                    UserStorageError::UserExists
                } else {
                    err.into()
                }
            })?;

        tracing::debug!(user_id = %user.id, "user created");

        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> UserStorageResult<Option<User>> {
        let response = self
            .dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .key(
                UserAttribute::Email.to_string(),
                AttributeValue::S(email.to_string()),
            )
            .send()
            .await?;

        let user = response
            .item()
            .map(|item| serde_dynamo::from_item(item.clone()))
            .transpose()?;

        Ok(user)
    }

    async fn get_latest(&self) -> UserStorageResult<Option<User>> {
        let mut latest: Option<User> = None;
        let mut exclusive_start_key = None;

        loop {
            let response = self
                .dynamodb_client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await?;

            let users = from_items::<_, User>(response.items.unwrap_or_default())?;
            for user in users {
                if is_newer(&user, latest.as_ref()) {
                    latest = Some(user);
                }
            }

            exclusive_start_key = response.last_evaluated_key;
            if exclusive_start_key.is_none() {
                break;
            }
        }

        Ok(latest)
    }
}
