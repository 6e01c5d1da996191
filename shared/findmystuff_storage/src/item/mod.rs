//! Item catalog storage module for `DynamoDB` operations

mod error;

use std::sync::Arc;

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;
pub use error::{ItemStorageError, ItemStorageResult};
use serde::{Deserialize, Serialize};
use serde_dynamo::{from_items, to_item};
use strum::Display;

/// `DynamoDB` table for found items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Primary key - store-generated item ID (UUID v4)
    pub id: String,
    /// Item name given by the uploader
    pub name: String,
    /// Free text description
    pub description: String,
    /// Public URL of the uploaded image
    pub image_url: String,
    /// Short public token printed in the QR code link
    pub unique_id: String,
    /// Timestamp of the upload in seconds
    pub uploaded_at: i64,
    /// ID of the user the upload is attributed to, not checked against the users table
    pub user_id: String,
}

/// Dashboard projection of an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSummary {
    /// Store-generated item ID
    pub id: String,
    /// Item name
    pub name: String,
    /// Item description
    pub description: String,
    /// Public URL of the image
    pub image_url: String,
    /// Short public token
    pub unique_id: String,
}

impl From<Item> for ItemSummary {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            image_url: item.image_url,
            unique_id: item.unique_id,
        }
    }
}

/// Request to create a new catalog item
#[derive(Debug, Clone)]
pub struct ItemCreateRequest {
    /// Item name
    pub name: String,
    /// Item description
    pub description: String,
    /// Public URL of the already uploaded image
    pub image_url: String,
    /// Short public token
    pub unique_id: String,
    /// Upload timestamp in seconds
    pub uploaded_at: i64,
    /// Uploader reference
    pub user_id: String,
}

/// `DynamoDB` attribute names for the item table
#[derive(Debug, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ItemAttribute {
    /// Primary key - item ID
    Id,
    /// Item name
    Name,
    /// Item description
    Description,
    /// Image URL
    ImageUrl,
    /// Public token (used for GSI)
    UniqueId,
    /// Upload timestamp
    UploadedAt,
    /// Uploader reference
    UserId,
}

/// Operations the backend needs from the item catalog
#[async_trait::async_trait]
pub trait ItemCatalog: Send + Sync {
    /// Stores a new item with a generated ID
    ///
    /// # Errors
    ///
    /// Returns `ItemStorageError` if the store operation fails
    async fn create(&self, request: ItemCreateRequest) -> ItemStorageResult<Item>;

    /// Finds the item carrying the given public token
    ///
    /// # Errors
    ///
    /// Returns `ItemStorageError` if the store operation fails
    async fn get_by_unique_id(&self, unique_id: &str) -> ItemStorageResult<Option<Item>>;

    /// Lists every item in the catalog
    ///
    /// # Errors
    ///
    /// Returns `ItemStorageError` if the store operation fails
    async fn list_summaries(&self) -> ItemStorageResult<Vec<ItemSummary>>;
}

/// Storage client for item catalog operations
pub struct ItemStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
    unique_id_index_name: String,
}

impl ItemStorage {
    /// Creates a new storage instance
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured `DynamoDB` client
    /// * `table_name` - `DynamoDB` table name for items
    /// * `unique_id_index_name` - Name of the GSI for `unique_id` lookups
    #[must_use]
    pub const fn new(
        dynamodb_client: Arc<DynamoDbClient>,
        table_name: String,
        unique_id_index_name: String,
    ) -> Self {
        Self {
            dynamodb_client,
            table_name,
            unique_id_index_name,
        }
    }
}

#[async_trait::async_trait]
impl ItemCatalog for ItemStorage {
    async fn create(&self, request: ItemCreateRequest) -> ItemStorageResult<Item> {
        let item = Item {
            id: uuid::Uuid::new_v4().to_string(),
            name: request.name,
            description: request.description,
            image_url: request.image_url,
            unique_id: request.unique_id,
            uploaded_at: request.uploaded_at,
            user_id: request.user_id,
        };

        let record = to_item(&item)?;

        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(record))
            .send()
            .await?;

        Ok(item)
    }

    async fn get_by_unique_id(&self, unique_id: &str) -> ItemStorageResult<Option<Item>> {
        let response = self
            .dynamodb_client
            .query()
            .table_name(&self.table_name)
            .index_name(&self.unique_id_index_name)
            .key_condition_expression("#unique_id = :unique_id")
            .expression_attribute_names("#unique_id", ItemAttribute::UniqueId.to_string())
            .expression_attribute_values(":unique_id", AttributeValue::S(unique_id.to_string()))
            .send()
            .await?;

        let items = from_items::<_, Item>(response.items.unwrap_or_default())?;

        Ok(items.into_iter().next())
    }

    async fn list_summaries(&self) -> ItemStorageResult<Vec<ItemSummary>> {
        let mut summaries = Vec::new();
        let mut exclusive_start_key = None;

        // `name` is a reserved word, so every projected attribute goes through a placeholder
        loop {
            let response = self
                .dynamodb_client
                .scan()
                .table_name(&self.table_name)
                .projection_expression("#id, #name, #description, #image_url, #unique_id")
                .expression_attribute_names("#id", ItemAttribute::Id.to_string())
                .expression_attribute_names("#name", ItemAttribute::Name.to_string())
                .expression_attribute_names("#description", ItemAttribute::Description.to_string())
                .expression_attribute_names("#image_url", ItemAttribute::ImageUrl.to_string())
                .expression_attribute_names("#unique_id", ItemAttribute::UniqueId.to_string())
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await?;

            summaries.extend(from_items::<_, ItemSummary>(
                response.items.unwrap_or_default(),
            )?);

            exclusive_start_key = response.last_evaluated_key;
            if exclusive_start_key.is_none() {
                break;
            }
        }

        tracing::debug!(count = summaries.len(), "listed catalog items");

        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> Item {
        Item {
            id: "item-id".to_string(),
            name: "Blue umbrella".to_string(),
            description: "Found at the bus stop".to_string(),
            image_url: "https://cdn.example.com/Blue%20umbrella__u.png__0a1b2c3d.png".to_string(),
            unique_id: "0a1b2c3d".to_string(),
            uploaded_at: 1_750_000_000,
            user_id: "user-id".to_string(),
        }
    }

    #[test]
    fn test_summary_drops_uploader_and_timestamp() {
        let summary = ItemSummary::from(item());

        assert_eq!(summary.id, "item-id");
        assert_eq!(summary.unique_id, "0a1b2c3d");

        let item: std::collections::HashMap<String, AttributeValue> = to_item(&summary).unwrap();
        assert!(!item.contains_key(&ItemAttribute::UserId.to_string()));
        assert!(!item.contains_key(&ItemAttribute::UploadedAt.to_string()));
    }

    #[test]
    fn test_summary_parses_from_projected_record() {
        let record: std::collections::HashMap<String, AttributeValue> = to_item(&item()).unwrap();
        let projected = record
            .into_iter()
            .filter(|(key, _)| {
                key != &ItemAttribute::UserId.to_string()
                    && key != &ItemAttribute::UploadedAt.to_string()
            })
            .collect::<std::collections::HashMap<_, _>>();

        let summaries = from_items::<_, ItemSummary>(vec![projected]).unwrap();

        assert_eq!(summaries, vec![ItemSummary::from(item())]);
    }
}
