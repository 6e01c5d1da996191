// Not every helper is used in every test file
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, GlobalSecondaryIndex, KeySchemaElement, KeyType, Projection,
    ProjectionType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use findmystuff_storage::{item::ItemAttribute, user::UserAttribute};
use tokio::time::sleep;
use uuid::Uuid;

/// Test configuration for LocalStack
pub const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";
pub const TEST_REGION: &str = "us-east-1";
pub const TEST_UNIQUE_ID_INDEX_NAME: &str = "unique_id-index";

/// Owns a test table and deletes it on drop
pub struct TestTable {
    pub dynamodb_client: Arc<DynamoDbClient>,
    pub table_name: String,
}

impl Drop for TestTable {
    fn drop(&mut self) {
        let client = self.dynamodb_client.clone();
        let table = self.table_name.clone();

        let handle = tokio::runtime::Handle::try_current();
        if let Ok(handle) = handle {
            handle.spawn(async move {
                let _ = client.delete_table().table_name(&table).send().await;
            });
        }
    }
}

/// Dynamo DB client pointed at LocalStack with static credentials
pub async fn localstack_client() -> Arc<DynamoDbClient> {
    let credentials = Credentials::from_keys("test", "test", None);
    let config = aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url(LOCALSTACK_ENDPOINT)
        .region(Region::new(TEST_REGION))
        .credentials_provider(credentials)
        .load()
        .await;

    Arc::new(DynamoDbClient::new(&config))
}

fn string_key(name: String, key_type: KeyType) -> KeySchemaElement {
    KeySchemaElement::builder()
        .attribute_name(name)
        .key_type(key_type)
        .build()
        .expect("Failed to build key schema")
}

fn string_attribute(name: String) -> AttributeDefinition {
    AttributeDefinition::builder()
        .attribute_name(name)
        .attribute_type(ScalarAttributeType::S)
        .build()
        .expect("Failed to build attribute definition")
}

/// Creates a users table keyed by email
pub async fn create_users_table() -> TestTable {
    let dynamodb_client = localstack_client().await;
    let table_name = format!("test-users-{}", Uuid::new_v4());

    dynamodb_client
        .create_table()
        .table_name(&table_name)
        .billing_mode(BillingMode::PayPerRequest)
        .key_schema(string_key(UserAttribute::Email.to_string(), KeyType::Hash))
        .attribute_definitions(string_attribute(UserAttribute::Email.to_string()))
        .send()
        .await
        .expect("Failed to create users table");

    sleep(Duration::from_millis(100)).await;

    TestTable {
        dynamodb_client,
        table_name,
    }
}

/// Creates an items table keyed by id with a GSI on `unique_id`
pub async fn create_items_table() -> TestTable {
    let dynamodb_client = localstack_client().await;
    let table_name = format!("test-items-{}", Uuid::new_v4());

    dynamodb_client
        .create_table()
        .table_name(&table_name)
        .billing_mode(BillingMode::PayPerRequest)
        .key_schema(string_key(ItemAttribute::Id.to_string(), KeyType::Hash))
        .attribute_definitions(string_attribute(ItemAttribute::Id.to_string()))
        .attribute_definitions(string_attribute(ItemAttribute::UniqueId.to_string()))
        .global_secondary_indexes(
            GlobalSecondaryIndex::builder()
                .index_name(TEST_UNIQUE_ID_INDEX_NAME)
                .key_schema(string_key(
                    ItemAttribute::UniqueId.to_string(),
                    KeyType::Hash,
                ))
                .projection(
                    Projection::builder()
                        .projection_type(ProjectionType::All)
                        .build(),
                )
                .build()
                .expect("Failed to build GSI"),
        )
        .send()
        .await
        .expect("Failed to create items table");

    sleep(Duration::from_millis(100)).await;

    TestTable {
        dynamodb_client,
        table_name,
    }
}
