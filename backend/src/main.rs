use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;

use findmystuff_backend::{
    media_storage::MediaStorage,
    pages::ItemPages,
    server::{self, Services},
    types::Environment,
};
use findmystuff_storage::{item::ItemStorage, user::UserStorage};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine outside local development
    dotenvy::dotenv().ok();

    let environment = Environment::from_env();

    // JSON logs for staging/production, human readable format for development
    match environment {
        Environment::Production | Environment::Staging => {
            fmt()
                .json()
                .with_env_filter(EnvFilter::from_default_env())
                .init();
        }
        Environment::Development { .. } => {
            fmt().with_env_filter(EnvFilter::from_default_env()).init();
        }
    }

    let aws_config = environment.aws_config().await;
    let dynamodb_client = Arc::new(DynamoDbClient::new(&aws_config));
    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));

    let services = Services {
        user_store: Arc::new(UserStorage::new(
            dynamodb_client.clone(),
            environment.users_table_name(),
        )),
        item_catalog: Arc::new(ItemStorage::new(
            dynamodb_client,
            environment.items_table_name(),
            environment.items_unique_id_index(),
        )),
        object_storage: Arc::new(MediaStorage::new(
            s3_client,
            environment.s3_bucket(),
            environment.media_public_base_url(),
        )),
        pages: Arc::new(ItemPages::new()?),
    };

    server::start(environment, services).await
}
