//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};

/// Default LocalStack endpoint used in development
const DEFAULT_LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development {
        /// Optional override for the `LocalStack` endpoint
        aws_endpoint_override: Option<String>,
    },
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development {
                aws_endpoint_override: env::var("AWS_ENDPOINT_OVERRIDE")
                    .ok()
                    .filter(|val| !val.trim().is_empty()),
            },
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Port the HTTP server listens on
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but is not a valid port number
    pub fn port(&self) -> Result<u16, std::num::ParseIntError> {
        env::var("PORT").map_or(Ok(5000), |p| p.parse())
    }

    /// Returns the value of a variable that is required outside development
    fn required_or(&self, name: &str, development_default: impl FnOnce() -> String) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var(name).unwrap_or_else(|_| panic!("{name} environment variable is not set"))
            }
            Self::Development { .. } => env::var(name).unwrap_or_else(|_| development_default()),
        }
    }

    /// Returns the S3 bucket name holding item images
    ///
    /// # Panics
    ///
    /// Panics outside development if `S3_BUCKET_NAME` is not set
    #[must_use]
    pub fn s3_bucket(&self) -> String {
        self.required_or("S3_BUCKET_NAME", || "public-files".to_string())
    }

    /// Base URL under which uploaded objects are publicly readable
    ///
    /// # Panics
    ///
    /// Panics outside development if `MEDIA_PUBLIC_BASE_URL` is not set
    #[must_use]
    pub fn media_public_base_url(&self) -> String {
        self.required_or("MEDIA_PUBLIC_BASE_URL", || {
            format!(
                "{}/{}",
                self.override_aws_endpoint_url()
                    .unwrap_or(DEFAULT_LOCALSTACK_ENDPOINT),
                self.s3_bucket()
            )
        })
    }

    /// Dynamo DB table holding users
    ///
    /// # Panics
    ///
    /// Panics outside development if `USERS_TABLE_NAME` is not set
    #[must_use]
    pub fn users_table_name(&self) -> String {
        self.required_or("USERS_TABLE_NAME", || "findmystuff-users".to_string())
    }

    /// Dynamo DB table holding catalog items
    ///
    /// # Panics
    ///
    /// Panics outside development if `ITEMS_TABLE_NAME` is not set
    #[must_use]
    pub fn items_table_name(&self) -> String {
        self.required_or("ITEMS_TABLE_NAME", || "findmystuff-items".to_string())
    }

    /// Name of the items GSI keyed by `unique_id`
    #[must_use]
    pub fn items_unique_id_index(&self) -> String {
        env::var("ITEMS_UNIQUE_ID_INDEX").unwrap_or_else(|_| "unique_id-index".to_string())
    }

    /// The single origin allowed to make cross-origin requests
    ///
    /// # Panics
    ///
    /// Panics outside development if `CORS_ALLOWED_ORIGIN` is not set
    #[must_use]
    pub fn cors_allowed_origin(&self) -> String {
        self.required_or("CORS_ALLOWED_ORIGIN", || "http://localhost:5173".to_string())
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development { .. } | Self::Staging)
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            // LocalStack endpoint for development
            Self::Development {
                aws_endpoint_override,
            } => Some(
                aws_endpoint_override
                    .as_deref()
                    .unwrap_or(DEFAULT_LOCALSTACK_ENDPOINT),
            ),
        }
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// AWS S3 service configuration
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        // Override "force path style" to true for compatibility with LocalStack
        // https://github.com/awslabs/aws-sdk-rust/discussions/874
        if matches!(self, Self::Development { .. }) {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }
}
