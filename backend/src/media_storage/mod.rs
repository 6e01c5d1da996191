//! S3-based storage for item images
mod error;

use std::sync::Arc;

use aws_sdk_s3::{primitives::ByteStream, Client as S3Client};
use url::Url;

pub use error::{BucketError, BucketResult};

/// Object storage operations the upload flow needs
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Uploads `data` under `key` with the given content type
    ///
    /// # Errors
    ///
    /// Returns `BucketError` if the upload is rejected or the service is unreachable
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> BucketResult<()>;

    /// Resolves a key to a publicly readable URL, `None` if no URL can be built
    fn public_url(&self, key: &str) -> Option<String>;
}

/// Builds `{base}/{key}` with the key percent-encoded as a single path segment
#[must_use]
pub fn public_url_for(base_url: &str, key: &str) -> Option<String> {
    if key.is_empty() {
        return None;
    }

    let mut url = Url::parse(base_url).ok()?;
    {
        let mut segments = url.path_segments_mut().ok()?;
        segments.pop_if_empty().push(key);
    }

    Some(url.into())
}

/// Media storage client for S3 operations
pub struct MediaStorage {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    public_base_url: String,
}

impl MediaStorage {
    /// Creates a new media storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - S3 bucket name for item images
    /// * `public_base_url` - Base URL under which the bucket's objects are publicly readable
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>, bucket_name: String, public_base_url: String) -> Self {
        Self {
            s3_client,
            bucket_name,
            public_base_url,
        }
    }
}

#[async_trait::async_trait]
impl ObjectStorage for MediaStorage {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> BucketResult<()> {
        let size = data.len();

        self.s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await?;

        tracing::info!(bucket = %self.bucket_name, key, size, "uploaded object");

        Ok(())
    }

    fn public_url(&self, key: &str) -> Option<String> {
        public_url_for(&self.public_base_url, key)
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use tokio::sync::RwLock;

    use super::{public_url_for, BucketError, BucketResult, ObjectStorage};

    /// An object captured by [`MockObjectStorage`]
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct StoredObject {
        pub key: String,
        pub data: Vec<u8>,
        pub content_type: String,
    }

    /// In-memory object storage recording every upload
    pub struct MockObjectStorage {
        public_base_url: Option<String>,
        fail_uploads: bool,
        objects: RwLock<Vec<StoredObject>>,
    }

    impl MockObjectStorage {
        /// Storage that accepts uploads and serves them under `public_base_url`
        #[must_use]
        pub fn new(public_base_url: &str) -> Self {
            Self {
                public_base_url: Some(public_base_url.to_string()),
                fail_uploads: false,
                objects: RwLock::new(Vec::new()),
            }
        }

        /// Storage whose uploads always fail
        #[must_use]
        pub fn failing() -> Self {
            Self {
                public_base_url: None,
                fail_uploads: true,
                objects: RwLock::new(Vec::new()),
            }
        }

        /// Storage that accepts uploads but never yields a public URL
        #[must_use]
        pub fn without_public_url() -> Self {
            Self {
                public_base_url: None,
                fail_uploads: false,
                objects: RwLock::new(Vec::new()),
            }
        }

        /// Snapshot of the uploaded objects
        pub async fn objects(&self) -> Vec<StoredObject> {
            self.objects.read().await.clone()
        }
    }

    #[async_trait::async_trait]
    impl ObjectStorage for MockObjectStorage {
        async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> BucketResult<()> {
            if self.fail_uploads {
                return Err(BucketError::S3Error("mock upload rejected".to_string()));
            }

            self.objects.write().await.push(StoredObject {
                key: key.to_string(),
                data,
                content_type: content_type.to_string(),
            });

            Ok(())
        }

        fn public_url(&self, key: &str) -> Option<String> {
            self.public_base_url
                .as_deref()
                .and_then(|base_url| public_url_for(base_url, key))
        }
    }
}
