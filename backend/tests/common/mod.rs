// Not every helper is used in every test binary
#![allow(dead_code)]

use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use findmystuff_backend::{
    media_storage::mock::MockObjectStorage,
    pages::ItemPages,
    password::hash_password,
    server::{self, Services},
    types::Environment,
};
use findmystuff_storage::{
    memory::{InMemoryItemCatalog, InMemoryUserStore},
    user::{User, UserCreateRequest, UserStore},
};
use tower::ServiceExt;

pub const TEST_PUBLIC_BASE_URL: &str = "http://localhost:4566/public-files";
pub const TEST_ORIGIN: &str = "http://localhost:5173";

const MULTIPART_BOUNDARY: &str = "findmystuff-test-boundary";

/// Initialize tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// One part of a multipart form
pub enum FormPart<'a> {
    Text {
        name: &'a str,
        value: &'a str,
    },
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

/// The full upload form with a PNG image
pub fn upload_form<'a>(name: &'a str, description: &'a str, filename: &'a str) -> Vec<FormPart<'a>> {
    vec![
        FormPart::File {
            name: "image",
            filename,
            content_type: "image/png",
            data: b"\x89PNG\r\n\x1a\nfake image bytes",
        },
        FormPart::Text {
            name: "name",
            value: name,
        },
        FormPart::Text {
            name: "description",
            value: description,
        },
    ]
}

fn multipart_body(parts: &[FormPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();

    for part in parts {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        match part {
            FormPart::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            FormPart::File {
                name,
                filename,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    body
}

/// Router wired to in-memory stores and a mock bucket
pub struct TestSetup {
    pub router: Router,
    pub user_store: Arc<InMemoryUserStore>,
    pub item_catalog: Arc<InMemoryItemCatalog>,
    pub object_storage: Arc<MockObjectStorage>,
}

impl TestSetup {
    pub fn new() -> Self {
        Self::with_object_storage(MockObjectStorage::new(TEST_PUBLIC_BASE_URL))
    }

    pub fn with_environment(environment: Environment) -> Self {
        Self::build(
            environment,
            MockObjectStorage::new(TEST_PUBLIC_BASE_URL),
        )
    }

    pub fn with_object_storage(object_storage: MockObjectStorage) -> Self {
        Self::build(
            Environment::Development {
                aws_endpoint_override: None,
            },
            object_storage,
        )
    }

    fn build(environment: Environment, object_storage: MockObjectStorage) -> Self {
        setup_test_env();

        let user_store = Arc::new(InMemoryUserStore::new());
        let item_catalog = Arc::new(InMemoryItemCatalog::new());
        let object_storage = Arc::new(object_storage);

        let services = Services {
            user_store: user_store.clone(),
            item_catalog: item_catalog.clone(),
            object_storage: object_storage.clone(),
            pages: Arc::new(ItemPages::new().expect("Templates should compile")),
        };
        let router = server::app(environment, services).expect("Failed to build router");

        Self {
            router,
            user_store,
            item_catalog,
            object_storage,
        }
    }

    /// Stores a user directly, bypassing the register endpoint
    pub async fn create_user(&self, full_name: &str, email: &str, password: &str) -> User {
        self.user_store
            .create(UserCreateRequest {
                full_name: full_name.to_string(),
                email: email.to_string(),
                password_hash: hash_password(password).expect("Failed to hash password"),
            })
            .await
            .expect("Failed to create user")
    }

    pub async fn send_post_request(
        &self,
        route: &str,
        payload: serde_json::Value,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json")
            .body(Body::from(payload.to_string()))?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_raw_post_request(
        &self,
        route: &str,
        content_type: Option<&str>,
        body: &'static str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let mut builder = Request::builder().uri(route).method("POST");
        if let Some(content_type) = content_type {
            builder = builder.header("Content-Type", content_type);
        }
        let request = builder.body(Body::from(body))?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_multipart_request(
        &self,
        route: &str,
        parts: &[FormPart<'_>],
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_request(
        &self,
        request: Request<Body>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn parse_response_body(
        &self,
        response: Response,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        let body = self.response_text(response).await?;
        let json = serde_json::from_str(&body)?;
        Ok(json)
    }

    pub async fn response_text(
        &self,
        response: Response,
    ) -> Result<String, Box<dyn std::error::Error>> {
        use http_body_util::BodyExt;

        let body = response.into_body().collect().await?.to_bytes();
        Ok(String::from_utf8(body.to_vec())?)
    }
}
