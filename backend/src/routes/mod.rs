mod auth;
mod docs;
mod health;
mod items;

pub use items::MAX_IMAGE_SIZE_BYTES;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};
use axum::extract::DefaultBodyLimit;

/// Creates the router with all handler routes
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .merge(docs::handler())
        .api_route("/", get(health::handler))
        .api_route("/register", post(auth::register))
        .api_route("/login", post(auth::login))
        .api_route("/dashboard", get(items::dashboard))
        // Multipart and HTML routes are left out of the OpenAPI document
        .route(
            "/myitem",
            axum::routing::post(items::upload_item)
                .layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE_BYTES)),
        )
        .route("/item/{unique_id}", axum::routing::get(items::view_item))
}
