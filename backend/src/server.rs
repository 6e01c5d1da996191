use std::{net::SocketAddr, sync::Arc, time::Duration};

use aide::openapi::OpenApi;
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method, StatusCode},
    Extension, Router,
};
use findmystuff_storage::{item::ItemCatalog, user::UserStore};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::routes;
use crate::{media_storage::ObjectStorage, pages::ItemPages, types::Environment};

/// Requests running longer than this are answered with `408`
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Stores and renderers shared by all handlers
#[derive(Clone)]
pub struct Services {
    pub user_store: Arc<dyn UserStore>,
    pub item_catalog: Arc<dyn ItemCatalog>,
    pub object_storage: Arc<dyn ObjectStorage>,
    pub pages: Arc<ItemPages>,
}

fn cors_layer(allowed_origin: &str) -> anyhow::Result<CorsLayer> {
    let origin = HeaderValue::from_str(allowed_origin)
        .map_err(|e| anyhow::anyhow!("Invalid CORS_ALLOWED_ORIGIN {allowed_origin:?}: {e}"))?;

    // Echoed back only when the request origin matches
    Ok(CorsLayer::new()
        .allow_origin([origin])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]))
}

/// Builds the application router with every route and layer attached
///
/// # Errors
///
/// Returns an error if the configured CORS origin is not a valid header value
pub fn app(environment: Environment, services: Services) -> anyhow::Result<Router> {
    let mut openapi = OpenApi::default();
    let cors = cors_layer(&environment.cors_allowed_origin())?;

    let router = routes::handler()
        .finish_api_with(&mut openapi, |api| api.title("FindMyStuff Backend"))
        .layer(Extension(openapi))
        .layer(Extension(environment))
        .layer(Extension(services.user_store))
        .layer(Extension(services.item_catalog))
        .layer(Extension(services.object_storage))
        .layer(Extension(services.pages))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(router)
}

/// Starts the server with the given environment and dependencies
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(environment: Environment, services: Services) -> anyhow::Result<()> {
    let port = environment.port()?;
    let router = app(environment, services)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 FindMyStuff Backend started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

/// Resolves on Ctrl+C or, on Unix, `SIGTERM`
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
