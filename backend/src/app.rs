//! Application state and initialization
//!
//! This module builds the central application state, wires the HTTP
//! router with its middleware, and runs the server until shutdown.

use crate::config::{Settings, MAX_REQUEST_BODY_BYTES};
use crate::database::{create_pool, Repository};
use crate::error::{AppError, Result};
use crate::routes;
use crate::services::BlogsService;
use axum::error_handling::HandleErrorLayer;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::{BoxError, Router};
use sqlx::SqlitePool;
use std::time::Duration;
use tower::timeout::error::Elapsed;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub blogs_service: BlogsService,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        let repo = Repository::new(pool);
        Self {
            blogs_service: BlogsService::new(repo),
        }
    }
}

/// Build the full HTTP application
pub fn build_router(state: AppState, settings: &Settings) -> Result<Router> {
    let router = Router::new()
        .nest("/api", routes::api_router())
        .fallback(routes::not_found);

    let router = with_request_deadline(router, settings.request_timeout())
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(cors_layer(&settings.cors_origins)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}

/// Fail requests that outlive `timeout` with a 408 error body
fn with_request_deadline<S>(router: Router<S>, timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(deadline_error))
            .layer(TimeoutLayer::new(timeout)),
    )
}

async fn deadline_error(err: BoxError) -> AppError {
    if err.is::<Elapsed>() {
        AppError::Timeout
    } else {
        AppError::Generic(format!("Unhandled middleware error: {}", err))
    }
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        let origins = origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin.trim())
                    .map_err(|e| AppError::Generic(format!("Invalid CORS origin {:?}: {}", origin, e)))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]))
}

/// Open the database, bind the listener and serve until Ctrl-C
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!("Initializing application");

    let pool = create_pool(&settings.database_path).await?;
    let state = AppState::new(pool.clone());
    let router = build_router(state, &settings)?;

    let listener = tokio::net::TcpListener::bind(settings.bind_addr()).await?;

    tracing::info!("[ ready ] http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
