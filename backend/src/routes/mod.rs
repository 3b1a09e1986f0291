//! HTTP routes exposed to clients
//!
//! This module organizes routes into logical submodules:
//! - `blogs`: Blog CRUD under `/api/blogs`

pub mod blogs;

use crate::app::AppState;
use crate::error::AppError;
use axum::Router;

/// All API routes, mounted under `/api`
pub fn api_router() -> Router<AppState> {
    Router::new().nest("/blogs", blogs::router())
}

/// Answer unknown paths with the usual error body
pub async fn not_found() -> AppError {
    AppError::NotFound("Not Found".to_string())
}
