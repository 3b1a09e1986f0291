//! Blog routes
//!
//! CRUD operations for blogs.

use crate::app::AppState;
use crate::database::{
    Blog, BlogPage, CreateBlogRequest, DeleteConfirmation, ListBlogsQuery, UpdateBlogRequest,
};
use crate::error::Result;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_blogs).post(create_blog))
        .route("/{id}", get(get_blog).put(update_blog).delete(delete_blog))
}

/// List one page of blogs
pub async fn list_blogs(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListBlogsQuery>, QueryRejection>,
) -> Result<Json<BlogPage>> {
    let Query(query) = query?;
    let page = state.blogs_service.list_blogs(query).await?;
    Ok(Json(page))
}

/// Get a blog by ID
pub async fn get_blog(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Blog>> {
    let blog = state.blogs_service.get_blog(&id).await?;
    Ok(Json(blog))
}

/// Create a blog
pub async fn create_blog(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateBlogRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Blog>)> {
    let Json(req) = payload?;
    let blog = state.blogs_service.create_blog(req).await?;
    Ok((StatusCode::CREATED, Json(blog)))
}

/// Update a blog
pub async fn update_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateBlogRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Blog>)> {
    let Json(req) = payload?;
    let blog = state.blogs_service.update_blog(&id, req).await?;
    Ok((StatusCode::ACCEPTED, Json(blog)))
}

/// Delete a blog
pub async fn delete_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteConfirmation>> {
    let confirmation = state.blogs_service.delete_blog(&id).await?;
    Ok(Json(confirmation))
}
