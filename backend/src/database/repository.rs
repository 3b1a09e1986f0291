//! Repository layer for database operations
//!
//! This module provides CRUD operations for blogs and owns the field
//! rules every stored blog must satisfy.

use super::models::*;
use crate::config::{MIN_BODY_LENGTH, MIN_TITLE_LENGTH};
use crate::error::{AppError, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new blog
    pub async fn create_blog(&self, new_blog: NewBlog) -> Result<Blog> {
        let mut errors = Vec::new();
        let title = required_field("title", new_blog.title, &mut errors);
        let body = required_field("body", new_blog.body, &mut errors);
        if let Some(title) = &title {
            validate_title(title, &mut errors);
        }
        if let Some(body) = &body {
            validate_body(body, &mut errors);
        }
        validate_image(&new_blog.image, &mut errors);
        validation_result(errors)?;

        let id = Uuid::new_v4().to_string();

        let blog = sqlx::query_as::<_, Blog>(
            r#"
            INSERT INTO blogs (id, title, body, image)
            VALUES (?, ?, ?, ?)
            RETURNING id, title, body, image
            "#,
        )
        .bind(&id)
        .bind(title)
        .bind(body)
        .bind(&new_blog.image)
        .fetch_one(&self.pool)
        .await
        .map_err(constraint_error)?;

        tracing::debug!("Created blog: {}", id);
        Ok(blog)
    }

    /// Get a blog by ID
    pub async fn get_blog(&self, id: Uuid) -> Result<Blog> {
        let blog = sqlx::query_as::<_, Blog>(
            r#"
            SELECT id, title, body, image FROM blogs WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(not_found)?;

        Ok(blog)
    }

    /// List blogs in insertion order
    pub async fn list_blogs(&self, offset: i64, limit: i64) -> Result<Vec<Blog>> {
        let blogs = sqlx::query_as::<_, Blog>(
            r#"
            SELECT id, title, body, image FROM blogs
            ORDER BY rowid
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(blogs)
    }

    /// Count all stored blogs
    pub async fn count_blogs(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blogs")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Update a blog. Fields left as `None` keep their stored values.
    pub async fn update_blog(&self, id: Uuid, changes: BlogChanges) -> Result<Blog> {
        let current = self.get_blog(id).await?;

        let title = changes.title.unwrap_or(current.title);
        let body = changes.body.unwrap_or(current.body);
        let image = changes.image.unwrap_or(current.image);

        let mut errors = Vec::new();
        validate_title(&title, &mut errors);
        validate_body(&body, &mut errors);
        validate_image(&image, &mut errors);
        validation_result(errors)?;

        let blog = sqlx::query_as::<_, Blog>(
            r#"
            UPDATE blogs SET title = ?, body = ?, image = ?
            WHERE id = ?
            RETURNING id, title, body, image
            "#,
        )
        .bind(&title)
        .bind(&body)
        .bind(&image)
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(constraint_error)?
        // Deleted between the read and the write
        .ok_or_else(not_found)?;

        tracing::debug!("Updated blog: {}", id);
        Ok(blog)
    }

    /// Delete a blog, returning how many rows were removed
    pub async fn delete_blog(&self, id: Uuid) -> Result<u64> {
        let rows = sqlx::query("DELETE FROM blogs WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::debug!("Deleted {} blog(s) with id: {}", rows, id);
        Ok(rows)
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Blog with this `id` does not exist.".to_string())
}

fn required_field(path: &str, value: Option<String>, errors: &mut Vec<String>) -> Option<String> {
    if value.is_none() {
        errors.push(format!("{}: Path `{}` is required.", path, path));
    }
    value
}

fn validate_title(title: &str, errors: &mut Vec<String>) {
    if title.chars().count() <= MIN_TITLE_LENGTH {
        errors.push(validator_failed("title", title));
    }
}

fn validate_body(body: &str, errors: &mut Vec<String>) {
    if body.chars().count() <= MIN_BODY_LENGTH {
        errors.push(validator_failed("body", body));
    }
}

fn validate_image(image: &[u8], errors: &mut Vec<String>) {
    if image.is_empty() {
        errors.push("image: Path `image` is required.".to_string());
    }
}

fn validator_failed(path: &str, value: &str) -> String {
    format!("{}: Validator failed for path `{}` with value `{}`", path, path, value)
}

fn validation_result(errors: Vec<String>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Blog validation failed: {}",
            errors.join(", ")
        )))
    }
}

/// Surface schema CHECK failures as validation errors
fn constraint_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_check_violation() => AppError::Validation(
            format!("Blog validation failed: {}", db_err.message()),
        ),
        _ => AppError::Database(err),
    }
}
