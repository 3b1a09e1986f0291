//! Blogs service
//!
//! High-level business logic for blog operations.
//! Checks request shape (ids, base64 images, paging) before anything
//! reaches the repository.

use crate::config::{DEFAULT_PAGE, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::database::base64_bytes::IMAGE_ENGINE;
use crate::database::{
    Blog, BlogChanges, BlogPage, CreateBlogRequest, DeleteConfirmation, ListBlogsQuery, NewBlog,
    Repository, UpdateBlogRequest,
};
use crate::error::{AppError, Result};
use base64::Engine as _;
use uuid::Uuid;

/// Service for managing blogs
#[derive(Clone)]
pub struct BlogsService {
    repo: Repository,
}

impl BlogsService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// List one page of blogs
    pub async fn list_blogs(&self, query: ListBlogsQuery) -> Result<BlogPage> {
        let pagination = Pagination::from_query(&query)?;

        let blogs = self
            .repo
            .list_blogs(pagination.offset(), pagination.limit)
            .await?;
        let total = self.repo.count_blogs().await?;

        Ok(BlogPage {
            blogs,
            total_pages: pagination.total_pages(total),
            page: pagination.page,
        })
    }

    /// Get a blog by ID
    pub async fn get_blog(&self, id: &str) -> Result<Blog> {
        let id = parse_id(id)?;
        self.repo.get_blog(id).await
    }

    /// Create a new blog from a request carrying a base64 image
    pub async fn create_blog(&self, req: CreateBlogRequest) -> Result<Blog> {
        let image = match req.image.as_deref() {
            None | Some("") => return Err(AppError::BadRequest("missing field `image`".to_string())),
            Some(encoded) => decode_image(encoded)?,
        };

        tracing::info!("Creating new blog ({} byte image)", image.len());

        let blog = self
            .repo
            .create_blog(NewBlog {
                title: req.title,
                body: req.body,
                image,
            })
            .await?;

        tracing::info!("Blog created successfully: {}", blog.id);

        Ok(blog)
    }

    /// Update a blog. Omitted fields and an empty image keep stored values.
    pub async fn update_blog(&self, id: &str, req: UpdateBlogRequest) -> Result<Blog> {
        let id = parse_id(id)?;

        tracing::debug!("Updating blog: {}", id);

        let image = match req.image.as_deref() {
            None | Some("") => None,
            Some(encoded) => Some(decode_image(encoded)?),
        };

        let blog = self
            .repo
            .update_blog(
                id,
                BlogChanges {
                    title: req.title,
                    body: req.body,
                    image,
                },
            )
            .await?;

        tracing::debug!("Blog updated successfully: {}", blog.id);

        Ok(blog)
    }

    /// Delete a blog
    pub async fn delete_blog(&self, id: &str) -> Result<DeleteConfirmation> {
        let id = parse_id(id)?;

        tracing::info!("Deleting blog: {}", id);

        if self.repo.delete_blog(id).await? == 0 {
            return Err(AppError::BadRequest(format!(
                "Blog with id: {} does not exist.",
                id
            )));
        }

        tracing::info!("Blog deleted successfully: {}", id);

        Ok(DeleteConfirmation {
            message: format!("Blog with id: {} has been successfully deleted.", id),
        })
    }
}

/// Resolved paging parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pagination {
    page: i64,
    limit: i64,
}

impl Pagination {
    fn from_query(query: &ListBlogsQuery) -> Result<Self> {
        let page = query.page.unwrap_or(DEFAULT_PAGE);
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);

        if page < 1 {
            return Err(AppError::BadRequest(
                "`page` must be a positive integer".to_string(),
            ));
        }
        if limit < 1 {
            return Err(AppError::BadRequest(
                "`limit` must be a positive integer".to_string(),
            ));
        }

        Ok(Self {
            page,
            limit: limit.min(MAX_PAGE_LIMIT),
        })
    }

    fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    fn total_pages(&self, total: i64) -> i64 {
        (total + self.limit - 1) / self.limit
    }
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::MalformedId {
        value: id.to_string(),
    })
}

fn decode_image(encoded: &str) -> Result<Vec<u8>> {
    IMAGE_ENGINE
        .decode(encoded)
        .map_err(|_| AppError::BadRequest("`image` is not a valid base64 string".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{initialize_database, Repository};
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use sqlx::sqlite::SqlitePoolOptions;

    const BODY: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit.";

    async fn create_test_service() -> BlogsService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        let repo = Repository::new(pool);
        BlogsService::new(repo)
    }

    fn create_request(title: &str) -> CreateBlogRequest {
        CreateBlogRequest {
            title: Some(title.to_string()),
            body: Some(BODY.to_string()),
            image: Some(STANDARD.encode(b"jaklsdjfklasjdfk")),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_blog() {
        let service = create_test_service().await;

        let blog = service.create_blog(create_request("Test blog 1")).await.unwrap();
        assert_eq!(blog.image, b"jaklsdjfklasjdfk");

        let fetched = service.get_blog(&blog.id).await.unwrap();
        assert_eq!(fetched.title, "Test blog 1");
        assert_eq!(fetched.body, BODY);
        assert_eq!(fetched.image, b"jaklsdjfklasjdfk");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_image() {
        let service = create_test_service().await;

        let result = service
            .create_blog(CreateBlogRequest {
                image: Some("jaksjdlkfajsd".to_string()),
                ..create_request("Test blog 1")
            })
            .await;

        match result {
            Err(AppError::BadRequest(message)) => {
                assert_eq!(message, "`image` is not a valid base64 string")
            }
            other => panic!("expected bad request, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_missing_image() {
        let service = create_test_service().await;

        for image in [None, Some(String::new())] {
            let result = service
                .create_blog(CreateBlogRequest {
                    image,
                    ..create_request("Test blog 1")
                })
                .await;

            match result {
                Err(AppError::BadRequest(message)) => assert_eq!(message, "missing field `image`"),
                other => panic!("expected bad request, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_malformed_id() {
        let service = create_test_service().await;

        assert!(matches!(
            service.get_blog("aasdfi").await,
            Err(AppError::MalformedId { .. })
        ));
        assert!(matches!(
            service
                .update_blog("aasdfi", UpdateBlogRequest::default())
                .await,
            Err(AppError::MalformedId { .. })
        ));
        assert!(matches!(
            service.delete_blog("aasdfi").await,
            Err(AppError::MalformedId { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_blog() {
        let service = create_test_service().await;

        let blog = service.create_blog(create_request("Original")).await.unwrap();

        let updated = service
            .update_blog(
                &blog.id,
                UpdateBlogRequest {
                    title: Some("Updated title".to_string()),
                    image: Some(String::new()),
                    ..UpdateBlogRequest::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Updated title");
        assert_eq!(updated.body, BODY);
        assert_eq!(updated.image, blog.image);

        let result = service
            .update_blog(
                &blog.id,
                UpdateBlogRequest {
                    image: Some("jaksjdlkfajsd".to_string()),
                    ..UpdateBlogRequest::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let service = create_test_service().await;

        let blog = service.create_blog(create_request("To delete")).await.unwrap();

        let confirmation = service.delete_blog(&blog.id).await.unwrap();
        assert_eq!(
            confirmation.message,
            format!("Blog with id: {} has been successfully deleted.", blog.id)
        );

        match service.delete_blog(&blog.id).await {
            Err(AppError::BadRequest(message)) => {
                assert_eq!(message, format!("Blog with id: {} does not exist.", blog.id))
            }
            other => panic!("expected bad request, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_second_page() {
        let service = create_test_service().await;

        for i in 1..=15 {
            service
                .create_blog(create_request(&format!("Blog number {}", i)))
                .await
                .unwrap();
        }

        let page = service
            .list_blogs(ListBlogsQuery {
                page: Some(2),
                limit: Some(10),
            })
            .await
            .unwrap();

        assert_eq!(page.blogs.len(), 5);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.page, 2);
    }

    #[tokio::test]
    async fn test_list_empty_store() {
        let service = create_test_service().await;

        let page = service.list_blogs(ListBlogsQuery::default()).await.unwrap();

        assert!(page.blogs.is_empty());
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_decode_image_allows_trailing_bits() {
        assert_eq!(decode_image("QR==").unwrap(), b"A");
        assert_eq!(decode_image("QQ==").unwrap(), b"A");
        assert_eq!(
            decode_image("amFrbHNkamZrbGFzamRmaw==").unwrap(),
            b"jaklsdjfklasjdfk"
        );
    }

    #[test]
    fn test_decode_image_rejects_malformed_input() {
        for encoded in ["jaksjdlkfajsd", "QQ", "QQ=", "Q$==", "QQ==QQ=="] {
            assert!(
                matches!(decode_image(encoded), Err(AppError::BadRequest(_))),
                "{}",
                encoded
            );
        }
    }

    #[tokio::test]
    async fn test_create_accepts_image_with_trailing_bits() {
        let service = create_test_service().await;

        let blog = service
            .create_blog(CreateBlogRequest {
                image: Some("QR==".to_string()),
                ..create_request("Test blog 1")
            })
            .await
            .unwrap();

        assert_eq!(blog.image, b"A");
    }

    #[test]
    fn test_pagination_defaults_and_cap() {
        let pagination = Pagination::from_query(&ListBlogsQuery::default()).unwrap();
        assert_eq!(pagination, Pagination { page: 1, limit: 10 });
        assert_eq!(pagination.offset(), 0);

        let pagination = Pagination::from_query(&ListBlogsQuery {
            page: Some(3),
            limit: Some(1_000),
        })
        .unwrap();
        assert_eq!(pagination.limit, MAX_PAGE_LIMIT);
        assert_eq!(pagination.offset(), 200);
        assert_eq!(pagination.total_pages(201), 3);
    }

    #[test]
    fn test_pagination_rejects_non_positive_values() {
        for (page, limit) in [(Some(0), None), (Some(-1), None), (None, Some(0)), (None, Some(-5))] {
            let result = Pagination::from_query(&ListBlogsQuery { page, limit });
            assert!(matches!(result, Err(AppError::BadRequest(_))));
        }
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let pagination = Pagination { page: 1, limit: 10 };

        assert_eq!(pagination.total_pages(0), 0);
        assert_eq!(pagination.total_pages(10), 1);
        assert_eq!(pagination.total_pages(11), 2);
        assert_eq!(pagination.total_pages(15), 2);
    }
}
