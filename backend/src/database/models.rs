//! Database models
//!
//! Rust structs representing the blog entity and the payloads that
//! create, change and page through it. Images are raw bytes in memory and
//! in the database, and base64 strings on the wire.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A published blog post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Blog {
    pub id: String,
    pub title: String,
    pub body: String,
    /// Cover image bytes, base64 encoded when serialized
    #[serde(with = "base64_bytes")]
    pub image: Vec<u8>,
}

/// Create blog request as sent by clients.
///
/// Every field is optional at this level so that a missing field is
/// reported with the same `{status, error}` body as any other failure.
#[derive(Debug, Default, Deserialize)]
pub struct CreateBlogRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    /// Base64 encoded image
    pub image: Option<String>,
}

/// Update blog request as sent by clients
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    /// Base64 encoded image
    pub image: Option<String>,
}

/// A blog ready to be stored, with the image already decoded.
///
/// Title and body presence is checked by the repository.
#[derive(Debug, Clone, Default)]
pub struct NewBlog {
    pub title: Option<String>,
    pub body: Option<String>,
    pub image: Vec<u8>,
}

/// Partial update of a stored blog. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct BlogChanges {
    pub title: Option<String>,
    pub body: Option<String>,
    pub image: Option<Vec<u8>>,
}

/// Query parameters of the list endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ListBlogsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// One page of blogs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPage {
    pub blogs: Vec<Blog>,
    pub total_pages: i64,
    pub page: i64,
}

/// Body returned after a successful delete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteConfirmation {
    pub message: String,
}

/// Serde adapter storing bytes as a standard padded base64 string
pub mod base64_bytes {
    use base64::alphabet;
    use base64::engine::general_purpose::STANDARD;
    use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Standard padded decoder that ignores non-zero bits left over in the
    /// final symbol, so `QR==` decodes to `A` like common lenient decoders.
    pub const IMAGE_ENGINE: GeneralPurpose = GeneralPurpose::new(
        &alphabet::STANDARD,
        GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
    );

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        IMAGE_ENGINE
            .decode(encoded)
            .map_err(serde::de::Error::custom)
    }
}
