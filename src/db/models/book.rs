//! Catalog models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::common::ShelfStatus;
use super::review::ReviewView;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub published_year: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Genre {
    pub id: String,
    pub name: String,
}

/// Catalog listing entry: book plus aggregated genre names, average rating
/// (one decimal, 0.0 when unreviewed) and the requester's shelf status.
#[derive(Debug, Serialize)]
pub struct BookView {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub published_year: Option<i64>,
    pub rating: f64,
    pub genres: Vec<String>,
    pub user_status: Option<ShelfStatus>,
}

/// Single-book view with its reviews, newest first
#[derive(Debug, Serialize)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: BookView,
    pub reviews: Vec<ReviewView>,
}

// DTOs for API

#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub published_year: Option<i64>,
    /// Genre names; each is upserted by name and linked
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub published_year: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub term: Option<String>,
    pub genre: Option<String>,
}

/// Admin listing entry: book plus review count and average rating
#[derive(Debug, Serialize)]
pub struct BookWithStats {
    #[serde(flatten)]
    pub book: Book,
    pub review_count: i64,
    pub average_rating: f64,
}
