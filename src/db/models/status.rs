//! Reading shelf models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::common::ShelfStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReadingStatus {
    pub id: String,
    pub user_id: String,
    pub book_id: String,
    pub status: ShelfStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Shelf entry joined with its book, for the caller's shelf listing
#[derive(Debug, Serialize, FromRow)]
pub struct StatusView {
    pub status: ShelfStatus,
    pub updated_at: String,
    pub book_id: String,
    pub title: String,
    pub author: String,
    pub cover_url: Option<String>,
    pub published_year: Option<i64>,
}

/// Per-shelf cardinality for one user
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub want_to_read: i64,
    pub reading: i64,
    pub read: i64,
}

// DTOs for API

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub book_id: String,
    /// Raw status string; validated against the closed enum before storage
    pub status: String,
}
