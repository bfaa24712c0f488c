//! Review models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: String,
    pub book_id: String,
    pub user_id: String,
    pub rating: i64,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Review joined with the reviewer's display identity
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReviewView {
    pub id: String,
    pub book_id: String,
    pub rating: i64,
    pub body: String,
    pub created_at: String,
    pub user_id: String,
    pub username: String,
    pub avatar_url: Option<String>,
}

// DTOs for API

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub book_id: String,
    pub rating: i64,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: Option<i64>,
    pub body: Option<String>,
}
