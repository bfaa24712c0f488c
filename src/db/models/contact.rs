//! Contact message models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContactMessage {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: String,
}

/// Contact message joined with the sender's display identity
#[derive(Debug, Serialize, FromRow)]
pub struct ContactView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: String,
    pub user_id: String,
    pub username: String,
}

// DTOs for API

#[derive(Debug, Deserialize)]
pub struct CreateContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}
