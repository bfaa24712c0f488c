//! User account models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::common::Role;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub gender: Option<String>,
    /// Comma-joined list of genre names
    pub favorite_genres: Option<String>,
    pub birthdate: Option<String>,
    pub country: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Response DTO that excludes the password hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub gender: Option<String>,
    pub favorite_genres: Option<String>,
    pub birthdate: Option<String>,
    pub country: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            gender: user.gender,
            favorite_genres: user.favorite_genres,
            birthdate: user.birthdate,
            country: user.country,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
        }
    }
}

// DTOs for API

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub gender: Option<String>,
    pub favorite_genres: Option<Vec<String>>,
    pub birthdate: Option<String>,
    pub country: Option<String>,
    pub avatar_url: Option<String>,
}

/// Admin listing entry: profile plus engagement counts
#[derive(Debug, Serialize)]
pub struct UserWithStats {
    #[serde(flatten)]
    pub user: UserResponse,
    pub review_count: i64,
    pub status_count: i64,
}
