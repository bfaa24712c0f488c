//! Profile endpoints for the authenticated user.

use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

use crate::db::{UpdateProfileRequest, User, UserResponse};
use crate::AppState;

use super::auth::AuthUser;
use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{
    validate_birthdate, validate_country, validate_gender, validate_genre_name, validate_url,
    validate_username,
};

/// Get the caller's profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let row: User = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&user.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserResponse::from(row)))
}

fn validate_update_request(req: &UpdateProfileRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Some(ref username) = req.username {
        if let Err(e) = validate_username(username) {
            errors.add("username", &e);
        }
    }
    if let Err(e) = validate_gender(&req.gender) {
        errors.add("gender", &e);
    }
    if let Some(ref genres) = req.favorite_genres {
        for name in genres {
            if let Err(e) = validate_genre_name(name) {
                errors.add("favorite_genres", &e);
            }
        }
    }
    if let Err(e) = validate_birthdate(&req.birthdate) {
        errors.add("birthdate", &e);
    }
    if let Err(e) = validate_country(&req.country) {
        errors.add("country", &e);
    }
    // Stored upload references ("/uploads/...") are accepted alongside full URLs
    let is_upload_ref = req
        .avatar_url
        .as_deref()
        .is_some_and(|a| a.starts_with("/uploads/"));
    if !is_upload_ref {
        if let Err(e) = validate_url(&req.avatar_url, "avatar_url") {
            errors.add("avatar_url", &e);
        }
    }

    errors.finish()
}

/// Update the caller's profile; absent fields are left untouched
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    validate_update_request(&req)?;

    let _existing: User = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&user.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let favorite_genres = req.favorite_genres.as_ref().map(|g| g.join(","));
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        UPDATE users SET
            username = COALESCE(?, username),
            gender = COALESCE(?, gender),
            favorite_genres = COALESCE(?, favorite_genres),
            birthdate = COALESCE(?, birthdate),
            country = COALESCE(?, country),
            avatar_url = COALESCE(?, avatar_url),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&req.username)
    .bind(&req.gender)
    .bind(&favorite_genres)
    .bind(&req.birthdate)
    .bind(&req.country)
    .bind(&req.avatar_url)
    .bind(&now)
    .bind(&user.id)
    .execute(&state.db)
    .await?;

    let row: User = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&user.id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(UserResponse::from(row)))
}
