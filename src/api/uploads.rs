//! Avatar upload: multipart image field, written under the uploads directory
//! and served back via the static `/uploads` route.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::AppState;

use super::auth::AuthUser;
use super::error::ApiError;

/// Size ceiling for uploaded images
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub avatar_url: String,
}

/// Reject anything that is not an image within the size ceiling
fn validate_image(content_type: Option<&str>, size: usize) -> Result<(), ApiError> {
    match content_type {
        Some(ct) if ct.starts_with("image/") => {}
        _ => return Err(ApiError::bad_request("File must be an image")),
    }

    if size == 0 {
        return Err(ApiError::bad_request("Uploaded file is empty"));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(ApiError::bad_request("File size must be less than 5MB"));
    }

    Ok(())
}

/// Unique on-disk name: caller id plus a random component, extension taken
/// from the original filename or guessed from the MIME type
fn avatar_filename(user_id: &str, original_name: Option<&str>, content_type: &str) -> String {
    let ext = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .or_else(|| {
            mime_guess::get_mime_extensions_str(content_type)
                .and_then(|exts| exts.first())
                .map(|e| e.to_string())
        })
        .unwrap_or_else(|| "bin".to_string());

    format!("{}_{}.{}", user_id, Uuid::new_v4(), ext)
}

/// Accept a multipart avatar image, store it, and point the caller's profile
/// at the stored file
pub async fn upload_avatar(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut stored: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("Malformed multipart body"))?
    {
        if field.name() != Some("avatar") {
            continue;
        }

        let content_type = field.content_type().map(|ct| ct.to_string());
        let original_name = field.file_name().map(|n| n.to_string());

        let bytes = field
            .bytes()
            .await
            .map_err(|_| ApiError::bad_request("Failed to read uploaded file"))?;

        validate_image(content_type.as_deref(), bytes.len())?;

        let filename = avatar_filename(
            &user.id,
            original_name.as_deref(),
            content_type.as_deref().unwrap_or("application/octet-stream"),
        );

        let avatar_dir = state.config.server.uploads_dir.join("avatars");
        tokio::fs::create_dir_all(&avatar_dir)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create avatar directory: {}", e);
                ApiError::internal("Failed to store file")
            })?;
        tokio::fs::write(avatar_dir.join(&filename), &bytes)
            .await
            .map_err(|e| {
                tracing::error!("Failed to write avatar: {}", e);
                ApiError::internal("Failed to store file")
            })?;

        stored = Some(format!("/uploads/avatars/{}", filename));
        break;
    }

    let avatar_url = stored.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;

    sqlx::query("UPDATE users SET avatar_url = ?, updated_at = ? WHERE id = ?")
        .bind(&avatar_url)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(&user.id)
        .execute(&state.db)
        .await?;

    Ok(Json(UploadResponse { avatar_url }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_validate_image_mime_prefix() {
        assert!(validate_image(Some("image/png"), 1024).is_ok());
        assert!(validate_image(Some("image/jpeg"), MAX_UPLOAD_BYTES).is_ok());

        let err = validate_image(Some("application/pdf"), 1024).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(validate_image(None, 1024).is_err());
    }

    #[test]
    fn test_validate_image_size_ceiling() {
        assert!(validate_image(Some("image/png"), MAX_UPLOAD_BYTES + 1).is_err());
        assert!(validate_image(Some("image/png"), 0).is_err());
    }

    #[test]
    fn test_avatar_filename_extension_sources() {
        let from_name = avatar_filename("u1", Some("Photo.PNG"), "image/png");
        assert!(from_name.starts_with("u1_"));
        assert!(from_name.ends_with(".png"));

        let from_mime = avatar_filename("u1", None, "image/jpeg");
        assert!(from_mime.ends_with(".jpe") || from_mime.ends_with(".jpg") || from_mime.ends_with(".jpeg"));

        let fallback = avatar_filename("u1", None, "not-a-mime-type");
        assert!(fallback.ends_with(".bin"));
    }
}
