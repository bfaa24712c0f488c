//! Contact message submission (authenticated users).

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{ContactMessage, CreateContactRequest};
use crate::AppState;

use super::auth::AuthUser;
use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::validate_email;

/// Submit a contact message; all fields required
pub async fn create_contact(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<ContactMessage>), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if req.name.trim().is_empty() {
        errors.add("name", "Name is required");
    }
    if let Err(e) = validate_email(&req.email) {
        errors.add("email", &e);
    }
    if req.message.trim().is_empty() {
        errors.add("message", "Message is required");
    }
    errors.finish()?;

    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO contact_messages (id, user_id, name, email, message, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&user.id)
    .bind(req.name.trim())
    .bind(&req.email)
    .bind(req.message.trim())
    .bind(&now)
    .execute(&state.db)
    .await?;

    let contact: ContactMessage = sqlx::query_as("SELECT * FROM contact_messages WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    Ok((StatusCode::CREATED, Json(contact)))
}
