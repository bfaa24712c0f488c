//! Reading shelf endpoints.
//!
//! POST is an upsert keyed on the (user, book) unique pair; PATCH requires an
//! existing row. Both reject unknown status values before touching storage.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{Book, ReadingStatus, SetStatusRequest, ShelfStatus, StatusCounts, StatusView};
use crate::AppState;

use super::auth::AuthUser;
use super::error::ApiError;
use super::validation::validate_uuid;

fn parse_status(raw: &str) -> Result<ShelfStatus, ApiError> {
    raw.parse::<ShelfStatus>().map_err(|_| {
        ApiError::validation_field(
            "status",
            "Invalid status. Must be one of: want_to_read, reading, read",
        )
    })
}

/// List the caller's shelf, newest first, each entry with its book
pub async fn list_statuses(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<StatusView>>, ApiError> {
    let statuses: Vec<StatusView> = sqlx::query_as(
        "SELECT s.status, s.updated_at, b.id AS book_id, b.title, b.author,
                b.cover_url, b.published_year
         FROM reading_statuses s
         JOIN books b ON b.id = s.book_id
         WHERE s.user_id = ?
         ORDER BY s.created_at DESC",
    )
    .bind(&user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(statuses))
}

/// Per-shelf counts for the caller
pub async fn status_counts(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<StatusCounts>, ApiError> {
    let rows: Vec<(ShelfStatus, i64)> = sqlx::query_as(
        "SELECT status, COUNT(*) FROM reading_statuses WHERE user_id = ? GROUP BY status",
    )
    .bind(&user.id)
    .fetch_all(&state.db)
    .await?;

    let mut counts = StatusCounts {
        want_to_read: 0,
        reading: 0,
        read: 0,
    };
    for (status, count) in rows {
        match status {
            ShelfStatus::WantToRead => counts.want_to_read = count,
            ShelfStatus::Reading => counts.reading = count,
            ShelfStatus::Read => counts.read = count,
        }
    }

    Ok(Json(counts))
}

/// Put a book on the caller's shelf, overwriting any previous status.
/// The UNIQUE(user_id, book_id) key makes concurrent calls converge to one row.
pub async fn set_status(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<ReadingStatus>, ApiError> {
    if let Err(e) = validate_uuid(&req.book_id, "book_id") {
        return Err(ApiError::validation_field("book_id", e));
    }
    let status = parse_status(&req.status)?;

    let book: Option<Book> = sqlx::query_as("SELECT * FROM books WHERE id = ?")
        .bind(&req.book_id)
        .fetch_optional(&state.db)
        .await?;
    if book.is_none() {
        return Err(ApiError::not_found("Book not found"));
    }

    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO reading_statuses (id, user_id, book_id, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id, book_id) DO UPDATE SET
            status = excluded.status,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&user.id)
    .bind(&req.book_id)
    .bind(status)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    let row: ReadingStatus =
        sqlx::query_as("SELECT * FROM reading_statuses WHERE user_id = ? AND book_id = ?")
            .bind(&user.id)
            .bind(&req.book_id)
            .fetch_one(&state.db)
            .await?;

    Ok(Json(row))
}

/// Update an existing shelf entry; NotFound when the pair has no row
pub async fn edit_status(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<ReadingStatus>, ApiError> {
    if let Err(e) = validate_uuid(&req.book_id, "book_id") {
        return Err(ApiError::validation_field("book_id", e));
    }
    let status = parse_status(&req.status)?;

    let existing: Option<ReadingStatus> =
        sqlx::query_as("SELECT * FROM reading_statuses WHERE user_id = ? AND book_id = ?")
            .bind(&user.id)
            .bind(&req.book_id)
            .fetch_optional(&state.db)
            .await?;
    if existing.is_none() {
        return Err(ApiError::not_found("Book status not found"));
    }

    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "UPDATE reading_statuses SET status = ?, updated_at = ? WHERE user_id = ? AND book_id = ?",
    )
    .bind(status)
    .bind(&now)
    .bind(&user.id)
    .bind(&req.book_id)
    .execute(&state.db)
    .await?;

    let row: ReadingStatus =
        sqlx::query_as("SELECT * FROM reading_statuses WHERE user_id = ? AND book_id = ?")
            .bind(&user.id)
            .bind(&req.book_id)
            .fetch_one(&state.db)
            .await?;

    Ok(Json(row))
}

/// Take a book off the caller's shelf; NotFound when the pair has no row
pub async fn remove_status(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(book_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if let Err(e) = validate_uuid(&book_id, "book_id") {
        return Err(ApiError::validation_field("book_id", e));
    }

    let result = sqlx::query("DELETE FROM reading_statuses WHERE user_id = ? AND book_id = ?")
        .bind(&user.id)
        .bind(&book_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Book status not found"));
    }

    Ok(Json(serde_json::json!({ "message": "Book status removed" })))
}
