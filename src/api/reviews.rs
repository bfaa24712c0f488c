//! Review endpoints: posting, listing, and owner-gated edit/delete.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{Book, CreateReviewRequest, Review, ReviewView, UpdateReviewRequest};
use crate::AppState;

use super::auth::AuthUser;
use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_rating, validate_review_body, validate_uuid};

/// Post a review. Rating and text are both required; the 1-5 bound is
/// enforced here rather than trusted to the client. A user may review the
/// same book more than once.
pub async fn add_review(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if let Err(e) = validate_uuid(&req.book_id, "book_id") {
        errors.add("book_id", &e);
    }
    if let Err(e) = validate_rating(req.rating) {
        errors.add("rating", &e);
    }
    if let Err(e) = validate_review_body(&req.body) {
        errors.add("body", &e);
    }
    errors.finish()?;

    let book: Option<Book> = sqlx::query_as("SELECT * FROM books WHERE id = ?")
        .bind(&req.book_id)
        .fetch_optional(&state.db)
        .await?;
    if book.is_none() {
        return Err(ApiError::not_found("Book not found"));
    }

    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO reviews (id, book_id, user_id, rating, body, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&req.book_id)
    .bind(&user.id)
    .bind(req.rating)
    .bind(req.body.trim())
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    let review: Review = sqlx::query_as("SELECT * FROM reviews WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    Ok((StatusCode::CREATED, Json(review)))
}

/// Reviews for one book, newest first, with reviewer identity. An empty
/// result is a distinct "no reviews" signal rather than an empty success.
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<String>,
) -> Result<Json<Vec<ReviewView>>, ApiError> {
    if let Err(e) = validate_uuid(&book_id, "book_id") {
        return Err(ApiError::validation_field("book_id", e));
    }

    let reviews: Vec<ReviewView> = sqlx::query_as(
        "SELECT r.id, r.book_id, r.rating, r.body, r.created_at,
                u.id AS user_id, u.username, u.avatar_url
         FROM reviews r
         JOIN users u ON u.id = r.user_id
         WHERE r.book_id = ?
         ORDER BY r.created_at DESC",
    )
    .bind(&book_id)
    .fetch_all(&state.db)
    .await?;

    if reviews.is_empty() {
        return Err(ApiError::not_found("No reviews for this book"));
    }

    Ok(Json(reviews))
}

/// Edit a review. Only the owning user may edit; a non-owner gets Forbidden,
/// a missing review NotFound.
pub async fn edit_review(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateReviewRequest>,
) -> Result<Json<Review>, ApiError> {
    if let Err(e) = validate_uuid(&id, "review_id") {
        return Err(ApiError::validation_field("review_id", e));
    }

    let mut errors = ValidationErrorBuilder::new();
    if let Some(rating) = req.rating {
        if let Err(e) = validate_rating(rating) {
            errors.add("rating", &e);
        }
    }
    if let Some(ref body) = req.body {
        if let Err(e) = validate_review_body(body) {
            errors.add("body", &e);
        }
    }
    errors.finish()?;

    let existing: Review = sqlx::query_as("SELECT * FROM reviews WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Review not found"))?;

    if existing.user_id != user.id {
        return Err(ApiError::forbidden("Not allowed to edit this review"));
    }

    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        UPDATE reviews SET
            rating = COALESCE(?, rating),
            body = COALESCE(?, body),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(req.rating)
    .bind(&req.body)
    .bind(&now)
    .bind(&id)
    .execute(&state.db)
    .await?;

    let review: Review = sqlx::query_as("SELECT * FROM reviews WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(review))
}

/// Delete a review. The owning user or an admin may delete; anyone else gets
/// Forbidden, a missing review NotFound.
pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if let Err(e) = validate_uuid(&id, "review_id") {
        return Err(ApiError::validation_field("review_id", e));
    }

    let existing: Review = sqlx::query_as("SELECT * FROM reviews WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Review not found"))?;

    if existing.user_id != user.id && !user.is_admin() {
        return Err(ApiError::forbidden("Not allowed to delete this review"));
    }

    sqlx::query("DELETE FROM reviews WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    Ok(Json(serde_json::json!({ "message": "Review deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_helpers::{insert_book, insert_user, test_state, user};
    use crate::db::Role;
    use crate::api::auth::AuthUser;

    fn admin_caller(id: &str) -> AuthUser {
        AuthUser {
            id: id.to_string(),
            role: Role::Admin,
        }
    }

    async fn post_review(
        state: &Arc<AppState>,
        caller: &str,
        book_id: &str,
        rating: i64,
        body: &str,
    ) -> Result<Review, ApiError> {
        add_review(
            State(state.clone()),
            user(caller),
            Json(CreateReviewRequest {
                book_id: book_id.to_string(),
                rating,
                body: body.to_string(),
            }),
        )
        .await
        .map(|(_, json)| json.0)
    }

    #[tokio::test]
    async fn test_add_review_enforces_rating_bounds() {
        let state = test_state().await;
        let reader_id = insert_user(&state, "ada", "ada@example.com", Role::User).await;
        let book_id = insert_book(&state, "1984", "George Orwell").await;

        for bad in [0, 6, -1] {
            let err = post_review(&state, &reader_id, &book_id, bad, "text")
                .await
                .unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }

        let err = post_review(&state, &reader_id, &book_id, 4, "   ")
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let review = post_review(&state, &reader_id, &book_id, 5, "Bleak and brilliant.")
            .await
            .unwrap();
        assert_eq!(review.rating, 5);

        // No uniqueness constraint: a second review by the same user is fine
        post_review(&state, &reader_id, &book_id, 3, "On reread, merely great.")
            .await
            .unwrap();
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE user_id = ?")
            .bind(&reader_id)
            .fetch_one(&state.db)
            .await
            .unwrap();
        assert_eq!(count.0, 2);
    }

    #[tokio::test]
    async fn test_list_reviews_newest_first_and_empty_signal() {
        let state = test_state().await;
        let reader_id = insert_user(&state, "ada", "ada@example.com", Role::User).await;
        let book_id = insert_book(&state, "1984", "George Orwell").await;

        let err = list_reviews(State(state.clone()), Path(book_id.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        sqlx::query(
            "INSERT INTO reviews (id, book_id, user_id, rating, body, created_at, updated_at)
             VALUES (?, ?, ?, 4, 'first', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&book_id)
        .bind(&reader_id)
        .execute(&state.db)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO reviews (id, book_id, user_id, rating, body, created_at, updated_at)
             VALUES (?, ?, ?, 5, 'second', '2026-01-02T00:00:00Z', '2026-01-02T00:00:00Z')",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&book_id)
        .bind(&reader_id)
        .execute(&state.db)
        .await
        .unwrap();

        let reviews = list_reviews(State(state.clone()), Path(book_id))
            .await
            .unwrap();
        assert_eq!(reviews.0.len(), 2);
        assert_eq!(reviews.0[0].body, "second");
        assert_eq!(reviews.0[0].username, "ada");
    }

    #[tokio::test]
    async fn test_edit_review_is_owner_only() {
        let state = test_state().await;
        let owner_id = insert_user(&state, "ada", "ada@example.com", Role::User).await;
        let other_id = insert_user(&state, "bob", "bob@example.com", Role::User).await;
        let admin_id = insert_user(&state, "root", "root@example.com", Role::Admin).await;
        let book_id = insert_book(&state, "1984", "George Orwell").await;

        let review = post_review(&state, &owner_id, &book_id, 4, "Good.")
            .await
            .unwrap();

        let patch = || UpdateReviewRequest {
            rating: Some(5),
            body: Some("Even better on reflection.".to_string()),
        };

        // Non-owner: forbidden. Admin is not exempt from the edit rule.
        let err = edit_review(
            State(state.clone()),
            user(&other_id),
            Path(review.id.clone()),
            Json(patch()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let err = edit_review(
            State(state.clone()),
            admin_caller(&admin_id),
            Path(review.id.clone()),
            Json(patch()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        // Owner succeeds
        let edited = edit_review(
            State(state.clone()),
            user(&owner_id),
            Path(review.id.clone()),
            Json(patch()),
        )
        .await
        .unwrap();
        assert_eq!(edited.0.rating, 5);

        // Missing review: not found, distinct from forbidden
        let err = edit_review(
            State(state.clone()),
            user(&owner_id),
            Path(Uuid::new_v4().to_string()),
            Json(patch()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_review_owner_or_admin() {
        let state = test_state().await;
        let owner_id = insert_user(&state, "ada", "ada@example.com", Role::User).await;
        let other_id = insert_user(&state, "bob", "bob@example.com", Role::User).await;
        let admin_id = insert_user(&state, "root", "root@example.com", Role::Admin).await;
        let book_id = insert_book(&state, "1984", "George Orwell").await;

        let first = post_review(&state, &owner_id, &book_id, 4, "Good.")
            .await
            .unwrap();
        let second = post_review(&state, &owner_id, &book_id, 2, "Changed my mind.")
            .await
            .unwrap();

        let err = delete_review(State(state.clone()), user(&other_id), Path(first.id.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        delete_review(State(state.clone()), user(&owner_id), Path(first.id))
            .await
            .unwrap();
        delete_review(
            State(state.clone()),
            admin_caller(&admin_id),
            Path(second.id.clone()),
        )
        .await
        .unwrap();

        let err = delete_review(State(state.clone()), admin_caller(&admin_id), Path(second.id))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
