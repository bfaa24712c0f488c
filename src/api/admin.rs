//! Admin dashboard endpoints: catalog and user stats, contact inbox, counts.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::db::{Book, BookWithStats, ContactView, User, UserResponse, UserWithStats};
use crate::AppState;

use super::auth::AdminUser;
use super::error::ApiError;
use super::validation::validate_uuid;

/// Dashboard counters
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_books: i64,
    pub total_users: i64,
    pub total_reviews: i64,
    pub total_contacts: i64,
}

/// All books with review count and average rating
pub async fn list_books_with_stats(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<BookWithStats>>, ApiError> {
    let books: Vec<Book> = sqlx::query_as("SELECT * FROM books ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;

    let mut results = Vec::with_capacity(books.len());
    for book in books {
        let (count, avg): (i64, Option<f64>) =
            sqlx::query_as("SELECT COUNT(*), AVG(rating) FROM reviews WHERE book_id = ?")
                .bind(&book.id)
                .fetch_one(&state.db)
                .await?;

        results.push(BookWithStats {
            book,
            review_count: count,
            average_rating: (avg.unwrap_or(0.0) * 10.0).round() / 10.0,
        });
    }

    Ok(Json(results))
}

/// All users (password hash excluded) with review and shelf-entry counts
pub async fn list_users_with_stats(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<UserWithStats>>, ApiError> {
    let users: Vec<User> = sqlx::query_as("SELECT * FROM users ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;

    let mut results = Vec::with_capacity(users.len());
    for user in users {
        let (review_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE user_id = ?")
                .bind(&user.id)
                .fetch_one(&state.db)
                .await?;
        let (status_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM reading_statuses WHERE user_id = ?")
                .bind(&user.id)
                .fetch_one(&state.db)
                .await?;

        results.push(UserWithStats {
            user: UserResponse::from(user),
            review_count,
            status_count,
        });
    }

    Ok(Json(results))
}

/// Contact messages, newest first, with sender identity
pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<ContactView>>, ApiError> {
    let contacts: Vec<ContactView> = sqlx::query_as(
        "SELECT c.id, c.name, c.email, c.message, c.created_at,
                u.id AS user_id, u.username
         FROM contact_messages c
         JOIN users u ON u.id = c.user_id
         ORDER BY c.created_at DESC",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(contacts))
}

/// Delete a contact message; NotFound when the id does not exist
pub async fn delete_contact(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if let Err(e) = validate_uuid(&id, "contact_id") {
        return Err(ApiError::validation_field("contact_id", e));
    }

    let result = sqlx::query("DELETE FROM contact_messages WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Contact message not found"));
    }

    Ok(Json(serde_json::json!({ "message": "Contact message deleted" })))
}

async fn count_table(pool: &sqlx::SqlitePool, sql: &str) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(sql).fetch_one(pool).await?;
    Ok(count)
}

/// Dashboard counts. The four counts are independent and run concurrently.
pub async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<DashboardStats>, ApiError> {
    let (books, users, reviews, contacts) = tokio::join!(
        count_table(&state.db, "SELECT COUNT(*) FROM books"),
        count_table(&state.db, "SELECT COUNT(*) FROM users"),
        count_table(&state.db, "SELECT COUNT(*) FROM reviews"),
        count_table(&state.db, "SELECT COUNT(*) FROM contact_messages"),
    );

    Ok(Json(DashboardStats {
        total_books: books?,
        total_users: users?,
        total_reviews: reviews?,
        total_contacts: contacts?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_helpers::{admin, insert_book, insert_user, test_state, user};
    use crate::api::contacts::create_contact;
    use crate::db::{CreateContactRequest, Role};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_dashboard_stats_counts_each_table() {
        let state = test_state().await;
        let admin_id = insert_user(&state, "root", "root@example.com", Role::Admin).await;
        let reader_id = insert_user(&state, "ada", "ada@example.com", Role::User).await;
        let book_id = insert_book(&state, "1984", "George Orwell").await;

        sqlx::query(
            "INSERT INTO reviews (id, book_id, user_id, rating, body, created_at, updated_at)
             VALUES (?, ?, ?, 5, 'x', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(&book_id)
        .bind(&reader_id)
        .execute(&state.db)
        .await
        .unwrap();

        create_contact(
            State(state.clone()),
            user(&reader_id),
            axum::Json(CreateContactRequest {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                message: "hi".to_string(),
            }),
        )
        .await
        .unwrap();

        let stats = dashboard_stats(State(state.clone()), admin(&admin_id))
            .await
            .unwrap();
        assert_eq!(stats.0.total_books, 1);
        assert_eq!(stats.0.total_users, 2);
        assert_eq!(stats.0.total_reviews, 1);
        assert_eq!(stats.0.total_contacts, 1);
    }

    #[tokio::test]
    async fn test_list_books_and_users_with_stats() {
        let state = test_state().await;
        let admin_id = insert_user(&state, "root", "root@example.com", Role::Admin).await;
        let reader_id = insert_user(&state, "ada", "ada@example.com", Role::User).await;
        let book_id = insert_book(&state, "1984", "George Orwell").await;

        for rating in [3, 4] {
            sqlx::query(
                "INSERT INTO reviews (id, book_id, user_id, rating, body, created_at, updated_at)
                 VALUES (?, ?, ?, ?, 'x', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
            )
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(&book_id)
            .bind(&reader_id)
            .bind(rating)
            .execute(&state.db)
            .await
            .unwrap();
        }
        sqlx::query(
            "INSERT INTO reading_statuses (id, user_id, book_id, status, created_at, updated_at)
             VALUES (?, ?, ?, 'read', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(&reader_id)
        .bind(&book_id)
        .execute(&state.db)
        .await
        .unwrap();

        let books = list_books_with_stats(State(state.clone()), admin(&admin_id))
            .await
            .unwrap();
        assert_eq!(books.0.len(), 1);
        assert_eq!(books.0[0].review_count, 2);
        assert_eq!(books.0[0].average_rating, 3.5);

        let users = list_users_with_stats(State(state.clone()), admin(&admin_id))
            .await
            .unwrap();
        let ada = users
            .0
            .iter()
            .find(|u| u.user.username == "ada")
            .unwrap();
        assert_eq!(ada.review_count, 2);
        assert_eq!(ada.status_count, 1);
    }

    #[tokio::test]
    async fn test_delete_contact_twice_reports_not_found() {
        let state = test_state().await;
        let admin_id = insert_user(&state, "root", "root@example.com", Role::Admin).await;
        let reader_id = insert_user(&state, "ada", "ada@example.com", Role::User).await;

        let (_, contact) = create_contact(
            State(state.clone()),
            user(&reader_id),
            axum::Json(CreateContactRequest {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                message: "hi".to_string(),
            }),
        )
        .await
        .unwrap();

        delete_contact(
            State(state.clone()),
            admin(&admin_id),
            Path(contact.0.id.clone()),
        )
        .await
        .unwrap();

        let err = delete_contact(State(state.clone()), admin(&admin_id), Path(contact.0.id))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
