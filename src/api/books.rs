//! Catalog endpoints: browsing, search and admin CRUD over books.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{
    Book, BookDetail, BookView, CreateBookRequest, ReviewView, SearchQuery, ShelfStatus,
    UpdateBookRequest,
};
use crate::AppState;

use super::auth::{AdminUser, MaybeAuthUser};
use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{
    validate_author, validate_genre_name, validate_published_year, validate_title, validate_url,
    validate_uuid,
};

/// Round an average rating to one decimal, 0.0 when there are no reviews
fn round_rating(avg: Option<f64>) -> f64 {
    (avg.unwrap_or(0.0) * 10.0).round() / 10.0
}

/// Genre names linked to a book, alphabetical
async fn book_genres(pool: &sqlx::SqlitePool, book_id: &str) -> Result<Vec<String>, ApiError> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT g.name FROM genres g
         JOIN book_genres bg ON bg.genre_id = g.id
         WHERE bg.book_id = ? ORDER BY g.name",
    )
    .bind(book_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(name,)| name).collect())
}

/// Assemble the listing view of one book for an optional requester
async fn build_book_view(
    pool: &sqlx::SqlitePool,
    book: Book,
    requester: Option<&str>,
) -> Result<BookView, ApiError> {
    let genres = book_genres(pool, &book.id).await?;

    let (avg,): (Option<f64>,) = sqlx::query_as("SELECT AVG(rating) FROM reviews WHERE book_id = ?")
        .bind(&book.id)
        .fetch_one(pool)
        .await?;

    let user_status = match requester {
        Some(user_id) => {
            let row: Option<(ShelfStatus,)> = sqlx::query_as(
                "SELECT status FROM reading_statuses WHERE user_id = ? AND book_id = ?",
            )
            .bind(user_id)
            .bind(&book.id)
            .fetch_optional(pool)
            .await?;
            row.map(|(status,)| status)
        }
        None => None,
    };

    Ok(BookView {
        id: book.id,
        title: book.title,
        author: book.author,
        description: book.description,
        cover_url: book.cover_url,
        published_year: book.published_year,
        rating: round_rating(avg),
        genres,
        user_status,
    })
}

/// List all books with genres, average rating and the caller's shelf status
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(user): MaybeAuthUser,
) -> Result<Json<Vec<BookView>>, ApiError> {
    let books: Vec<Book> = sqlx::query_as("SELECT * FROM books ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;

    let requester = user.as_ref().map(|u| u.id.as_str());
    let mut views = Vec::with_capacity(books.len());
    for book in books {
        views.push(build_book_view(&state.db, book, requester).await?);
    }

    Ok(Json(views))
}

/// Get one book with its reviews, newest first
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(id): Path<String>,
) -> Result<Json<BookDetail>, ApiError> {
    if let Err(e) = validate_uuid(&id, "book_id") {
        return Err(ApiError::validation_field("book_id", e));
    }

    let book: Book = sqlx::query_as("SELECT * FROM books WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Book not found"))?;

    let reviews: Vec<ReviewView> = sqlx::query_as(
        "SELECT r.id, r.book_id, r.rating, r.body, r.created_at,
                u.id AS user_id, u.username, u.avatar_url
         FROM reviews r
         JOIN users u ON u.id = r.user_id
         WHERE r.book_id = ?
         ORDER BY r.created_at DESC",
    )
    .bind(&id)
    .fetch_all(&state.db)
    .await?;

    let requester = user.as_ref().map(|u| u.id.as_str());
    let view = build_book_view(&state.db, book, requester).await?;

    Ok(Json(BookDetail {
        book: view,
        reviews,
    }))
}

/// Search the catalog. Term matches title or author as a case-insensitive
/// substring; genre matches a genre name exactly (case-insensitive); both
/// filters AND together. Zero matches is a distinct "no matches" signal.
pub async fn search_books(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(user): MaybeAuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<BookView>>, ApiError> {
    let term = query
        .term
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_lowercase();
    let genre = query
        .genre
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    let books: Vec<Book> = sqlx::query_as(
        "SELECT DISTINCT b.* FROM books b
         LEFT JOIN book_genres bg ON bg.book_id = b.id
         LEFT JOIN genres g ON g.id = bg.genre_id
         WHERE (?1 = '' OR LOWER(b.title) LIKE '%' || ?1 || '%' OR LOWER(b.author) LIKE '%' || ?1 || '%')
           AND (?2 = '' OR LOWER(g.name) = ?2)
         ORDER BY b.title",
    )
    .bind(&term)
    .bind(&genre)
    .fetch_all(&state.db)
    .await?;

    if books.is_empty() {
        return Err(ApiError::not_found("No books matched your search"));
    }

    let requester = user.as_ref().map(|u| u.id.as_str());
    let mut views = Vec::with_capacity(books.len());
    for book in books {
        views.push(build_book_view(&state.db, book, requester).await?);
    }

    Ok(Json(views))
}

fn validate_create_request(req: &CreateBookRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_title(&req.title) {
        errors.add("title", &e);
    }
    if let Err(e) = validate_author(&req.author) {
        errors.add("author", &e);
    }
    if let Err(e) = validate_url(&req.cover_url, "cover_url") {
        errors.add("cover_url", &e);
    }
    if let Err(e) = validate_published_year(&req.published_year) {
        errors.add("published_year", &e);
    }
    for name in &req.genres {
        if let Err(e) = validate_genre_name(name) {
            errors.add("genres", &e);
        }
    }

    errors.finish()
}

fn validate_update_request(req: &UpdateBookRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Some(ref title) = req.title {
        if let Err(e) = validate_title(title) {
            errors.add("title", &e);
        }
    }
    if let Some(ref author) = req.author {
        if let Err(e) = validate_author(author) {
            errors.add("author", &e);
        }
    }
    if let Err(e) = validate_url(&req.cover_url, "cover_url") {
        errors.add("cover_url", &e);
    }
    if let Err(e) = validate_published_year(&req.published_year) {
        errors.add("published_year", &e);
    }

    errors.finish()
}

/// Create a book (admin only), upserting each supplied genre by name
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Json(req): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<BookView>), ApiError> {
    validate_create_request(&req)?;

    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    let mut tx = state.db.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO books (id, title, author, description, cover_url, published_year, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(req.title.trim())
    .bind(req.author.trim())
    .bind(&req.description)
    .bind(&req.cover_url)
    .bind(req.published_year)
    .bind(&now)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    for name in &req.genres {
        let name = name.trim();
        sqlx::query("INSERT INTO genres (id, name) VALUES (?, ?) ON CONFLICT(name) DO NOTHING")
            .bind(Uuid::new_v4().to_string())
            .bind(name)
            .execute(&mut *tx)
            .await?;

        let (genre_id,): (String,) = sqlx::query_as("SELECT id FROM genres WHERE name = ?")
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO book_genres (id, book_id, genre_id) VALUES (?, ?, ?)
             ON CONFLICT(book_id, genre_id) DO NOTHING",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&id)
        .bind(&genre_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    let book: Book = sqlx::query_as("SELECT * FROM books WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    tracing::info!(book = %book.title, "Book created");

    let view = build_book_view(&state.db, book, None).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Update a book (admin only)
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateBookRequest>,
) -> Result<Json<Book>, ApiError> {
    if let Err(e) = validate_uuid(&id, "book_id") {
        return Err(ApiError::validation_field("book_id", e));
    }
    validate_update_request(&req)?;

    let _existing: Book = sqlx::query_as("SELECT * FROM books WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Book not found"))?;

    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        UPDATE books SET
            title = COALESCE(?, title),
            author = COALESCE(?, author),
            description = COALESCE(?, description),
            cover_url = COALESCE(?, cover_url),
            published_year = COALESCE(?, published_year),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&req.title)
    .bind(&req.author)
    .bind(&req.description)
    .bind(&req.cover_url)
    .bind(req.published_year)
    .bind(&now)
    .bind(&id)
    .execute(&state.db)
    .await?;

    let book: Book = sqlx::query_as("SELECT * FROM books WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(book))
}

/// Delete a book and its dependents (admin only). Reviews, shelf entries and
/// genre links referencing the book go first, all inside one transaction.
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if let Err(e) = validate_uuid(&id, "book_id") {
        return Err(ApiError::validation_field("book_id", e));
    }

    let book: Option<Book> = sqlx::query_as("SELECT * FROM books WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?;
    let book = book.ok_or_else(|| ApiError::not_found("Book not found"))?;

    let mut tx = state.db.begin().await?;

    sqlx::query("DELETE FROM reviews WHERE book_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM reading_statuses WHERE book_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM book_genres WHERE book_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM books WHERE id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(book = %book.title, "Book deleted");

    Ok(StatusCode::NO_CONTENT)
}
