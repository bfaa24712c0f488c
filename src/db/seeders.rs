//! Database seeders for the starter catalog.
//!
//! Seeds a handful of well-known books and their genres so a fresh install
//! has something to browse. Runs on every startup; every insert is keyed on
//! an existing unique column, so reruns are no-ops.

use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

/// Seed starter genres and books (runs on every startup, insert-if-absent)
pub async fn seed_catalog(pool: &SqlitePool) -> Result<()> {
    info!("Seeding starter catalog...");

    let genres = ["Fiction", "Romance", "Dystopian", "Classic", "Adventure"];
    for name in genres {
        sqlx::query("INSERT INTO genres (id, name) VALUES (?, ?) ON CONFLICT(name) DO NOTHING")
            .bind(Uuid::new_v4().to_string())
            .bind(name)
            .execute(pool)
            .await?;
    }

    // Format: (title, author, description, cover_url, published_year, genre)
    let books: Vec<(&str, &str, &str, &str, i64, &str)> = vec![
        (
            "A Million to One",
            "Tony Faggioli",
            "A gripping tale of odds, chances, and the extraordinary moments that define our lives.",
            "https://www.designforwriters.com/wp-content/uploads/2017/10/design-for-writers-book-cover-tf-2-a-million-to-one.jpg",
            2017,
            "Fiction",
        ),
        (
            "The Great Gatsby",
            "F. Scott Fitzgerald",
            "A story of the mysterious Jay Gatsby and his love for Daisy Buchanan, set in the Jazz Age.",
            "https://images-na.ssl-images-amazon.com/images/S/compressed.photo.goodreads.com/books/1490528560i/4671.jpg",
            1925,
            "Classic",
        ),
        (
            "To Kill a Mockingbird",
            "Harper Lee",
            "A powerful story about racial injustice in the Deep South.",
            "https://images-na.ssl-images-amazon.com/images/S/compressed.photo.goodreads.com/books/1553383690i/2657.jpg",
            1960,
            "Classic",
        ),
        (
            "1984",
            "George Orwell",
            "A dystopian novel about totalitarianism and surveillance.",
            "https://images-na.ssl-images-amazon.com/images/S/compressed.photo.goodreads.com/books/1657781256i/61439040.jpg",
            1949,
            "Dystopian",
        ),
        (
            "Pride and Prejudice",
            "Jane Austen",
            "A classic romance novel exploring love, society, and misunderstandings in 19th-century England.",
            "https://images-na.ssl-images-amazon.com/images/S/compressed.photo.goodreads.com/books/1320399351i/1885.jpg",
            1813,
            "Romance",
        ),
    ];

    let now = Utc::now().to_rfc3339();

    for (title, author, description, cover_url, year, genre) in books {
        let existing: Option<(String,)> =
            sqlx::query_as("SELECT id FROM books WHERE title = ? AND author = ?")
                .bind(title)
                .bind(author)
                .fetch_optional(pool)
                .await?;
        if existing.is_some() {
            continue;
        }

        let book_id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO books (id, title, author, description, cover_url, published_year, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&book_id)
        .bind(title)
        .bind(author)
        .bind(description)
        .bind(cover_url)
        .bind(year)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await?;

        let genre_row: Option<(String,)> = sqlx::query_as("SELECT id FROM genres WHERE name = ?")
            .bind(genre)
            .fetch_optional(pool)
            .await?;
        if let Some((genre_id,)) = genre_row {
            sqlx::query(
                "INSERT INTO book_genres (id, book_id, genre_id) VALUES (?, ?, ?)
                 ON CONFLICT(book_id, genre_id) DO NOTHING",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&book_id)
            .bind(&genre_id)
            .execute(pool)
            .await?;
        }
    }

    info!("Catalog seeding completed");
    Ok(())
}
