mod admin;
pub mod auth;
mod books;
mod contacts;
mod error;
mod reviews;
mod statuses;
mod uploads;
mod users;
mod validation;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Account routes; register/login are public, profile requires a bearer token
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route(
            "/profile",
            get(users::get_profile).put(users::update_profile),
        );

    let api_routes = Router::new()
        // Catalog
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/search", get(books::search_books))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/books/:id/reviews", get(reviews::list_reviews))
        // Reviews
        .route("/reviews", post(reviews::add_review))
        .route(
            "/reviews/:id",
            put(reviews::edit_review).delete(reviews::delete_review),
        )
        // Reading shelf
        .route(
            "/status",
            get(statuses::list_statuses)
                .post(statuses::set_status)
                .patch(statuses::edit_status),
        )
        .route("/status/counts", get(statuses::status_counts))
        .route("/status/:book_id", delete(statuses::remove_status))
        // Contact
        .route("/contact", post(contacts::create_contact))
        // Avatar upload; body limit sized for the 5 MB image ceiling plus framing
        .route(
            "/upload/avatar",
            post(uploads::upload_avatar)
                .layer(DefaultBodyLimit::max(uploads::MAX_UPLOAD_BYTES + 64 * 1024)),
        );

    // Admin routes are role-gated in the AdminUser extractor
    let admin_routes = Router::new()
        .route("/books", get(admin::list_books_with_stats))
        .route("/users", get(admin::list_users_with_stats))
        .route("/contacts", get(admin::list_contacts))
        .route("/contacts/:id", delete(admin::delete_contact))
        .route("/stats", get(admin::dashboard_stats));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
