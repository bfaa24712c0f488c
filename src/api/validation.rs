//! Input validation for API requests.
//!
//! This module provides validation functions for API request data,
//! ensuring all inputs meet the required format and constraints.
//!
//! For collecting multiple validation errors and returning them as an ApiError,
//! use the `ValidationErrorBuilder` from the `error` module.

use chrono::{Datelike, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating HTTP/HTTPS URLs (cover images, avatars)
    static ref HTTP_URL_REGEX: Regex = Regex::new(
        r"^https?://[a-zA-Z0-9][-a-zA-Z0-9]*(\.[a-zA-Z0-9][-a-zA-Z0-9]*)*(:\d+)?(/[-a-zA-Z0-9_%&=+@~.?]+)*/?$"
    ).unwrap();

    /// Regex for validating email addresses (pragmatic, not RFC-complete)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9][-a-zA-Z0-9]*(\.[a-zA-Z0-9][-a-zA-Z0-9]*)+$"
    ).unwrap();
}

/// Validate a book title
pub fn validate_title(title: &str) -> Result<(), String> {
    let title = title.trim();
    if title.is_empty() {
        return Err("Title is required".to_string());
    }

    if title.len() < 2 {
        return Err("Title must be at least 2 characters".to_string());
    }

    if title.len() > 255 {
        return Err("Title is too long (max 255 characters)".to_string());
    }

    Ok(())
}

/// Validate an author name
pub fn validate_author(author: &str) -> Result<(), String> {
    let author = author.trim();
    if author.is_empty() {
        return Err("Author is required".to_string());
    }

    if author.len() < 2 {
        return Err("Author must be at least 2 characters".to_string());
    }

    if author.len() > 255 {
        return Err("Author is too long (max 255 characters)".to_string());
    }

    Ok(())
}

/// Validate an HTTP(S) URL (optional field)
pub fn validate_url(url: &Option<String>, field_name: &str) -> Result<(), String> {
    if let Some(u) = url {
        if u.is_empty() {
            return Ok(()); // Empty string treated as no URL
        }

        if u.len() > 2048 {
            return Err(format!("{} is too long (max 2048 characters)", field_name));
        }

        if !HTTP_URL_REGEX.is_match(u) {
            return Err(format!("{} must be a valid HTTP(S) URL", field_name));
        }
    }

    Ok(())
}

/// Validate a published year (optional field)
pub fn validate_published_year(year: &Option<i64>) -> Result<(), String> {
    if let Some(y) = year {
        if *y < 1 {
            return Err("Published year must be a positive integer".to_string());
        }

        let current_year = Utc::now().year() as i64;
        if *y > current_year {
            return Err("Published year cannot be in the future".to_string());
        }
    }

    Ok(())
}

/// Validate a review rating (integer 1-5, enforced server-side)
pub fn validate_rating(rating: i64) -> Result<(), String> {
    if !(1..=5).contains(&rating) {
        return Err("Rating must be an integer between 1 and 5".to_string());
    }

    Ok(())
}

/// Validate review text
pub fn validate_review_body(body: &str) -> Result<(), String> {
    if body.trim().is_empty() {
        return Err("Review text is required".to_string());
    }

    if body.len() > 10_000 {
        return Err("Review text is too long (max 10000 characters)".to_string());
    }

    Ok(())
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email address".to_string());
    }

    Ok(())
}

/// Validate a username
pub fn validate_username(username: &str) -> Result<(), String> {
    let username = username.trim();
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.len() < 2 {
        return Err("Username must be at least 2 characters".to_string());
    }

    if username.len() > 64 {
        return Err("Username is too long (max 64 characters)".to_string());
    }

    Ok(())
}

/// Validate a password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }

    if password.len() > 128 {
        return Err("Password is too long (max 128 characters)".to_string());
    }

    Ok(())
}

/// Valid gender values (profile field)
const VALID_GENDERS: [&str; 3] = ["male", "female", "other"];

/// Validate a gender value (optional field)
pub fn validate_gender(gender: &Option<String>) -> Result<(), String> {
    if let Some(g) = gender {
        if g.is_empty() {
            return Ok(());
        }

        if !VALID_GENDERS.contains(&g.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid gender. Must be one of: {}",
                VALID_GENDERS.join(", ")
            ));
        }
    }

    Ok(())
}

/// Validate a birthdate in ISO format (optional field)
pub fn validate_birthdate(birthdate: &Option<String>) -> Result<(), String> {
    if let Some(b) = birthdate {
        if b.is_empty() {
            return Ok(());
        }

        if NaiveDate::parse_from_str(b, "%Y-%m-%d").is_err() {
            return Err("Invalid date format. Use YYYY-MM-DD".to_string());
        }
    }

    Ok(())
}

/// Validate a country name (optional field)
pub fn validate_country(country: &Option<String>) -> Result<(), String> {
    if let Some(c) = country {
        if c.is_empty() {
            return Ok(());
        }

        if c.len() < 2 {
            return Err("Country must be at least 2 characters".to_string());
        }

        if c.len() > 64 {
            return Err("Country is too long (max 64 characters)".to_string());
        }
    }

    Ok(())
}

/// Validate a genre name
pub fn validate_genre_name(name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Genre name is required".to_string());
    }

    if name.len() < 2 {
        return Err("Genre name must be at least 2 characters".to_string());
    }

    if name.len() > 64 {
        return Err("Genre name is too long (max 64 characters)".to_string());
    }

    Ok(())
}

/// Validate a UUID string
pub fn validate_uuid(id: &str, field_name: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err(format!("{} is required", field_name));
    }

    if uuid::Uuid::parse_str(id).is_err() {
        return Err(format!("Invalid {} format", field_name));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title() {
        assert!(validate_title("1984").is_ok());
        assert!(validate_title("The Great Gatsby").is_ok());

        assert!(validate_title("").is_err());
        assert!(validate_title("A").is_err()); // too short
        assert!(validate_title(&"x".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_author() {
        assert!(validate_author("George Orwell").is_ok());
        assert!(validate_author("").is_err());
        assert!(validate_author("X").is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url(&Some("https://example.com/cover.jpg".to_string()), "cover_url").is_ok());
        assert!(validate_url(&Some("http://books.example.com/1984".to_string()), "cover_url").is_ok());
        assert!(validate_url(&None, "cover_url").is_ok());
        assert!(validate_url(&Some(String::new()), "cover_url").is_ok());

        assert!(validate_url(&Some("not-a-url".to_string()), "cover_url").is_err());
        assert!(validate_url(&Some("ftp://example.com/file".to_string()), "cover_url").is_err());
    }

    #[test]
    fn test_validate_published_year() {
        assert!(validate_published_year(&Some(1925)).is_ok());
        assert!(validate_published_year(&Some(2020)).is_ok());
        assert!(validate_published_year(&None).is_ok());

        assert!(validate_published_year(&Some(0)).is_err());
        assert!(validate_published_year(&Some(-50)).is_err());
        assert!(validate_published_year(&Some(9999)).is_err());
    }

    #[test]
    fn test_validate_rating() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(3).is_ok());
        assert!(validate_rating(5).is_ok());

        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        assert!(validate_rating(-1).is_err());
    }

    #[test]
    fn test_validate_review_body() {
        assert!(validate_review_body("Loved it.").is_ok());
        assert!(validate_review_body("").is_err());
        assert!(validate_review_body("   ").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("reader@example.com").is_ok());
        assert!(validate_email("a.b+c@sub.example.co").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("missing@tld").is_err());
    }

    #[test]
    fn test_validate_username_and_password() {
        assert!(validate_username("marguerite").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("x").is_err());

        assert!(validate_password("correct horse").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_gender() {
        assert!(validate_gender(&Some("female".to_string())).is_ok());
        assert!(validate_gender(&Some("Other".to_string())).is_ok());
        assert!(validate_gender(&None).is_ok());

        assert!(validate_gender(&Some("unknown".to_string())).is_err());
    }

    #[test]
    fn test_validate_birthdate() {
        assert!(validate_birthdate(&Some("1990-04-21".to_string())).is_ok());
        assert!(validate_birthdate(&None).is_ok());

        assert!(validate_birthdate(&Some("21/04/1990".to_string())).is_err());
        assert!(validate_birthdate(&Some("not-a-date".to_string())).is_err());
    }

    #[test]
    fn test_validate_genre_name() {
        assert!(validate_genre_name("Dystopian").is_ok());
        assert!(validate_genre_name("").is_err());
        assert!(validate_genre_name("F").is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000", "book_id").is_ok());
        assert!(validate_uuid("", "book_id").is_err());
        assert!(validate_uuid("not-a-uuid", "book_id").is_err());
    }
}
