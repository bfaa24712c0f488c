//! Closed enums shared across models.

use serde::{Deserialize, Serialize};

/// Account role. Exactly two values exist; anything else in the store is a
/// data error and fails parsing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Self::User
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// A user's per-book shelf state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ShelfStatus {
    WantToRead,
    Reading,
    Read,
}

impl std::fmt::Display for ShelfStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WantToRead => write!(f, "want_to_read"),
            Self::Reading => write!(f, "reading"),
            Self::Read => write!(f, "read"),
        }
    }
}

impl std::str::FromStr for ShelfStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "want_to_read" => Ok(Self::WantToRead),
            "reading" => Ok(Self::Reading),
            "read" => Ok(Self::Read),
            _ => Err(format!("Unknown reading status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_round_trip() {
        assert_eq!(Role::from_str("admin").unwrap(), Role::Admin);
        assert_eq!(Role::from_str("USER").unwrap(), Role::User);
        assert_eq!(Role::Admin.to_string(), "admin");
        assert!(Role::from_str("superuser").is_err());
    }

    #[test]
    fn test_shelf_status_round_trip() {
        assert_eq!(
            ShelfStatus::from_str("want_to_read").unwrap(),
            ShelfStatus::WantToRead
        );
        assert_eq!(ShelfStatus::from_str("read").unwrap(), ShelfStatus::Read);
        assert_eq!(ShelfStatus::Reading.to_string(), "reading");
        assert!(ShelfStatus::from_str("finished").is_err());
        // Strict casing: the wire format is lowercase snake_case
        assert!(ShelfStatus::from_str("Read").is_err());
    }
}
