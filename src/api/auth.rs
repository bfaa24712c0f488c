//! Registration, login and bearer-assertion handling.
//!
//! Identity assertions are stateless JWTs carrying only the user id and role,
//! verified per request with no session store. Rotation/revocation before
//! expiry is therefore not possible; this is an accepted limitation.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderMap, StatusCode},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{LoginRequest, LoginResponse, RegisterRequest, Role, User, UserResponse};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_email, validate_password, validate_username};

/// JWT claims for an identity assertion: subject (user id), role, validity window
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Sign an identity assertion for a user
pub fn issue_token(
    user_id: &str,
    role: Role,
    secret: &str,
    ttl_hours: i64,
) -> anyhow::Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        role,
        iat: now.timestamp(),
        exp: (now + Duration::hours(ttl_hours)).timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

/// Verify an identity assertion. Fails closed: any parse, signature or expiry
/// failure yields None, never a partial identity.
pub fn verify_token(token: &str, secret: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

/// Extract the bearer token from request headers
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// The verified identity of the caller: user id and role from the assertion
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;
        let claims = verify_token(token, &state.config.auth.jwt_secret)
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;
        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}

/// Caller identity for admin-gated routes. A valid non-admin assertion is
/// rejected with 403, distinct from the 401 for a missing/invalid one.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ApiError::forbidden("Admins only"));
        }
        Ok(AdminUser(user))
    }
}

/// Optional caller identity for routes that personalize but don't require auth
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for MaybeAuthUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = extract_bearer(&parts.headers)
            .and_then(|token| verify_token(token, &state.config.auth.jwt_secret))
            .map(|claims| AuthUser {
                id: claims.sub,
                role: claims.role,
            });
        Ok(MaybeAuthUser(user))
    }
}

fn validate_register_request(req: &RegisterRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_username(&req.username) {
        errors.add("username", &e);
    }
    if let Err(e) = validate_email(&req.email) {
        errors.add("email", &e);
    }
    if let Err(e) = validate_password(&req.password) {
        errors.add("password", &e);
    }

    errors.finish()
}

/// Register a new account
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    validate_register_request(&req)?;

    let existing: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&req.email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::validation_field("email", "Email already registered"));
    }

    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    let password_hash =
        hash_password(&req.password).map_err(|_| ApiError::internal("Failed to hash password"))?;

    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, password_hash, role, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&req.username)
    .bind(&req.email)
    .bind(&password_hash)
    .bind(Role::User)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    let user: User = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    tracing::info!("Registered user {}", user.email);

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Login endpoint
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&req.email)
        .fetch_optional(&state.db)
        .await?;

    let user = user.ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let token = issue_token(
        &user.id,
        user.role,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_hours,
    )
    .map_err(|_| ApiError::internal("Failed to sign token"))?;

    Ok(Json(LoginResponse {
        token,
        user: UserResponse::from(user),
    }))
}

/// Ensure the configured admin account exists (runs at startup)
pub async fn ensure_admin_user(
    pool: &sqlx::SqlitePool,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    let existing: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    let password_hash = hash_password(password)
        .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {}", e))?;

    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, password_hash, role, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind("admin")
    .bind(email)
    .bind(&password_hash)
    .bind(Role::Admin)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    tracing::info!("Created admin user {}", email);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    async fn test_state() -> Arc<AppState> {
        let db = crate::db::test_pool().await;
        Arc::new(AppState::new(Config::default(), db))
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("reading is fun").unwrap();
        assert!(verify_password("reading is fun", &hash));
        assert!(!verify_password("reading is not fun", &hash));
    }

    #[test]
    fn test_verify_password_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_token_round_trip() {
        let token = issue_token("user-1", Role::Admin, "secret", 24).unwrap();
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_fails_closed() {
        let token = issue_token("user-1", Role::User, "secret", 24).unwrap();
        // Wrong secret
        assert!(verify_token(&token, "other-secret").is_none());
        // Garbage
        assert!(verify_token("not.a.token", "secret").is_none());
        // Expired (beyond the default leeway)
        let expired = issue_token("user-1", Role::User, "secret", -2).unwrap();
        assert!(verify_token(&expired, "secret").is_none());
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let state = test_state().await;

        let req = || RegisterRequest {
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "longenough".to_string(),
        };

        let (status, _) = register(State(state.clone()), Json(req())).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let err = register(State(state.clone()), Json(req())).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&state.db)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let state = test_state().await;

        register(
            State(state.clone()),
            Json(RegisterRequest {
                username: "ada".to_string(),
                email: "ada@example.com".to_string(),
                password: "longenough".to_string(),
            }),
        )
        .await
        .unwrap();

        let resp = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "ada@example.com".to_string(),
                password: "longenough".to_string(),
            }),
        )
        .await
        .unwrap();

        let claims = verify_token(&resp.0.token, &state.config.auth.jwt_secret).unwrap();
        assert_eq!(claims.sub, resp.0.user.id);
        assert_eq!(claims.role, Role::User);

        let err = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "ada@example.com".to_string(),
                password: "wrong".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_ensure_admin_user_is_idempotent() {
        let state = test_state().await;

        ensure_admin_user(&state.db, "admin@example.com", "hunter2hunter2")
            .await
            .unwrap();
        ensure_admin_user(&state.db, "admin@example.com", "hunter2hunter2")
            .await
            .unwrap();

        let admins: Vec<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind("admin@example.com")
            .fetch_all(&state.db)
            .await
            .unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].role, Role::Admin);
    }
}
