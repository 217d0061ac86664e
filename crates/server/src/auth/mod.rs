//! Authentication Module
//!
//! Handles user signup, login, and access-token resolution.
//! Tokens are opaque uuid strings issued once at signup and never rotated.

pub mod middleware;

use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::models::User;

/// Credential store plus the account operations built on it.
pub struct AuthManager {
    pool: SqlitePool,
}

impl AuthManager {
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        let manager = Self { pool };
        manager.init_db().await?;
        Ok(manager)
    }

    async fn init_db(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                access_token TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Register a new user.
    ///
    /// Email uniqueness is left to the store's UNIQUE constraint; a
    /// duplicate surfaces as a generic signup failure, not a conflict code.
    pub async fn signup(&self, name: String, email: String, password: String) -> Result<User> {
        let email = normalize_email(&email);
        let password_hash = hash(&password, DEFAULT_COST)?;
        let user = User::new(name, email, password_hash);

        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, access_token, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.access_token)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                warn!("signup rejected, email already registered: {}", user.email);
                Error::SignupFail
            } else {
                Error::Store(e)
            }
        })?;

        info!("user registered: {} ({})", user.name, user.email);

        Ok(user)
    }

    /// Verify credentials and hand back the stored access token.
    ///
    /// Unknown email and wrong password collapse into the same error so the
    /// endpoint can't be used to enumerate accounts.
    pub async fn login(&self, email: String, password: String) -> Result<User> {
        let email = normalize_email(&email);

        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;

        let Some(user) = user else {
            warn!("failed login attempt for {email}");
            return Err(Error::LoginFail);
        };

        if !verify(&password, &user.password_hash)? {
            warn!("failed login attempt for {email}");
            return Err(Error::LoginFail);
        }

        info!("user logged in: {}", user.name);

        Ok(user)
    }

    /// Resolve an access token to its user. Malformed and unknown tokens are
    /// both plain lookup misses.
    pub async fn user_for_token(&self, token: &str) -> Result<User> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE access_token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        user.ok_or(Error::AuthFail)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}
