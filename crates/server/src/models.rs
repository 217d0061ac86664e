use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User record stored in the database
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Opaque credential issued once at signup, never rotated
    #[serde(skip_serializing)]
    pub access_token: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            password_hash,
            access_token: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        }
    }
}

/// A short text post with a running like counter
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Thought {
    pub id: String,
    pub message: String,
    pub hearts: i64,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl Thought {
    pub fn new(message: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            message: message.into(),
            hearts: 0,
            user_id: user_id.into(),
            created_at: Utc::now(),
        }
    }
}

/// One row per (user, thought) pair; the unique index on the pair is what
/// keeps a user from liking the same thought twice.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub user_id: String,
    pub thought_id: String,
    pub created_at: DateTime<Utc>,
}

/// Message length bounds for a thought.
pub const MESSAGE_MIN_LEN: usize = 5;
pub const MESSAGE_MAX_LEN: usize = 140;

pub fn message_in_bounds(message: &str) -> bool {
    let len = message.chars().count();
    (MESSAGE_MIN_LEN..=MESSAGE_MAX_LEN).contains(&len)
}
