//! Thought storage module
//!
//! Owns the thoughts table and the like ledger. All mutation is delegated
//! to store-native atomic operations: the heart counter moves through a
//! single conditional UPDATE, and duplicate likes are stopped by the
//! unique index on (user_id, thought_id) rather than a read-then-insert
//! check that would race under concurrent requests.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::auth::is_unique_violation;
use crate::error::{Error, Result};
use crate::models::{Like, Thought};

/// Optional heart-count filter for listing thoughts.
#[derive(Debug, Clone, Copy)]
pub enum HeartFilter {
    Any,
    Exact(i64),
    AtLeast(i64),
}

pub struct ThoughtStore {
    pool: SqlitePool,
}

impl ThoughtStore {
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        let store = Self { pool };
        store.init_db().await?;
        Ok(store)
    }

    async fn init_db(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS thoughts (
                id TEXT PRIMARY KEY,
                message TEXT NOT NULL,
                hearts INTEGER NOT NULL DEFAULT 0,
                user_id TEXT NOT NULL REFERENCES users(id),
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // One like per user per thought, enforced by the store itself.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS likes (
                user_id TEXT NOT NULL REFERENCES users(id),
                thought_id TEXT NOT NULL REFERENCES thoughts(id),
                created_at TEXT NOT NULL,
                UNIQUE (user_id, thought_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn create(&self, user_id: &str, message: String) -> Result<Thought> {
        let thought = Thought::new(message, user_id);

        sqlx::query(
            "INSERT INTO thoughts (id, message, hearts, user_id, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&thought.id)
        .bind(&thought.message)
        .bind(thought.hearts)
        .bind(&thought.user_id)
        .bind(thought.created_at)
        .execute(&self.pool)
        .await?;

        info!("thought created: {} by {}", thought.id, thought.user_id);

        Ok(thought)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Thought>> {
        let thought = sqlx::query_as("SELECT * FROM thoughts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(thought)
    }

    pub async fn list(&self, filter: HeartFilter) -> Result<Vec<Thought>> {
        let thoughts = match filter {
            HeartFilter::Any => {
                sqlx::query_as("SELECT * FROM thoughts ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
            HeartFilter::Exact(n) => {
                sqlx::query_as(
                    "SELECT * FROM thoughts WHERE hearts = ? ORDER BY created_at DESC",
                )
                .bind(n)
                .fetch_all(&self.pool)
                .await?
            }
            HeartFilter::AtLeast(n) => {
                sqlx::query_as(
                    "SELECT * FROM thoughts WHERE hearts >= ? ORDER BY created_at DESC",
                )
                .bind(n)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(thoughts)
    }

    /// Replace a thought's message. Ownership is checked explicitly so a
    /// mismatch can be logged, but callers still see it as a plain miss.
    pub async fn update_message(
        &self,
        id: &str,
        author_id: &str,
        new_message: String,
    ) -> Result<Thought> {
        self.authorize(id, author_id).await?;

        let thought: Option<Thought> = sqlx::query_as(
            "UPDATE thoughts SET message = ? WHERE id = ? RETURNING *",
        )
        .bind(&new_message)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        thought.ok_or(Error::NotFound("Thought not found"))
    }

    pub async fn delete(&self, id: &str, author_id: &str) -> Result<Thought> {
        self.authorize(id, author_id).await?;

        let thought: Option<Thought> =
            sqlx::query_as("DELETE FROM thoughts WHERE id = ? RETURNING *")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        thought.ok_or(Error::NotFound("Thought not found"))
    }

    /// Record a like and bump the heart counter in one transaction.
    ///
    /// The counter moves with `hearts = hearts + 1` inside the store, so two
    /// concurrent likes from different users both land. A second like from
    /// the same user trips the ledger's unique index and rolls the whole
    /// transaction back.
    pub async fn like(&self, user_id: &str, thought_id: &str) -> Result<Thought> {
        let mut tx = self.pool.begin().await?;

        let thought: Option<Thought> = sqlx::query_as(
            "UPDATE thoughts SET hearts = hearts + 1 WHERE id = ? RETURNING *",
        )
        .bind(thought_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(thought) = thought else {
            return Err(Error::NotFound("Thought not found"));
        };

        let like = Like {
            user_id: user_id.to_string(),
            thought_id: thought_id.to_string(),
            created_at: Utc::now(),
        };
        sqlx::query("INSERT INTO likes (user_id, thought_id, created_at) VALUES (?, ?, ?)")
            .bind(&like.user_id)
            .bind(&like.thought_id)
            .bind(like.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::AlreadyLiked
                } else {
                    Error::Store(e)
                }
            })?;

        tx.commit().await?;

        Ok(thought)
    }

    /// All thoughts the user has liked, newest like first, optionally
    /// restricted to a minimum heart count.
    pub async fn liked_by(&self, user_id: &str, min_hearts: Option<i64>) -> Result<Vec<Thought>> {
        let thoughts = match min_hearts {
            None => {
                sqlx::query_as(
                    "SELECT t.* FROM thoughts t \
                     JOIN likes l ON l.thought_id = t.id \
                     WHERE l.user_id = ? \
                     ORDER BY l.created_at DESC",
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            Some(min) => {
                sqlx::query_as(
                    "SELECT t.* FROM thoughts t \
                     JOIN likes l ON l.thought_id = t.id \
                     WHERE l.user_id = ? AND t.hearts >= ? \
                     ORDER BY l.created_at DESC",
                )
                .bind(user_id)
                .bind(min)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(thoughts)
    }

    /// Two-step ownership check: fetch, then compare the author. The store
    /// conflated "not yours" with "not found" in the historical API, so the
    /// mismatch is logged here and reported upward as a miss.
    async fn authorize(&self, id: &str, author_id: &str) -> Result<()> {
        let thought = self
            .get(id)
            .await?
            .ok_or(Error::NotFound("Thought not found"))?;

        if thought.user_id != author_id {
            warn!(
                "user {} attempted to modify thought {} owned by {}",
                author_id, id, thought.user_id
            );
            return Err(Error::NotFound("Thought not found"));
        }

        Ok(())
    }
}
