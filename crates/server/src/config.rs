//! Server configuration and shared state

use std::sync::Arc;

use crate::auth::AuthManager;
use crate::store::ThoughtStore;

/// Configuration for the Happy Thoughts server.
///
/// The store URL and listen port are the only externally configured values.
#[derive(Clone, Debug)]
pub struct Config {
    /// SQLite connection URL
    pub database_url: String,
    /// Port the app will run on. Defaults to 8080, can be overridden
    /// with the PORT env variable.
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:thoughts.sqlite".to_string(),
            port: 8080,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
        }
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthManager>,
    pub thoughts: Arc<ThoughtStore>,
}
