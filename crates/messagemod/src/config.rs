//! Server configuration.

use messagemod_store::database_url_from_env;

/// Configuration for a message submission server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the WebSocket transport binds to.
    pub bind_addr: String,

    /// SQLite URL for the message store. Must point at an existing
    /// database file (or `sqlite::memory:`); see
    /// [`messagemod_store::sqlite_url_for_path`].
    pub database_url: String,
}

impl ServerConfig {
    /// Reads configuration from the environment.
    ///
    /// `MESSAGEMOD_ADDR` overrides the bind address; `DATABASE_URL`
    /// selects the database, defaulting to `messages.db` in the current
    /// directory (created on first use).
    pub fn from_env() -> std::io::Result<Self> {
        let bind_addr = std::env::var("MESSAGEMOD_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let database_url = database_url_from_env()?;
        Ok(Self {
            bind_addr,
            database_url,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            database_url: "sqlite://messages.db".to_string(),
        }
    }
}
