//! Message persistence for messagemod.
//!
//! A [`MessageStore`] owns a SQLite connection pool and persists one row
//! per submission. The handle is explicitly constructed and passed to
//! whoever needs persistence (there is no global singleton), and it
//! moves through a strict lifecycle:
//!
//! ```text
//! Uninitialized → Initializing → Ready      (on startup)
//!                                 Ready → Closed   (on shutdown)
//! ```
//!
//! `save` and `find_by_id` called outside `Ready` fail fast with
//! [`StoreError::NotInitialized`] instead of hanging or silently
//! no-opping.

mod error;
mod message;
mod store;

pub use error::StoreError;
pub use message::{Message, MessageId};
pub use store::MessageStore;

use std::path::{Path, PathBuf};

/// Turns a filesystem path into a SQLite URL, creating parent directories
/// and the database file if they do not exist.
pub fn sqlite_url_for_path(p: &Path) -> std::io::Result<String> {
    let abs = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };
    if let Some(parent) = abs.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&abs)?;
    let s = abs.to_string_lossy().replace('\\', "/");
    Ok(format!("sqlite://{s}"))
}

/// Builds a SQLite URL from the `DATABASE_URL` environment variable.
///
/// Falls back to `messages.db` in the current directory when unset.
pub fn database_url_from_env() -> std::io::Result<String> {
    let raw = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "messages.db".to_string());
    normalize_database_url(&raw)
}

/// Normalizes a raw `DATABASE_URL` value into a usable SQLite URL.
///
/// `sqlite::memory:` is passed through untouched. Anything else is
/// treated as a path, with or without a `sqlite://` prefix; an absolute
/// path stays absolute (the leading slash after `sqlite://` belongs to
/// the path and must survive un-prefixing).
pub fn normalize_database_url(raw: &str) -> std::io::Result<String> {
    if raw == "sqlite::memory:" {
        return Ok(raw.to_string());
    }
    let path_part = raw.strip_prefix("sqlite://").unwrap_or(raw);
    sqlite_url_for_path(&PathBuf::from(path_part))
}
