//! Integration tests for the message store lifecycle and persistence.
//!
//! Each test gets its own on-disk SQLite database under a temp dir so the
//! pool behaves exactly like production (shared across connections).

use anyhow::Result;
use messagemod_protocol::SenderId;
use messagemod_store::{
    normalize_database_url, sqlite_url_for_path, MessageId, MessageStore,
    StoreError,
};
use tempfile::TempDir;

fn url_in(td: &TempDir) -> String {
    sqlite_url_for_path(&td.path().join("messages.db"))
        .expect("build sqlite url")
}

#[tokio::test]
async fn test_save_and_find_round_trip() -> Result<()> {
    let td = TempDir::new()?;
    let store = MessageStore::new();
    store.initialize(&url_in(&td)).await?;

    let sender = SenderId::random();
    let saved = store.save(sender, "hello").await?;
    assert_eq!(saved.sender_id, sender);
    assert_eq!(saved.text, "hello");

    let found = store.find_by_id(saved.id).await?;
    assert_eq!(found, Some(saved));
    Ok(())
}

#[tokio::test]
async fn test_find_unknown_id_returns_none() -> Result<()> {
    let td = TempDir::new()?;
    let store = MessageStore::new();
    store.initialize(&url_in(&td)).await?;

    let found = store.find_by_id(MessageId(9999)).await?;
    assert!(found.is_none());
    Ok(())
}

#[tokio::test]
async fn test_save_before_initialize_fails_fast() {
    let store = MessageStore::new();
    let err = store
        .save(SenderId::random(), "hello")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotInitialized));
}

#[tokio::test]
async fn test_save_after_close_fails_fast() -> Result<()> {
    let td = TempDir::new()?;
    let store = MessageStore::new();
    store.initialize(&url_in(&td)).await?;
    store.close().await;

    let err = store
        .save(SenderId::random(), "hello")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotInitialized));

    let err = store.find_by_id(MessageId(1)).await.unwrap_err();
    assert!(matches!(err, StoreError::NotInitialized));
    Ok(())
}

#[tokio::test]
async fn test_connection_reflects_lifecycle() -> Result<()> {
    let td = TempDir::new()?;
    let store = MessageStore::new();
    assert!(!store.test_connection().await);
    assert!(!store.is_ready().await);

    store.initialize(&url_in(&td)).await?;
    assert!(store.test_connection().await);
    assert!(store.is_ready().await);

    store.close().await;
    assert!(!store.test_connection().await);
    Ok(())
}

#[tokio::test]
async fn test_double_initialize_is_rejected() -> Result<()> {
    let td = TempDir::new()?;
    let store = MessageStore::new();
    let url = url_in(&td);
    store.initialize(&url).await?;

    let err = store.initialize(&url).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyInitialized));
    Ok(())
}

#[tokio::test]
async fn test_initialize_after_close_is_rejected() -> Result<()> {
    let td = TempDir::new()?;
    let store = MessageStore::new();
    let url = url_in(&td);
    store.initialize(&url).await?;
    store.close().await;

    let err = store.initialize(&url).await.unwrap_err();
    assert!(matches!(err, StoreError::Closed));
    Ok(())
}

#[tokio::test]
async fn test_failed_initialize_reverts_to_uninitialized() {
    let td = TempDir::new().unwrap();
    let store = MessageStore::new();
    // A directory is not a valid database file.
    let dir_url =
        format!("sqlite://{}", td.path().to_string_lossy());
    let err = store.initialize(&dir_url).await.unwrap_err();
    assert!(matches!(err, StoreError::Persistence(_)));
    assert!(!store.is_ready().await);

    // Still fails fast, not AlreadyInitialized.
    let err = store
        .save(SenderId::random(), "hello")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotInitialized));
}

// A save that violates the length constraint must leave no row behind:
// the transaction rolls back and even the rowid sequence is reverted.
#[tokio::test]
async fn test_failed_save_leaves_no_partial_row() -> Result<()> {
    let td = TempDir::new()?;
    let store = MessageStore::new();
    store.initialize(&url_in(&td)).await?;

    let sender = SenderId::random();
    let overlong = "a".repeat(300); // bypasses handler truncation
    let err = store.save(sender, &overlong).await.unwrap_err();
    assert!(matches!(err, StoreError::Persistence(_)));

    assert!(store.find_by_id(MessageId(1)).await?.is_none());

    // The store is still usable and the first committed row gets id 1.
    let saved = store.save(sender, "ok").await?;
    assert_eq!(saved.id, MessageId(1));
    Ok(())
}

#[tokio::test]
async fn test_schema_survives_reopen() -> Result<()> {
    let td = TempDir::new()?;
    let url = url_in(&td);

    let first = MessageStore::new();
    first.initialize(&url).await?;
    let sender = SenderId::random();
    let saved = first.save(sender, "persisted").await?;
    first.close().await;

    let second = MessageStore::new();
    second.initialize(&url).await?;
    let found = second.find_by_id(saved.id).await?;
    assert_eq!(found.map(|m| m.text), Some("persisted".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_sqlite_url_for_path_creates_parent_dirs() -> Result<()> {
    let td = TempDir::new()?;
    let nested = td.path().join("a").join("b").join("messages.db");
    assert!(!nested.parent().unwrap().exists());

    let url = sqlite_url_for_path(&nested)?;
    assert!(nested.exists());
    assert!(url.starts_with("sqlite:///"));

    // Idempotent: calling again must not fail or truncate.
    let again = sqlite_url_for_path(&nested)?;
    assert_eq!(url, again);
    Ok(())
}

// An operator-supplied absolute URL must open exactly the configured
// file, not a path re-rooted under the current directory.
#[tokio::test]
async fn test_normalize_preserves_absolute_database_url() -> Result<()> {
    let td = TempDir::new()?;
    let db = td.path().join("messages.db");
    let raw = format!("sqlite://{}", db.display());

    let url = normalize_database_url(&raw)?;
    assert_eq!(url, format!("sqlite://{}", db.display()));

    // The normalized URL is directly usable by the store.
    let store = MessageStore::new();
    store.initialize(&url).await?;
    let saved = store.save(SenderId::random(), "configured path").await?;
    assert_eq!(saved.id, MessageId(1));
    assert!(db.exists());
    Ok(())
}

#[tokio::test]
async fn test_normalize_passes_memory_url_through() -> Result<()> {
    assert_eq!(normalize_database_url("sqlite::memory:")?, "sqlite::memory:");
    Ok(())
}

#[tokio::test]
async fn test_normalize_accepts_unprefixed_path() -> Result<()> {
    let td = TempDir::new()?;
    let db = td.path().join("rel.db");
    let url = normalize_database_url(&db.display().to_string())?;
    assert_eq!(url, format!("sqlite://{}", db.display()));
    assert!(db.exists());
    Ok(())
}
