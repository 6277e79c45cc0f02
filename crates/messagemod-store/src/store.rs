//! The SQLite-backed message store.

use messagemod_protocol::{SenderId, MAX_TEXT_UNITS};
use sqlx::{Row, SqlitePool};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{Message, MessageId, StoreError};

/// Lifecycle state of the store handle.
enum StoreState {
    Uninitialized,
    Initializing,
    Ready(SqlitePool),
    Closed,
}

/// Persists submissions as rows in the `messages` table.
///
/// Construct once with [`MessageStore::new`], share via `Arc`, call
/// [`initialize`](Self::initialize) at server startup and
/// [`close`](Self::close) at shutdown. All operations take `&self`.
pub struct MessageStore {
    state: RwLock<StoreState>,
}

impl MessageStore {
    /// Creates an uninitialized store handle.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::Uninitialized),
        }
    }

    /// Connects the pool and creates the schema.
    ///
    /// While the connection attempt is in flight the store reports
    /// `Initializing`, so concurrent saves fail fast instead of queueing
    /// behind it. On failure the state reverts to `Uninitialized` and the
    /// error is returned; the caller decides whether to run degraded.
    pub async fn initialize(
        &self,
        database_url: &str,
    ) -> Result<(), StoreError> {
        {
            let mut state = self.state.write().await;
            match *state {
                StoreState::Uninitialized => {
                    *state = StoreState::Initializing;
                }
                StoreState::Initializing | StoreState::Ready(_) => {
                    return Err(StoreError::AlreadyInitialized);
                }
                StoreState::Closed => return Err(StoreError::Closed),
            }
        }

        tracing::info!(database_url, "initializing message store");
        let result = connect_and_migrate(database_url).await;

        let mut state = self.state.write().await;
        match result {
            Ok(pool) => {
                *state = StoreState::Ready(pool);
                tracing::info!("message store ready");
                Ok(())
            }
            Err(e) => {
                *state = StoreState::Uninitialized;
                Err(StoreError::Persistence(e))
            }
        }
    }

    /// Returns whether the store is in the `Ready` state.
    pub async fn is_ready(&self) -> bool {
        matches!(*self.state.read().await, StoreState::Ready(_))
    }

    /// Performs a trivial round-trip query to confirm the store is
    /// reachable. Used only at startup to decide whether to enable
    /// submissions.
    pub async fn test_connection(&self) -> bool {
        let Ok(pool) = self.pool().await else {
            return false;
        };
        match sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&pool)
            .await
        {
            Ok(_) => {
                tracing::info!("database connection verified");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "database connection check failed");
                false
            }
        }
    }

    /// Persists one submission and returns the fully populated record.
    ///
    /// The insert runs inside a transaction: either the whole row becomes
    /// visible or, on any failure, the transaction is rolled back when it
    /// drops and nothing is.
    pub async fn save(
        &self,
        sender_id: SenderId,
        text: &str,
    ) -> Result<Message, StoreError> {
        let pool = self.pool().await?;

        let mut tx = pool.begin().await?;
        let result =
            sqlx::query("INSERT INTO messages (uuid, text) VALUES (?, ?)")
                .bind(sender_id.to_string())
                .bind(text)
                .execute(&mut *tx)
                .await?;
        let id = MessageId(result.last_insert_rowid());
        tx.commit().await?;

        tracing::info!(%sender_id, %id, "message saved");
        Ok(Message {
            id,
            sender_id,
            text: text.to_owned(),
        })
    }

    /// Fetches a message by its assigned key.
    pub async fn find_by_id(
        &self,
        id: MessageId,
    ) -> Result<Option<Message>, StoreError> {
        let pool = self.pool().await?;

        let row =
            sqlx::query("SELECT id, uuid, text FROM messages WHERE id = ?")
                .bind(id.0)
                .fetch_optional(&pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw_uuid: String = row.try_get("uuid")?;
        let sender_id = Uuid::parse_str(&raw_uuid)
            .map(SenderId)
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "uuid".into(),
                source: Box::new(e),
            })?;

        Ok(Some(Message {
            id: MessageId(row.try_get("id")?),
            sender_id,
            text: row.try_get("text")?,
        }))
    }

    /// Releases all store resources. Every later operation fails with
    /// [`StoreError::NotInitialized`].
    pub async fn close(&self) {
        let mut state = self.state.write().await;
        if let StoreState::Ready(pool) =
            std::mem::replace(&mut *state, StoreState::Closed)
        {
            tracing::info!("closing message store");
            pool.close().await;
        }
    }

    /// Clones the pool out of the `Ready` state, failing fast otherwise.
    async fn pool(&self) -> Result<SqlitePool, StoreError> {
        match &*self.state.read().await {
            StoreState::Ready(pool) => Ok(pool.clone()),
            _ => Err(StoreError::NotInitialized),
        }
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

async fn connect_and_migrate(
    database_url: &str,
) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePool::connect(database_url).await?;

    // The CHECK mirrors the validation limit so an overlong text can
    // never be committed even if a caller skips truncation.
    let ddl = format!(
        "CREATE TABLE IF NOT EXISTS messages (
            id   INTEGER PRIMARY KEY AUTOINCREMENT,
            uuid TEXT NOT NULL,
            text TEXT NOT NULL CHECK (length(text) <= {MAX_TEXT_UNITS})
        )"
    );
    sqlx::query(&ddl).execute(&pool).await?;

    Ok(pool)
}
