//! # messagemod
//!
//! Server side of the message submission path: accept connections,
//! authenticate senders, decode submission buffers arriving on the
//! `"messagemod:message"` channel, enforce the length limit, persist each
//! message, and send a success or error notice back to the submitter.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use messagemod::{AnonymousAuth, MessageServerBuilder};
//! use messagemod_store::MessageStore;
//!
//! # async fn run() -> Result<(), messagemod::MessageModError> {
//! let store = Arc::new(MessageStore::new());
//! let server = MessageServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .database_url("sqlite://messages.db")
//!     .store(Arc::clone(&store))
//!     .build(AnonymousAuth)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod auth;
mod config;
mod error;
mod handler;
mod server;
mod submission;

pub use auth::{AnonymousAuth, AuthError, Authenticator, TokenAuth};
pub use config::ServerConfig;
pub use error::MessageModError;
pub use server::{MessageServer, MessageServerBuilder, ServerHandle};

/// Commonly used items for server binaries and tests.
pub mod prelude {
    pub use crate::{
        AnonymousAuth, Authenticator, MessageModError, MessageServer,
        MessageServerBuilder, ServerConfig, ServerHandle, TokenAuth,
    };
    pub use messagemod_protocol::{
        ClientFrame, Notice, SenderId, ServerFrame, MESSAGE_CHANNEL,
    };
    pub use messagemod_store::{Message, MessageId, MessageStore};
}
