//! Client side of the message submission path.
//!
//! [`EntryForm`] models the text entry field: bounded input, trims on
//! submit, and treats an empty submission as a no-op. [`MessageClient`]
//! owns the connection: it handshakes, frames submissions for the
//! `"messagemod:message"` channel, and surfaces server notices.

mod client;
mod entry;
mod error;

pub use client::MessageClient;
pub use entry::EntryForm;
pub use error::ClientError;
