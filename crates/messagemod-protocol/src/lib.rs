//! Wire protocol for messagemod.
//!
//! This crate defines the "language" that the client and server speak:
//!
//! - **Types** ([`ClientFrame`], [`ServerFrame`], [`Notice`], [`SenderId`]) —
//!   the message structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how the structured message
//!   body is converted to/from bytes.
//! - **Submission buffer** ([`encode_submission`], [`decode_submission`]) —
//!   the length-prefixed binary payload carried on the
//!   [`MESSAGE_CHANNEL`] channel.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the server's
//! submission handling. It doesn't know about connections or storage; it
//! only knows how to serialize and deserialize messages.
//!
//! ```text
//! Transport (bytes) → Protocol (frames + submission buffer) → Handler
//! ```

mod buffer;
mod codec;
mod error;
mod types;

pub use buffer::{decode_submission, encode_submission};
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    truncate_text, ClientFrame, MessageBody, Notice, SenderId, ServerFrame,
    MAX_TEXT_UNITS, MESSAGE_CHANNEL,
};
