//! Core wire types for messagemod.
//!
//! Everything in this module travels on the wire: the frames exchanged on
//! the WebSocket connection, the structured message body carried inside a
//! submission buffer, and the identity/feedback types both sides share.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The named channel that carries submission buffers from client to server.
pub const MESSAGE_CHANNEL: &str = "messagemod:message";

/// Maximum message length in Unicode scalar values.
///
/// Longer input is truncated to this many units, never rejected.
pub const MAX_TEXT_UNITS: usize = 256;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A stable identifier for the submitting player.
///
/// Assigned by the server during the handshake and attached to every
/// persisted message. The handler never trusts an identity declared inside
/// a payload, only this value, which comes from the authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SenderId(pub Uuid);

impl SenderId {
    /// Generates a fresh random identifier (used for anonymous sessions).
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Message body
// ---------------------------------------------------------------------------

/// The structured message carried inside a submission buffer.
///
/// A single string field, no version tag. The buffer framing in
/// [`crate::encode_submission`] length-prefixes the encoded form of this
/// struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    /// The free text the player typed.
    pub text: String,
}

/// Truncates `text` to at most [`MAX_TEXT_UNITS`] Unicode scalar values.
///
/// Returns the input unchanged when it is already short enough. The cut
/// always lands on a character boundary.
pub fn truncate_text(text: &str) -> &str {
    match text.char_indices().nth(MAX_TEXT_UNITS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

/// Messages sent from client to server.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON, e.g.
/// `{ "type": "Hello", "token": null }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientFrame {
    /// First frame on every connection: authenticate and obtain a
    /// [`SenderId`]. `token` is interpreted by the server's authenticator.
    Hello { token: Option<String> },

    /// An opaque byte buffer addressed to a named channel.
    ///
    /// Submissions travel on [`MESSAGE_CHANNEL`]; `data` is the
    /// length-prefixed submission buffer. Buffers for unknown channels
    /// are dropped by the server.
    Channel { channel: String, data: Vec<u8> },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerFrame {
    /// Handshake response carrying the identity the server assigned.
    HelloAck { sender_id: SenderId },

    /// Feedback for a submission.
    Notice { notice: Notice },
}

/// User-visible feedback for one submission.
///
/// These two variants are the only response payloads the server defines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notice {
    /// The message was persisted.
    Saved,

    /// The message was not persisted; `reason` is safe to show the player.
    Failed { reason: String },
}

// =========================================================================
// Tests
// =========================================================================
