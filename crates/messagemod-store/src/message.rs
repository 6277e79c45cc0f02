//! The persisted message record.

use std::fmt;

use messagemod_protocol::SenderId;

/// Opaque key assigned by the store when a message is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

/// One durable row in the `messages` table.
///
/// Constructed only by the store after a successful save, so `id` is
/// always populated and the record is never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The store-assigned key.
    pub id: MessageId,
    /// Who submitted the message (from the authenticated session).
    pub sender_id: SenderId,
    /// The message text, at most 256 units at the point of persistence.
    pub text: String,
}
