//! Unified error type for the messagemod server.

use messagemod_protocol::ProtocolError;
use messagemod_store::StoreError;
use messagemod_transport::TransportError;

use crate::AuthError;

/// Top-level error that wraps all layer-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum MessageModError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid frame).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A store-level error (lifecycle or persistence).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The connecting client could not be authenticated.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let top: MessageModError = err.into();
        assert!(matches!(top, MessageModError::Transport(_)));
        assert!(top.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::MalformedPayload("short".into());
        let top: MessageModError = err.into();
        assert!(matches!(top, MessageModError::Protocol(_)));
    }

    #[test]
    fn test_from_store_error() {
        let err = StoreError::NotInitialized;
        let top: MessageModError = err.into();
        assert!(matches!(top, MessageModError::Store(_)));
    }

    #[test]
    fn test_from_auth_error() {
        let err = AuthError("bad token".into());
        let top: MessageModError = err.into();
        assert!(matches!(top, MessageModError::Auth(_)));
        assert!(top.to_string().contains("bad token"));
    }
}
