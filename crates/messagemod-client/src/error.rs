use messagemod_protocol::ProtocolError;
use thiserror::Error;

/// Errors surfaced by [`MessageClient`](crate::MessageClient).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("invalid frame: {0}")]
    InvalidFrame(#[from] serde_json::Error),

    #[error("connection closed")]
    Closed,
}
