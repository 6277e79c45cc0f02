//! Per-connection handler: handshake, then frame routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive `Hello` → authenticate → assign `SenderId` → `HelloAck`
//!   2. Loop: buffers arriving on the message channel are handed to the
//!      submission worker; notices coming back are sent to the client.
//!
//! The handler task itself never touches the store: submissions are
//! re-dispatched to the server's submission worker so persistence work
//! never blocks network I/O.

use std::sync::Arc;
use std::time::Duration;

use messagemod_protocol::{
    ClientFrame, Codec, Notice, ProtocolError, SenderId, ServerFrame,
    MESSAGE_CHANNEL,
};
use messagemod_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::submission::Submission;
use crate::{AuthError, Authenticator, MessageModError};

/// How long a client has to complete the handshake.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<A, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<A, C>>,
) -> Result<(), MessageModError>
where
    A: Authenticator,
    C: Codec,
{
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let sender_id = perform_handshake(&conn, &state).await?;
    tracing::info!(%conn_id, %sender_id, "sender authenticated");

    // Notices for this sender flow back through this channel from the
    // submission worker.
    let (notice_tx, mut notice_rx) = mpsc::channel::<Notice>(8);

    loop {
        tokio::select! {
            received = conn.recv() => {
                let data = match received {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(%sender_id, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%sender_id, error = %e, "recv error");
                        break;
                    }
                };

                let frame: ClientFrame = match state.codec.decode(&data) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::debug!(
                            %sender_id, error = %e, "failed to decode frame"
                        );
                        continue;
                    }
                };

                handle_frame(&state, sender_id, frame, &notice_tx).await;
            }
            Some(notice) = notice_rx.recv() => {
                let frame = ServerFrame::Notice { notice };
                let bytes = state.codec.encode(&frame)?;
                conn.send(&bytes).await.map_err(MessageModError::Transport)?;
            }
        }
    }

    Ok(())
}

/// Routes one decoded frame. Never fails the connection: bad frames are
/// logged and dropped.
async fn handle_frame<A, C>(
    state: &Arc<ServerState<A, C>>,
    sender_id: SenderId,
    frame: ClientFrame,
    notice_tx: &mpsc::Sender<Notice>,
) where
    A: Authenticator,
    C: Codec,
{
    match frame {
        ClientFrame::Channel { channel, data }
            if channel == MESSAGE_CHANNEL =>
        {
            let submission = Submission {
                sender_id,
                buffer: data,
                reply: notice_tx.clone(),
            };
            if state.submissions.send(submission).await.is_err() {
                tracing::error!(
                    %sender_id,
                    "submission queue is gone, dropping message"
                );
            }
        }
        ClientFrame::Channel { channel, .. } => {
            tracing::debug!(
                %sender_id, channel, "ignoring buffer for unknown channel"
            );
        }
        ClientFrame::Hello { .. } => {
            tracing::debug!(%sender_id, "ignoring repeated Hello");
        }
    }
}

/// Performs the initial handshake: receive `Hello`, authenticate, send
/// `HelloAck`.
async fn perform_handshake<A, C>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<A, C>>,
) -> Result<SenderId, MessageModError>
where
    A: Authenticator,
    C: Codec,
{
    let data = match tokio::time::timeout(HANDSHAKE_TIMEOUT, conn.recv())
        .await
    {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(MessageModError::Protocol(
                ProtocolError::InvalidMessage(
                    "connection closed before handshake".into(),
                ),
            ));
        }
        Ok(Err(e)) => return Err(MessageModError::Transport(e)),
        Err(_) => {
            return Err(MessageModError::Protocol(
                ProtocolError::InvalidMessage("handshake timed out".into()),
            ));
        }
    };

    let frame: ClientFrame = state.codec.decode(&data)?;
    let token = match frame {
        ClientFrame::Hello { token } => token,
        _ => {
            send_failure(conn, &state.codec, "expected Hello").await?;
            return Err(MessageModError::Protocol(
                ProtocolError::InvalidMessage(
                    "first frame must be Hello".into(),
                ),
            ));
        }
    };

    let sender_id =
        match state.auth.authenticate(token.as_deref()).await {
            Ok(id) => id,
            Err(AuthError(reason)) => {
                send_failure(conn, &state.codec, "authentication failed")
                    .await?;
                return Err(MessageModError::Auth(AuthError(reason)));
            }
        };

    let ack = ServerFrame::HelloAck { sender_id };
    let bytes = state.codec.encode(&ack)?;
    conn.send(&bytes).await.map_err(MessageModError::Transport)?;

    Ok(sender_id)
}

/// Sends a `Notice::Failed` frame to the client.
async fn send_failure(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    reason: &str,
) -> Result<(), MessageModError> {
    let frame = ServerFrame::Notice {
        notice: Notice::Failed {
            reason: reason.to_string(),
        },
    };
    let bytes = codec.encode(&frame)?;
    conn.send(&bytes).await.map_err(MessageModError::Transport)?;
    Ok(())
}
