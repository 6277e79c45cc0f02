use futures_util::{SinkExt, StreamExt};
use messagemod_protocol::{
    encode_submission, ClientFrame, JsonCodec, Notice, SenderId, ServerFrame,
    MESSAGE_CHANNEL,
};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::error::ClientError;

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A connected, handshaken submission client.
pub struct MessageClient {
    ws: Ws,
    sender_id: SenderId,
}

impl MessageClient {
    /// Connects to `addr` and performs the hello exchange. With a token
    /// the server resolves the caller's identity from it; without one
    /// the server assigns a fresh identity.
    pub async fn connect(
        addr: &str,
        token: Option<String>,
    ) -> Result<Self, ClientError> {
        let (mut ws, _) =
            tokio_tungstenite::connect_async(format!("ws://{addr}")).await?;

        let hello = ClientFrame::Hello { token };
        ws.send(WsMessage::Binary(serde_json::to_vec(&hello)?.into()))
            .await?;

        let sender_id = match recv_frame(&mut ws).await? {
            ServerFrame::HelloAck { sender_id } => sender_id,
            ServerFrame::Notice {
                notice: Notice::Failed { reason },
            } => return Err(ClientError::Handshake(reason)),
            other => {
                return Err(ClientError::Handshake(format!(
                    "unexpected reply: {other:?}"
                )))
            }
        };
        debug!(%sender_id, "connected");

        Ok(Self { ws, sender_id })
    }

    /// The identity the server acknowledged during the handshake.
    pub fn sender_id(&self) -> SenderId {
        self.sender_id
    }

    /// Frames `text` and sends it on the submission channel. Returns as
    /// soon as the frame is on the wire; the outcome arrives later as a
    /// notice via [`next_notice`](Self::next_notice).
    pub async fn submit(&mut self, text: &str) -> Result<(), ClientError> {
        let data = encode_submission(&JsonCodec, text)?;
        let frame = ClientFrame::Channel {
            channel: MESSAGE_CHANNEL.to_string(),
            data,
        };
        self.ws
            .send(WsMessage::Binary(serde_json::to_vec(&frame)?.into()))
            .await?;
        Ok(())
    }

    /// Waits for the next server notice. Returns `Ok(None)` when the
    /// server closes the connection.
    pub async fn next_notice(&mut self) -> Result<Option<Notice>, ClientError> {
        loop {
            let msg = match self.ws.next().await {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(None),
            };
            match msg {
                WsMessage::Binary(_) | WsMessage::Text(_) => {
                    let frame: ServerFrame =
                        serde_json::from_slice(&msg.into_data())?;
                    match frame {
                        ServerFrame::Notice { notice } => {
                            return Ok(Some(notice))
                        }
                        other => debug!(?other, "ignoring frame"),
                    }
                }
                WsMessage::Close(_) => return Ok(None),
                _ => {}
            }
        }
    }

    pub async fn close(mut self) -> Result<(), ClientError> {
        self.ws.close(None).await?;
        Ok(())
    }
}

async fn recv_frame(ws: &mut Ws) -> Result<ServerFrame, ClientError> {
    let msg = ws.next().await.ok_or(ClientError::Closed)??;
    Ok(serde_json::from_slice(&msg.into_data())?)
}
