//! The submission worker: the server-owned execution context.
//!
//! Connection handlers hand raw buffers to this single task over a
//! queue, so decoding, validation, and persistence never run on network
//! I/O tasks and submissions are processed in arrival order. Every
//! failure is answered with a `Failed` notice and a log entry; nothing
//! here is ever fatal to the process.

use std::sync::Arc;

use messagemod_protocol::{
    decode_submission, truncate_text, Codec, Notice, SenderId,
    MAX_TEXT_UNITS,
};
use messagemod_store::{MessageStore, StoreError};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// One raw submission from an authenticated connection.
pub(crate) struct Submission {
    /// Identity from the session, never from the payload.
    pub(crate) sender_id: SenderId,
    /// The length-prefixed submission buffer as received.
    pub(crate) buffer: Vec<u8>,
    /// Where the resulting notice goes.
    pub(crate) reply: mpsc::Sender<Notice>,
}

/// Drains the submission queue until every sender is gone or the worker
/// task is torn down at shutdown.
pub(crate) async fn run_submission_worker<C: Codec>(
    store: Arc<MessageStore>,
    codec: C,
    mut rx: mpsc::Receiver<Submission>,
) {
    while let Some(submission) = rx.recv().await {
        let notice = process(&store, &codec, &submission).await;
        // Never await on the reply channel: the handler that drains it
        // may itself be parked on a full submission queue, and a shared
        // worker must not wedge on one slow consumer.
        match submission.reply.try_send(notice) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    sender_id = %submission.sender_id,
                    "notice channel full, dropping notice"
                );
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(
                    sender_id = %submission.sender_id,
                    "submitter disconnected before notice delivery"
                );
            }
        }
    }
}

/// Decode → truncate → persist for one submission.
async fn process<C: Codec>(
    store: &MessageStore,
    codec: &C,
    submission: &Submission,
) -> Notice {
    let text = match decode_submission(codec, &submission.buffer) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(
                sender_id = %submission.sender_id,
                error = %e,
                "failed to decode submission"
            );
            return Notice::Failed {
                reason: "could not read your message".into(),
            };
        }
    };

    tracing::info!(
        sender_id = %submission.sender_id,
        text = %text,
        "received message"
    );

    let units = text.chars().count();
    if units > MAX_TEXT_UNITS {
        tracing::warn!(
            sender_id = %submission.sender_id,
            units,
            "message too long, truncating to {MAX_TEXT_UNITS} units"
        );
    }
    let text = truncate_text(&text);

    match store.save(submission.sender_id, text).await {
        Ok(message) => {
            tracing::debug!(
                sender_id = %submission.sender_id,
                id = %message.id,
                "submission persisted"
            );
            Notice::Saved
        }
        Err(StoreError::NotInitialized) => {
            tracing::error!(
                sender_id = %submission.sender_id,
                "store unavailable, submission dropped"
            );
            Notice::Failed {
                reason: "storage is unavailable".into(),
            }
        }
        Err(e) => {
            tracing::error!(
                sender_id = %submission.sender_id,
                error = %e,
                "failed to save submission"
            );
            Notice::Failed {
                reason: "could not save your message".into(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use messagemod_protocol::{encode_submission, JsonCodec};

    fn submission(buffer: Vec<u8>) -> (Submission, mpsc::Receiver<Notice>) {
        let (reply, rx) = mpsc::channel(1);
        (
            Submission {
                sender_id: SenderId::random(),
                buffer,
                reply,
            },
            rx,
        )
    }

    // No database needed: an uninitialized store exercises the
    // storage-unavailable reply path.
    #[tokio::test]
    async fn test_process_uninitialized_store_replies_failed() {
        let store = MessageStore::new();
        let codec = JsonCodec;
        let buffer = encode_submission(&codec, "hello").unwrap();
        let (sub, _rx) = submission(buffer);

        let notice = process(&store, &codec, &sub).await;
        assert_eq!(
            notice,
            Notice::Failed {
                reason: "storage is unavailable".into()
            }
        );
    }

    #[tokio::test]
    async fn test_process_malformed_buffer_replies_failed() {
        let store = MessageStore::new();
        let codec = JsonCodec;
        // Declares 127 bytes, carries none.
        let (sub, _rx) = submission(vec![0x7F]);

        let notice = process(&store, &codec, &sub).await;
        assert_eq!(
            notice,
            Notice::Failed {
                reason: "could not read your message".into()
            }
        );
    }

    // The worker must keep draining the queue even when a submitter
    // never reads its notices; a wedged reply channel for one
    // connection cannot stall submissions from everyone else.
    #[tokio::test]
    async fn test_worker_keeps_draining_with_full_reply_channel() {
        let store = Arc::new(MessageStore::new());
        let (tx, rx) = mpsc::channel(2);
        let worker =
            tokio::spawn(run_submission_worker(store, JsonCodec, rx));

        // One-slot reply channel that nobody drains: the first notice
        // fills it, later ones must be dropped without blocking.
        let (stuck_reply, mut stuck_rx) = mpsc::channel(1);
        for _ in 0..3 {
            let buffer = encode_submission(&JsonCodec, "hello").unwrap();
            tx.send(Submission {
                sender_id: SenderId::random(),
                buffer,
                reply: stuck_reply.clone(),
            })
            .await
            .unwrap();
        }

        // A healthy submitter behind the flood still gets its notice.
        let (reply, mut reply_rx) = mpsc::channel(1);
        let buffer = encode_submission(&JsonCodec, "hello").unwrap();
        tx.send(Submission {
            sender_id: SenderId::random(),
            buffer,
            reply,
        })
        .await
        .unwrap();

        let notice =
            tokio::time::timeout(Duration::from_secs(5), reply_rx.recv())
                .await
                .expect("worker should not be wedged")
                .expect("notice should arrive");
        assert!(matches!(notice, Notice::Failed { .. }));

        drop(tx);
        worker.await.unwrap();

        // Exactly one notice made it into the stuck channel.
        assert!(stuck_rx.try_recv().is_ok());
        assert!(stuck_rx.try_recv().is_err());
    }
}
