use crate::error::AppError;
use axum::body::Body;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use std::io;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error};

const CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Upstream ended and the response body was fully handed to the client.
    Completed { bytes: u64 },
    /// The client went away before the upstream ended.
    Aborted { bytes: u64 },
}

/// One upstream-to-client byte relay.
///
/// [`Transfer::start`] spawns a task that pulls upstream chunks into the
/// response body through a bounded channel. [`Transfer::completion`] resolves
/// once that body has been written out and dropped, or with the first
/// upstream stream error.
pub struct Transfer {
    outcome: oneshot::Receiver<Result<TransferOutcome, AppError>>,
}

impl Transfer {
    pub fn start<S, E>(first: Option<Bytes>, upstream: S) -> (Body, Transfer)
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::channel::<Result<Bytes, io::Error>>(CHANNEL_CAPACITY);
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let (body_done_tx, body_done_rx) = oneshot::channel::<()>();

        // body_done_tx lives inside the body stream and is dropped with it.
        let body_stream = ReceiverStream::new(rx).map(move |chunk| {
            let _ = &body_done_tx;
            chunk
        });

        tokio::spawn(async move {
            let outcome = relay(first, upstream, tx, body_done_rx).await;
            let _ = outcome_tx.send(outcome);
        });

        (Body::from_stream(body_stream), Transfer { outcome: outcome_rx })
    }

    pub async fn completion(self) -> Result<TransferOutcome, AppError> {
        self.outcome
            .await
            .unwrap_or_else(|_| Err(AppError::Stream("relay task ended without reporting".to_string())))
    }
}

async fn relay<S, E>(
    first: Option<Bytes>,
    upstream: S,
    tx: mpsc::Sender<Result<Bytes, io::Error>>,
    body_done: oneshot::Receiver<()>,
) -> Result<TransferOutcome, AppError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let mut upstream = std::pin::pin!(upstream);
    let mut relayed: u64 = 0;

    if let Some(chunk) = first {
        let len = chunk.len() as u64;
        if tx.send(Ok(chunk)).await.is_err() {
            debug!("Client disconnected before the first chunk was written");
            return Ok(TransferOutcome::Aborted { bytes: relayed });
        }
        relayed += len;
    }

    while let Some(chunk) = upstream.next().await {
        match chunk {
            Ok(bytes) => {
                let len = bytes.len() as u64;
                if tx.send(Ok(bytes)).await.is_err() {
                    debug!(bytes = relayed, "Client disconnected mid-transfer");
                    return Ok(TransferOutcome::Aborted { bytes: relayed });
                }
                relayed += len;
            }
            Err(e) => {
                error!(bytes = relayed, "Upstream stream error: {}", e);
                let message = e.to_string();
                // Headers are already committed; erroring the body aborts the response.
                let _ = tx.send(Err(io::Error::new(io::ErrorKind::Other, e))).await;
                return Err(AppError::Stream(message));
            }
        }
    }

    drop(tx);
    // Resolves (with RecvError) once the server has finished with the body.
    let _ = body_done.await;
    Ok(TransferOutcome::Completed { bytes: relayed })
}
