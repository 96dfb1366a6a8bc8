//! Streaming subscriptions.
//!
//! Each subscription runs in its own task: compute immediately, then every
//! `interval`, pushing records into a bounded channel. The loop ends when the
//! cancellation token fires or the receiving side goes away, and it never
//! starts another fan-out after either is observed.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use common::PredictionRecord;
use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::PredictionOrchestrator;

/// Spawns per-subscriber recompute loops.
#[derive(Clone)]
pub struct StreamPublisher {
    orchestrator: Arc<PredictionOrchestrator>,
    interval: Duration,
    buffer: usize,
}

impl StreamPublisher {
    pub fn new(orchestrator: Arc<PredictionOrchestrator>, interval: Duration, buffer: usize) -> Self {
        Self {
            orchestrator,
            interval,
            buffer: buffer.max(1),
        }
    }

    /// Start streaming predictions for `match_id`.
    ///
    /// The first record bypasses the cache. Cancel `cancel` or drop the
    /// returned stream to stop the loop.
    pub fn stream_prediction(&self, match_id: &str, cancel: CancellationToken) -> PredictionStream {
        let (tx, rx) = mpsc::channel(self.buffer);
        let id = Uuid::new_v4();

        let task = tokio::spawn(run_subscription(
            self.orchestrator.clone(),
            match_id.to_string(),
            self.interval,
            tx,
            cancel.clone(),
            id,
        ));

        PredictionStream {
            id,
            rx,
            cancel,
            task: Some(task),
        }
    }
}

/// Receiving end of one subscription. Dropping it cancels the loop.
pub struct PredictionStream {
    id: Uuid,
    rx: mpsc::Receiver<PredictionRecord>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PredictionStream {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Next record, or `None` once the loop has stopped and the buffer is drained.
    pub async fn recv(&mut self) -> Option<PredictionRecord> {
        self.rx.recv().await
    }

    /// Cancel and wait for the loop task to exit.
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(subscription = %self.id, "stream task ended abnormally: {}", e);
            }
        }
    }
}

impl Stream for PredictionStream {
    type Item = PredictionRecord;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl Drop for PredictionStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_subscription(
    orchestrator: Arc<PredictionOrchestrator>,
    match_id: String,
    interval: Duration,
    tx: mpsc::Sender<PredictionRecord>,
    cancel: CancellationToken,
    id: Uuid,
) {
    info!(subscription = %id, "Client subscribed to StreamPrediction for match {}", match_id);
    let mut emitted: u64 = 0;

    loop {
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tx.closed() => break,
            r = orchestrator.compute_prediction(&match_id) => r,
        };

        match outcome {
            Ok(record) => {
                let sent = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    r = tx.send(record) => r,
                };
                if sent.is_err() {
                    break;
                }
                emitted += 1;
                debug!(subscription = %id, "emitted record {} for {}", emitted, match_id);
            }
            Err(e) if e.is_not_found() => {
                warn!(subscription = %id, "{}: match not found, retrying next tick", match_id);
            }
            Err(e) => {
                warn!(subscription = %id, "{}: tick failed: {}", match_id, e);
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tx.closed() => break,
            _ = sleep(interval) => {}
        }
    }

    info!(
        subscription = %id,
        "Client cancelled StreamPrediction for match {} after {} records",
        match_id, emitted
    );
}
