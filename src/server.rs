//! TCP front end for the orchestrator.
//!
//! Each accepted connection is served by its own task, holding one worker
//! permit for as long as it stays open. A connection handles any number of
//! `get_prediction` requests in sequence; `stream_prediction` switches it to
//! streaming mode until the client sends `cancel` or disconnects.

use std::net::SocketAddr;
use std::sync::Arc;

use common::{Error, Result};
use futures::{SinkExt, StreamExt};
use orchestrator::{PredictionOrchestrator, StreamPublisher};
use prediction_protocol::{connection, decode_request, encode, Connection, Request, Response};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct PredictionServer {
    orchestrator: Arc<PredictionOrchestrator>,
    publisher: StreamPublisher,
    workers: Arc<Semaphore>,
}

impl PredictionServer {
    pub fn new(
        orchestrator: Arc<PredictionOrchestrator>,
        publisher: StreamPublisher,
        max_workers: usize,
    ) -> Self {
        Self {
            orchestrator,
            publisher,
            workers: Arc::new(Semaphore::new(max_workers.max(1))),
        }
    }

    /// Accept connections until `shutdown` fires.
    pub async fn run(&self, listener: TcpListener, shutdown: CancellationToken) -> Result<()> {
        loop {
            let permit = tokio::select! {
                _ = shutdown.cancelled() => break,
                p = self.workers.clone().acquire_owned() => {
                    p.map_err(|e| Error::Other(format!("worker pool closed: {}", e)))?
                }
            };

            let (socket, peer) = tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        warn!("accept failed: {}", e);
                        continue;
                    }
                },
            };

            let orchestrator = self.orchestrator.clone();
            let publisher = self.publisher.clone();
            let conn_shutdown = shutdown.child_token();
            tokio::spawn(async move {
                let _permit = permit;
                debug!(%peer, "connection opened");
                if let Err(e) =
                    handle_connection(socket, peer, orchestrator, publisher, conn_shutdown).await
                {
                    warn!(%peer, "connection error: {}", e);
                }
                debug!(%peer, "connection closed");
            });
        }

        info!("PredictionService listener stopped");
        Ok(())
    }
}

async fn handle_connection(
    socket: TcpStream,
    peer: SocketAddr,
    orchestrator: Arc<PredictionOrchestrator>,
    publisher: StreamPublisher,
    shutdown: CancellationToken,
) -> Result<()> {
    let mut conn = connection(socket);

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            frame = conn.next() => match frame {
                None => return Ok(()),
                Some(Ok(line)) => line,
                Some(Err(e)) => return Err(Error::Protocol(e.to_string())),
            },
        };
        if line.trim().is_empty() {
            continue;
        }

        let request = match decode_request(&line) {
            Ok(r) => r,
            Err(e) => {
                debug!(%peer, "rejecting frame: {}", e);
                send(&mut conn, &Response::from_error(&e)).await?;
                continue;
            }
        };

        match request {
            Request::GetPrediction { match_id } => {
                let response = match orchestrator.get_prediction(&match_id).await {
                    Ok(record) => Response::Prediction(record),
                    Err(e) => Response::from_error(&e),
                };
                send(&mut conn, &response).await?;
            }
            Request::StreamPrediction { match_id } => {
                let keep_open =
                    serve_stream(&mut conn, &publisher, &match_id, shutdown.child_token()).await?;
                if !keep_open {
                    return Ok(());
                }
            }
            Request::Cancel => {
                let err = Error::Protocol("cancel sent with no active stream".into());
                send(&mut conn, &Response::from_error(&err)).await?;
            }
        }
    }
}

/// Relay stream records until the client cancels (returns `true`) or the
/// connection goes away (returns `false`).
async fn serve_stream<T>(
    conn: &mut Connection<T>,
    publisher: &StreamPublisher,
    match_id: &str,
    cancel: CancellationToken,
) -> Result<bool>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let mut stream = publisher.stream_prediction(match_id, cancel);

    let keep_open = loop {
        tokio::select! {
            frame = conn.next() => match frame {
                None => break false,
                Some(Err(e)) => {
                    warn!("{}: stream connection error: {}", match_id, e);
                    break false;
                }
                Some(Ok(line)) if line.trim().is_empty() => {}
                Some(Ok(line)) => match decode_request(&line) {
                    Ok(Request::Cancel) => break true,
                    Ok(_) => {
                        let err = Error::Protocol("stream active; send cancel first".into());
                        send(conn, &Response::from_error(&err)).await?;
                    }
                    Err(e) => send(conn, &Response::from_error(&e)).await?,
                },
            },
            record = stream.recv() => match record {
                Some(record) => {
                    if let Err(e) = send(conn, &Response::Prediction(record)).await {
                        debug!("{}: client went away: {}", match_id, e);
                        break false;
                    }
                }
                // Only happens once the token was cancelled from above.
                None => break false,
            },
        }
    };

    stream.close().await;

    if keep_open {
        send(
            conn,
            &Response::StreamEnd {
                match_id: match_id.to_string(),
            },
        )
        .await?;
    }
    Ok(keep_open)
}

async fn send<T>(conn: &mut Connection<T>, response: &Response) -> Result<()>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let line = encode(response)?;
    conn.send(line)
        .await
        .map_err(|e| Error::Protocol(e.to_string()))
}
