//! Wire protocol between the orchestrator and its callers.
//!
//! One JSON object per line. A connection carries any number of
//! `get_prediction` exchanges; `stream_prediction` switches it into streaming
//! mode until the client sends `cancel` or hangs up.

use common::{Error, PredictionRecord, Result};
use serde::{Deserialize, Serialize};
use tokio_util::codec::{Framed, LinesCodec};

/// Longest accepted frame in bytes.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// A line-framed protocol connection.
pub type Connection<T> = Framed<T, LinesCodec>;

/// Caller → orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    GetPrediction { match_id: String },
    StreamPrediction { match_id: String },
    Cancel,
}

/// Orchestrator → caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Prediction(PredictionRecord),
    Error { code: ErrorCode, message: String },
    /// Acknowledges a `cancel` and ends streaming mode.
    StreamEnd { match_id: String },
}

impl Response {
    pub fn from_error(err: &Error) -> Self {
        Self::Error {
            code: ErrorCode::from(err),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    InvalidInput,
    Unavailable,
    BadRequest,
    Internal,
}

impl From<&Error> for ErrorCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::NotFound(_) => Self::NotFound,
            Error::InvalidInput(_) => Self::InvalidInput,
            Error::Unavailable { .. } => Self::Unavailable,
            Error::Json(_) | Error::Protocol(_) => Self::BadRequest,
            Error::Config(_) | Error::Io(_) | Error::Other(_) => Self::Internal,
        }
    }
}

/// Line codec with the protocol's frame limit.
pub fn codec() -> LinesCodec {
    LinesCodec::new_with_max_length(MAX_FRAME_LEN)
}

/// Wrap an I/O object in the protocol framing.
pub fn connection<T>(io: T) -> Connection<T>
where
    T: tokio::io::AsyncRead + tokio::io::AsyncWrite,
{
    Framed::new(io, codec())
}

pub fn encode<T: Serialize>(msg: &T) -> Result<String> {
    Ok(serde_json::to_string(msg)?)
}

pub fn decode_request(line: &str) -> Result<Request> {
    serde_json::from_str(line.trim())
        .map_err(|e| Error::Protocol(format!("bad request frame: {}", e)))
}

pub fn decode_response(line: &str) -> Result<Response> {
    serde_json::from_str(line.trim())
        .map_err(|e| Error::Protocol(format!("bad response frame: {}", e)))
}
