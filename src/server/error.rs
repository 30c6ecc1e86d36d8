use thiserror::Error;
use tokio_util::codec::LinesCodecError;

/// Session error types.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line codec error: {0}")]
    Codec(#[from] LinesCodecError),

    /// The client closed the connection while a prompt was waiting.
    #[error("client disconnected")]
    Disconnected,

    /// The server is shutting down.
    #[error("session cancelled")]
    Cancelled,
}
