//! Transport error types.

use thiserror::Error;

/// A specialized `Result` type for transport operations.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Represents errors that can occur during transport operations.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum TransportError {
    /// The channel has been closed; no further frames can move.
    #[error("transport closed")]
    Closed,

    /// Failed to send a frame.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Failed to receive a frame.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// An underlying I/O error occurred.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<TransportError> for embermcp_protocol::Error {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Closed => {
                embermcp_protocol::Error::ConnectionClosed("transport closed".to_string())
            }
            other => embermcp_protocol::Error::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_maps_to_connection_closed() {
        let err: embermcp_protocol::Error = TransportError::Closed.into();
        assert!(matches!(err, embermcp_protocol::Error::ConnectionClosed(_)));
    }

    #[test]
    fn test_io_maps_to_transport() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err: embermcp_protocol::Error = TransportError::from(io).into();
        assert!(matches!(err, embermcp_protocol::Error::Transport(_)));
    }
}
