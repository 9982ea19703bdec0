//! Core transport trait.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::TransportResult;

/// A full-duplex channel moving one complete JSON-RPC frame at a time.
///
/// Framing is the implementation's concern: line-delimited JSON for pipes,
/// SSE events or HTTP bodies for network transports, plain channel items
/// in-process. By the time a frame crosses this boundary it is one complete
/// JSON payload.
///
/// # Concurrency contract
///
/// Implementations must tolerate one task calling [`recv`](Transport::recv)
/// while any number of tasks call [`send`](Transport::send); writes are
/// serialized internally. Within each direction frames move in the order
/// they were written; the two directions are independent.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Send a single frame to the peer.
    async fn send(&self, frame: Bytes) -> TransportResult<()>;

    /// Receive the next frame from the peer.
    ///
    /// Returns `Ok(None)` on orderly end-of-stream; the stream is finite
    /// and not restartable. An `Err` means the channel failed mid-stream.
    async fn recv(&self) -> TransportResult<Option<Bytes>>;

    /// Close the channel. Idempotent; frames already in flight may still
    /// be drained by the peer.
    async fn close(&self) -> TransportResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // The trait must remain object-safe: the session stores it as a
    // `dyn Transport` handle.
    fn _assert_object_safe(_t: &dyn Transport) {}
}
