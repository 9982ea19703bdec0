//! In-memory duplex transport pair.
//!
//! Two [`InMemoryTransport`] ends wired back to back over unbounded
//! channels. Frames written on one end emerge on the other in order.
//! Used to connect a client and a server session inside one process,
//! primarily from tests.

use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::{Mutex, mpsc};
use tracing::trace;

use crate::error::{TransportError, TransportResult};
use crate::traits::Transport;

/// One end of an in-process duplex channel.
pub struct InMemoryTransport {
    /// Outgoing direction; dropped on close so the peer sees end-of-stream.
    tx: StdMutex<Option<mpsc::UnboundedSender<Bytes>>>,
    /// Incoming direction; the async lock serializes the single receiver.
    rx: Mutex<mpsc::UnboundedReceiver<Bytes>>,
}

impl InMemoryTransport {
    /// Create a connected pair of transports.
    ///
    /// Everything sent on the first end is received by the second and
    /// vice versa.
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        (
            Self {
                tx: StdMutex::new(Some(a_tx)),
                rx: Mutex::new(a_rx),
            },
            Self {
                tx: StdMutex::new(Some(b_tx)),
                rx: Mutex::new(b_rx),
            },
        )
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn send(&self, frame: Bytes) -> TransportResult<()> {
        let sender = self
            .tx
            .lock()
            .expect("transport sender mutex poisoned")
            .clone();
        match sender {
            Some(tx) => tx.send(frame).map_err(|_| TransportError::Closed),
            None => Err(TransportError::Closed),
        }
    }

    async fn recv(&self) -> TransportResult<Option<Bytes>> {
        let frame = self.rx.lock().await.recv().await;
        if frame.is_none() {
            trace!("in-memory transport reached end of stream");
        }
        Ok(frame)
    }

    async fn close(&self) -> TransportResult<()> {
        // Dropping the sender lets the peer drain buffered frames and then
        // observe end-of-stream.
        self.tx
            .lock()
            .expect("transport sender mutex poisoned")
            .take();
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let open = self
            .tx
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false);
        f.debug_struct("InMemoryTransport")
            .field("open", &open)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_frames_cross_the_pair_in_order() {
        let (a, b) = InMemoryTransport::pair();

        a.send(Bytes::from_static(b"one")).await.unwrap();
        a.send(Bytes::from_static(b"two")).await.unwrap();

        assert_eq!(b.recv().await.unwrap().unwrap(), Bytes::from_static(b"one"));
        assert_eq!(b.recv().await.unwrap().unwrap(), Bytes::from_static(b"two"));
    }

    #[tokio::test]
    async fn test_close_yields_end_of_stream_after_drain() {
        let (a, b) = InMemoryTransport::pair();

        a.send(Bytes::from_static(b"last")).await.unwrap();
        a.close().await.unwrap();

        assert_eq!(
            b.recv().await.unwrap().unwrap(),
            Bytes::from_static(b"last")
        );
        assert!(b.recv().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_send_after_close_fails() {
        let (a, _b) = InMemoryTransport::pair();
        a.close().await.unwrap();
        a.close().await.unwrap(); // idempotent

        let err = a.send(Bytes::from_static(b"x")).await.unwrap_err();
        assert!(matches!(err, TransportError::Closed));
    }

    #[tokio::test]
    async fn test_directions_are_independent() {
        let (a, b) = InMemoryTransport::pair();

        b.send(Bytes::from_static(b"from-b")).await.unwrap();
        a.send(Bytes::from_static(b"from-a")).await.unwrap();

        assert_eq!(
            a.recv().await.unwrap().unwrap(),
            Bytes::from_static(b"from-b")
        );
        assert_eq!(
            b.recv().await.unwrap().unwrap(),
            Bytes::from_static(b"from-a")
        );
    }
}
