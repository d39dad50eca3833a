//! Primary peer stream link: dialing and fire-and-forget transmission.
//!
//! The primary peer is reached over a dedicated TCP stream, dialed in the
//! sending direction only; the receiving direction is a separate socket
//! owned by an external collaborator (the dual-socket handshake). This
//! module owns the outbound half: the dial that drives the registry
//! through `Attempting -> Connected | Error`, and the transmit path whose
//! completion is observed only for logging.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info, trace, warn};

use crate::core::{ConnectError, PrimaryPeer};

use super::registry::ConnectionRegistry;

/// Outbound stream connection to the primary peer.
///
/// Shareable behind an `Arc`: the relay holds one clone for transmission
/// while the session drives [`attempt`](Self::attempt).
#[derive(Debug)]
pub struct PrimaryLink {
    peer: SocketAddr,
    registry: Arc<ConnectionRegistry>,
    stream: Arc<Mutex<Option<TcpStream>>>,
}

impl PrimaryLink {
    /// Create an undialed link to `peer`, reporting into `registry`.
    pub fn new(peer: SocketAddr, registry: Arc<ConnectionRegistry>) -> Self {
        Self { peer, registry, stream: Arc::new(Mutex::new(None)) }
    }

    /// Address this link dials.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Registry this link reports into.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Whether a dialed stream is currently held.
    pub async fn is_dialed(&self) -> bool {
        self.stream.lock().await.is_some()
    }

    /// Dial the primary peer.
    ///
    /// Drives the registry `Attempting -> Connected` on success and
    /// `Attempting -> Error` on failure; a failure is surfaced once and
    /// never retried here. Safe to call repeatedly: each successful dial
    /// replaces (and thereby closes) any previously held stream, and a
    /// call in a state the registry rejects (already attempting,
    /// connected, or ready) is a no-op.
    ///
    /// There is no timeout on the dial: a peer that accepts neither
    /// connection nor refusal stalls the caller until the OS gives up.
    pub async fn attempt(&self) -> Result<(), ConnectError> {
        if !self.registry.begin_attempt() {
            debug!(status = %self.registry.status(), "primary attempt skipped");
            return Ok(());
        }

        info!(peer = %self.peer, "attempting primary connection");
        match TcpStream::connect(self.peer).await {
            Ok(stream) => {
                *self.stream.lock().await = Some(stream);
                self.registry.mark_connected();
                info!(peer = %self.peer, "primary connection established");
                Ok(())
            }
            Err(err) => {
                self.registry.mark_failed();
                warn!(peer = %self.peer, %err, "primary connection failed");
                Err(if err.kind() == io::ErrorKind::ConnectionRefused {
                    ConnectError::Refused(err)
                } else {
                    ConnectError::Dial(err)
                })
            }
        }
    }
}

impl PrimaryPeer for PrimaryLink {
    /// Queue `packet` for transmission on a background task.
    ///
    /// Never blocks the caller and never retries; the write result is
    /// only logged. Transmitting before any successful dial (the link can
    /// be `Ready` purely from the inbound handshake) is a logged no-op.
    /// Must be called from within a tokio runtime.
    fn transmit(&self, packet: Vec<u8>) {
        let stream = Arc::clone(&self.stream);
        let peer = self.peer;
        tokio::spawn(async move {
            let mut guard = stream.lock().await;
            match guard.as_mut() {
                Some(stream) => match stream.write_all(&packet).await {
                    Ok(()) => trace!(%peer, bytes = packet.len(), "primary send complete"),
                    Err(err) => warn!(%peer, %err, "primary send failed"),
                },
                None => debug!(%peer, "primary send skipped, link not dialed"),
            }
        });
    }
}
