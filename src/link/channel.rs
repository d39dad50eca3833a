//! Channel-backed reference transport.
//!
//! Multiplexes logical connections over in-process mpsc channels: one
//! byte-packet queue per secondary connection. Opening and closing a
//! connection keeps the registry's secondary set in step, the way the
//! real transport collaborator announces peers joining and leaving.
//! Sends are unbounded and never block: best-effort datagram-like
//! semantics with no backpressure, matching the protocol's resource
//! model.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::debug;

use crate::core::{ConnectionId, SendError, Transport};

use super::registry::ConnectionRegistry;

/// In-process [`Transport`] delivering packets over per-connection
/// channels.
#[derive(Debug)]
pub struct ChannelTransport {
    registry: Arc<ConnectionRegistry>,
    peers: Mutex<HashMap<ConnectionId, mpsc::UnboundedSender<Vec<u8>>>>,
}

impl ChannelTransport {
    /// Create a transport that mirrors its connections into `registry`.
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry, peers: Mutex::new(HashMap::new()) }
    }

    /// Open a logical connection and register it as a secondary.
    ///
    /// Returns the receiving end of the connection's packet queue, or
    /// `None` if the id is already open.
    pub fn open(&self, id: ConnectionId) -> Option<mpsc::UnboundedReceiver<Vec<u8>>> {
        let mut peers = self.peers.lock().expect("peer map lock poisoned");
        if peers.contains_key(&id) {
            return None;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        peers.insert(id, tx);
        drop(peers);

        self.registry.register_secondary(id);
        debug!(connection = %id, "transport connection opened");
        Some(rx)
    }

    /// Close a logical connection and unregister it.
    ///
    /// Returns `false` if the id was not open.
    pub fn close(&self, id: ConnectionId) -> bool {
        let removed = self.peers.lock().expect("peer map lock poisoned").remove(&id).is_some();
        if removed {
            self.registry.unregister_secondary(id);
            debug!(connection = %id, "transport connection closed");
        }
        removed
    }

    /// Number of open connections.
    pub fn open_connections(&self) -> usize {
        self.peers.lock().expect("peer map lock poisoned").len()
    }
}

impl Transport for ChannelTransport {
    fn send(&self, connection: ConnectionId, packet: &[u8]) -> Result<(), SendError> {
        let peers = self.peers.lock().expect("peer map lock poisoned");
        let tx = peers.get(&connection).ok_or_else(|| SendError::Failed {
            connection: connection.raw(),
            reason: "unknown connection".to_string(),
        })?;
        tx.send(packet.to_vec()).map_err(|_| SendError::Failed {
            connection: connection.raw(),
            reason: "receiver dropped".to_string(),
        })
    }
}
