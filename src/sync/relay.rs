//! Packet fan-out and relay.
//!
//! One encoded packet goes to up to two places: the primary peer over its
//! dedicated stream (only while the registry reports the link `Ready`),
//! and every live secondary connection over the shared transport. When a
//! packet is being relayed on behalf of another connection, that
//! connection is excluded so nothing is echoed back to its sender.
//!
//! Delivery is best effort throughout: a failed secondary send is logged
//! and swallowed without touching the remaining destinations, and the
//! primary path is fire-and-forget by contract.

use std::sync::Arc;

use tracing::{trace, warn};

use crate::core::{PacketOrigin, PrimaryPeer, Transport};
use crate::link::ConnectionRegistry;

/// Fans encoded packets out to the primary peer and the secondary
/// connections, consulting the registry on every call.
#[derive(Debug)]
pub struct Relay<P, T> {
    registry: Arc<ConnectionRegistry>,
    primary: P,
    transport: T,
}

impl<P: PrimaryPeer, T: Transport> Relay<P, T> {
    /// Create a relay over the given registry, primary path, and
    /// transport.
    pub fn new(registry: Arc<ConnectionRegistry>, primary: P, transport: T) -> Self {
        Self { registry, primary, transport }
    }

    /// Registry this relay consults.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// The shared transport used for secondary connections.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Transmit a locally produced packet to every peer.
    ///
    /// Equivalent to [`forward`](Self::forward) with
    /// [`PacketOrigin::Local`].
    pub fn send(&self, packet: &[u8]) {
        self.forward(packet, PacketOrigin::Local);
    }

    /// Relay a packet to every peer except the one it came from.
    ///
    /// The primary peer receives the packet whenever the link is `Ready`,
    /// unless the packet originated at the primary itself. Each secondary
    /// connection receives it unless it is the origin. A failure on one
    /// destination never aborts delivery to the others.
    pub fn forward(&self, packet: &[u8], origin: PacketOrigin) {
        if origin != PacketOrigin::Primary && self.registry.is_primary_ready() {
            self.primary.transmit(packet.to_vec());
        }

        for connection in self.registry.secondary_ids() {
            if origin == PacketOrigin::Secondary(connection) {
                continue;
            }
            match self.transport.send(connection, packet) {
                Ok(()) => trace!(%connection, bytes = packet.len(), "relayed packet"),
                Err(err) => warn!(%connection, %err, "secondary send failed"),
            }
        }
    }
}
