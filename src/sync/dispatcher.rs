//! Tick-driven event dispatcher.
//!
//! An external scheduler calls [`Dispatcher::tick`] at a steady cadence
//! (originally once per rendered frame; the cadence is not part of the
//! contract). Each tick drains at most one item from each scene store
//! queue, encodes it, and hands the packet to the relay. Draining one
//! item per queue per tick keeps per-kind ordering at queue FIFO order;
//! ordering across kinds is unspecified.

use tracing::{debug, warn};

use crate::core::{PrimaryPeer, SceneStore, Transport};

use super::message::SyncMessage;
use super::relay::Relay;

/// Drains pending scene events and pushes them onto the wire.
#[derive(Debug)]
pub struct Dispatcher<S, P, T> {
    store: S,
    relay: Relay<P, T>,
}

impl<S: SceneStore, P: PrimaryPeer, T: Transport> Dispatcher<S, P, T> {
    /// Create a dispatcher draining `store` into `relay`.
    pub fn new(store: S, relay: Relay<P, T>) -> Self {
        Self { store, relay }
    }

    /// The scene store this dispatcher drains.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the scene store (the application side enqueues
    /// through this).
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The relay packets are handed to.
    pub fn relay(&self) -> &Relay<P, T> {
        &self.relay
    }

    /// Run one synchronization tick.
    ///
    /// Drains up to one item from each queue, in a fixed order. An event
    /// that fails to encode is logged and dropped; it never aborts the
    /// rest of the tick, and nothing here is fatal. Returns the number of
    /// packets handed to the relay.
    pub fn tick(&mut self) -> usize {
        let mut dispatched = 0;

        if let Some(spawn) = self.store.take_spawned_entity() {
            let id = self.store.register_entity(&spawn);
            let msg = SyncMessage::object_create(id, spawn.kind, spawn.transform);
            self.relay.send(&msg.encode());
            debug!(%id, kind = spawn.kind.name(), "sent object create");
            dispatched += 1;
        }

        if let Some(update) = self.store.take_moved_entity() {
            let msg = SyncMessage::object_move(update.id, update.transform);
            self.relay.send(&msg.encode());
            dispatched += 1;
        }

        if let Some(avatar) = self.store.take_new_avatar() {
            let msg = SyncMessage::avatar_create(avatar.id, avatar.transform);
            self.relay.send(&msg.encode());
            debug!(id = %avatar.id, "sent avatar create");
            dispatched += 1;
        }

        if let Some(avatar) = self.store.take_moved_avatar() {
            match SyncMessage::avatar_move(avatar.id, &avatar.pose) {
                Ok(msg) => {
                    self.relay.send(&msg.encode());
                    dispatched += 1;
                }
                Err(err) => warn!(id = %avatar.id, %err, "dropping avatar move"),
            }
        }

        if let Some(request) = self.store.take_forwarded_packet() {
            self.relay.forward(&request.packet, request.origin);
            dispatched += 1;
        }

        if let Some(id) = self.store.take_deleted_entity() {
            let msg = SyncMessage::delete(id);
            self.relay.send(&msg.encode());
            debug!(%id, "sent delete");
            dispatched += 1;
        }

        if let Some(text) = self.store.take_outbound_text() {
            match SyncMessage::text(text) {
                Ok(msg) => {
                    self.relay.send(&msg.encode());
                    debug!("sent text message");
                    dispatched += 1;
                }
                Err(err) => warn!(%err, "dropping text message"),
            }
        }

        dispatched
    }
}
