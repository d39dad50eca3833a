//! Core traits for the SCENIC protocol.
//!
//! These traits are the seams between the sync core and its external
//! collaborators. The core only consumes them: queue population, peer
//! bookkeeping on the transport side, and the inbound half of the primary
//! handshake all live outside this crate.

use super::error::SendError;
use super::types::{AvatarPose, ConnectionId, EntityId, EntityKind, PacketOrigin, Transform};

/// A freshly spawned entity that has not yet been assigned an id.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    /// Kind of entity that was spawned.
    pub kind: EntityKind,
    /// Transform at spawn time.
    pub transform: Transform,
}

/// A movement update for an entity that already has an id.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityUpdate {
    /// The entity's wire address.
    pub id: EntityId,
    /// New transform.
    pub transform: Transform,
}

/// Snapshot of a tracked avatar.
///
/// Avatars carry their id from creation; move events are encoded from the
/// pose's root joint rather than `transform`.
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarSnapshot {
    /// The avatar entity's wire address.
    pub id: EntityId,
    /// The avatar entity's own transform (used at creation).
    pub transform: Transform,
    /// Tracked joint transforms.
    pub pose: AvatarPose,
}

/// An inbound packet queued for relay to the other peers.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardRequest {
    /// The packet bytes exactly as received (already framed).
    pub packet: Vec<u8>,
    /// The connection the packet arrived on.
    pub origin: PacketOrigin,
}

/// Scene state store: the queues of pending state-change events.
///
/// Each `take_*` drains at most one item and returns `None` when the
/// queue is empty. Items of the same kind must come back in the order
/// they were enqueued; ordering across kinds is unspecified.
pub trait SceneStore {
    /// Drain one newly spawned entity, if any.
    fn take_spawned_entity(&mut self) -> Option<SpawnRequest>;

    /// Drain one moved entity, if any.
    fn take_moved_entity(&mut self) -> Option<EntityUpdate>;

    /// Drain one newly observed avatar, if any.
    fn take_new_avatar(&mut self) -> Option<AvatarSnapshot>;

    /// Drain one moved avatar, if any.
    fn take_moved_avatar(&mut self) -> Option<AvatarSnapshot>;

    /// Drain one deleted entity id, if any.
    fn take_deleted_entity(&mut self) -> Option<EntityId>;

    /// Drain one inbound packet awaiting relay, if any.
    fn take_forwarded_packet(&mut self) -> Option<ForwardRequest>;

    /// Drain one outbound text message, if any.
    fn take_outbound_text(&mut self) -> Option<String>;

    /// Allocate and record the wire id for a spawned entity.
    ///
    /// Ids are assigned exactly once and never reassigned while the
    /// entity is live.
    fn register_entity(&mut self, spawn: &SpawnRequest) -> EntityId;
}

/// Shared transport multiplexing many logical connections.
///
/// Expected to be best-effort and non-blocking: delivery is not
/// guaranteed and a failure affects only the named connection.
pub trait Transport {
    /// Transmit a packet to one connection.
    fn send(&self, connection: ConnectionId, packet: &[u8]) -> Result<(), SendError>;
}

/// Fire-and-forget transmit path to the primary peer.
///
/// Implementations must not block the caller and must not retry:
/// completion (or failure) is observed only for logging. The relay gates
/// every call on the registry reporting the link `Ready`.
pub trait PrimaryPeer {
    /// Hand a packet to the primary stream.
    fn transmit(&self, packet: Vec<u8>);
}

impl<T: Transport> Transport for std::sync::Arc<T> {
    fn send(&self, connection: ConnectionId, packet: &[u8]) -> Result<(), SendError> {
        (**self).send(connection, packet)
    }
}

impl<P: PrimaryPeer> PrimaryPeer for std::sync::Arc<P> {
    fn transmit(&self, packet: Vec<u8>) {
        (**self).transmit(packet)
    }
}
