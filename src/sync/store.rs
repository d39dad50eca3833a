//! In-memory scene event queues.
//!
//! [`SceneQueues`] is the reference [`SceneStore`]: the application side
//! pushes state-change events as they happen, the dispatcher drains them
//! at its own cadence. One FIFO per event kind, so per-kind ordering is
//! the enqueue order; nothing is promised across kinds.

use std::collections::VecDeque;

use crate::core::{
    AvatarSnapshot, EntityId, EntityUpdate, ForwardRequest, SceneStore, SpawnRequest,
};

/// First id handed out by the allocator. Non-positive values are reserved
/// by the legacy convention.
const FIRST_ENTITY_ID: i32 = 1;

/// Queue-backed scene state store with a monotonic entity id allocator.
#[derive(Debug)]
pub struct SceneQueues {
    spawned: VecDeque<SpawnRequest>,
    moved: VecDeque<EntityUpdate>,
    new_avatars: VecDeque<AvatarSnapshot>,
    moved_avatars: VecDeque<AvatarSnapshot>,
    deleted: VecDeque<EntityId>,
    forwarded: VecDeque<ForwardRequest>,
    outbound_text: VecDeque<String>,
    next_id: i32,
}

impl SceneQueues {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            spawned: VecDeque::new(),
            moved: VecDeque::new(),
            new_avatars: VecDeque::new(),
            moved_avatars: VecDeque::new(),
            deleted: VecDeque::new(),
            forwarded: VecDeque::new(),
            outbound_text: VecDeque::new(),
            next_id: FIRST_ENTITY_ID,
        }
    }

    /// Queue a newly spawned entity.
    pub fn push_spawned_entity(&mut self, spawn: SpawnRequest) {
        self.spawned.push_back(spawn);
    }

    /// Queue a movement update.
    pub fn push_moved_entity(&mut self, update: EntityUpdate) {
        self.moved.push_back(update);
    }

    /// Queue a newly observed avatar.
    pub fn push_new_avatar(&mut self, avatar: AvatarSnapshot) {
        self.new_avatars.push_back(avatar);
    }

    /// Queue an avatar movement.
    pub fn push_moved_avatar(&mut self, avatar: AvatarSnapshot) {
        self.moved_avatars.push_back(avatar);
    }

    /// Queue a deletion.
    pub fn push_deleted_entity(&mut self, id: EntityId) {
        self.deleted.push_back(id);
    }

    /// Queue an inbound packet for relay to the other peers.
    pub fn push_forwarded_packet(&mut self, request: ForwardRequest) {
        self.forwarded.push_back(request);
    }

    /// Queue an outbound text message.
    pub fn push_outbound_text(&mut self, text: impl Into<String>) {
        self.outbound_text.push_back(text.into());
    }

    /// Number of events currently pending across all queues.
    pub fn pending(&self) -> usize {
        self.spawned.len()
            + self.moved.len()
            + self.new_avatars.len()
            + self.moved_avatars.len()
            + self.deleted.len()
            + self.forwarded.len()
            + self.outbound_text.len()
    }

    /// Whether every queue is empty.
    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }
}

impl Default for SceneQueues {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneStore for SceneQueues {
    fn take_spawned_entity(&mut self) -> Option<SpawnRequest> {
        self.spawned.pop_front()
    }

    fn take_moved_entity(&mut self) -> Option<EntityUpdate> {
        self.moved.pop_front()
    }

    fn take_new_avatar(&mut self) -> Option<AvatarSnapshot> {
        self.new_avatars.pop_front()
    }

    fn take_moved_avatar(&mut self) -> Option<AvatarSnapshot> {
        self.moved_avatars.pop_front()
    }

    fn take_deleted_entity(&mut self) -> Option<EntityId> {
        self.deleted.pop_front()
    }

    fn take_forwarded_packet(&mut self) -> Option<ForwardRequest> {
        self.forwarded.pop_front()
    }

    fn take_outbound_text(&mut self) -> Option<String> {
        self.outbound_text.pop_front()
    }

    fn register_entity(&mut self, _spawn: &SpawnRequest) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EntityKind, Transform};

    fn spawn(kind: EntityKind) -> SpawnRequest {
        SpawnRequest { kind, transform: Transform::default() }
    }

    #[test]
    fn test_empty_store() {
        let mut store = SceneQueues::new();
        assert!(store.is_idle());
        assert!(store.take_spawned_entity().is_none());
        assert!(store.take_moved_entity().is_none());
        assert!(store.take_deleted_entity().is_none());
        assert!(store.take_outbound_text().is_none());
    }

    #[test]
    fn test_fifo_per_queue() {
        let mut store = SceneQueues::new();
        store.push_spawned_entity(spawn(EntityKind::Cube));
        store.push_spawned_entity(spawn(EntityKind::Sphere));

        assert_eq!(store.take_spawned_entity().unwrap().kind, EntityKind::Cube);
        assert_eq!(store.take_spawned_entity().unwrap().kind, EntityKind::Sphere);
        assert!(store.take_spawned_entity().is_none());
    }

    #[test]
    fn test_id_allocator_monotonic() {
        let mut store = SceneQueues::new();
        let a = store.register_entity(&spawn(EntityKind::Cube));
        let b = store.register_entity(&spawn(EntityKind::Cube));
        let c = store.register_entity(&spawn(EntityKind::Sphere));

        assert_eq!(a, EntityId(1));
        assert_eq!(b, EntityId(2));
        assert_eq!(c, EntityId(3));
    }

    #[test]
    fn test_pending_counts_all_queues() {
        let mut store = SceneQueues::new();
        store.push_deleted_entity(EntityId(4));
        store.push_outbound_text("Hello");
        assert_eq!(store.pending(), 2);

        store.take_deleted_entity();
        store.take_outbound_text();
        assert!(store.is_idle());
    }
}
