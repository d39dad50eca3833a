//! Protocol constants shared by every SCENIC peer.
//!
//! These values are fixed by the wire contract and MUST NOT be changed.
//! There is no version negotiation: both ends of every connection must
//! agree on this table.

// =============================================================================
// MESSAGE TAGS
// =============================================================================

/// Object creation (position, rotation, kind, id).
pub const TAG_OBJECT_CREATE: u32 = 0;

/// Object movement (position, rotation, id). Avatar moves reuse this tag.
pub const TAG_OBJECT_MOVE: u32 = 1;

/// Object deletion (id only).
pub const TAG_DELETE: u32 = 2;

/// Avatar creation (position, rotation, id).
pub const TAG_AVATAR_CREATE: u32 = 3;

/// Free-form ASCII text message.
pub const TAG_TEXT: u32 = 4;

// =============================================================================
// FRAMING
// =============================================================================

/// Packet header size: u32 total size + u32 message tag.
///
/// The size field counts every byte of the packet, itself included.
pub const PACKET_HEADER_SIZE: usize = 8;

/// Wire size of a transform: 3 x f32 position + 3 x f32 rotation.
pub const TRANSFORM_WIRE_SIZE: usize = 24;

/// Wire size of an entity id (two's-complement 32-bit).
pub const ENTITY_ID_WIRE_SIZE: usize = 4;

/// Wire size of an entity kind tag.
pub const ENTITY_KIND_WIRE_SIZE: usize = 4;

// =============================================================================
// SKELETAL TRACKING
// =============================================================================

/// Joint whose transform stands in for a tracked avatar when it moves.
pub const ROOT_JOINT: &str = "SpineBase";

// =============================================================================
// LEGACY NAMING
// =============================================================================

/// Suffix appended to prefab names at instantiation time by the scene
/// engine; stripped before mapping a spawn name to an [`EntityKind`].
///
/// [`EntityKind`]: crate::core::EntityKind
pub const SPAWN_NAME_SUFFIX: &str = "(Clone)";

/// Raw origin value meaning "no particular origin" in the legacy integer
/// convention. See [`PacketOrigin`].
///
/// [`PacketOrigin`]: crate::core::PacketOrigin
pub const RAW_ORIGIN_LOCAL: i32 = -1;

// =============================================================================
// NETWORK
// =============================================================================

/// Well-known port the primary peer listens on.
pub const DEFAULT_PRIMARY_PORT: u16 = 46000;
