//! Shared identity and geometry types.
//!
//! Everything here is plain data: the codec turns these into wire bytes,
//! the relay routes by them, and the collaborator traits exchange them.

use std::collections::HashMap;

use super::constants::{RAW_ORIGIN_LOCAL, ROOT_JOINT, SPAWN_NAME_SUFFIX};
use super::error::EncodeError;

/// Three 32-bit float components.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
}

impl Vec3 {
    /// Create a vector from its components.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Position and rotation snapshot of a scene entity.
///
/// Rotation is Euler angles in degrees. No normalization is performed;
/// wrap-around (359 degrees to 0) is the receiver's concern.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    /// World position.
    pub position: Vec3,
    /// Euler rotation, degrees.
    pub rotation: Vec3,
}

impl Transform {
    /// Create a transform from position and rotation vectors.
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        Self { position, rotation }
    }
}

/// Identifier of a synchronized scene entity.
///
/// Assigned exactly once, by the side that first observes the entity, and
/// reused as the entity's wire address for the lifetime of the session.
/// Two's-complement 32-bit on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub i32);

impl EntityId {
    /// Raw wire value.
    pub fn raw(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed enumeration of spawnable entity kinds.
///
/// Encoded as a 32-bit integer on the wire. Both ends must share this
/// table; there is no negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum EntityKind {
    /// Cube prefab.
    Cube = 0,
    /// Sphere prefab.
    Sphere = 1,
    /// Capsule prefab.
    Capsule = 2,
    /// Cylinder prefab.
    Cylinder = 3,
}

impl EntityKind {
    /// Wire value of this kind.
    pub fn tag(self) -> u32 {
        self as u32
    }

    /// Map a wire value back to a kind, if it is in the table.
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(Self::Cube),
            1 => Some(Self::Sphere),
            2 => Some(Self::Capsule),
            3 => Some(Self::Cylinder),
            _ => None,
        }
    }

    /// Derive a kind from a spawn-time object name.
    ///
    /// The scene engine appends an instantiation suffix to prefab names
    /// when it clones them; that suffix is stripped (when present) before
    /// the lookup. Names outside the kind table fail with
    /// [`EncodeError::InvalidKind`].
    pub fn from_spawn_name(name: &str) -> Result<Self, EncodeError> {
        let base = name.strip_suffix(SPAWN_NAME_SUFFIX).unwrap_or(name);
        match base {
            "Cube" => Ok(Self::Cube),
            "Sphere" => Ok(Self::Sphere),
            "Capsule" => Ok(Self::Capsule),
            "Cylinder" => Ok(Self::Cylinder),
            _ => Err(EncodeError::InvalidKind { name: base.to_string() }),
        }
    }

    /// Prefab name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Cube => "Cube",
            Self::Sphere => "Sphere",
            Self::Capsule => "Capsule",
            Self::Cylinder => "Cylinder",
        }
    }
}

/// Identifier of one logical connection on the shared transport.
///
/// Opaque: handed out by the transport abstraction when a secondary peer
/// joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub i32);

impl ConnectionId {
    /// Raw transport value.
    pub fn raw(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a packet entered this peer.
///
/// Typed replacement for the legacy integer convention in which `-1`
/// meant "no particular origin". The relay uses the origin to avoid
/// echoing a packet back to its sender: the matching secondary connection
/// is skipped, and the primary peer is skipped only when the packet
/// originated there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketOrigin {
    /// Locally generated, no particular origin (raw `-1`).
    Local,
    /// Arrived over the primary stream connection.
    Primary,
    /// Arrived from the secondary connection with this id.
    Secondary(ConnectionId),
}

impl PacketOrigin {
    /// Map a legacy raw origin value into the typed form.
    ///
    /// `-1` is [`PacketOrigin::Local`]; anything else names a secondary
    /// connection. The primary has no raw encoding; only the receiving
    /// collaborator can tag a packet as primary-sourced.
    pub fn from_raw(raw: i32) -> Self {
        if raw == RAW_ORIGIN_LOCAL {
            Self::Local
        } else {
            Self::Secondary(ConnectionId(raw))
        }
    }

    /// Legacy raw value of this origin.
    ///
    /// [`PacketOrigin::Primary`] maps to the `-1` sentinel, the closest
    /// value the legacy convention can express.
    pub fn raw(self) -> i32 {
        match self {
            Self::Local | Self::Primary => RAW_ORIGIN_LOCAL,
            Self::Secondary(id) => id.raw(),
        }
    }
}

/// Named joint transforms of a tracked body.
///
/// Avatar move packets carry the transform of one designated root joint
/// rather than the avatar entity's own transform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvatarPose {
    joints: HashMap<String, Transform>,
}

impl AvatarPose {
    /// Create an empty pose.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) a joint's transform.
    pub fn set_joint(&mut self, name: impl Into<String>, transform: Transform) {
        self.joints.insert(name.into(), transform);
    }

    /// Look up a joint by name.
    pub fn joint(&self, name: &str) -> Option<&Transform> {
        self.joints.get(name)
    }

    /// Transform of the designated root joint, if tracked.
    pub fn root_joint(&self) -> Option<&Transform> {
        self.joint(ROOT_JOINT)
    }

    /// Number of tracked joints.
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Whether no joints are tracked.
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }
}
