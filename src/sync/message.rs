//! Scene sync message types and packet codec.
//!
//! Every message shares the same length-prefixed framing:
//!
//! ```text
//! +0   Total Size (4 bytes LE32, counts every byte incl. this field)
//! +4   Message Tag (4 bytes LE32)
//! +8   Tag-specific payload (variable)
//! ```
//!
//! All integers are two's-complement little-endian; floats are IEEE-754
//! single precision little-endian. The size field makes every packet
//! self-describing, which is the contract length-delimited reassembly on
//! the receiving side relies on.

use crate::core::constants::{
    ENTITY_ID_WIRE_SIZE, ENTITY_KIND_WIRE_SIZE, PACKET_HEADER_SIZE, ROOT_JOINT,
    TAG_AVATAR_CREATE, TAG_DELETE, TAG_OBJECT_CREATE, TAG_OBJECT_MOVE, TAG_TEXT,
    TRANSFORM_WIRE_SIZE,
};
use crate::core::{AvatarPose, DecodeError, EncodeError, EntityId, EntityKind, Transform, Vec3};

/// Wire size of an object-create packet.
pub const OBJECT_CREATE_SIZE: usize =
    PACKET_HEADER_SIZE + TRANSFORM_WIRE_SIZE + ENTITY_KIND_WIRE_SIZE + ENTITY_ID_WIRE_SIZE;

/// Wire size of an object-move (and avatar-move) packet.
pub const OBJECT_MOVE_SIZE: usize = PACKET_HEADER_SIZE + TRANSFORM_WIRE_SIZE + ENTITY_ID_WIRE_SIZE;

/// Wire size of a delete packet.
pub const DELETE_SIZE: usize = PACKET_HEADER_SIZE + ENTITY_ID_WIRE_SIZE;

/// Wire size of an avatar-create packet.
pub const AVATAR_CREATE_SIZE: usize = OBJECT_MOVE_SIZE;

/// Closed, versionless message tag table.
///
/// Both ends must share this table; there is no negotiation. Avatar moves
/// carry the [`MessageKind::ObjectMove`] tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// A new object entered the scene.
    ObjectCreate,
    /// An object (or an avatar's root joint) moved.
    ObjectMove,
    /// An object left the scene.
    Delete,
    /// A tracked avatar entered the scene.
    AvatarCreate,
    /// Free-form ASCII text.
    Text,
}

impl MessageKind {
    /// Wire tag of this kind.
    pub fn tag(self) -> u32 {
        match self {
            Self::ObjectCreate => TAG_OBJECT_CREATE,
            Self::ObjectMove => TAG_OBJECT_MOVE,
            Self::Delete => TAG_DELETE,
            Self::AvatarCreate => TAG_AVATAR_CREATE,
            Self::Text => TAG_TEXT,
        }
    }

    /// Map a wire tag back to a kind, if it is in the table.
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            TAG_OBJECT_CREATE => Some(Self::ObjectCreate),
            TAG_OBJECT_MOVE => Some(Self::ObjectMove),
            TAG_DELETE => Some(Self::Delete),
            TAG_AVATAR_CREATE => Some(Self::AvatarCreate),
            TAG_TEXT => Some(Self::Text),
            _ => None,
        }
    }
}

/// One scene synchronization message.
///
/// Construct through the associated functions (which enforce the encode
/// preconditions), then [`encode`](Self::encode) for the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncMessage {
    /// A new object: transform, kind, and freshly assigned id.
    ObjectCreate {
        /// Wire address assigned at creation.
        id: EntityId,
        /// Kind of the spawned object.
        kind: EntityKind,
        /// Transform at creation.
        transform: Transform,
    },
    /// An object moved. Also the wire shape of an avatar move, where the
    /// transform is the pose's root joint.
    ObjectMove {
        /// Wire address of the moved object.
        id: EntityId,
        /// New transform.
        transform: Transform,
    },
    /// An object was deleted.
    Delete {
        /// Wire address of the deleted object.
        id: EntityId,
    },
    /// A tracked avatar entered the scene.
    AvatarCreate {
        /// Wire address of the avatar.
        id: EntityId,
        /// The avatar entity's transform.
        transform: Transform,
    },
    /// Free-form text. Invariant: ASCII only; construct through
    /// [`SyncMessage::text`], which rejects anything else.
    Text(String),
}

impl SyncMessage {
    /// Message for a newly created object.
    pub fn object_create(id: EntityId, kind: EntityKind, transform: Transform) -> Self {
        Self::ObjectCreate { id, kind, transform }
    }

    /// Message for a newly created object, deriving the kind from its
    /// spawn-time name.
    ///
    /// Fails with [`EncodeError::InvalidKind`] if the name (instantiation
    /// suffix stripped) is not in the kind table.
    pub fn object_create_from_spawn(
        name: &str,
        id: EntityId,
        transform: Transform,
    ) -> Result<Self, EncodeError> {
        let kind = EntityKind::from_spawn_name(name)?;
        Ok(Self::ObjectCreate { id, kind, transform })
    }

    /// Message for a moved object.
    pub fn object_move(id: EntityId, transform: Transform) -> Self {
        Self::ObjectMove { id, transform }
    }

    /// Message for a deleted object.
    pub fn delete(id: EntityId) -> Self {
        Self::Delete { id }
    }

    /// Message for a newly observed avatar.
    pub fn avatar_create(id: EntityId, transform: Transform) -> Self {
        Self::AvatarCreate { id, transform }
    }

    /// Message for a moved avatar.
    ///
    /// The wire shape is identical to an object move; the transform sent
    /// is that of the pose's designated root joint, not the avatar
    /// entity's own. Fails with [`EncodeError::MissingJoint`] if the pose
    /// does not track that joint.
    pub fn avatar_move(id: EntityId, pose: &AvatarPose) -> Result<Self, EncodeError> {
        let transform = pose
            .root_joint()
            .copied()
            .ok_or(EncodeError::MissingJoint { joint: ROOT_JOINT })?;
        Ok(Self::ObjectMove { id, transform })
    }

    /// Free-form text message.
    ///
    /// Text is ASCII on the wire. Non-ASCII input fails with
    /// [`EncodeError::NonAsciiText`] instead of being transcoded or
    /// silently mangled.
    pub fn text(text: impl Into<String>) -> Result<Self, EncodeError> {
        let text = text.into();
        if let Some(position) = text.bytes().position(|b| !b.is_ascii()) {
            return Err(EncodeError::NonAsciiText { position });
        }
        Ok(Self::Text(text))
    }

    /// Kind of this message.
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::ObjectCreate { .. } => MessageKind::ObjectCreate,
            Self::ObjectMove { .. } => MessageKind::ObjectMove,
            Self::Delete { .. } => MessageKind::Delete,
            Self::AvatarCreate { .. } => MessageKind::AvatarCreate,
            Self::Text(_) => MessageKind::Text,
        }
    }

    /// Total wire size, header included.
    pub fn wire_size(&self) -> usize {
        match self {
            Self::ObjectCreate { .. } => OBJECT_CREATE_SIZE,
            Self::ObjectMove { .. } => OBJECT_MOVE_SIZE,
            Self::Delete { .. } => DELETE_SIZE,
            Self::AvatarCreate { .. } => AVATAR_CREATE_SIZE,
            Self::Text(text) => PACKET_HEADER_SIZE + text.len(),
        }
    }

    /// Encode to wire format.
    ///
    /// The returned buffer's length always equals the embedded size field.
    pub fn encode(&self) -> Vec<u8> {
        let size = self.wire_size();
        let mut buf = Vec::with_capacity(size);
        buf.extend_from_slice(&(size as u32).to_le_bytes());
        buf.extend_from_slice(&self.kind().tag().to_le_bytes());

        match self {
            Self::ObjectCreate { id, kind, transform } => {
                put_transform(&mut buf, transform);
                buf.extend_from_slice(&kind.tag().to_le_bytes());
                buf.extend_from_slice(&id.raw().to_le_bytes());
            }
            Self::ObjectMove { id, transform } | Self::AvatarCreate { id, transform } => {
                put_transform(&mut buf, transform);
                buf.extend_from_slice(&id.raw().to_le_bytes());
            }
            Self::Delete { id } => {
                buf.extend_from_slice(&id.raw().to_le_bytes());
            }
            Self::Text(text) => {
                buf.extend_from_slice(text.as_bytes());
            }
        }

        debug_assert_eq!(buf.len(), size);
        buf
    }

    /// Decode one packet from wire format.
    ///
    /// Trailing bytes beyond the declared size are ignored; use
    /// [`decode_with_length`](Self::decode_with_length) when consuming a
    /// byte stream.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < PACKET_HEADER_SIZE {
            return Err(DecodeError::TruncatedPacket {
                expected: PACKET_HEADER_SIZE,
                actual: data.len(),
            });
        }

        let declared = u32::from_le_bytes(data[0..4].try_into().unwrap()) as usize;
        let tag = u32::from_le_bytes(data[4..8].try_into().unwrap());

        if declared < PACKET_HEADER_SIZE {
            return Err(DecodeError::InvalidLength {
                tag,
                expected: PACKET_HEADER_SIZE,
                declared,
            });
        }
        if data.len() < declared {
            return Err(DecodeError::TruncatedPacket {
                expected: declared,
                actual: data.len(),
            });
        }

        let kind = MessageKind::from_tag(tag).ok_or(DecodeError::UnknownKind { tag })?;

        match kind {
            MessageKind::ObjectCreate => {
                expect_size(tag, OBJECT_CREATE_SIZE, declared)?;
                let transform = get_transform(&data[8..32]);
                let kind_tag = u32::from_le_bytes(data[32..36].try_into().unwrap());
                let kind = EntityKind::from_tag(kind_tag)
                    .ok_or(DecodeError::UnknownEntityKind { value: kind_tag })?;
                let id = EntityId(i32::from_le_bytes(data[36..40].try_into().unwrap()));
                Ok(Self::ObjectCreate { id, kind, transform })
            }
            MessageKind::ObjectMove => {
                expect_size(tag, OBJECT_MOVE_SIZE, declared)?;
                let transform = get_transform(&data[8..32]);
                let id = EntityId(i32::from_le_bytes(data[32..36].try_into().unwrap()));
                Ok(Self::ObjectMove { id, transform })
            }
            MessageKind::Delete => {
                expect_size(tag, DELETE_SIZE, declared)?;
                let id = EntityId(i32::from_le_bytes(data[8..12].try_into().unwrap()));
                Ok(Self::Delete { id })
            }
            MessageKind::AvatarCreate => {
                expect_size(tag, AVATAR_CREATE_SIZE, declared)?;
                let transform = get_transform(&data[8..32]);
                let id = EntityId(i32::from_le_bytes(data[32..36].try_into().unwrap()));
                Ok(Self::AvatarCreate { id, transform })
            }
            MessageKind::Text => {
                let payload = &data[PACKET_HEADER_SIZE..declared];
                if let Some(position) = payload.iter().position(|b| !b.is_ascii()) {
                    return Err(DecodeError::NonAsciiText { position });
                }
                // ASCII is valid UTF-8
                let text = String::from_utf8(payload.to_vec())
                    .expect("ASCII payload is valid UTF-8");
                Ok(Self::Text(text))
            }
        }
    }

    /// Decode one packet, returning the message and the bytes consumed.
    pub fn decode_with_length(data: &[u8]) -> Result<(Self, usize), DecodeError> {
        let msg = Self::decode(data)?;
        let consumed = msg.wire_size();
        Ok((msg, consumed))
    }
}

fn expect_size(tag: u32, expected: usize, declared: usize) -> Result<(), DecodeError> {
    if declared != expected {
        return Err(DecodeError::InvalidLength { tag, expected, declared });
    }
    Ok(())
}

fn put_transform(buf: &mut Vec<u8>, transform: &Transform) {
    buf.extend_from_slice(&transform.position.x.to_le_bytes());
    buf.extend_from_slice(&transform.position.y.to_le_bytes());
    buf.extend_from_slice(&transform.position.z.to_le_bytes());
    buf.extend_from_slice(&transform.rotation.x.to_le_bytes());
    buf.extend_from_slice(&transform.rotation.y.to_le_bytes());
    buf.extend_from_slice(&transform.rotation.z.to_le_bytes());
}

fn get_transform(data: &[u8]) -> Transform {
    let f = |range: std::ops::Range<usize>| f32::from_le_bytes(data[range].try_into().unwrap());
    Transform {
        position: Vec3::new(f(0..4), f(4..8), f(8..12)),
        rotation: Vec3::new(f(12..16), f(16..20), f(20..24)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_transform() -> Transform {
        Transform::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 90.0, 0.0))
    }

    #[test]
    fn test_object_create_roundtrip() {
        let msg = SyncMessage::object_create(EntityId(7), EntityKind::Sphere, sample_transform());
        let encoded = msg.encode();
        assert_eq!(encoded.len(), OBJECT_CREATE_SIZE);
        assert_eq!(SyncMessage::decode(&encoded).unwrap(), msg);
    }

    #[test]
    fn test_object_move_roundtrip() {
        let msg = SyncMessage::object_move(EntityId(42), sample_transform());
        let encoded = msg.encode();
        let decoded = SyncMessage::decode(&encoded).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(decoded.kind(), MessageKind::ObjectMove);
    }

    #[test]
    fn test_delete_roundtrip() {
        let msg = SyncMessage::delete(EntityId(3));
        let encoded = msg.encode();
        assert_eq!(encoded.len(), DELETE_SIZE);
        assert_eq!(SyncMessage::decode(&encoded).unwrap(), msg);
    }

    #[test]
    fn test_avatar_create_roundtrip() {
        let msg = SyncMessage::avatar_create(EntityId(90001), sample_transform());
        let encoded = msg.encode();
        assert_eq!(encoded.len(), AVATAR_CREATE_SIZE);
        assert_eq!(SyncMessage::decode(&encoded).unwrap(), msg);
    }

    #[test]
    fn test_size_field_matches_buffer_length() {
        let messages = [
            SyncMessage::object_create(EntityId(1), EntityKind::Cube, sample_transform()),
            SyncMessage::object_move(EntityId(2), sample_transform()),
            SyncMessage::delete(EntityId(3)),
            SyncMessage::avatar_create(EntityId(4), sample_transform()),
            SyncMessage::text("GREETINGS FROM THE COMPUTER").unwrap(),
            SyncMessage::text("").unwrap(),
        ];
        for msg in messages {
            let encoded = msg.encode();
            let declared = u32::from_le_bytes(encoded[0..4].try_into().unwrap()) as usize;
            assert_eq!(declared, encoded.len());
            assert_eq!(declared, msg.wire_size());
        }
    }

    #[test]
    fn test_cube_create_bit_exact() {
        // Cube at (1, 2, 3) rotated (0, 90, 0), id 7:
        // size 40 | tag 0 | pos | rot | kind 0 | id 7
        let msg = SyncMessage::object_create(EntityId(7), EntityKind::Cube, sample_transform());
        let encoded = msg.encode();
        let expected = hex::decode(concat!(
            "28000000", // total size = 40
            "00000000", // tag = object create
            "0000803f", "00000040", "00004040", // position (1.0, 2.0, 3.0)
            "00000000", "0000b442", "00000000", // rotation (0.0, 90.0, 0.0)
            "00000000", // kind = cube
            "07000000", // id = 7
        ))
        .unwrap();
        assert_eq!(encoded, expected);

        let decoded = SyncMessage::decode(&encoded).unwrap();
        assert_eq!(
            decoded,
            SyncMessage::ObjectCreate {
                id: EntityId(7),
                kind: EntityKind::Cube,
                transform: sample_transform(),
            }
        );
    }

    #[test]
    fn test_text_hello() {
        let msg = SyncMessage::text("Hello").unwrap();
        let encoded = msg.encode();
        assert_eq!(encoded.len(), 13);
        assert_eq!(&encoded[8..], b"Hello");

        match SyncMessage::decode(&encoded).unwrap() {
            SyncMessage::Text(text) => assert_eq!(text, "Hello"),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_text_rejects_non_ascii() {
        let err = SyncMessage::text("na\u{ef}ve").unwrap_err();
        assert_eq!(err, EncodeError::NonAsciiText { position: 2 });
    }

    #[test]
    fn test_avatar_move_uses_root_joint_and_move_tag() {
        let mut pose = AvatarPose::new();
        let spine = Transform::new(Vec3::new(0.5, 1.0, 0.5), Vec3::new(0.0, 45.0, 0.0));
        pose.set_joint("SpineBase", spine);
        pose.set_joint("Head", sample_transform());

        let msg = SyncMessage::avatar_move(EntityId(12345), &pose).unwrap();
        assert_eq!(msg.kind(), MessageKind::ObjectMove);

        let encoded = msg.encode();
        let decoded = SyncMessage::decode(&encoded).unwrap();
        assert_eq!(decoded, SyncMessage::ObjectMove { id: EntityId(12345), transform: spine });
    }

    #[test]
    fn test_avatar_move_missing_joint() {
        let mut pose = AvatarPose::new();
        pose.set_joint("Head", sample_transform());

        let err = SyncMessage::avatar_move(EntityId(1), &pose).unwrap_err();
        assert_eq!(err, EncodeError::MissingJoint { joint: "SpineBase" });
    }

    #[test]
    fn test_object_create_from_spawn() {
        let msg =
            SyncMessage::object_create_from_spawn("Sphere(Clone)", EntityId(9), sample_transform())
                .unwrap();
        match msg {
            SyncMessage::ObjectCreate { kind, id, .. } => {
                assert_eq!(kind, EntityKind::Sphere);
                assert_eq!(id, EntityId(9));
            }
            other => panic!("expected object create, got {other:?}"),
        }

        let err =
            SyncMessage::object_create_from_spawn("Teapot(Clone)", EntityId(9), sample_transform())
                .unwrap_err();
        assert!(matches!(err, EncodeError::InvalidKind { .. }));
    }

    #[test]
    fn test_decode_short_header() {
        let result = SyncMessage::decode(&[0u8; 5]);
        assert_eq!(
            result,
            Err(DecodeError::TruncatedPacket { expected: PACKET_HEADER_SIZE, actual: 5 })
        );
    }

    #[test]
    fn test_decode_truncated_payload() {
        let mut encoded = SyncMessage::object_move(EntityId(1), sample_transform()).encode();
        encoded.truncate(20);

        let result = SyncMessage::decode(&encoded);
        assert_eq!(
            result,
            Err(DecodeError::TruncatedPacket { expected: OBJECT_MOVE_SIZE, actual: 20 })
        );
    }

    #[test]
    fn test_decode_unknown_tag() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&12u32.to_le_bytes());
        buf.extend_from_slice(&0xDEADu32.to_le_bytes());
        buf.extend_from_slice(&7i32.to_le_bytes());

        let result = SyncMessage::decode(&buf);
        assert_eq!(result, Err(DecodeError::UnknownKind { tag: 0xDEAD }));
    }

    #[test]
    fn test_decode_length_mismatch() {
        // A move packet whose declared size disagrees with the move layout
        let mut encoded = SyncMessage::object_move(EntityId(1), sample_transform()).encode();
        encoded[0..4].copy_from_slice(&30u32.to_le_bytes());

        let result = SyncMessage::decode(&encoded);
        assert_eq!(
            result,
            Err(DecodeError::InvalidLength {
                tag: TAG_OBJECT_MOVE,
                expected: OBJECT_MOVE_SIZE,
                declared: 30
            })
        );
    }

    #[test]
    fn test_decode_unknown_entity_kind() {
        let mut encoded =
            SyncMessage::object_create(EntityId(7), EntityKind::Cube, sample_transform()).encode();
        encoded[32..36].copy_from_slice(&77u32.to_le_bytes());

        let result = SyncMessage::decode(&encoded);
        assert_eq!(result, Err(DecodeError::UnknownEntityKind { value: 77 }));
    }

    #[test]
    fn test_decode_non_ascii_text_payload() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&10u32.to_le_bytes());
        buf.extend_from_slice(&TAG_TEXT.to_le_bytes());
        buf.extend_from_slice(&[b'h', 0xFF]);

        let result = SyncMessage::decode(&buf);
        assert_eq!(result, Err(DecodeError::NonAsciiText { position: 1 }));
    }

    #[test]
    fn test_decode_with_length_trailing_data() {
        let msg = SyncMessage::delete(EntityId(5));
        let mut data = msg.encode();
        data.extend_from_slice(&[0xFF; 32]);

        let (decoded, consumed) = SyncMessage::decode_with_length(&data).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(consumed, DELETE_SIZE);
    }
}
