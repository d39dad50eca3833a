//! Error types for the SCENIC protocol.

use thiserror::Error;

/// Errors that can occur when encoding a scene event into a packet.
///
/// All of these fail the single encode call; none of them is fatal to the
/// session or the process.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Spawn name does not map to any registered entity kind.
    #[error("unknown entity kind for spawn name {name:?}")]
    InvalidKind {
        /// The offending spawn name (suffix already stripped).
        name: String,
    },

    /// The avatar pose is missing the designated root joint.
    #[error("avatar pose is missing joint {joint:?}")]
    MissingJoint {
        /// Name of the joint that was looked up.
        joint: &'static str,
    },

    /// Text contains a code point outside the ASCII range.
    ///
    /// Text packets are ASCII on the wire; non-ASCII input is rejected
    /// rather than transcoded.
    #[error("text is not ASCII at byte {position}")]
    NonAsciiText {
        /// Byte index of the first non-ASCII code point.
        position: usize,
    },
}

/// Errors that can occur when decoding a packet.
///
/// A rejected packet is surfaced to the caller and dropped; the connection
/// it arrived on is never torn down.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer bytes are present than the size field declares (or fewer
    /// than a packet header).
    #[error("truncated packet: expected {expected} bytes, got {actual}")]
    TruncatedPacket {
        /// Bytes the packet declares (or the minimum header size).
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// The message tag is not in the closed tag table.
    #[error("unknown message tag {tag:#010x}")]
    UnknownKind {
        /// The unrecognized tag value.
        tag: u32,
    },

    /// The declared size disagrees with the fixed layout of this kind.
    #[error("invalid packet length for tag {tag}: expected {expected} bytes, declared {declared}")]
    InvalidLength {
        /// The message tag.
        tag: u32,
        /// Size the kind's layout requires.
        expected: usize,
        /// Size the packet declared.
        declared: usize,
    },

    /// The entity kind field is not in the closed kind enumeration.
    #[error("unknown entity kind {value}")]
    UnknownEntityKind {
        /// The unrecognized kind value.
        value: u32,
    },

    /// Text payload contains a byte outside the ASCII range.
    #[error("text payload is not ASCII at byte {position}")]
    NonAsciiText {
        /// Byte index of the first non-ASCII byte.
        position: usize,
    },
}

/// Errors that can occur when dialing the primary peer.
///
/// A failed attempt is recorded as `LinkStatus::Error` and is never
/// retried automatically; the caller must explicitly re-attempt.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The primary peer actively refused the connection.
    #[error("primary peer refused connection: {0}")]
    Refused(std::io::Error),

    /// The dial failed for any other reason (unreachable, reset, ...).
    #[error("dial failed: {0}")]
    Dial(std::io::Error),
}

/// Error transmitting a packet to a single secondary connection.
///
/// Per-destination: a failed send to one connection never aborts sends to
/// the remaining destinations or to the primary peer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The transport could not deliver to this connection.
    #[error("send to connection {connection} failed: {reason}")]
    Failed {
        /// Raw id of the destination connection.
        connection: i32,
        /// Transport-specific failure description.
        reason: String,
    },
}

/// Errors in the session configuration surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The primary peer address does not parse as an IP address.
    #[error("invalid primary peer address {address:?}")]
    InvalidAddress {
        /// The address string as configured (after trimming).
        address: String,
    },
}

/// Top-level SCENIC errors.
#[derive(Debug, Error)]
pub enum ScenicError {
    /// Encode error.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Decode error.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Connection error.
    #[error("connect error: {0}")]
    Connect(#[from] ConnectError),

    /// Send error.
    #[error("send error: {0}")]
    Send(#[from] SendError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
