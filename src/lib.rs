//! # SCENIC Protocol
//!
//! **S**cene-**C**hange **E**ncoding and **N**etwork **I**nterchange **C**ore
//!
//! SCENIC synchronizes shared scene entities (creation, movement,
//! deletion, avatar tracking) across a small set of heterogeneous peers:
//! one privileged *primary* peer on a dedicated stream connection, and
//! any number of *secondary* peers behind a shared multiplexing
//! transport. It provides:
//!
//! - **Framing**: every message is a self-describing, length-prefixed
//!   binary packet (`[u32 size][u32 tag][payload]`, little-endian)
//! - **Fan-out**: one state change reaches every peer; relayed packets
//!   reach every peer *except* the one they came from
//! - **Readiness gating**: the primary peer is only written to once the
//!   asymmetric dual-socket handshake has completed in both directions
//! - **Best effort**: no acks, no retransmission, no backpressure; a
//!   peer that misses an update stays behind
//!
//! ## Feature Flags
//!
//! - `runtime` (default): tokio-backed primary link, channel transport,
//!   and session driver
//!
//! ## Modules
//!
//! - [`core`]: constants, error taxonomy, shared types, collaborator
//!   traits (always included)
//! - [`sync`]: packet codec, scene queues, dispatcher, relay (always
//!   included)
//! - [`link`]: connection registry (always included); primary link and
//!   channel transport (require `runtime`)
//! - [`session`]: high-level session API (requires `runtime`)
//!
//! ## Example Usage
//!
//! ```
//! use scenic_protocol::sync::SyncMessage;
//! use scenic_protocol::core::{EntityId, EntityKind, Transform, Vec3};
//!
//! // Encode a scene change...
//! let transform = Transform::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 90.0, 0.0));
//! let msg = SyncMessage::object_create(EntityId(7), EntityKind::Cube, transform);
//! let packet = msg.encode();
//!
//! // ...every packet declares its own length...
//! assert_eq!(packet.len(), 40);
//! assert_eq!(u32::from_le_bytes(packet[0..4].try_into().unwrap()), 40);
//!
//! // ...and decodes back symmetrically.
//! assert_eq!(SyncMessage::decode(&packet).unwrap(), msg);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

// Link layer (registry always; sockets feature-gated internally)
pub mod link;

// Sync layer (always included)
pub mod sync;

// Session API (feature-gated)
#[cfg(feature = "runtime")]
#[cfg_attr(docsrs, doc(cfg(feature = "runtime")))]
pub mod session;

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types, errors, and collaborator traits
    pub use crate::core::*;

    // Link layer
    pub use crate::link::*;

    // Sync layer
    pub use crate::sync::*;

    // Session API (when enabled)
    #[cfg(feature = "runtime")]
    pub use crate::session::*;
}

// Re-export commonly used items at crate root
pub use crate::core::{
    ConnectionId, DecodeError, EncodeError, EntityId, EntityKind, PacketOrigin, ScenicError,
    Transform,
};
pub use crate::link::{ConnectionRegistry, LinkStatus};
pub use crate::sync::{Dispatcher, MessageKind, Relay, SceneQueues, SyncMessage};

#[cfg(feature = "runtime")]
pub use crate::link::{ChannelTransport, PrimaryLink};

#[cfg(feature = "runtime")]
pub use crate::session::{SessionConfig, SessionConfigBuilder, SyncSession};
