//! SCENIC Protocol - Link Layer
//!
//! Connection plumbing between the sync core and the peers:
//!
//! - **Connection registry**: [`ConnectionRegistry`], the primary link's
//!   lifecycle state machine plus the live secondary connection set
//! - **Primary link**: [`PrimaryLink`], outbound TCP dial and
//!   fire-and-forget transmission (requires the `runtime` feature)
//! - **Channel transport**: [`ChannelTransport`], in-process reference
//!   transport multiplexing logical connections (requires `runtime`)
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │              Sync Layer                   │
//! │        codec, dispatcher, relay           │
//! ├───────────────────────────────────────────┤
//! │              Link Layer                   │  <- this module
//! │   registry, primary stream, transport     │
//! ├───────────────────────────────────────────┤
//! │        TCP stream / shared transport      │
//! └───────────────────────────────────────────┘
//! ```
//!
//! The registry is pure state and compiles everywhere; the primary link
//! and channel transport need tokio.

mod registry;

#[cfg(feature = "runtime")]
mod channel;
#[cfg(feature = "runtime")]
mod primary;

pub use registry::*;

#[cfg(feature = "runtime")]
pub use channel::*;
#[cfg(feature = "runtime")]
pub use primary::*;
