//! SCENIC Protocol - Sync Layer
//!
//! Turns scene state changes into wire packets and fans them out:
//!
//! - [`SyncMessage`]: the packet codec (length-prefixed, kind-tagged)
//! - [`SceneQueues`]: reference scene store with per-kind FIFO queues
//! - [`Dispatcher`]: tick-driven drain of pending events
//! - [`Relay`]: primary + secondary fan-out with origin exclusion

mod dispatcher;
mod message;
mod relay;
mod store;

pub use dispatcher::*;
pub use message::*;
pub use relay::*;
pub use store::*;
