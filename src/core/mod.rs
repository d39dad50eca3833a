//! SCENIC Protocol - Core Layer
//!
//! Always-available foundation for the protocol:
//!
//! - **Constants**: wire tags, framing sizes, well-known defaults
//! - **Errors**: encode/decode, connection, send, and config taxonomies
//! - **Types**: entity identity, transforms, origins, avatar poses
//! - **Traits**: the collaborator seams ([`SceneStore`], [`Transport`],
//!   [`PrimaryPeer`]) this crate consumes but does not populate

pub mod constants;
mod error;
mod traits;
mod types;

pub use constants::*;
pub use error::*;
pub use traits::*;
pub use types::*;
