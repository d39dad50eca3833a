//! Connection registry: primary link lifecycle plus the secondary set.
//!
//! The registry is the single source of truth the relay consults on every
//! send. It is internally synchronized so it can be shared behind an
//! `Arc`: the status is an atomic with acquire/release ordering, the
//! secondary set sits behind a lock. Each field still has one logical
//! writer: the establisher (and the receiving-side collaborator) for the
//! status, the transport collaborator for the set.

use std::collections::BTreeSet;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU8, Ordering};

use tracing::debug;

use crate::core::ConnectionId;

/// Lifecycle state of the primary stream connection.
///
/// The machine is deliberately small and one-directional:
///
/// ```text
/// Disconnected|Error --attempt--> Attempting --success--> Connected
///                                 Attempting --failure--> Error
/// Connected|Disconnected --remote ready--> Ready
/// ```
///
/// `Ready` is set by the receiving-side collaborator once the remote peer
/// has completed the inbound half of the dual-socket handshake, and is
/// the only state in which the relay transmits to the primary. There is
/// no transition out of `Ready`, and the only way out of `Error` is an
/// explicit new attempt; reconnection otherwise means restarting the
/// process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LinkStatus {
    /// No connection and no attempt made yet.
    Disconnected = 0,
    /// A dial is in flight.
    Attempting = 1,
    /// The outbound dial succeeded.
    Connected = 2,
    /// The remote peer completed its inbound handshake; transmit enabled.
    Ready = 3,
    /// The last dial failed.
    Error = 4,
}

impl LinkStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Disconnected,
            1 => Self::Attempting,
            2 => Self::Connected,
            3 => Self::Ready,
            _ => Self::Error,
        }
    }
}

impl std::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Attempting => "attempting",
            Self::Connected => "connected",
            Self::Ready => "ready",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Tracks the primary connection's lifecycle and the live secondary
/// connection ids.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    status: AtomicU8,
    secondaries: RwLock<BTreeSet<ConnectionId>>,
}

impl ConnectionRegistry {
    /// Create a registry with the primary `Disconnected` and no
    /// secondaries.
    pub fn new() -> Self {
        Self {
            status: AtomicU8::new(LinkStatus::Disconnected as u8),
            secondaries: RwLock::new(BTreeSet::new()),
        }
    }

    /// Current primary link status.
    pub fn status(&self) -> LinkStatus {
        LinkStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Whether the relay may transmit to the primary peer.
    pub fn is_primary_ready(&self) -> bool {
        self.status() == LinkStatus::Ready
    }

    /// Record the start of a dial. Allowed from `Disconnected` and
    /// `Error`; any other state rejects the transition.
    pub fn begin_attempt(&self) -> bool {
        self.transition(&[LinkStatus::Disconnected, LinkStatus::Error], LinkStatus::Attempting)
    }

    /// Record a successful dial. Allowed from `Attempting` only.
    pub fn mark_connected(&self) -> bool {
        self.transition(&[LinkStatus::Attempting], LinkStatus::Connected)
    }

    /// Record a failed dial. Allowed from `Attempting` only.
    pub fn mark_failed(&self) -> bool {
        self.transition(&[LinkStatus::Attempting], LinkStatus::Error)
    }

    /// Record the remote peer's inbound handshake completing.
    ///
    /// Allowed from `Connected` and `Disconnected` only: in particular a
    /// failed link (`Error`) never becomes `Ready` without a successful
    /// re-attempt in between.
    pub fn mark_remote_ready(&self) -> bool {
        self.transition(&[LinkStatus::Connected, LinkStatus::Disconnected], LinkStatus::Ready)
    }

    fn transition(&self, from: &[LinkStatus], to: LinkStatus) -> bool {
        let mut current = self.status.load(Ordering::Acquire);
        loop {
            if !from.iter().any(|s| *s as u8 == current) {
                debug!(
                    current = %LinkStatus::from_u8(current),
                    requested = %to,
                    "ignoring link status transition"
                );
                return false;
            }
            match self.status.compare_exchange_weak(
                current,
                to as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    /// Add a secondary connection. Returns `false` if it was already
    /// registered.
    pub fn register_secondary(&self, id: ConnectionId) -> bool {
        let inserted = self
            .secondaries
            .write()
            .expect("secondary set lock poisoned")
            .insert(id);
        if inserted {
            debug!(connection = %id, "secondary connection registered");
        }
        inserted
    }

    /// Remove a secondary connection. Returns `false` if it was not
    /// registered.
    pub fn unregister_secondary(&self, id: ConnectionId) -> bool {
        let removed = self
            .secondaries
            .write()
            .expect("secondary set lock poisoned")
            .remove(&id);
        if removed {
            debug!(connection = %id, "secondary connection unregistered");
        }
        removed
    }

    /// Snapshot of the live secondary connection ids.
    pub fn secondary_ids(&self) -> Vec<ConnectionId> {
        self.secondaries
            .read()
            .expect("secondary set lock poisoned")
            .iter()
            .copied()
            .collect()
    }

    /// Number of live secondary connections.
    pub fn secondary_count(&self) -> usize {
        self.secondaries.read().expect("secondary set lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let registry = ConnectionRegistry::new();
        assert_eq!(registry.status(), LinkStatus::Disconnected);
        assert!(!registry.is_primary_ready());
        assert!(registry.secondary_ids().is_empty());
    }

    #[test]
    fn test_successful_dial_path() {
        let registry = ConnectionRegistry::new();
        assert!(registry.begin_attempt());
        assert_eq!(registry.status(), LinkStatus::Attempting);
        assert!(registry.mark_connected());
        assert_eq!(registry.status(), LinkStatus::Connected);
        assert!(registry.mark_remote_ready());
        assert_eq!(registry.status(), LinkStatus::Ready);
        assert!(registry.is_primary_ready());
    }

    #[test]
    fn test_failed_dial_path() {
        let registry = ConnectionRegistry::new();
        registry.begin_attempt();
        assert!(registry.mark_failed());
        assert_eq!(registry.status(), LinkStatus::Error);
    }

    #[test]
    fn test_reattempt_from_error() {
        let registry = ConnectionRegistry::new();
        registry.begin_attempt();
        registry.mark_failed();

        // Explicit re-attempt is the only way out of Error
        assert!(registry.begin_attempt());
        assert_eq!(registry.status(), LinkStatus::Attempting);
        assert!(registry.mark_connected());
        assert_eq!(registry.status(), LinkStatus::Connected);
    }

    #[test]
    fn test_error_never_silently_ready() {
        let registry = ConnectionRegistry::new();
        registry.begin_attempt();
        registry.mark_failed();

        assert!(!registry.mark_remote_ready());
        assert_eq!(registry.status(), LinkStatus::Error);
    }

    #[test]
    fn test_remote_ready_from_disconnected() {
        // The inbound handshake can land before any outward dial
        let registry = ConnectionRegistry::new();
        assert!(registry.mark_remote_ready());
        assert_eq!(registry.status(), LinkStatus::Ready);
    }

    #[test]
    fn test_remote_ready_rejected_while_attempting() {
        let registry = ConnectionRegistry::new();
        registry.begin_attempt();
        assert!(!registry.mark_remote_ready());
        assert_eq!(registry.status(), LinkStatus::Attempting);
    }

    #[test]
    fn test_ready_is_terminal() {
        let registry = ConnectionRegistry::new();
        registry.mark_remote_ready();

        assert!(!registry.begin_attempt());
        assert!(!registry.mark_connected());
        assert!(!registry.mark_failed());
        assert_eq!(registry.status(), LinkStatus::Ready);
    }

    #[test]
    fn test_connected_requires_attempt() {
        let registry = ConnectionRegistry::new();
        assert!(!registry.mark_connected());
        assert!(!registry.mark_failed());
        assert_eq!(registry.status(), LinkStatus::Disconnected);
    }

    #[test]
    fn test_secondary_set() {
        let registry = ConnectionRegistry::new();
        assert!(registry.register_secondary(ConnectionId(10)));
        assert!(registry.register_secondary(ConnectionId(20)));
        assert!(!registry.register_secondary(ConnectionId(10)));
        assert_eq!(registry.secondary_count(), 2);
        assert_eq!(registry.secondary_ids(), vec![ConnectionId(10), ConnectionId(20)]);

        assert!(registry.unregister_secondary(ConnectionId(10)));
        assert!(!registry.unregister_secondary(ConnectionId(10)));
        assert_eq!(registry.secondary_ids(), vec![ConnectionId(20)]);
    }
}
