//! High-level synchronization session.
//!
//! Ties the pieces together for one shared-scene session: the connection
//! registry, the primary link, and the dispatcher over an injected scene
//! store and transport. The session itself stays passive: an external
//! scheduler calls [`tick`](SyncSession::tick), the receiving-side
//! collaborator flips the registry to ready, and the transport
//! collaborator maintains the secondary set.

use std::sync::Arc;

use crate::core::{ConfigError, ConnectError, SceneStore, Transport};
use crate::link::{ConnectionRegistry, PrimaryLink};
use crate::sync::{Dispatcher, Relay};

use super::config::SessionConfig;

/// One shared-scene synchronization session.
///
/// Generic over the scene store `S` and the secondary transport `T`.
///
/// # Example
///
/// ```ignore
/// use scenic_protocol::prelude::*;
///
/// let registry = Arc::new(ConnectionRegistry::new());
/// let transport = Arc::new(ChannelTransport::new(Arc::clone(&registry)));
/// let config = SessionConfigBuilder::new()
///     .primary_address("192.168.0.42")
///     .build();
///
/// let mut session =
///     SyncSession::with_registry(config, SceneQueues::new(), registry, transport)?;
///
/// session.attempt_primary().await?;
/// loop {
///     session.store_mut().push_outbound_text("Hello");
///     session.tick();
/// }
/// ```
#[derive(Debug)]
pub struct SyncSession<S, T> {
    config: SessionConfig,
    registry: Arc<ConnectionRegistry>,
    primary: Arc<PrimaryLink>,
    dispatcher: Dispatcher<S, Arc<PrimaryLink>, T>,
}

impl<S: SceneStore, T: Transport> SyncSession<S, T> {
    /// Create a session with a fresh registry.
    ///
    /// Fails with [`ConfigError::InvalidAddress`] if the configured
    /// primary address does not parse; nothing is dialed yet.
    pub fn new(config: SessionConfig, store: S, transport: T) -> Result<Self, ConfigError> {
        Self::with_registry(config, store, Arc::new(ConnectionRegistry::new()), transport)
    }

    /// Create a session over an existing registry.
    ///
    /// Use this when the transport collaborator already mirrors its
    /// connections into the registry (for example
    /// [`ChannelTransport`](crate::link::ChannelTransport)).
    pub fn with_registry(
        config: SessionConfig,
        store: S,
        registry: Arc<ConnectionRegistry>,
        transport: T,
    ) -> Result<Self, ConfigError> {
        let endpoint = config.primary_endpoint()?;
        let primary = Arc::new(PrimaryLink::new(endpoint, Arc::clone(&registry)));
        let relay = Relay::new(Arc::clone(&registry), Arc::clone(&primary), transport);
        let dispatcher = Dispatcher::new(store, relay);
        Ok(Self { config, registry, primary, dispatcher })
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Shared registry handle.
    ///
    /// Hand clones of this to the receiving-side collaborator (which
    /// signals remote-ready) and to the transport collaborator (which
    /// maintains the secondary set).
    pub fn registry(&self) -> Arc<ConnectionRegistry> {
        Arc::clone(&self.registry)
    }

    /// The primary link.
    pub fn primary(&self) -> &Arc<PrimaryLink> {
        &self.primary
    }

    /// Scene store, for inspection.
    pub fn store(&self) -> &S {
        self.dispatcher.store()
    }

    /// Scene store, for the application side to enqueue events.
    pub fn store_mut(&mut self) -> &mut S {
        self.dispatcher.store_mut()
    }

    /// Dial the primary peer once.
    ///
    /// No retry and no timeout; see [`PrimaryLink::attempt`]. On failure
    /// the registry is left in `Error` and the caller decides whether to
    /// re-attempt.
    pub async fn attempt_primary(&self) -> Result<(), ConnectError> {
        self.primary.attempt().await
    }

    /// Run one synchronization tick, draining pending scene events onto
    /// the wire. Returns the number of packets handed to the relay.
    pub fn tick(&mut self) -> usize {
        self.dispatcher.tick()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ConnectionId, EntityId, EntityKind, ForwardRequest, PacketOrigin, SpawnRequest, Transform};
    use crate::link::ChannelTransport;
    use crate::session::SessionConfigBuilder;
    use crate::sync::{SceneQueues, SyncMessage};

    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn channel_session() -> (
        SyncSession<SceneQueues, Arc<ChannelTransport>>,
        Arc<ChannelTransport>,
    ) {
        let registry = Arc::new(ConnectionRegistry::new());
        let transport = Arc::new(ChannelTransport::new(Arc::clone(&registry)));
        let session = SyncSession::with_registry(
            SessionConfig::default(),
            SceneQueues::new(),
            registry,
            Arc::clone(&transport),
        )
        .unwrap();
        (session, transport)
    }

    #[test]
    fn test_invalid_address_rejected_at_construction() {
        let config = SessionConfigBuilder::new().primary_address("primary.local").build();
        let registry = Arc::new(ConnectionRegistry::new());
        let transport = Arc::new(ChannelTransport::new(Arc::clone(&registry)));

        let result = SyncSession::new(config, SceneQueues::new(), transport);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_tick_fans_out_to_secondaries() {
        let (mut session, transport) = channel_session();
        let mut rx10 = transport.open(ConnectionId(10)).unwrap();
        let mut rx20 = transport.open(ConnectionId(20)).unwrap();

        session.store_mut().push_spawned_entity(SpawnRequest {
            kind: EntityKind::Cube,
            transform: Transform::default(),
        });

        assert_eq!(session.tick(), 1);

        for rx in [&mut rx10, &mut rx20] {
            let bytes = rx.recv().await.unwrap();
            let msg = SyncMessage::decode(&bytes).unwrap();
            assert!(matches!(msg, SyncMessage::ObjectCreate { id: EntityId(1), .. }));
        }
    }

    #[tokio::test]
    async fn test_forwarded_packet_not_echoed_to_origin() {
        let (mut session, transport) = channel_session();
        let mut rx10 = transport.open(ConnectionId(10)).unwrap();
        let mut rx20 = transport.open(ConnectionId(20)).unwrap();

        let packet = SyncMessage::delete(EntityId(7)).encode();
        session.store_mut().push_forwarded_packet(ForwardRequest {
            packet: packet.clone(),
            origin: PacketOrigin::Secondary(ConnectionId(10)),
        });

        assert_eq!(session.tick(), 1);

        assert_eq!(rx20.recv().await.unwrap(), packet);
        assert!(rx10.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_primary_receives_after_ready() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let registry = Arc::new(ConnectionRegistry::new());
        let transport = Arc::new(ChannelTransport::new(Arc::clone(&registry)));
        let config = SessionConfigBuilder::new()
            .primary_address(addr.ip().to_string())
            .primary_port(addr.port())
            .build();
        let mut session = SyncSession::with_registry(
            config,
            SceneQueues::new(),
            Arc::clone(&registry),
            transport,
        )
        .unwrap();

        session.attempt_primary().await.unwrap();
        let (mut primary_side, _) = listener.accept().await.unwrap();

        // Not ready yet: the tick must not touch the primary path
        session.store_mut().push_deleted_entity(EntityId(1));
        session.tick();

        // The receiving-side collaborator completes the handshake
        registry.mark_remote_ready();
        session.store_mut().push_deleted_entity(EntityId(2));
        session.tick();

        let expected = SyncMessage::delete(EntityId(2)).encode();
        let mut received = vec![0u8; expected.len()];
        primary_side.read_exact(&mut received).await.unwrap();
        assert_eq!(received, expected);
    }
}
