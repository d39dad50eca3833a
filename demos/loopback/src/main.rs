//! SCENIC loopback demo.
//!
//! Runs a whole shared-scene session inside one process: a TCP listener
//! standing in for the primary peer, two channel-transport secondaries,
//! and a session ticking through a scripted set of scene changes. Run
//! with `RUST_LOG=debug` to watch the relay decisions.

use std::error::Error;
use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scenic_protocol::core::{
    AvatarPose, AvatarSnapshot, ConnectionId, EntityId, EntityKind, EntityUpdate, ForwardRequest,
    PacketOrigin, SpawnRequest, Transform, Vec3,
};
use scenic_protocol::link::{ChannelTransport, ConnectionRegistry};
use scenic_protocol::session::{SessionConfigBuilder, SyncSession};
use scenic_protocol::sync::{SceneQueues, SyncMessage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // A local listener stands in for the primary peer
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let primary_addr = listener.local_addr()?;
    info!(%primary_addr, "primary peer listening");

    let registry = Arc::new(ConnectionRegistry::new());
    let transport = Arc::new(ChannelTransport::new(Arc::clone(&registry)));

    let config = SessionConfigBuilder::new()
        .primary_address(primary_addr.ip().to_string())
        .primary_port(primary_addr.port())
        .build();
    let mut session =
        SyncSession::with_registry(config, SceneQueues::new(), Arc::clone(&registry), Arc::clone(&transport))?;

    // Dial out, then let the "receiving side" complete its half of the
    // handshake so the link becomes ready
    session.attempt_primary().await?;
    let (primary_side, _) = listener.accept().await?;
    registry.mark_remote_ready();

    let primary_task = tokio::spawn(read_primary(primary_side));

    // Two secondary peers join through the shared transport
    let rx10 = transport.open(ConnectionId(10)).expect("connection 10 is fresh");
    let rx20 = transport.open(ConnectionId(20)).expect("connection 20 is fresh");
    let peer10 = tokio::spawn(read_secondary(10, rx10));
    let peer20 = tokio::spawn(read_secondary(20, rx20));

    script_scene(session.store_mut());

    // Drive the dispatcher the way a frame loop would
    let mut interval = tokio::time::interval(std::time::Duration::from_millis(16));
    loop {
        interval.tick().await;
        if session.tick() == 0 {
            break;
        }
    }

    // Closing the secondaries ends their reader tasks
    transport.close(ConnectionId(10));
    transport.close(ConnectionId(20));
    peer10.await?;
    peer20.await?;

    // Give the fire-and-forget primary writes a moment to land
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    primary_task.abort();

    info!("loopback session complete");
    Ok(())
}

/// The scripted scene: a cube is spawned and pushed around, an avatar
/// walks through, a couple of text messages go out, and one packet
/// arrives from connection 10 to be relayed onward.
fn script_scene(store: &mut SceneQueues) {
    let origin = Transform::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 90.0, 0.0));

    store.push_spawned_entity(SpawnRequest { kind: EntityKind::Cube, transform: origin });
    store.push_moved_entity(EntityUpdate {
        id: EntityId(1),
        transform: Transform::new(Vec3::new(1.5, 2.0, 3.0), Vec3::new(0.0, 95.0, 0.0)),
    });

    let mut pose = AvatarPose::new();
    pose.set_joint("SpineBase", Transform::new(Vec3::new(0.0, 1.0, 0.0), Vec3::default()));
    store.push_new_avatar(AvatarSnapshot { id: EntityId(90001), transform: origin, pose: pose.clone() });
    store.push_moved_avatar(AvatarSnapshot { id: EntityId(90001), transform: origin, pose });

    store.push_outbound_text("GREETINGS FROM THE COMPUTER");
    store.push_outbound_text("Hello");

    store.push_forwarded_packet(ForwardRequest {
        packet: SyncMessage::object_move(EntityId(1), origin).encode(),
        origin: PacketOrigin::Secondary(ConnectionId(10)),
    });

    store.push_deleted_entity(EntityId(1));
}

/// Reads the primary-side stream, reassembling packets from the length
/// prefix (TCP may coalesce or split them arbitrarily).
async fn read_primary(mut stream: tokio::net::TcpStream) {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buffer.extend_from_slice(&chunk[..n]);

        loop {
            match SyncMessage::decode_with_length(&buffer) {
                Ok((msg, consumed)) => {
                    info!(peer = "primary", ?msg, "received");
                    buffer.drain(..consumed);
                }
                // Partial packet: wait for more bytes
                Err(scenic_protocol::DecodeError::TruncatedPacket { .. }) => break,
                Err(err) => {
                    info!(peer = "primary", %err, "rejected packet, closing");
                    return;
                }
            }
        }
    }
}

/// Logs every packet one secondary connection receives.
async fn read_secondary(id: i32, mut rx: mpsc::UnboundedReceiver<Vec<u8>>) {
    while let Some(packet) = rx.recv().await {
        match SyncMessage::decode(&packet) {
            Ok(msg) => info!(peer = id, ?msg, "received"),
            Err(err) => info!(peer = id, %err, "rejected packet"),
        }
    }
}
