use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::UdpSocket;
use tokio::sync::Mutex;

use crate::message::Message;
use crate::timer::Timer;

/// Fixed per-send settle delay, applied before every outbound datagram in
/// both protocols.
const SEND_DELAY: Duration = Duration::from_millis(10);

/// Everything the harness hands a freshly constructed peer. The two atomics
/// are owned by the harness and outlive the peer's task pair, which is how
/// post-run state is observed without cross-process shared memory.
#[derive(Clone)]
pub struct PeerConfig {
    pub id: u32,
    pub num_nodes: u32,
    pub base_port: u16,
    pub is_starter: bool,
    pub coordinator_id: Arc<AtomicU32>,
    pub message_count: Arc<AtomicU32>,
}

/// Mutable per-peer state shared between the starter and listener tasks.
///
/// `running_election` and `has_announced` only ever move one way
/// (true->false and false->true respectively); every write below keeps to
/// that direction and uses `AcqRel`/`Acquire` so the two tasks agree on
/// ordering without a lock.
pub struct PeerState {
    pub id: u32,
    pub num_nodes: u32,
    pub base_port: u16,
    pub is_starter: bool,
    pub coordinator_id: Arc<AtomicU32>,
    pub message_count: Arc<AtomicU32>,
    pub running_election: AtomicBool,
    pub has_announced: AtomicBool,
    pub last_announce_time: Mutex<Option<Instant>>,
    pub timer: Mutex<Option<Timer>>,
}

impl PeerState {
    pub fn new(cfg: PeerConfig) -> Self {
        cfg.coordinator_id.store(cfg.id, Ordering::Release);
        PeerState {
            id: cfg.id,
            num_nodes: cfg.num_nodes,
            base_port: cfg.base_port,
            is_starter: cfg.is_starter,
            coordinator_id: cfg.coordinator_id,
            message_count: cfg.message_count,
            running_election: AtomicBool::new(false),
            has_announced: AtomicBool::new(false),
            last_announce_time: Mutex::new(None),
            timer: Mutex::new(None),
        }
    }

    /// While this holds, the listener keeps running: the peer still
    /// considers itself a potential winner and hasn't announced yet.
    pub fn should_keep_listening(&self) -> bool {
        self.coordinator_id.load(Ordering::Acquire) == self.id
            && !self.has_announced.load(Ordering::Acquire)
    }

    /// Send one datagram to `peer_id`, via a fresh ephemeral socket per send.
    /// Peers listen on well-known ports (`base_port + id`) but never need a
    /// stable port of their own to send from.
    pub async fn send(&self, msg: Message, peer_id: u32) {
        tokio::time::sleep(SEND_DELAY).await;

        let addr = (std::net::Ipv4Addr::LOCALHOST, self.base_port + peer_id as u16);
        let Ok(socket) = UdpSocket::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await else {
            tracing::warn!(id = self.id, peer_id, "failed to bind ephemeral send socket");
            return;
        };
        if let Err(err) = socket.send_to(msg.encode().as_bytes(), addr).await {
            tracing::warn!(id = self.id, peer_id, %err, "send failed");
            return;
        }
        self.message_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Broadcast `coordinator <id>` to every peer in `[0, num_nodes)`,
    /// including this peer itself (harmless: by the time it would be
    /// processed, this peer's own termination predicate has flipped).
    pub async fn broadcast_coordinator(&self) {
        for peer_id in 0..self.num_nodes {
            self.send(Message::Coordinator(self.id), peer_id).await;
        }
    }
}
