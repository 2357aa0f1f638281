use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::message::Message;
use crate::peer::{PeerConfig, PeerState};

use super::ElectionProtocol;

/// Base per-probe delay constant; the actual wait after each probe is
/// `PROBE_DELAY_SECS * (2*id + num_nodes)` seconds.
const PROBE_DELAY_SECS: f64 = 0.01;

/// Suppresses a second `coordinator` broadcast within this window, which is
/// what absorbs the cascade of `are_you_alive` probes a live, large peer
/// receives from many smaller starters.
const ANNOUNCE_DEBOUNCE: Duration = Duration::from_secs(1);

/// Improved Bully: a starter probes higher-ranked peers one at a time, in
/// descending order, waiting a bounded delay for a `coordinator` reply
/// before moving to the next candidate.
pub struct ImprovedPeer {
    state: PeerState,
}

impl ImprovedPeer {
    pub fn new(cfg: PeerConfig) -> Self {
        ImprovedPeer { state: PeerState::new(cfg) }
    }

    fn probe_wait(&self) -> Duration {
        Duration::from_secs_f64(PROBE_DELAY_SECS * (2 * self.state.id + self.state.num_nodes) as f64)
    }

    /// Entry point. Probes candidates `num_nodes-1` down to `id+1`.
    async fn check_alive(self: &Arc<Self>) {
        self.state.running_election.store(true, Ordering::Release);

        for peer_id in ((self.state.id + 1)..self.state.num_nodes).rev() {
            self.state.send(Message::AreYouAlive(self.state.id), peer_id).await;
            tokio::time::sleep(self.probe_wait()).await;

            if !self.state.running_election.load(Ordering::Acquire) {
                // A coordinator message from a larger peer arrived.
                return;
            }
        }

        self.state.running_election.store(false, Ordering::Release);
        self.announce_coordinator().await;
    }

    async fn msg_received_rua(self: &Arc<Self>, sender_id: u32) {
        if sender_id < self.state.id {
            self.announce_coordinator().await;
        }
        // Larger senders are never expected; ignored.
    }

    async fn msg_received_coordinator(self: &Arc<Self>, sender_id: u32) {
        use std::cmp::Ordering as CmpOrdering;
        match sender_id.cmp(&self.state.id) {
            CmpOrdering::Less => {
                // Stale or mistaken announcement: start a fresh election.
                self.check_alive().await;
            }
            CmpOrdering::Greater => {
                self.state.coordinator_id.store(sender_id, Ordering::Release);
                self.state.running_election.store(false, Ordering::Release);
            }
            CmpOrdering::Equal => {}
        }
    }

    async fn announce_coordinator(&self) {
        let mut last = self.state.last_announce_time.lock().await;
        let now = Instant::now();
        if let Some(previous) = *last {
            if now <= previous + ANNOUNCE_DEBOUNCE {
                return;
            }
        }
        *last = Some(now);
        drop(last);

        tracing::info!(id = self.state.id, "announcing coordinator");
        self.state.broadcast_coordinator().await;
        self.state.has_announced.store(true, Ordering::Release);
    }
}

#[async_trait]
impl ElectionProtocol for ImprovedPeer {
    fn state(&self) -> &PeerState {
        &self.state
    }

    async fn start_election(self: Arc<Self>) {
        self.check_alive().await;
    }

    async fn handle_message(self: Arc<Self>, msg: Message) {
        match msg {
            Message::AreYouAlive(sender) => self.msg_received_rua(sender).await,
            Message::Coordinator(sender) => self.msg_received_coordinator(sender).await,
            Message::Election(_) | Message::Ok(_) | Message::Exit => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    fn make(id: u32, num_nodes: u32) -> Arc<ImprovedPeer> {
        let cfg = PeerConfig {
            id,
            num_nodes,
            base_port: 4100,
            is_starter: false,
            coordinator_id: Arc::new(AtomicU32::new(id)),
            message_count: Arc::new(AtomicU32::new(0)),
        };
        Arc::new(ImprovedPeer::new(cfg))
    }

    #[tokio::test]
    async fn coordinator_from_larger_accepted_and_stops_election() {
        let peer = make(2, 5);
        peer.state.running_election.store(true, Ordering::Release);
        peer.clone().handle_message(Message::Coordinator(4)).await;
        assert_eq!(peer.state.coordinator_id.load(Ordering::Acquire), 4);
        assert!(!peer.state.running_election.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn coordinator_from_smaller_restarts_election() {
        let peer = make(2, 5);
        // check_alive would block on real probes; assert only the flag it
        // sets before probing, to keep this a unit-level test.
        let handling = tokio::time::timeout(
            Duration::from_millis(5),
            peer.clone().handle_message(Message::Coordinator(1)),
        )
        .await;
        assert!(handling.is_err(), "check_alive should still be probing");
        assert!(peer.state.running_election.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn are_you_alive_from_smaller_triggers_debounced_announce() {
        let peer = make(2, 5);
        peer.clone().handle_message(Message::AreYouAlive(1)).await;
        assert!(peer.state.has_announced.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn are_you_alive_from_larger_is_ignored() {
        let peer = make(2, 5);
        peer.clone().handle_message(Message::AreYouAlive(4)).await;
        assert!(!peer.state.has_announced.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn second_announce_within_debounce_window_is_suppressed() {
        let peer = make(2, 5);
        peer.announce_coordinator().await;
        let sent_after_first = peer.state.message_count.load(Ordering::Relaxed);
        peer.announce_coordinator().await;
        let sent_after_second = peer.state.message_count.load(Ordering::Relaxed);
        assert_eq!(sent_after_first, sent_after_second);
    }
}
