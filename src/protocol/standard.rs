use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::message::Message;
use crate::peer::{PeerConfig, PeerState};
use crate::timer::Timer;

use super::ElectionProtocol;

/// Classical Bully: a starter announces `election` to every larger peer,
/// waits `0.2 * num_nodes` seconds for a cancelling `OK`, and otherwise
/// declares itself coordinator when the timer fires.
pub struct StandardPeer {
    state: PeerState,
}

impl StandardPeer {
    pub fn new(cfg: PeerConfig) -> Self {
        StandardPeer { state: PeerState::new(cfg) }
    }

    fn election_wait(&self) -> Duration {
        Duration::from_secs_f64(0.2 * self.state.num_nodes as f64)
    }

    /// Entry point. No-op if an election is already running on this peer.
    async fn run_election(self: &Arc<Self>) {
        if self.state.running_election.swap(true, Ordering::AcqRel) {
            return;
        }

        tracing::debug!(id = self.state.id, "starting election");

        let this = Arc::clone(self);
        let timer = Timer::start(self.election_wait(), move || async move {
            this.announce_coordinator().await;
        });
        *self.state.timer.lock().await = Some(timer);

        for peer_id in (self.state.id + 1)..self.state.num_nodes {
            self.state.send(Message::Election(self.state.id), peer_id).await;
        }
    }

    async fn msg_received_election(self: &Arc<Self>, sender_id: u32) {
        if sender_id < self.state.id {
            self.state.send(Message::Ok(self.state.id), sender_id).await;
            self.run_election().await;
        }
        // Larger senders are ignored: they'll announce themselves.
    }

    async fn msg_received_ok(self: &Arc<Self>, _sender_id: u32) {
        if self.state.running_election.swap(false, Ordering::AcqRel) {
            if let Some(timer) = self.state.timer.lock().await.take() {
                timer.cancel();
            }
        }
    }

    async fn msg_received_coordinator(&self, sender_id: u32) {
        self.state.coordinator_id.store(sender_id, Ordering::Release);
    }

    async fn announce_coordinator(self: &Arc<Self>) {
        tracing::info!(id = self.state.id, "announcing coordinator");
        self.state.broadcast_coordinator().await;
        self.state.running_election.store(false, Ordering::Release);
        self.state.has_announced.store(true, Ordering::Release);
    }
}

#[async_trait]
impl ElectionProtocol for StandardPeer {
    fn state(&self) -> &PeerState {
        &self.state
    }

    async fn start_election(self: Arc<Self>) {
        self.run_election().await;
    }

    async fn handle_message(self: Arc<Self>, msg: Message) {
        match msg {
            Message::Election(sender) => self.msg_received_election(sender).await,
            Message::Ok(sender) => self.msg_received_ok(sender).await,
            Message::Coordinator(sender) => self.msg_received_coordinator(sender).await,
            Message::AreYouAlive(_) | Message::Exit => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    fn make(id: u32, num_nodes: u32) -> Arc<StandardPeer> {
        let cfg = PeerConfig {
            id,
            num_nodes,
            base_port: 4000,
            is_starter: false,
            coordinator_id: Arc::new(AtomicU32::new(id)),
            message_count: Arc::new(AtomicU32::new(0)),
        };
        Arc::new(StandardPeer::new(cfg))
    }

    #[tokio::test]
    async fn election_from_smaller_sends_ok_and_starts_own_election() {
        let peer = make(2, 5);
        peer.clone().handle_message(Message::Election(1)).await;
        assert!(peer.state.running_election.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn election_from_larger_is_ignored() {
        let peer = make(2, 5);
        peer.clone().handle_message(Message::Election(3)).await;
        assert!(!peer.state.running_election.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn ok_after_run_election_cancels_timer_and_clears_flag() {
        let peer = make(2, 5);
        peer.clone().start_election().await;
        assert!(peer.state.running_election.load(Ordering::Acquire));

        peer.clone().handle_message(Message::Ok(3)).await;
        assert!(!peer.state.running_election.load(Ordering::Acquire));

        // The timer fired region would have announced by now had it not
        // been cancelled.
        tokio::time::sleep(peer.election_wait() + Duration::from_millis(50)).await;
        assert!(!peer.state.has_announced.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn coordinator_message_sets_observed_coordinator() {
        let peer = make(2, 5);
        peer.clone().handle_message(Message::Coordinator(4)).await;
        assert_eq!(peer.state.coordinator_id.load(Ordering::Acquire), 4);
    }

    #[tokio::test]
    async fn run_election_is_idempotent() {
        let peer = make(2, 5);
        peer.clone().start_election().await;
        let count_after_first = peer.state.message_count.load(Ordering::Relaxed);
        peer.clone().start_election().await;
        let count_after_second = peer.state.message_count.load(Ordering::Relaxed);
        assert_eq!(count_after_first, count_after_second);
    }
}
