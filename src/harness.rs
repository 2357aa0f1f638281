use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::error::ElectionError;
use crate::peer::PeerConfig;
use crate::protocol::{self, ProtocolKind};
use crate::runtime::run_peer;

/// What one peer observed after its run finished.
#[derive(Debug, Clone)]
pub struct PeerOutcome {
    pub id: u32,
    pub message_count: u32,
    pub coordinator_id: u32,
    pub error: Option<Arc<ElectionError>>,
}

/// The result of running one protocol over one alive set.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub protocol: ProtocolKind,
    pub outcomes: Vec<PeerOutcome>,
}

impl RunReport {
    pub fn total_messages(&self) -> u32 {
        self.outcomes.iter().map(|o| o.message_count).sum()
    }

    /// `Some(coordinator)` iff every peer agrees and that agreement equals
    /// `max(alive)`; `None` on any mismatch. A mismatch is reported as a
    /// diagnostic, not an error: the run still completed, it just didn't
    /// converge correctly.
    pub fn consensus(&self, alive: &[u32]) -> Option<u32> {
        let expected = *alive.iter().max()?;
        self.outcomes
            .iter()
            .all(|o| o.coordinator_id == expected)
            .then_some(expected)
    }

    pub fn observed_coordinators(&self) -> Vec<(u32, u32)> {
        self.outcomes.iter().map(|o| (o.id, o.coordinator_id)).collect()
    }
}

/// Construct one peer per member of `alive`, start them all concurrently,
/// join them all, and report each peer's final counters.
///
/// Per-peer task failures (e.g. a bind failure) never abort siblings: each
/// peer's outcome carries its own error, and the harness always returns a
/// full report.
pub async fn run_peer_set(
    kind: ProtocolKind,
    num_nodes: u32,
    alive: &[u32],
    starters: &[u32],
    base_port: u16,
) -> RunReport {
    let mut handles = Vec::with_capacity(alive.len());
    let mut coordinators = Vec::with_capacity(alive.len());
    let mut counters = Vec::with_capacity(alive.len());

    for &id in alive {
        let coordinator_id = Arc::new(AtomicU32::new(id));
        let message_count = Arc::new(AtomicU32::new(0));

        let cfg = PeerConfig {
            id,
            num_nodes,
            base_port,
            is_starter: starters.contains(&id),
            coordinator_id: Arc::clone(&coordinator_id),
            message_count: Arc::clone(&message_count),
        };

        let peer = protocol::build(kind, cfg);
        coordinators.push(coordinator_id);
        counters.push(message_count);
        handles.push(tokio::spawn(run_peer(peer)));
    }

    let mut outcomes = Vec::with_capacity(alive.len());
    for (i, handle) in handles.into_iter().enumerate() {
        let error = match handle.await {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(Arc::new(err)),
            Err(join_err) => Some(Arc::new(ElectionError::Join(join_err))),
        };
        outcomes.push(PeerOutcome {
            id: alive[i],
            message_count: counters[i].load(Ordering::Relaxed),
            coordinator_id: coordinators[i].load(Ordering::Relaxed),
            error,
        });
    }

    RunReport { protocol: kind, outcomes }
}
