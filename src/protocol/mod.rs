mod improved;
mod standard;

use std::sync::Arc;

use async_trait::async_trait;

use crate::message::Message;
use crate::peer::{PeerConfig, PeerState};

pub use improved::ImprovedPeer;
pub use standard::StandardPeer;

/// Which protocol variant a peer runs. Selects the state machine; the
/// per-peer runtime (starter/listener tasks, socket lifecycle, termination
/// predicate) is identical across both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolKind {
    Standard,
    Improved,
}

impl ProtocolKind {
    pub fn label(&self) -> &'static str {
        match self {
            ProtocolKind::Standard => "standard",
            ProtocolKind::Improved => "improved",
        }
    }
}

/// Common entry points both state machines expose to the per-peer runtime.
///
/// Object-safe via `async_trait` so the harness can hold a homogeneous
/// `Vec<Arc<dyn ElectionProtocol>>` across a run without knowing at compile
/// time which variant each peer is running.
#[async_trait]
pub trait ElectionProtocol: Send + Sync + 'static {
    fn state(&self) -> &PeerState;

    /// The starter's election entry point (`run_election`/`check_alive`).
    /// Idempotent: a call while an election is already running is a no-op.
    async fn start_election(self: Arc<Self>);

    /// Dispatch one decoded, non-`Exit` message to the protocol's handlers.
    async fn handle_message(self: Arc<Self>, msg: Message);
}

pub fn build(kind: ProtocolKind, cfg: PeerConfig) -> Arc<dyn ElectionProtocol> {
    match kind {
        ProtocolKind::Standard => Arc::new(StandardPeer::new(cfg)),
        ProtocolKind::Improved => Arc::new(ImprovedPeer::new(cfg)),
    }
}
