use thiserror::Error;

/// Errors surfaced by a single peer's runtime or by the harness that drives it.
///
/// Decode failures and consensus mismatches are deliberately absent here: the
/// former are dropped silently at the call site, the latter is a reported
/// diagnostic (`RunReport::consensus`), not a propagated error.
#[derive(Debug, Error)]
pub enum ElectionError {
    #[error("failed to bind peer socket: {0}")]
    Bind(#[source] std::io::Error),

    #[error("failed to receive datagram: {0}")]
    Recv(#[source] std::io::Error),

    #[error("peer task panicked: {0}")]
    Join(#[source] tokio::task::JoinError),

    #[error("message storm: sent {sent} datagrams, limit was {limit}")]
    MessageStorm { sent: u32, limit: u32 },

    #[error("failed to read batch file {path}: {source}")]
    BatchRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse batch file {path}: {source}")]
    BatchParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to render report: {0}")]
    Report(String),
}
