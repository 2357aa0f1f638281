use std::time::Instant;

use serde::Deserialize;

use crate::error::ElectionError;
use crate::harness::run_peer_set;
use crate::protocol::ProtocolKind;

/// One entry of the batch JSON schema: `{ "num": int, "alive": [...], "starters": [...] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchRun {
    pub num: u32,
    pub starters: Vec<u32>,
    pub alive: Vec<u32>,
}

pub async fn load_batch(path: &str) -> Result<Vec<BatchRun>, ElectionError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ElectionError::BatchRead { path: path.to_string(), source })?;
    serde_json::from_str(&text)
        .map_err(|source| ElectionError::BatchParse { path: path.to_string(), source })
}

/// One row of the comparator's output table: message counts and wall time
/// for a Standard pass and an Improved pass over the same alive/starter set.
#[derive(Debug, Clone)]
pub struct ComparisonRow {
    pub index: usize,
    pub std_msgs: u32,
    pub std_time_secs: f64,
    pub imp_msgs: u32,
    pub imp_time_secs: f64,
}

/// Run one Standard pass then one Improved pass over the same run
/// definition, timing each and logging a consensus warning (not an error)
/// if either fails to converge.
pub async fn compare(index: usize, run: &BatchRun, base_port: u16) -> ComparisonRow {
    let t0 = Instant::now();
    let std_report =
        run_peer_set(ProtocolKind::Standard, run.num, &run.alive, &run.starters, base_port).await;
    let std_time_secs = t0.elapsed().as_secs_f64();

    if std_report.consensus(&run.alive).is_none() {
        tracing::warn!(
            test = index,
            protocol = "standard",
            observed = ?std_report.observed_coordinators(),
            "no consensus or wrong coordinator elected"
        );
    }

    let t1 = Instant::now();
    let imp_report =
        run_peer_set(ProtocolKind::Improved, run.num, &run.alive, &run.starters, base_port).await;
    let imp_time_secs = t1.elapsed().as_secs_f64();

    if imp_report.consensus(&run.alive).is_none() {
        tracing::warn!(
            test = index,
            protocol = "improved",
            observed = ?imp_report.observed_coordinators(),
            "no consensus or wrong coordinator elected"
        );
    }

    ComparisonRow {
        index,
        std_msgs: std_report.total_messages(),
        std_time_secs,
        imp_msgs: imp_report.total_messages(),
        imp_time_secs,
    }
}

pub async fn batch_compare(batch: &[BatchRun], base_port: u16) -> Vec<ComparisonRow> {
    let mut rows = Vec::with_capacity(batch.len());
    for (index, run) in batch.iter().enumerate() {
        tracing::info!(test = index, "running comparison");
        rows.push(compare(index, run, base_port).await);
    }
    rows
}
