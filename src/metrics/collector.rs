use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::{AttemptRecord, MetricsSnapshot};

use super::MetricsAggregator;

/// Everything the collector owned when the record channel closed.
#[derive(Debug)]
pub struct CollectedRun {
    pub records: Vec<AttemptRecord>,
    pub summary: MetricsSnapshot,
}

/// Spawns the single-writer task that owns the shared attempt buffer and the
/// aggregator. Workers send completed records over the returned channel; all
/// mutation happens on the collector task, so no record can be lost to a
/// concurrent write and the counters stay consistent by construction.
///
/// The task resolves once every sender handle has been dropped.
#[must_use]
pub fn spawn_record_collector(
    expected: usize,
) -> (mpsc::Sender<AttemptRecord>, JoinHandle<CollectedRun>) {
    let capacity = expected.clamp(1, 1024);
    let (records_tx, mut records_rx) = mpsc::channel::<AttemptRecord>(capacity);

    let handle = tokio::spawn(async move {
        let mut aggregator = MetricsAggregator::default();
        let mut records = Vec::with_capacity(expected.min(4096));
        while let Some(record) = records_rx.recv().await {
            aggregator.update(record.duration_ms, record.status_code);
            records.push(record);
        }
        CollectedRun {
            records,
            summary: aggregator.snapshot(),
        }
    });

    (records_tx, handle)
}
