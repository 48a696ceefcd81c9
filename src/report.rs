use crate::domain::{AttemptRecord, Job};
use crate::error::AppResult;

/// Prints the operator-facing summary of a finished job.
pub(crate) fn print_summary(job: &Job) {
    let summary = job.summary.clone().unwrap_or_default();

    println!();
    println!("Job {} {}", job.id, job.status.as_str());
    if let (Some(started), Some(finished)) = (job.started_at.as_deref(), job.finished_at.as_deref())
    {
        println!("  window:       {} -> {}", started, finished);
    }
    println!(
        "  requests:     {} total | {} ok | {} rate-limited | {} error",
        summary.total, summary.ok, summary.rate_limit, summary.error
    );

    let mut durations: Vec<u64> = job.results.iter().map(|record| record.duration_ms).collect();
    durations.sort_unstable();
    println!(
        "  latency (ms): avg {} | p50 {} | p90 {} | p99 {}",
        summary.avg_ms,
        percentile(&durations, 50),
        percentile(&durations, 90),
        percentile(&durations, 99)
    );

    if let Some(retry_after) = first_retry_after(&job.results) {
        println!("  retry-after:  {} (first observed)", retry_after);
    }
}

/// Writes the full job document as pretty JSON.
///
/// # Errors
///
/// Returns an error when the document cannot be encoded or written.
pub(crate) fn export_job_json(path: &str, job: &Job) -> AppResult<()> {
    let encoded = serde_json::to_string_pretty(job)?;
    std::fs::write(path, encoded)?;
    Ok(())
}

fn first_retry_after(records: &[AttemptRecord]) -> Option<&str> {
    records
        .iter()
        .find_map(|record| record.retry_after.as_deref())
}

/// Nearest-rank percentile over an ascending-sorted slice.
fn percentile(sorted_ms: &[u64], pct: u64) -> u64 {
    if sorted_ms.is_empty() {
        return 0;
    }
    let len = u64::try_from(sorted_ms.len()).unwrap_or(u64::MAX);
    let rank = len
        .saturating_mul(pct)
        .saturating_add(99)
        .checked_div(100)
        .unwrap_or(1)
        .max(1);
    let index = usize::try_from(rank.saturating_sub(1))
        .unwrap_or(0)
        .min(sorted_ms.len().saturating_sub(1));
    sorted_ms.get(index).copied().unwrap_or(0)
}
