//! The persisted document model: jobs, attempt records, and summaries.
//!
//! Field names serialize in camelCase (`createdAt`, `durationMs`,
//! `rateLimit`, ...) so stored documents read naturally from JSON tooling and
//! stay stable across releases.
mod job;
mod record;


pub use job::{Job, JobPatch, JobStatus, MetricsSnapshot};
pub use record::{AttemptRecord, AttemptStatus, RequestTrace, ResponseTrace, TransportErrorTrace};

/// Current wall-clock time as an ISO-8601 string with millisecond precision.
#[must_use]
pub fn iso_now() -> String {
    chrono::Utc::now()
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
