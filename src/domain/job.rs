use serde::{Deserialize, Serialize};

use crate::config::TestConfig;

use super::record::AttemptRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Final aggregate over all attempt records of a job.
///
/// The classification buckets are mutually exclusive and
/// `total == ok + error + rate_limit` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub total: u64,
    pub ok: u64,
    pub error: u64,
    pub rate_limit: u64,
    pub avg_ms: u64,
}

/// One probe run: its configuration, lifecycle state, and outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub config: TestConfig,
    pub status: JobStatus,
    pub created_at: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    #[serde(default)]
    pub results: Vec<AttemptRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<MetricsSnapshot>,
}

impl Job {
    #[must_use]
    pub fn queued(id: String, config: TestConfig, created_at: String) -> Self {
        Self {
            id,
            config,
            status: JobStatus::Queued,
            created_at,
            started_at: None,
            finished_at: None,
            results: Vec::new(),
            summary: None,
        }
    }
}

/// Shallow-merge patch applied by `JobStore::update_job`: fields left `None`
/// keep whatever the stored document already holds.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub results: Option<Vec<AttemptRecord>>,
    pub summary: Option<MetricsSnapshot>,
}

impl JobPatch {
    #[must_use]
    pub fn started(timestamp: String) -> Self {
        Self {
            status: Some(JobStatus::Running),
            started_at: Some(timestamp),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn completed(
        timestamp: String,
        results: Vec<AttemptRecord>,
        summary: MetricsSnapshot,
    ) -> Self {
        Self {
            status: Some(JobStatus::Completed),
            finished_at: Some(timestamp),
            results: Some(results),
            summary: Some(summary),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failed(timestamp: String) -> Self {
        Self {
            status: Some(JobStatus::Failed),
            finished_at: Some(timestamp),
            ..Self::default()
        }
    }

    pub fn apply(self, job: &mut Job) {
        if let Some(status) = self.status {
            job.status = status;
        }
        if let Some(started_at) = self.started_at {
            job.started_at = Some(started_at);
        }
        if let Some(finished_at) = self.finished_at {
            job.finished_at = Some(finished_at);
        }
        if let Some(results) = self.results {
            job.results = results;
        }
        if let Some(summary) = self.summary {
            job.summary = Some(summary);
        }
    }
}
