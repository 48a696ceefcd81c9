use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{Job, JobPatch};
use crate::error::StoreError;

use super::JobStore;

/// Process-local store; documents vanish when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    jobs: RwLock<HashMap<String, Job>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn create_job(&self, job: Job) -> Result<Job, StoreError> {
        let mut jobs = self.jobs.write().await;
        jobs.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    async fn update_job(&self, id: &str, patch: JobPatch) -> Result<Option<Job>, StoreError> {
        let mut jobs = self.jobs.write().await;
        Ok(jobs.get_mut(id).map(|job| {
            patch.apply(job);
            job.clone()
        }))
    }

    async fn get_job(&self, id: &str) -> Result<Option<Job>, StoreError> {
        let jobs = self.jobs.read().await;
        Ok(jobs.get(id).cloned())
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, StoreError> {
        let jobs = self.jobs.read().await;
        Ok(jobs.values().cloned().collect())
    }
}
