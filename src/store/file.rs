use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::error;

use crate::domain::{Job, JobPatch};
use crate::error::StoreError;

use super::JobStore;

/// Durable store backed by a single JSON document of the form
/// `{"jobs": {"<id>": {...}}}`.
///
/// Reads and writes go through one internal lock, so concurrent engine calls
/// see a consistent read-modify-write cycle. A file that no longer parses is
/// backed up beside itself and treated as empty rather than poisoning every
/// subsequent run.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct JobsDocument {
    #[serde(default)]
    jobs: BTreeMap<String, Job>,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<JobsDocument, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(JobsDocument::default());
            }
            Err(err) => {
                return Err(StoreError::ReadStore {
                    path: self.path.clone(),
                    source: err,
                });
            }
        };

        match serde_json::from_str(&content) {
            Ok(document) => Ok(document),
            Err(err) => {
                self.back_up_corrupt(&content, &err).await;
                Ok(JobsDocument::default())
            }
        }
    }

    async fn back_up_corrupt(&self, content: &str, parse_err: &serde_json::Error) {
        let backup = PathBuf::from(format!(
            "{}.corrupt-{}",
            self.path.display(),
            chrono::Utc::now().timestamp_millis()
        ));
        error!(
            "Job store {} no longer parses ({}); backing it up to {} and starting empty.",
            self.path.display(),
            parse_err,
            backup.display()
        );
        if let Err(err) = tokio::fs::write(&backup, content).await {
            error!("Failed to back up corrupt job store: {}", err);
        }
    }

    async fn write_document(&self, document: &JobsDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|err| StoreError::WriteStore {
                        path: self.path.clone(),
                        source: err,
                    })?;
            }
        }
        let encoded = serde_json::to_string_pretty(document)
            .map_err(|err| StoreError::EncodeDocument { source: err })?;
        tokio::fs::write(&self.path, encoded)
            .await
            .map_err(|err| StoreError::WriteStore {
                path: self.path.clone(),
                source: err,
            })
    }
}

#[async_trait]
impl JobStore for FileStore {
    async fn create_job(&self, job: Job) -> Result<Job, StoreError> {
        let _guard = self.guard.lock().await;
        let mut document = self.read_document().await?;
        document.jobs.insert(job.id.clone(), job.clone());
        self.write_document(&document).await?;
        Ok(job)
    }

    async fn update_job(&self, id: &str, patch: JobPatch) -> Result<Option<Job>, StoreError> {
        let _guard = self.guard.lock().await;
        let mut document = self.read_document().await?;
        let Some(job) = document.jobs.get_mut(id) else {
            return Ok(None);
        };
        patch.apply(job);
        let updated = job.clone();
        self.write_document(&document).await?;
        Ok(Some(updated))
    }

    async fn get_job(&self, id: &str) -> Result<Option<Job>, StoreError> {
        let _guard = self.guard.lock().await;
        let document = self.read_document().await?;
        Ok(document.jobs.get(id).cloned())
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, StoreError> {
        let _guard = self.guard.lock().await;
        let document = self.read_document().await?;
        Ok(document.jobs.into_values().collect())
    }
}
