//! Job persistence: the store contract plus in-memory and JSON-file backends.
mod file;
mod memory;


pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::domain::{Job, JobPatch};
use crate::error::StoreError;

/// Key-value persistence of job documents, addressed by job id.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persists a new job document keyed by its id, returning it unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be written.
    async fn create_job(&self, job: Job) -> Result<Job, StoreError>;

    /// Shallow-merges `patch` into the stored document and persists the
    /// result. Returns `None` when the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be read or written.
    async fn update_job(&self, id: &str, patch: JobPatch) -> Result<Option<Job>, StoreError>;

    /// Fetches a job document, `None` when the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be read.
    async fn get_job(&self, id: &str) -> Result<Option<Job>, StoreError>;

    /// Lists all stored job documents.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be read.
    async fn list_jobs(&self) -> Result<Vec<Job>, StoreError>;
}
