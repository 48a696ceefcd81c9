//! The job coordinator: quota split, worker launch, and the single terminal
//! write.
mod sequencer;
mod worker;


pub use sequencer::Sequencer;

use std::sync::Arc;

use futures_util::future::join_all;
use rand::Rng;
use tracing::{error, warn};

use crate::config::TestConfig;
use crate::domain::{Job, JobPatch, iso_now};
use crate::error::{AppError, AppResult, EngineError};
use crate::http::ProbeClient;
use crate::metrics::spawn_record_collector;
use crate::store::JobStore;

use worker::{AttemptContext, AttemptTemplate, Pacing, run_worker};

/// Drives probe jobs from `queued` to a terminal state against a pluggable
/// job store.
#[derive(Clone)]
pub struct Engine {
    store: Arc<dyn JobStore>,
}

impl Engine {
    #[must_use]
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Creates and persists a `queued` job, schedules its execution on the
    /// runtime, and returns immediately. The caller never blocks on network
    /// I/O; execution errors are logged by the supervising task.
    ///
    /// # Errors
    ///
    /// Returns an error when the config is invalid or the job document
    /// cannot be persisted.
    pub async fn start_test(&self, config: TestConfig) -> AppResult<Job> {
        let job = self.enqueue(config).await?;
        let engine = self.clone();
        let job_id = job.id.clone();
        tokio::spawn(async move {
            if let Err(err) = engine.run_job(&job_id).await {
                error!("Engine error running job {}: {}", job_id, err);
            }
        });
        Ok(job)
    }

    /// Creates a `queued` job and drives it to a terminal state before
    /// returning. This is the synchronous entry used by the CLI and tests.
    ///
    /// # Errors
    ///
    /// Returns an error when the config is invalid or the store fails.
    pub async fn run_to_completion(&self, config: TestConfig) -> AppResult<Job> {
        let job = self.enqueue(config).await?;
        self.run_job(&job.id).await
    }

    /// Executes a previously created job. Must be invoked exactly once per
    /// job; individual request failures are data, not errors — only a store
    /// problem (or an unknown id) makes this fail.
    ///
    /// # Errors
    ///
    /// Returns an error when the id is unknown or the job document cannot be
    /// read or written.
    pub async fn run_job(&self, id: &str) -> AppResult<Job> {
        match self.execute_job(id).await {
            Ok(job) => Ok(job),
            Err(err) => {
                if !matches!(err, AppError::Engine(EngineError::JobNotFound { .. })) {
                    self.try_mark_failed(id).await;
                }
                Err(err)
            }
        }
    }

    /// Fetches a job document.
    ///
    /// # Errors
    ///
    /// Returns an error when the store cannot be read.
    pub async fn get_job(&self, id: &str) -> AppResult<Option<Job>> {
        Ok(self.store.get_job(id).await?)
    }

    /// Lists all job documents.
    ///
    /// # Errors
    ///
    /// Returns an error when the store cannot be read.
    pub async fn list_jobs(&self) -> AppResult<Vec<Job>> {
        Ok(self.store.list_jobs().await?)
    }

    async fn enqueue(&self, config: TestConfig) -> AppResult<Job> {
        config.validate()?;
        let job = Job::queued(new_job_id(), config, iso_now());
        Ok(self.store.create_job(job).await?)
    }

    async fn execute_job(&self, id: &str) -> AppResult<Job> {
        let job = self
            .store
            .get_job(id)
            .await?
            .ok_or_else(|| job_not_found(id))?;
        let config = job.config;
        config.validate()?;

        let clients = config.worker_count();
        let total = config.attempt_total();

        self.store
            .update_job(id, JobPatch::started(iso_now()))
            .await?
            .ok_or_else(|| job_not_found(id))?;

        let template = Arc::new(AttemptTemplate::from_config(&config)?);
        let client = Arc::new(ProbeClient::new(
            config.retry_limit(),
            config.retry_delay(),
        )?);
        let sequencer = Arc::new(Sequencer::new());
        let pacing = Pacing::from_config(&config);

        let expected = usize::try_from(total).unwrap_or(usize::MAX);
        let (records_tx, collector) = spawn_record_collector(expected);

        let mut workers = Vec::new();
        for quota in split_quota(total, clients) {
            if quota == 0 {
                continue;
            }
            let context = AttemptContext {
                client: Arc::clone(&client),
                template: Arc::clone(&template),
                sequencer: Arc::clone(&sequencer),
                records: records_tx.clone(),
            };
            workers.push(tokio::spawn(run_worker(context, pacing, quota)));
        }
        drop(records_tx);

        for joined in join_all(workers).await {
            if let Err(err) = joined {
                error!("Worker task aborted: {}", err);
            }
        }

        let mut run = collector.await?;
        run.records.sort_unstable_by_key(|record| record.seq);

        let patch = JobPatch::completed(iso_now(), run.records, run.summary);
        self.store
            .update_job(id, patch)
            .await?
            .ok_or_else(|| job_not_found(id))
    }

    /// Best-effort transition to `failed` so an engine-level error does not
    /// leave the document stuck in `running`. A store that is down for this
    /// write too only gets logged; the original error still surfaces.
    async fn try_mark_failed(&self, id: &str) {
        match self.store.update_job(id, JobPatch::failed(iso_now())).await {
            Ok(Some(_)) => {}
            Ok(None) => warn!("Job {} disappeared before it could be marked failed.", id),
            Err(err) => error!("Failed to mark job {} as failed: {}", id, err),
        }
    }
}

fn job_not_found(id: &str) -> AppError {
    AppError::engine(EngineError::JobNotFound { id: id.to_owned() })
}

/// Splits `total_requests` attempts across `clients` workers: every worker
/// gets the floor share and the first `total % clients` workers one extra, so
/// the quotas always sum to the exact total.
#[must_use]
pub fn split_quota(total_requests: u64, clients: u64) -> Vec<u64> {
    let clients = clients.max(1);
    let total = total_requests.max(1);
    let base = total.checked_div(clients).unwrap_or(0);
    let remainder = total.checked_rem(clients).unwrap_or(0);
    (0..clients)
        .map(|worker| {
            if worker < remainder {
                base.saturating_add(1)
            } else {
                base
            }
        })
        .collect()
}

/// Opaque job id: millisecond epoch in base-36 plus a random suffix.
fn new_job_id() -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let millis = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| {
            let index = rng.gen_range(0..DIGITS.len());
            char::from(DIGITS.get(index).copied().unwrap_or(b'0'))
        })
        .collect();
    format!("{}-{}", to_base36(millis), suffix)
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_owned();
    }
    let mut encoded = Vec::new();
    while value > 0 {
        let digit = usize::try_from(value.checked_rem(36).unwrap_or(0)).unwrap_or(0);
        encoded.push(DIGITS.get(digit).copied().unwrap_or(b'0'));
        value = value.checked_div(36).unwrap_or(0);
    }
    encoded.reverse();
    String::from_utf8_lossy(&encoded).into_owned()
}
