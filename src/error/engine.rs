use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Job '{id}' was not found.")]
    JobNotFound { id: String },
}
