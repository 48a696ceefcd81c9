use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read job store '{path}': {source}")]
    ReadStore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write job store '{path}': {source}")]
    WriteStore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode job store document: {source}")]
    EncodeDocument {
        #[source]
        source: serde_json::Error,
    },
}
