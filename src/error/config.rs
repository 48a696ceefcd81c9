use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML config '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },
    #[error("Failed to parse JSON config '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported config extension '{ext}'.")]
    UnsupportedExtension { ext: String },
    #[error("Config file has no extension.")]
    MissingExtension,
    #[error("An endpoint URL is required (pass --url or set 'endpoint' in the config file).")]
    MissingEndpoint,
    #[error("Invalid header '{header}': expected 'Name: value'.")]
    MalformedHeader { header: String },
}
