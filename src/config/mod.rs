//! Test configuration types, defaults, and file loading.
mod loader;
mod types;


pub use loader::{load_config, load_config_file};
pub use types::{ConfigFile, HttpMethod, RequestConfig, TestConfig};
