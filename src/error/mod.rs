mod app;
mod config;
mod engine;
mod http;
mod store;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use engine::EngineError;
pub use http::HttpError;
pub use store::StoreError;
