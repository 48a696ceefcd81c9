//! Command-line interface for the probe binary.
mod parsers;


pub use parsers::{parse_body_data, parse_header};

use clap::Parser;

use crate::config::{ConfigFile, HttpMethod, TestConfig};
use crate::error::{AppError, AppResult, ConfigError};

#[derive(Debug, Parser)]
#[command(
    name = "limitprobe",
    version,
    about = "Discovers how an API enforces its rate limits by firing controlled request bursts and tracing every attempt."
)]
pub struct ProbeArgs {
    /// Target endpoint URL.
    #[arg(short = 'u', long)]
    pub url: Option<String>,

    /// HTTP method for the request template.
    #[arg(short = 'm', long, value_enum)]
    pub method: Option<HttpMethod>,

    /// Request header in 'Name: value' form. Repeatable.
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Request body; parsed as JSON when possible, otherwise sent verbatim.
    #[arg(short = 'd', long)]
    pub data: Option<String>,

    /// Number of concurrent workers (clients).
    #[arg(short = 'c', long)]
    pub clients: Option<u64>,

    /// Total number of attempts across all workers.
    #[arg(short = 'n', long = "requests")]
    pub total_requests: Option<u64>,

    /// Per-attempt timeout in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Pause between bursts in milliseconds. Zero fires everything at once.
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Attempts launched together within one burst.
    #[arg(long)]
    pub burst_size: Option<u64>,

    /// Transport-failure retries per attempt.
    #[arg(long)]
    pub retries: Option<u32>,

    /// Base backoff delay between retries in milliseconds.
    #[arg(long)]
    pub retry_delay_ms: Option<u64>,

    /// Config file path (.toml or .json).
    #[arg(long)]
    pub config: Option<String>,

    /// Persist job documents to this JSON file instead of keeping them
    /// in memory only.
    #[arg(long, env = "LIMITPROBE_JOBS_FILE")]
    pub jobs_file: Option<String>,

    /// Write the finished job document to this path as pretty JSON.
    #[arg(long)]
    pub export_json: Option<String>,

    /// Verbose logging.
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl ProbeArgs {
    /// Merges CLI flags over an optional config file into the final test
    /// configuration. CLI values win; headers add to (and override) the
    /// file's header map.
    ///
    /// # Errors
    ///
    /// Returns an error when no endpoint was supplied anywhere, a `-H`
    /// value is malformed, or the merged configuration fails validation.
    pub fn resolve_config(&self, file: Option<ConfigFile>) -> AppResult<TestConfig> {
        let file = file.unwrap_or_default();
        let endpoint = self
            .url
            .clone()
            .or(file.endpoint)
            .ok_or_else(|| AppError::config(ConfigError::MissingEndpoint))?;

        let mut config = TestConfig::new(endpoint);
        config.request = file.request;
        if let Some(method) = self.method {
            config.request.method = Some(method);
        }
        for raw in &self.headers {
            let (name, value) = parse_header(raw)?;
            config.request.headers.insert(name, value);
        }
        if let Some(data) = self.data.as_deref() {
            config.request.body = Some(parse_body_data(data));
        }
        config.clients = self.clients.or(file.clients);
        config.total_requests = self.total_requests.or(file.total_requests);
        config.timeout_ms = self.timeout_ms.or(file.timeout_ms);
        config.interval_ms = self.interval_ms.or(file.interval_ms);
        config.burst_size = self.burst_size.or(file.burst_size);
        config.retries = self.retries.or(file.retries);
        config.retry_delay_ms = self.retry_delay_ms.or(file.retry_delay_ms);

        config.validate()?;
        Ok(config)
    }
}
