use std::collections::BTreeMap;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, HttpError};

pub(crate) const DEFAULT_TIMEOUT_MS: u64 = 5_000;
pub(crate) const DEFAULT_RETRY_DELAY_MS: u64 = 200;

#[derive(Debug, Clone, Copy, Default, ValueEnum, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "post")]
    Post,
    #[serde(alias = "patch")]
    Patch,
    #[serde(alias = "put")]
    Put,
    #[serde(alias = "delete")]
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub fn as_method(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Request template sent on every attempt of a job.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct RequestConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

/// Validated specification of one probe run.
///
/// Counts are stored as configured; the accessor methods apply the documented
/// defaults and coerce zero values up to one so a run can never end up with
/// zero (or runaway) workers.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestConfig {
    pub endpoint: String,
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clients: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_requests: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub burst_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_delay_ms: Option<u64>,
}

impl TestConfig {
    #[must_use]
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            request: RequestConfig::default(),
            clients: None,
            total_requests: None,
            timeout_ms: None,
            interval_ms: None,
            burst_size: None,
            retries: None,
            retry_delay_ms: None,
        }
    }

    /// Number of concurrent workers, coerced to at least one.
    #[must_use]
    pub fn worker_count(&self) -> u64 {
        sanitize_count(self.clients)
    }

    /// Total attempts across all workers, coerced to at least one.
    #[must_use]
    pub fn attempt_total(&self) -> u64 {
        sanitize_count(self.total_requests)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.unwrap_or(0))
    }

    #[must_use]
    pub fn burst(&self) -> u64 {
        sanitize_count(self.burst_size)
    }

    #[must_use]
    pub fn retry_limit(&self) -> u32 {
        self.retries.unwrap_or(0)
    }

    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms.unwrap_or(DEFAULT_RETRY_DELAY_MS))
    }

    /// Checks the endpoint URL and header names/values before dispatch.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint is not a valid URL or a header
    /// cannot be represented on the wire.
    pub fn validate(&self) -> AppResult<()> {
        url::Url::parse(&self.endpoint).map_err(|err| {
            AppError::http(HttpError::InvalidUrl {
                url: self.endpoint.clone(),
                source: err,
            })
        })?;
        for (name, value) in &self.request.headers {
            reqwest::header::HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                AppError::http(HttpError::InvalidHeaderName {
                    name: name.clone(),
                    source: err,
                })
            })?;
            reqwest::header::HeaderValue::from_str(value).map_err(|err| {
                AppError::http(HttpError::InvalidHeaderValue {
                    name: name.clone(),
                    source: err,
                })
            })?;
        }
        Ok(())
    }
}

fn sanitize_count(value: Option<u64>) -> u64 {
    value.unwrap_or(1).max(1)
}

/// On-disk configuration shape: every field optional so a file can supply any
/// subset and the CLI fills in the rest.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub endpoint: Option<String>,
    #[serde(default)]
    pub request: RequestConfig,
    pub clients: Option<u64>,
    pub total_requests: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub interval_ms: Option<u64>,
    pub burst_size: Option<u64>,
    pub retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}
