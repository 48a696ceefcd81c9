use std::time::Duration;

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tokio::time::sleep;
use tracing::debug;

use crate::config::{HttpMethod, TestConfig};
use crate::error::{AppError, AppResult, HttpError};

/// Everything captured from a completed HTTP exchange. Produced for *any*
/// status code the server returned; only transport-level problems are errors.
#[derive(Debug)]
pub struct ExchangeData {
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Prepared request template shared by every attempt of a job.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    pub timeout: Duration,
}

impl RequestSpec {
    /// Builds the wire-ready template from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when a configured header name or value cannot be
    /// represented on the wire.
    pub fn from_config(config: &TestConfig) -> AppResult<Self> {
        let mut headers = HeaderMap::with_capacity(config.request.headers.len());
        for (name, value) in &config.request.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                AppError::http(HttpError::InvalidHeaderName {
                    name: name.clone(),
                    source: err,
                })
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|err| {
                AppError::http(HttpError::InvalidHeaderValue {
                    name: name.clone(),
                    source: err,
                })
            })?;
            headers.insert(header_name, header_value);
        }
        Ok(Self {
            url: config.endpoint.clone(),
            method: config.request.method.unwrap_or_default(),
            headers,
            body: config.request.body.clone(),
            timeout: config.timeout(),
        })
    }
}

/// HTTP client wrapper with per-attempt timeout and bounded retry.
///
/// Any response the server manages to send back, 4xx and 5xx included, is a
/// successful completion from this client's point of view. Retries apply to
/// transport failures only, with `retry_delay * 2^attempt` backoff, and
/// exhausting them surfaces the last transport error.
#[derive(Debug)]
pub struct ProbeClient {
    client: Client,
    retry_limit: u32,
    retry_delay: Duration,
}

impl ProbeClient {
    /// Builds the underlying connection pool.
    ///
    /// # Errors
    ///
    /// Returns an error when the TLS backend or connection pool cannot be
    /// initialized.
    pub fn new(retry_limit: u32, retry_delay: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))?;
        Ok(Self {
            client,
            retry_limit,
            retry_delay,
        })
    }

    /// Issues one attempt, retrying transport failures up to the configured
    /// limit.
    ///
    /// # Errors
    ///
    /// Returns the last transport error once retries are exhausted. A
    /// received HTTP error status is not an error here.
    pub async fn send(&self, spec: &RequestSpec) -> Result<ExchangeData, reqwest::Error> {
        let mut attempt: u32 = 0;
        loop {
            match self.dispatch(spec).await {
                Ok(exchange) => return Ok(exchange),
                Err(error) => {
                    if attempt >= self.retry_limit {
                        return Err(error);
                    }
                    let backoff = backoff_delay(self.retry_delay, attempt);
                    debug!(
                        "Transport failure on attempt {}: {}; retrying in {:?}",
                        attempt, error, backoff
                    );
                    sleep(backoff).await;
                    attempt = attempt.saturating_add(1);
                }
            }
        }
    }

    async fn dispatch(&self, spec: &RequestSpec) -> Result<ExchangeData, reqwest::Error> {
        let mut builder = self
            .client
            .request(spec.method.as_method(), spec.url.clone())
            .timeout(spec.timeout)
            .headers(spec.headers.clone());
        builder = match spec.body.as_ref() {
            None | Some(Value::Null) => builder,
            Some(Value::String(text)) => builder.body(text.clone()),
            Some(
                value @ (Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_)),
            ) => builder.json(value),
        };
        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        Ok(ExchangeData {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_owned(),
            headers,
            body,
        })
    }
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let multiplier = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
    base.checked_mul(multiplier).unwrap_or(Duration::MAX)
}
