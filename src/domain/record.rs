use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::HttpMethod;

/// Classification of one attempt, derived from its status code alone.
///
/// Both the per-record `status` field and the summary buckets are computed
/// through [`AttemptStatus::from_status_code`], so the two can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Ok,
    RateLimited,
    Error,
}

impl AttemptStatus {
    /// Status code 429 is rate-limited, any 2xx is ok, everything else
    /// (including 0, the no-response marker) is an error.
    #[must_use]
    pub const fn from_status_code(status_code: u16) -> Self {
        if status_code == 429 {
            AttemptStatus::RateLimited
        } else if status_code >= 200 && status_code < 300 {
            AttemptStatus::Ok
        } else {
            AttemptStatus::Error
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            AttemptStatus::Ok => "ok",
            AttemptStatus::RateLimited => "rate_limited",
            AttemptStatus::Error => "error",
        }
    }
}

/// Echo of the request template as it was sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTrace {
    pub url: String,
    pub method: HttpMethod,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

/// Echo of the response, when one was obtained at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTrace {
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

/// Structured description of a transport-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportErrorTrace {
    pub message: String,
    pub code: Option<String>,
    pub error_type: String,
}

impl TransportErrorTrace {
    #[must_use]
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        let (code, error_type) = if error.is_timeout() {
            (Some("timeout"), "TimeoutError")
        } else if error.is_connect() {
            (Some("connect"), "ConnectError")
        } else if error.is_body() || error.is_decode() {
            (Some("body"), "BodyError")
        } else if error.is_request() {
            (Some("request"), "RequestError")
        } else {
            (None, "TransportError")
        };
        Self {
            message: error.to_string(),
            code: code.map(ToOwned::to_owned),
            error_type: error_type.to_owned(),
        }
    }
}

/// Full trace of one HTTP attempt.
///
/// `seq` is the global dispatch-order index (1-based, dense across the whole
/// job); completed jobs store records sorted by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub seq: u64,
    pub timestamp: String,
    pub status: AttemptStatus,
    pub status_code: u16,
    pub duration_ms: u64,
    pub retry_after: Option<String>,
    pub request: RequestTrace,
    pub response: Option<ResponseTrace>,
    pub error: Option<TransportErrorTrace>,
}
