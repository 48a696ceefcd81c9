//! Result recording: body rendering, header extraction, and attempt traces.
//!
//! Nothing in this module returns an error. A body that cannot be serialized
//! degrades to a placeholder string and unrepresentable header values render
//! lossily, so a single malformed exchange can never abort a run.
mod body;
mod headers;


pub use body::{MAX_BODY_BYTES, TRUNCATION_MARKER, render_body_bytes, render_body_value, truncate_with_marker};
pub use headers::HeaderSource;

use crate::domain::{
    AttemptRecord, AttemptStatus, RequestTrace, ResponseTrace, TransportErrorTrace, iso_now,
};
use crate::http::ExchangeData;

const RETRY_AFTER: &str = "retry-after";

/// Builds the record for an attempt that produced an HTTP response,
/// whatever its status code.
#[must_use]
pub fn record_exchange(
    seq: u64,
    request: RequestTrace,
    exchange: &ExchangeData,
    duration_ms: u64,
) -> AttemptRecord {
    let headers = HeaderSource::Typed(&exchange.headers);
    AttemptRecord {
        seq,
        timestamp: iso_now(),
        status: AttemptStatus::from_status_code(exchange.status),
        status_code: exchange.status,
        duration_ms,
        retry_after: headers.get(RETRY_AFTER),
        request,
        response: Some(ResponseTrace {
            status: exchange.status,
            status_text: exchange.status_text.clone(),
            headers: headers.entries(),
            body: render_body_bytes(&exchange.body),
        }),
        error: None,
    }
}

/// Builds the record for an attempt where no response was obtainable:
/// status code 0, no response echo, populated error description.
#[must_use]
pub fn record_transport_failure(
    seq: u64,
    request: RequestTrace,
    error: &reqwest::Error,
    duration_ms: u64,
) -> AttemptRecord {
    AttemptRecord {
        seq,
        timestamp: iso_now(),
        status: AttemptStatus::Error,
        status_code: 0,
        duration_ms,
        retry_after: None,
        request,
        response: None,
        error: Some(TransportErrorTrace::from_reqwest(error)),
    }
}
