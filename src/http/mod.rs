//! The outbound HTTP client wrapper used by workers.
mod client;


pub use client::{ExchangeData, ProbeClient, RequestSpec};
