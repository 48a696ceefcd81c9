use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep};
use tracing::warn;

use crate::config::TestConfig;
use crate::domain::{AttemptRecord, RequestTrace};
use crate::error::AppResult;
use crate::http::{ProbeClient, RequestSpec};
use crate::trace::{record_exchange, record_transport_failure, render_body_value};

use super::Sequencer;

/// Immutable per-job state shared by every attempt: the wire template and the
/// request echo written into each record.
#[derive(Debug)]
pub(crate) struct AttemptTemplate {
    pub(crate) spec: RequestSpec,
    pub(crate) request_trace: RequestTrace,
}

impl AttemptTemplate {
    pub(crate) fn from_config(config: &TestConfig) -> AppResult<Self> {
        let spec = RequestSpec::from_config(config)?;
        let request_trace = RequestTrace {
            url: config.endpoint.clone(),
            method: config.request.method.unwrap_or_default(),
            headers: config.request.headers.clone(),
            body: config
                .request
                .body
                .as_ref()
                .and_then(render_body_value),
        };
        Ok(Self {
            spec,
            request_trace,
        })
    }
}

/// Everything a worker needs to issue attempts and hand off their records.
pub(crate) struct AttemptContext {
    pub(crate) client: Arc<ProbeClient>,
    pub(crate) template: Arc<AttemptTemplate>,
    pub(crate) sequencer: Arc<Sequencer>,
    pub(crate) records: mpsc::Sender<AttemptRecord>,
}

/// How a worker spreads its quota over time.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Pacing {
    /// The whole quota fires simultaneously. Maximizes the chance of
    /// tripping a remote rate limiter under true concurrent load.
    Unbounded,
    /// Bursts of `size` fired in parallel with `interval` between them.
    Bursts { size: u64, interval: Duration },
}

impl Pacing {
    pub(crate) fn from_config(config: &TestConfig) -> Self {
        if config.interval().is_zero() && config.burst_size.is_none() {
            Pacing::Unbounded
        } else {
            Pacing::Bursts {
                size: config.burst(),
                interval: config.interval(),
            }
        }
    }
}

/// Issues exactly `quota` attempts and terminates. Every attempt, including
/// transport failures, produces one record; nothing a single attempt does can
/// abort the worker.
pub(crate) async fn run_worker(context: AttemptContext, pacing: Pacing, quota: u64) {
    match pacing {
        Pacing::Unbounded => dispatch_burst(&context, quota).await,
        Pacing::Bursts { size, interval } => {
            let mut sent: u64 = 0;
            while sent < quota {
                let remaining = quota.saturating_sub(sent);
                let current = size.max(1).min(remaining);
                dispatch_burst(&context, current).await;
                sent = sent.saturating_add(current);
                if !interval.is_zero() && sent < quota {
                    sleep(interval).await;
                }
            }
        }
    }
}

/// Launches `count` attempts in parallel and waits for all of them. `seq` is
/// drawn synchronously while the burst is assembled, so sequence numbers
/// follow dispatch order regardless of completion order.
async fn dispatch_burst(context: &AttemptContext, count: u64) {
    let attempts: Vec<_> = (0..count)
        .map(|_| {
            let seq = context.sequencer.next();
            perform_attempt(context, seq)
        })
        .collect();
    join_all(attempts).await;
}

async fn perform_attempt(context: &AttemptContext, seq: u64) {
    let started = Instant::now();
    let outcome = context.client.send(&context.template.spec).await;
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let request_trace = context.template.request_trace.clone();
    let record = match outcome {
        Ok(exchange) => record_exchange(seq, request_trace, &exchange, elapsed_ms),
        Err(error) => record_transport_failure(seq, request_trace, &error, elapsed_ms),
    };

    if context.records.send(record).await.is_err() {
        warn!("Record collector closed before attempt {} was stored.", seq);
    }
}
