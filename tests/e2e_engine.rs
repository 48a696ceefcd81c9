mod support_engine;

use std::sync::Arc;
use std::time::{Duration, Instant};

use limitprobe::config::TestConfig;
use limitprobe::domain::{AttemptStatus, Job, JobStatus};
use limitprobe::engine::Engine;
use limitprobe::store::MemoryStore;
use limitprobe::trace::{MAX_BODY_BYTES, TRUNCATION_MARKER};

use support_engine::{ResponsePlan, dead_endpoint_or_skip, run_async_test, spawn_http_server_or_skip};

fn memory_engine() -> Engine {
    Engine::new(Arc::new(MemoryStore::new()))
}

fn check_seq_density(job: &Job, expected_total: u64) -> Result<(), String> {
    if job.results.len() != usize::try_from(expected_total).unwrap_or(0) {
        return Err(format!(
            "Expected {} records, got {}",
            expected_total,
            job.results.len()
        ));
    }
    for (index, record) in job.results.iter().enumerate() {
        let expected = u64::try_from(index).unwrap_or(u64::MAX).saturating_add(1);
        if record.seq != expected {
            return Err(format!(
                "Record {} carries seq {} instead of {}",
                index, record.seq, expected
            ));
        }
    }
    Ok(())
}

#[test]
fn single_request_against_200_completes_with_one_ok() -> Result<(), String> {
    let Some((url, server)) = spawn_http_server_or_skip(ResponsePlan::ok())? else {
        return Ok(());
    };

    run_async_test(async {
        let engine = memory_engine();
        let job = engine
            .run_to_completion(TestConfig::new(url))
            .await
            .map_err(|err| format!("run failed: {}", err))?;

        if job.status != JobStatus::Completed {
            return Err(format!("Expected completed, got {}", job.status.as_str()));
        }
        if job.started_at.is_none() || job.finished_at.is_none() {
            return Err("Terminal jobs must carry both timestamps".to_owned());
        }
        let summary = job
            .summary
            .clone()
            .ok_or_else(|| "Expected a summary".to_owned())?;
        if summary.total != 1 || summary.ok != 1 || summary.error != 0 || summary.rate_limit != 0 {
            return Err(format!(
                "Unexpected summary: total={} ok={}",
                summary.total, summary.ok
            ));
        }
        check_seq_density(&job, 1)?;
        let record = job
            .results
            .first()
            .ok_or_else(|| "Missing record".to_owned())?;
        if record.status != AttemptStatus::Ok || record.status_code != 200 {
            return Err("Unexpected record classification".to_owned());
        }
        let response = record
            .response
            .as_ref()
            .ok_or_else(|| "Expected a response echo".to_owned())?;
        if response.status != 200 {
            return Err("Unexpected echoed status".to_owned());
        }
        Ok(())
    })?;

    if server.hits() != 1 {
        return Err(format!("Expected exactly one request, saw {}", server.hits()));
    }
    Ok(())
}

#[test]
fn burst_against_429_classifies_everything_rate_limited() -> Result<(), String> {
    let Some((url, _server)) = spawn_http_server_or_skip(ResponsePlan::rate_limited("30"))? else {
        return Ok(());
    };

    run_async_test(async {
        let mut config = TestConfig::new(url);
        config.clients = Some(1);
        config.total_requests = Some(3);
        config.burst_size = Some(3);
        config.interval_ms = Some(0);

        let engine = memory_engine();
        let job = engine
            .run_to_completion(config)
            .await
            .map_err(|err| format!("run failed: {}", err))?;

        let summary = job
            .summary
            .clone()
            .ok_or_else(|| "Expected a summary".to_owned())?;
        if summary.rate_limit != 3 || summary.total != 3 {
            return Err(format!(
                "Unexpected summary: rateLimit={} total={}",
                summary.rate_limit, summary.total
            ));
        }
        for record in &job.results {
            if record.status != AttemptStatus::RateLimited {
                return Err("Every record must be rate_limited".to_owned());
            }
            if record.retry_after.as_deref() != Some("30") {
                return Err("Every record must capture Retry-After".to_owned());
            }
        }
        Ok(())
    })
}

#[test]
fn many_workers_produce_dense_sorted_sequences() -> Result<(), String> {
    let Some((url, server)) = spawn_http_server_or_skip(ResponsePlan::ok())? else {
        return Ok(());
    };

    run_async_test(async {
        let mut config = TestConfig::new(url);
        config.clients = Some(3);
        config.total_requests = Some(10);

        let engine = memory_engine();
        let job = engine
            .run_to_completion(config)
            .await
            .map_err(|err| format!("run failed: {}", err))?;

        check_seq_density(&job, 10)?;
        let summary = job
            .summary
            .clone()
            .ok_or_else(|| "Expected a summary".to_owned())?;
        if summary.total != 10 {
            return Err(format!("Unexpected total: {}", summary.total));
        }
        if summary
            .ok
            .saturating_add(summary.error)
            .saturating_add(summary.rate_limit)
            != summary.total
        {
            return Err("Buckets must sum to total".to_owned());
        }
        Ok(())
    })?;

    if server.hits() != 10 {
        return Err(format!("Expected 10 requests, saw {}", server.hits()));
    }
    Ok(())
}

#[test]
fn transport_failures_become_records_not_errors() -> Result<(), String> {
    let Some(endpoint) = dead_endpoint_or_skip() else {
        return Ok(());
    };

    run_async_test(async {
        let mut config = TestConfig::new(endpoint);
        config.clients = Some(2);
        config.total_requests = Some(2);
        config.timeout_ms = Some(2_000);

        let engine = memory_engine();
        let job = engine
            .run_to_completion(config)
            .await
            .map_err(|err| format!("run failed: {}", err))?;

        if job.status != JobStatus::Completed {
            return Err("Transport failures must not fail the job".to_owned());
        }
        let summary = job
            .summary
            .clone()
            .ok_or_else(|| "Expected a summary".to_owned())?;
        if summary.error != 2 || summary.total != 2 {
            return Err(format!(
                "Unexpected summary: error={} total={}",
                summary.error, summary.total
            ));
        }
        for record in &job.results {
            if record.status_code != 0 {
                return Err(format!(
                    "Expected status code 0, got {}",
                    record.status_code
                ));
            }
            if record.response.is_some() {
                return Err("No response must be echoed".to_owned());
            }
            let error = record
                .error
                .as_ref()
                .ok_or_else(|| "Expected an error description".to_owned())?;
            if error.message.is_empty() {
                return Err("Error descriptions must carry a message".to_owned());
            }
        }
        Ok(())
    })
}

#[test]
fn paced_bursts_respect_the_interval() -> Result<(), String> {
    let Some((url, _server)) = spawn_http_server_or_skip(ResponsePlan::ok())? else {
        return Ok(());
    };

    run_async_test(async {
        let mut config = TestConfig::new(url);
        config.total_requests = Some(3);
        config.burst_size = Some(1);
        config.interval_ms = Some(150);

        let engine = memory_engine();
        let started = Instant::now();
        let job = engine
            .run_to_completion(config)
            .await
            .map_err(|err| format!("run failed: {}", err))?;
        let elapsed = started.elapsed();

        if job.results.len() != 3 {
            return Err(format!("Expected 3 records, got {}", job.results.len()));
        }
        // Two inter-burst pauses of 150ms each; allow some timer slack.
        if elapsed < Duration::from_millis(280) {
            return Err(format!("Run finished too fast: {:?}", elapsed));
        }
        Ok(())
    })
}

#[test]
fn oversized_request_bodies_are_truncated_in_the_trace() -> Result<(), String> {
    let Some((url, _server)) = spawn_http_server_or_skip(ResponsePlan::ok())? else {
        return Ok(());
    };

    run_async_test(async {
        let mut config = TestConfig::new(url);
        config.request.method = Some(limitprobe::config::HttpMethod::Post);
        config.request.body = Some(serde_json::Value::String(
            "x".repeat(MAX_BODY_BYTES.saturating_add(50_000)),
        ));

        let engine = memory_engine();
        let job = engine
            .run_to_completion(config)
            .await
            .map_err(|err| format!("run failed: {}", err))?;

        let record = job
            .results
            .first()
            .ok_or_else(|| "Missing record".to_owned())?;
        let body = record
            .request
            .body
            .as_deref()
            .ok_or_else(|| "Expected an echoed body".to_owned())?;
        if !body.ends_with(TRUNCATION_MARKER) {
            return Err("Expected the truncation marker".to_owned());
        }
        if body.len() > MAX_BODY_BYTES.saturating_add(TRUNCATION_MARKER.len()) {
            return Err(format!("Echoed body is too large: {}", body.len()));
        }
        Ok(())
    })
}

#[test]
fn start_test_returns_queued_and_completes_in_the_background() -> Result<(), String> {
    let Some((url, _server)) = spawn_http_server_or_skip(ResponsePlan::ok())? else {
        return Ok(());
    };

    run_async_test(async {
        let engine = memory_engine();
        let queued = engine
            .start_test(TestConfig::new(url))
            .await
            .map_err(|err| format!("start failed: {}", err))?;
        if queued.status != JobStatus::Queued {
            return Err(format!(
                "start_test must return a queued job, got {}",
                queued.status.as_str()
            ));
        }
        if !queued.results.is_empty() || queued.summary.is_some() {
            return Err("Queued jobs must be empty".to_owned());
        }

        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(25)).await;
            let current = engine
                .get_job(&queued.id)
                .await
                .map_err(|err| format!("get failed: {}", err))?
                .ok_or_else(|| "Job disappeared".to_owned())?;
            if current.status == JobStatus::Completed {
                return Ok(());
            }
        }
        Err("Job never completed in the background".to_owned())
    })
}

#[test]
fn rereading_a_completed_job_is_idempotent() -> Result<(), String> {
    let Some((url, _server)) = spawn_http_server_or_skip(ResponsePlan::ok())? else {
        return Ok(());
    };

    run_async_test(async {
        let mut config = TestConfig::new(url);
        config.total_requests = Some(4);

        let engine = memory_engine();
        let job = engine
            .run_to_completion(config)
            .await
            .map_err(|err| format!("run failed: {}", err))?;

        let first = engine
            .get_job(&job.id)
            .await
            .map_err(|err| format!("get failed: {}", err))?
            .ok_or_else(|| "Job missing on first read".to_owned())?;
        let second = engine
            .get_job(&job.id)
            .await
            .map_err(|err| format!("get failed: {}", err))?
            .ok_or_else(|| "Job missing on second read".to_owned())?;

        let first_doc =
            serde_json::to_value(&first).map_err(|err| format!("encode failed: {}", err))?;
        let second_doc =
            serde_json::to_value(&second).map_err(|err| format!("encode failed: {}", err))?;
        if first_doc != second_doc {
            return Err("Re-reads must be identical".to_owned());
        }
        Ok(())
    })
}

#[test]
fn running_an_unknown_job_is_an_error() -> Result<(), String> {
    run_async_test(async {
        let engine = memory_engine();
        match engine.run_job("missing-id").await {
            Ok(_) => Err("Expected a not-found error".to_owned()),
            Err(err) => {
                if err.to_string().contains("was not found") {
                    Ok(())
                } else {
                    Err(format!("Unexpected error: {}", err))
                }
            }
        }
    })
}
