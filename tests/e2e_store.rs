mod support_engine;

use std::sync::Arc;

use tempfile::tempdir;

use limitprobe::config::TestConfig;
use limitprobe::domain::JobStatus;
use limitprobe::engine::Engine;
use limitprobe::store::FileStore;

use support_engine::{ResponsePlan, run_async_test, spawn_http_server_or_skip};

#[test]
fn finished_jobs_survive_in_the_file_store() -> Result<(), String> {
    let Some((url, _server)) = spawn_http_server_or_skip(ResponsePlan::ok())? else {
        return Ok(());
    };

    run_async_test(async {
        let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
        let path = dir.path().join("data").join("test-logs.json");

        let mut config = TestConfig::new(url);
        config.total_requests = Some(2);

        let engine = Engine::new(Arc::new(FileStore::new(&path)));
        let job = engine
            .run_to_completion(config)
            .await
            .map_err(|err| format!("run failed: {}", err))?;

        // A separate engine over the same file sees the terminal document.
        let reopened = Engine::new(Arc::new(FileStore::new(&path)));
        let persisted = reopened
            .get_job(&job.id)
            .await
            .map_err(|err| format!("get failed: {}", err))?
            .ok_or_else(|| "Job missing after reopen".to_owned())?;

        if persisted.status != JobStatus::Completed {
            return Err("Persisted job must be completed".to_owned());
        }
        if persisted.results.len() != 2 {
            return Err(format!(
                "Persisted job lost records: {}",
                persisted.results.len()
            ));
        }
        let summary = persisted
            .summary
            .ok_or_else(|| "Persisted job lost its summary".to_owned())?;
        if summary.total != 2 {
            return Err(format!("Unexpected persisted total: {}", summary.total));
        }

        let listed = reopened
            .list_jobs()
            .await
            .map_err(|err| format!("list failed: {}", err))?;
        if listed.len() != 1 {
            return Err(format!("Expected one stored job, got {}", listed.len()));
        }
        Ok(())
    })
}

#[test]
fn the_terminal_write_is_the_only_one_carrying_results() -> Result<(), String> {
    let Some((url, _server)) = spawn_http_server_or_skip(ResponsePlan::ok())? else {
        return Ok(());
    };

    run_async_test(async {
        let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
        let path = dir.path().join("jobs.json");

        let mut config = TestConfig::new(url);
        config.total_requests = Some(3);

        let engine = Engine::new(Arc::new(FileStore::new(&path)));
        let job = engine
            .run_to_completion(config)
            .await
            .map_err(|err| format!("run failed: {}", err))?;

        // The document on disk is the terminal state: completed, sorted, with
        // a summary whose counters match the stored records.
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| format!("read failed: {}", err))?;
        let document: serde_json::Value =
            serde_json::from_str(&raw).map_err(|err| format!("decode failed: {}", err))?;
        let stored = document
            .get("jobs")
            .and_then(|jobs| jobs.get(&job.id))
            .ok_or_else(|| "Stored document missing".to_owned())?;
        if stored.get("status").and_then(serde_json::Value::as_str) != Some("completed") {
            return Err("Stored status must be completed".to_owned());
        }
        let results = stored
            .get("results")
            .and_then(serde_json::Value::as_array)
            .ok_or_else(|| "Stored results missing".to_owned())?;
        if results.len() != 3 {
            return Err(format!("Expected 3 stored records, got {}", results.len()));
        }
        let seqs: Vec<u64> = results
            .iter()
            .filter_map(|record| record.get("seq").and_then(serde_json::Value::as_u64))
            .collect();
        if seqs != vec![1, 2, 3] {
            return Err(format!("Stored records out of order: {:?}", seqs));
        }
        Ok(())
    })
}
