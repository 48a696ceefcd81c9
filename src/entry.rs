use std::sync::Arc;

use clap::Parser;
use tracing::info;

use crate::args::ProbeArgs;
use crate::config;
use crate::engine::Engine;
use crate::error::AppResult;
use crate::store::{FileStore, JobStore, MemoryStore};

pub(crate) fn run() -> AppResult<()> {
    let args = ProbeArgs::parse();
    crate::logger::init_logging(args.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args))
}

async fn run_async(args: ProbeArgs) -> AppResult<()> {
    let file = config::load_config(args.config.as_deref())?;
    let test_config = args.resolve_config(file)?;

    let store: Arc<dyn JobStore> = match args.jobs_file.as_deref() {
        Some(path) => Arc::new(FileStore::new(path)),
        None => Arc::new(MemoryStore::new()),
    };
    let engine = Engine::new(store);

    info!(
        "Probing {} with {} request(s) across {} client(s)",
        test_config.endpoint,
        test_config.attempt_total(),
        test_config.worker_count()
    );

    let job = engine.run_to_completion(test_config).await?;
    crate::report::print_summary(&job);

    if let Some(path) = args.export_json.as_deref() {
        crate::report::export_job_json(path, &job)?;
        info!("Job document written to {}", path);
    }

    Ok(())
}
