mod args;
mod config;
mod domain;
mod engine;
mod entry;
mod error;
mod http;
mod logger;
mod metrics;
mod report;
mod store;
mod trace;

use error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
