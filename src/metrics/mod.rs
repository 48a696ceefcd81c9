//! Running metrics aggregation for in-flight jobs.
mod aggregator;
mod collector;


pub use aggregator::MetricsAggregator;
pub use collector::{CollectedRun, spawn_record_collector};
