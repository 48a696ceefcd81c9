//! Core library for the `limitprobe` CLI.
//!
//! This crate provides the building blocks used by the binary: the typed test
//! configuration, the job/result document model, the request tracer, the HTTP
//! client wrapper, the metrics aggregator, the job store, and the execution
//! engine that coordinates a probe run. The primary user-facing interface is
//! the `limitprobe` command-line application; library APIs may evolve as the
//! CLI grows.
pub mod args;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod http;
pub mod metrics;
pub mod store;
pub mod trace;
