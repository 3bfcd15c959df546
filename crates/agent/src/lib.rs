//! `plant-monitor-agent` library crate.
//!
//! Re-exports internal modules for integration testing. The binary
//! entrypoint lives in `main.rs`.

pub mod config;
pub mod feed;
pub mod monitor;
pub mod runner;
