//! Plant monitoring domain logic.
//!
//! Contains the threshold evaluation engine, the per-plant aggregator and
//! the plant directory. All logic in this module is synchronous and free
//! of I/O so it can be tested in isolation.

pub mod aggregator;
pub mod catalog;
pub mod inputs;
pub mod thresholds;
