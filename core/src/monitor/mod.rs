//! Orchestration: cycle aggregation, health counters and the phase runner.
//!
//! `cycle` folds poll results and applies the gated commit.
//! `health` keeps the counters and logs them periodically.
//! `runner` drives INIT, catch-up, steady state and shutdown.

pub mod cycle;
pub mod health;
pub mod runner;
