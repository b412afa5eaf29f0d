//! Juice protocol monitor core.
//!
//! Polls the JuiceSwap and JuiceDollar indexers for governance and risk
//! events, renders them as Telegram alerts and delivers them with
//! at-least-once semantics driven by per-category watermarks.

pub mod data;
pub mod delivery;
pub mod error;
pub mod feed;
pub mod infrastructure;
pub mod monitor;
pub mod render;
pub mod snapshot;
pub mod types;

pub use monitor::runner::{Monitor, MonitorOptions, RunSummary};
