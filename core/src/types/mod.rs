//! Plain value types shared across the monitor.

pub mod alert;
pub mod category;
pub mod config;
pub mod health;
