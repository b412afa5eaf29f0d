//! Watermark values and their on-disk store.

pub mod store;
pub mod watermark;
