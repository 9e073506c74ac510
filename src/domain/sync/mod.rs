//! Sync domain - aggregation, output sink and the sync cycle

mod builder;
mod service;
mod sink;

pub use builder::{DuplicatePolicy, KeySet, KeySetBuilder};
pub use service::{SyncReport, SyncService, SyncSettings};
pub use sink::KeySink;

#[cfg(test)]
pub use sink::mock;
