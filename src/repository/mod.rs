mod conversion;
mod snapshot_repository;

pub use snapshot_repository::{SnapshotRepository, SnapshotStorage};

#[cfg(test)]
pub mod memory;
