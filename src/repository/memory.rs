//! Snapshot storage kept in memory, used by the tests.

use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;

use super::SnapshotStorage;
use crate::models::Snapshot;

#[derive(Default)]
pub struct MemorySnapshots {
    stored: Mutex<Snapshot>,
    saves: Mutex<usize>,
    fail: Mutex<bool>,
}

impl MemorySnapshots {
    pub fn with(snapshot: Snapshot) -> MemorySnapshots {
        MemorySnapshots {
            stored: Mutex::new(snapshot),
            ..Default::default()
        }
    }

    pub fn stored(&self) -> Snapshot {
        self.stored.lock().unwrap().clone()
    }

    pub fn saves(&self) -> usize {
        *self.saves.lock().unwrap()
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

#[async_trait]
impl SnapshotStorage for MemorySnapshots {
    async fn load(&self) -> Result<Snapshot, anyhow::Error> {
        if *self.fail.lock().unwrap() {
            return Err(anyhow!("Disk I/O error"));
        }
        Ok(self.stored())
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), anyhow::Error> {
        if *self.fail.lock().unwrap() {
            return Err(anyhow!("Disk I/O error"));
        }
        *self.stored.lock().unwrap() = snapshot.clone();
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }
}
