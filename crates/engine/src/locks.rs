// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-sandbox in-process lock map.
//!
//! `SandboxManager::ensure_running` needs at most one promotion in flight
//! per sandbox on a single process; this is the single-process half of
//! that guarantee (the other half is the row lock `bay-storage` takes on
//! Postgres). A `parking_lot::Mutex` guards the short map-mutation section
//! (create/remove an entry); a `tokio::sync::Mutex` guards the long
//! critical section that awaits driver/runtime I/O.

use parking_lot::Mutex as SyncMutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Default)]
pub struct SandboxLocks {
    entries: SyncMutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl SandboxLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `sandbox_id`, creating its entry if absent.
    /// Holding the returned guard serializes every caller on this sandbox
    /// within this process.
    pub async fn acquire(&self, sandbox_id: &str) -> OwnedMutexGuard<()> {
        let entry = {
            let mut entries = self.entries.lock();
            entries.entry(sandbox_id.to_string()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
        };
        entry.lock_owned().await
    }

    /// Drop the map entry for `sandbox_id` if nothing else references it.
    /// Called after a sandbox is hard-deleted, so the map does not grow
    /// without bound over the life of the process.
    pub fn cleanup(&self, sandbox_id: &str) {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(sandbox_id) {
            if Arc::strong_count(entry) == 1 {
                entries.remove(sandbox_id);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;
