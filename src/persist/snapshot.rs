//! Debounced snapshot writes.

use super::codec;
use super::storage::{KeyValueStore, STORAGE_KEY};
use crate::model::EditorDocument;
use crate::timing::{Debouncer, Millis};
use tracing::{debug, warn};

/// Coalesces document mutations into one storage write per quiet window.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    pending: Debouncer<String>,
    writes: u64,
}

impl SnapshotWriter {
    /// Writer that waits `debounce_ms` after the last staged document.
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            pending: Debouncer::new(debounce_ms),
            writes: 0,
        }
    }

    /// Serialize `doc` now and schedule the write.
    pub fn stage(&mut self, doc: &EditorDocument, now: Millis) {
        self.pending.push(codec::serialize(doc), now);
    }

    /// Write the staged snapshot if its window has elapsed.
    pub fn poll<S: KeyValueStore>(&mut self, store: &mut S, now: Millis) -> bool {
        match self.pending.poll(now) {
            Some(payload) => self.write(store, &payload),
            None => false,
        }
    }

    /// Write the staged snapshot immediately, if any.
    pub fn flush<S: KeyValueStore>(&mut self, store: &mut S) -> bool {
        match self.pending.flush() {
            Some(payload) => self.write(store, &payload),
            None => false,
        }
    }

    /// When the staged snapshot is due.
    pub fn deadline(&self) -> Option<Millis> {
        self.pending.deadline()
    }

    /// Whether a snapshot is staged.
    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }

    /// Successful writes so far.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    fn write<S: KeyValueStore>(&mut self, store: &mut S, payload: &str) -> bool {
        match store.set(STORAGE_KEY, payload) {
            Ok(()) => {
                self.writes += 1;
                debug!(bytes = payload.len(), "Snapshot written");
                true
            }
            Err(e) => {
                warn!(error = %e, "Snapshot write failed");
                false
            }
        }
    }
}
