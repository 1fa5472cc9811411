//! The visible result log.
//!
//! [`ResultLog`] accumulates [`ResultRow`]s for the life of the session:
//! append-only, ordered by arrival, never persisted. Each append is also
//! published on a broadcast channel — the "bring the new row into view"
//! signal a front end subscribes to.

use deat_core::ResultRow;
use parking_lot::RwLock;
use tokio::sync::broadcast;

/// Capacity of the appended-row broadcast channel. A lagging subscriber
/// misses notifications, not log entries — the log itself is complete.
const APPEND_CHANNEL_CAPACITY: usize = 64;

/// Append-only store of rendered result rows.
pub struct ResultLog {
    rows: RwLock<Vec<ResultRow>>,
    appended: broadcast::Sender<ResultRow>,
}

impl ResultLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        let (appended, _) = broadcast::channel(APPEND_CHANNEL_CAPACITY);
        Self {
            rows: RwLock::new(Vec::new()),
            appended,
        }
    }

    /// Append a row and signal subscribers.
    pub fn append(&self, row: ResultRow) {
        self.rows.write().push(row.clone());
        // No subscribers is fine; the log still records the row.
        let _ = self.appended.send(row);
    }

    /// Snapshot of all rows, in arrival order.
    #[must_use]
    pub fn rows(&self) -> Vec<ResultRow> {
        self.rows.read().clone()
    }

    /// Number of rows appended so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Whether the log is still empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// Subscribe to appended rows.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ResultRow> {
        self.appended.subscribe()
    }
}

impl Default for ResultLog {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
