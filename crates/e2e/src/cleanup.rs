//! Feed cleanup registry.
//!
//! Tests that create feed records through the UI register the resulting
//! `feed_id` here, either for deletion or for deactivation. The runner
//! executes the registered reversions after the test body settles (pass,
//! fail, panic or timeout alike), so a broken test never leaks feeds
//! into the shared supplier account.
//!
//! Reversion is best-effort: a missing row or a per-entry connection error
//! is logged and swallowed, because cleanup must never fail a test
//! retroactively or hide its original result. When the database connection
//! parameters are absent entirely, teardown is skipped as a whole: that is
//! "cleanup intentionally skipped", not "cleanup attempted and failed".

use parking_lot::Mutex;
use tracing::{debug, warn};

use hubtest_common::{FeedStore, TestConfig};

/// Per-test registry of feed ids to revert in teardown.
///
/// One instance per test execution; the runner shares it into the test body
/// behind an `Arc` and drains it exactly once afterwards.
#[derive(Debug, Default)]
pub struct CleanupRegistry {
    to_deactivate: Mutex<Vec<String>>,
    to_delete: Mutex<Vec<String>>,
}

impl CleanupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a feed for deletion in teardown. Empty ids are ignored.
    /// Duplicates are kept and processed; deduplication is the caller's
    /// concern.
    pub fn register_delete(&self, feed_id: &str) {
        if feed_id.is_empty() {
            return;
        }
        self.to_delete.lock().push(feed_id.to_string());
    }

    /// Register a feed for deactivation in teardown. Same rules as
    /// [`register_delete`](Self::register_delete).
    pub fn register_deactivate(&self, feed_id: &str) {
        if feed_id.is_empty() {
            return;
        }
        self.to_deactivate.lock().push(feed_id.to_string());
    }

    /// Number of entries currently registered, deactivations + deletions.
    pub fn pending(&self) -> usize {
        self.to_deactivate.lock().len() + self.to_delete.lock().len()
    }

    /// Execute the registered reversions.
    ///
    /// Deactivations run before deletions: deactivation is a state change
    /// on a row that deletion would remove. Within each class, insertion
    /// order is preserved and every entry is attempted even when an earlier
    /// one fails. Entries are drained, so a second call finds nothing to do.
    pub async fn run(&self, config: &TestConfig, store: &dyn FeedStore) {
        let to_deactivate = std::mem::take(&mut *self.to_deactivate.lock());
        let to_delete = std::mem::take(&mut *self.to_delete.lock());

        if !config.db_configured() {
            if !to_deactivate.is_empty() || !to_delete.is_empty() {
                debug!(
                    deactivate = to_deactivate.len(),
                    delete = to_delete.len(),
                    "db connection not configured, skipping feed cleanup"
                );
            }
            return;
        }

        for feed_id in &to_deactivate {
            if let Err(e) = store.deactivate_by_id(feed_id).await {
                warn!(%feed_id, "cleanup: feed deactivation failed: {e}");
            }
        }
        for feed_id in &to_delete {
            if let Err(e) = store.delete_by_id(feed_id).await {
                warn!(%feed_id, "cleanup: feed deletion failed: {e}");
            }
        }
    }
}
