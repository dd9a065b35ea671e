//! Channel cleanup: classify a page of history, delete it, move the cursor.
//!
//! - [`classify`] splits a page into bulk-deletable and single-deletable ids
//! - [`execute`] issues the delete calls (singles first, then one bulk call)
//! - [`driver`] pages through the channel and owns the per-request session

use chrono::Duration;

pub mod classify;
pub mod driver;
pub mod execute;

pub use classify::{classify, Classification};
pub use driver::{CleanupReport, CleanupSession, Cursor, PaginationDriver};
pub use execute::delete_messages;

/// Reaction that exempts a message from cleanup.
pub const KEEP_EMOJI: &str = "\u{1f4be}"; // 💾

/// Reaction used to acknowledge a clean request.
pub const ACK_EMOJI: &str = "\u{1f9f9}"; // 🧹

/// Tunables for one cleanup run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CleanupPolicy {
    pub keep_emoji: String,
    /// Messages newer than this are deleted through the bulk endpoint.
    ///
    /// Discord allows bulk deletes up to 14 days back; one week leaves room
    /// for clock and pagination skew.
    pub bulk_max_age: Duration,
    pub page_size: usize,
    /// The warning is sent once the session's single-delete total exceeds this.
    pub warning_threshold: usize,
    pub warning_message: String,
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        Self {
            keep_emoji: KEEP_EMOJI.to_string(),
            bulk_max_age: Duration::hours(168),
            page_size: 100,
            warning_threshold: 120,
            warning_message: "This may take a while...".to_string(),
        }
    }
}
