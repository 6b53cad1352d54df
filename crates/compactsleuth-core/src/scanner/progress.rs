/// Scan progress reporting: lightweight messages sent from the analyzer
/// to whoever subscribed via `ScanSession::subscribe_progress`.
///
/// Errors are deliberately absent: skipped entries and failed directories
/// are reported through `tracing` only.
use std::time::Duration;

/// Maximum number of progress messages that may queue up in the channel.
///
/// Updates are sent with `try_send`, so a slow consumer loses intermediate
/// updates instead of stalling the walk.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 4_096;

#[derive(Debug, Clone, PartialEq)]
pub enum ScanProgress {
    /// Periodic update with running totals for the current `analyze` call.
    Update {
        files_found: u64,
        dirs_found: u64,
        total_size: u64,
        current_path: String,
    },
    /// The requested directory finished analysis.
    Complete {
        duration: Duration,
        files_found: u64,
        dirs_found: u64,
        error_count: u64,
    },
    /// The walk stopped because processing was paused.
    Cancelled,
}
