/// Scan configuration.
use serde::{Deserialize, Serialize};

/// Default number of visited entries between progress updates.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Follow symbolic links when classifying and sizing entries.
    pub follow_links: bool,

    /// Leave dot-files and dot-directories out of the index.
    pub skip_hidden: bool,

    /// Entries visited between `ScanProgress::Update` messages. 0 disables updates.
    pub progress_interval: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            follow_links: false,
            skip_hidden: false,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let opts: ScanOptions = serde_json::from_str(r#"{ "skip_hidden": true }"#).unwrap();
        assert!(opts.skip_hidden);
        assert!(!opts.follow_links);
        assert_eq!(opts.progress_interval, DEFAULT_PROGRESS_INTERVAL);
    }
}
