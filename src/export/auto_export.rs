//! When to write the corrected table back after label edits.
//!
//! The host loop owns the clock, so every call takes `now`.

use std::time::Duration;
use web_time::Instant;

use crate::config::AutoExportConfig;

/// Export schedule for unsaved label edits.
///
/// An export is due once the edits have been quiet for the debounce delay
/// and the previous attempt is at least the minimum interval old. A failed
/// attempt keeps the edits unexported, so with a zero interval the next tick
/// tries again.
#[derive(Debug)]
pub struct AutoExportManager {
    enabled: bool,
    debounce: Duration,
    min_interval: Duration,
    /// Latest edit not yet written; `None` when the file is up to date
    unexported_since: Option<Instant>,
    last_attempt: Option<Instant>,
}

impl AutoExportManager {
    /// Schedule from configuration. Stays off without a destination path.
    pub fn from_config(config: &AutoExportConfig) -> Self {
        let enabled = config.enabled && config.path.is_some();
        if config.enabled && !enabled {
            log::warn!("Auto-export enabled without a path, leaving it off");
        }
        Self {
            enabled,
            debounce: Duration::from_secs(config.debounce_secs),
            min_interval: Duration::from_secs(config.interval_secs),
            unexported_since: None,
            last_attempt: None,
        }
    }

    /// Note a label edit at `now`, restarting the debounce delay.
    pub fn record_change(&mut self, now: Instant) {
        self.unexported_since = Some(now);
    }

    /// Whether edits are waiting to be written.
    pub fn has_unexported(&self) -> bool {
        self.unexported_since.is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether an export should run at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(changed) = self.unexported_since else {
            return false;
        };
        let quiet = now.saturating_duration_since(changed) >= self.debounce;
        let spaced = self
            .last_attempt
            .is_none_or(|attempt| now.saturating_duration_since(attempt) >= self.min_interval);
        quiet && spaced
    }

    /// Record an export attempt made at `now`. Edits stay pending on failure.
    pub fn record_attempt(&mut self, now: Instant, succeeded: bool) {
        self.last_attempt = Some(now);
        if succeeded {
            self.unexported_since = None;
        } else {
            log::debug!("Auto-export will retry after {:?}", self.min_interval);
        }
    }
}
