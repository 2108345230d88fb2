//! Runtime Configuration
//!
//! Per-thread knobs for the reactive runtime. The configuration is plain
//! data so a host can embed it in its own settings file.

use serde::{Deserialize, Serialize};

/// Configuration of the reactive runtime on one thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// How many triggers may be nested inside one another before the
    /// innermost propagation is abandoned. Unbounded when `None`.
    ///
    /// Running effects are never re-notified, so only schedulers that
    /// trigger from inside their callback can recurse without end. Long
    /// chains of computed values nest one trigger per link.
    pub max_trigger_depth: Option<usize>,

    /// Log a warning when a read-only computed value is written.
    pub warn_on_readonly_write: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_trigger_depth: None,
            warn_on_readonly_write: true,
        }
    }
}

impl RuntimeConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Set the trigger depth bound.
    pub fn with_max_trigger_depth(mut self, depth: usize) -> Self {
        self.max_trigger_depth = Some(depth);
        self
    }

    /// Enable or disable the read-only computed warning.
    pub fn with_readonly_warning(mut self, enabled: bool) -> Self {
        self.warn_on_readonly_write = enabled;
        self
    }
}
