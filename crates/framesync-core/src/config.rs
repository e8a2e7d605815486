#![forbid(unsafe_code)]

//! Tunable timings, element ids and label text for the sync engine.
//!
//! Every field defaults to the value the embedded page has always used, so
//! `SyncConfig::default()` behaves like the hardcoded original. Hosts may
//! pass a JSON object overriding any subset of fields:
//!
//! ```json
//! { "poll_interval_ms": 1000, "target_origin": "https://example.com" }
//! ```

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ElementRole, SyncError};

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Delay after start before the first height check.
    pub startup_delay_ms: u64,
    /// Delay after entering Expanded before checking.
    pub expand_settle_ms: u64,
    /// Fallback deadline after entering Collapsed when no transition end arrives.
    pub collapse_fallback_ms: u64,
    /// Quiet window for mutation batches.
    pub mutation_debounce_ms: u64,
    /// Period of the background poll.
    pub poll_interval_ms: u64,

    /// Destination origin passed to `postMessage`.
    pub target_origin: String,

    pub toggle_id: String,
    pub content_id: String,
    pub status_id: String,
    pub height_label_id: String,

    /// Class applied to the content container and toggle while expanded.
    pub expanded_class: String,

    pub status_collapsed: String,
    pub status_expanded: String,
    pub toggle_label_collapsed: String,
    pub toggle_label_expanded: String,
    /// Appended to the height in the height display label.
    pub height_label_suffix: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            startup_delay_ms: 100,
            expand_settle_ms: 100,
            collapse_fallback_ms: 600,
            mutation_debounce_ms: 300,
            poll_interval_ms: 2000,
            target_origin: "*".into(),
            toggle_id: "toggle-button".into(),
            content_id: "content".into(),
            status_id: "status".into(),
            height_label_id: "height-display".into(),
            expanded_class: "expanded".into(),
            status_collapsed: "Collapsed".into(),
            status_expanded: "Expanded".into(),
            toggle_label_collapsed: "Show more".into(),
            toggle_label_expanded: "Show less".into(),
            height_label_suffix: "px".into(),
        }
    }
}

impl SyncConfig {
    /// Load from a JSON string; absent fields keep their defaults.
    pub fn from_json_str(s: &str) -> Result<Self, SyncError> {
        let config: Self = serde_json::from_str(s)?;
        config.validated()
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.poll_interval_ms == 0 {
            errors.push("poll_interval_ms must be > 0".into());
        }
        if self.collapse_fallback_ms == 0 {
            errors.push("collapse_fallback_ms must be > 0".into());
        }
        if self.target_origin.trim().is_empty() {
            errors.push("target_origin must not be empty".into());
        }
        if self.expanded_class.trim().is_empty() {
            errors.push("expanded_class must not be empty".into());
        }
        for role in ElementRole::ALL {
            if self.element_id(role).trim().is_empty() {
                errors.push(format!("id for {} must not be empty", role.label()));
            }
        }
        errors
    }

    /// Consume the config, returning it only if [`Self::validate`] is clean.
    pub fn validated(self) -> Result<Self, SyncError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(SyncError::InvalidConfig(errors))
        }
    }

    /// Element id configured for `role`.
    #[must_use]
    pub fn element_id(&self, role: ElementRole) -> &str {
        match role {
            ElementRole::Toggle => &self.toggle_id,
            ElementRole::Content => &self.content_id,
            ElementRole::Status => &self.status_id,
            ElementRole::HeightLabel => &self.height_label_id,
        }
    }

    #[must_use]
    pub const fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    #[must_use]
    pub const fn expand_settle(&self) -> Duration {
        Duration::from_millis(self.expand_settle_ms)
    }

    #[must_use]
    pub const fn collapse_fallback(&self) -> Duration {
        Duration::from_millis(self.collapse_fallback_ms)
    }

    #[must_use]
    pub const fn mutation_debounce(&self) -> Duration {
        Duration::from_millis(self.mutation_debounce_ms)
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
