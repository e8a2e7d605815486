#![forbid(unsafe_code)]

//! Expand/collapse controller and its settle timing.
//!
//! Expanding is measured after a short fixed delay. Collapsing waits for the
//! content container's transition to finish, raced against a fallback
//! deadline; the [`SettleGate`] is consumed by whichever side wins, so the
//! height check runs exactly once per collapse.

use core::time::Duration;

use tracing::{debug, warn};

use crate::config::SyncConfig;
use crate::error::HostError;

/// DOM bookkeeping the controller needs from the host.
pub trait Presentation {
    /// Whether an element with `id` exists.
    fn has_element(&self, id: &str) -> bool;

    /// Add (`enabled`) or remove `class` on the element with `id`.
    fn set_class(&mut self, id: &str, class: &str, enabled: bool) -> Result<(), HostError>;

    /// Replace the text content of the element with `id`.
    fn set_text(&mut self, id: &str, text: &str) -> Result<(), HostError>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionState {
    #[default]
    Collapsed,
    Expanded,
}

impl ExpansionState {
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Collapsed => Self::Expanded,
            Self::Expanded => Self::Collapsed,
        }
    }

    #[must_use]
    pub const fn is_expanded(self) -> bool {
        matches!(self, Self::Expanded)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Collapsed => "collapsed",
            Self::Expanded => "expanded",
        }
    }
}

/// When to measure after entering a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlePlan {
    /// Check once `delay` has elapsed.
    After(Duration),
    /// Check on the container's transition end, or at `fallback` at the latest.
    AwaitTransition { fallback: Duration },
}

/// Two-state toggle controller.
#[derive(Debug, Default, Clone)]
pub struct ToggleStateMachine {
    state: ExpansionState,
}

impl ToggleStateMachine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ExpansionState::Collapsed,
        }
    }

    #[must_use]
    pub const fn state(&self) -> ExpansionState {
        self.state
    }

    /// Flip the state unconditionally and return the new one.
    pub fn toggle(&mut self) -> ExpansionState {
        self.state = self.state.flipped();
        debug!(state = self.state.as_str(), "toggle");
        self.state
    }

    /// Settle timing for the current state.
    #[must_use]
    pub const fn settle_plan(&self, config: &SyncConfig) -> SettlePlan {
        match self.state {
            ExpansionState::Expanded => SettlePlan::After(config.expand_settle()),
            ExpansionState::Collapsed => SettlePlan::AwaitTransition {
                fallback: config.collapse_fallback(),
            },
        }
    }

    /// Push the current state into the view: the expanded class on the
    /// content container and toggle control, plus both labels.
    ///
    /// Individual write failures are logged; the remaining writes still run.
    pub fn apply<V: Presentation>(&self, view: &mut V, config: &SyncConfig) -> bool {
        let expanded = self.state.is_expanded();
        let (status, label) = if expanded {
            (&config.status_expanded, &config.toggle_label_expanded)
        } else {
            (&config.status_collapsed, &config.toggle_label_collapsed)
        };
        let writes = [
            view.set_class(&config.content_id, &config.expanded_class, expanded),
            view.set_class(&config.toggle_id, &config.expanded_class, expanded),
            view.set_text(&config.status_id, status),
            view.set_text(&config.toggle_id, label),
        ];
        let mut clean = true;
        for err in writes.into_iter().filter_map(Result::err) {
            warn!(error = %err, state = self.state.as_str(), "presentation update failed");
            clean = false;
        }
        clean
    }
}

/// Why a pending collapse settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleCause {
    TransitionEnd,
    Fallback,
}

/// One-shot latch for a pending collapse.
///
/// Resolving consumes the gate, so only the first of transition end and
/// fallback can ever produce a check.
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct SettleGate {
    armed_at: Duration,
    fallback_at: Duration,
}

impl SettleGate {
    pub fn arm(now: Duration, fallback: Duration) -> Self {
        Self {
            armed_at: now,
            fallback_at: now.saturating_add(fallback),
        }
    }

    #[must_use]
    pub const fn fallback_at(&self) -> Duration {
        self.fallback_at
    }

    /// Consume the gate, returning how long the collapse took to settle.
    pub fn resolve(self, cause: SettleCause, now: Duration) -> Duration {
        let waited = now.saturating_sub(self.armed_at);
        debug!(?cause, waited_ms = waited.as_millis() as u64, "collapse settled");
        waited
    }
}
