#![forbid(unsafe_code)]

//! The height sync engine.
//!
//! [`HeightSync`] owns every piece of mutable state (last reported height,
//! expansion state, pending deadlines, the collapse gate) and is driven
//! entirely by the host: DOM events are forwarded to the `on_*` methods and
//! the host wakes the engine at [`HeightSync::next_deadline`] by calling
//! [`HeightSync::advance`]. Nothing here blocks or spawns.

use core::time::Duration;

use tracing::{debug, error, trace, warn};

use crate::config::SyncConfig;
use crate::error::{ElementRole, SyncError};
use crate::filter::HeightChangeFilter;
use crate::notifier::{Delivery, DeliveryStats, EmbeddingContext, ParentNotifier};
use crate::reader::{HeightReader, HeightSource};
use crate::signals::{HostCapabilities, TransitionSource, Trigger};
use crate::timers::{DeterministicClock, TimerKind, TimerQueue};
use crate::toggle::{
    ExpansionState, Presentation, SettleCause, SettleGate, SettlePlan, ToggleStateMachine,
};

/// What a single height check did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Height changed; a notification was attempted.
    Sent { height: u32, delivery: Delivery },
    /// Height equals the last report; nothing sent.
    Unchanged(u32),
    /// The host could not measure; the check was abandoned.
    ReadFailed,
}

/// A check that ran, with the trigger and the time it was due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredCheck {
    pub trigger: Trigger,
    pub at: Duration,
    pub outcome: CheckOutcome,
}

/// Host-driven height sync engine.
pub struct HeightSync<S, P, V> {
    config: SyncConfig,
    clock: DeterministicClock,
    reader: HeightReader<S>,
    filter: HeightChangeFilter<P>,
    view: V,
    toggle: ToggleStateMachine,
    timers: TimerQueue,
    collapse: Option<SettleGate>,
    running: bool,
    mutation_watch: bool,
    mutation_batches: u32,
}

impl<S, P, V> HeightSync<S, P, V>
where
    S: HeightSource,
    P: EmbeddingContext,
    V: Presentation,
{
    /// Build an engine. Nothing is armed until [`Self::start`].
    pub fn new(config: SyncConfig, heights: S, parent: P, view: V) -> Result<Self, SyncError> {
        let config = config.validated()?;
        let notifier = ParentNotifier::new(parent, config.target_origin.clone());
        Ok(Self {
            config,
            clock: DeterministicClock::new(),
            reader: HeightReader::new(heights),
            filter: HeightChangeFilter::new(notifier),
            view,
            toggle: ToggleStateMachine::new(),
            timers: TimerQueue::new(),
            collapse: None,
            running: false,
            mutation_watch: false,
            mutation_batches: 0,
        })
    }

    /// Verify the required elements and arm the startup check and poll.
    ///
    /// A missing element aborts initialization: no source is armed and the
    /// engine stays stopped. Starting a running engine is a no-op.
    pub fn start(&mut self, now: Duration, caps: HostCapabilities) -> Result<(), SyncError> {
        if self.running {
            return Ok(());
        }
        self.clock.set(now);
        for role in ElementRole::ALL {
            let id = self.config.element_id(role);
            if !self.view.has_element(id) {
                error!(
                    element = role.label(),
                    id,
                    "required element missing; height sync disabled"
                );
                return Err(SyncError::MissingElement {
                    role,
                    id: id.to_owned(),
                });
            }
        }

        let now = self.clock.now();
        let startup_at = now.saturating_add(self.config.startup_delay());
        let poll_at = now.saturating_add(self.config.poll_interval());
        self.timers.arm(TimerKind::Startup, startup_at);
        self.timers.arm(TimerKind::Poll, poll_at);
        self.mutation_watch = caps.mutation_observer;
        if !self.mutation_watch {
            warn!("mutation observation unavailable; relying on resize and poll");
        }
        self.running = true;
        debug!(
            startup_ms = self.config.startup_delay_ms,
            poll_ms = self.config.poll_interval_ms,
            "height sync started"
        );
        Ok(())
    }

    /// Tear down: drop every pending deadline and the collapse gate.
    ///
    /// Returns whether the engine was running.
    pub fn stop(&mut self) -> bool {
        let was_running = self.running;
        self.running = false;
        self.timers.clear();
        self.collapse = None;
        self.mutation_batches = 0;
        if was_running {
            debug!("height sync stopped");
        }
        was_running
    }

    /// Viewport resized: check immediately.
    pub fn on_resize(&mut self, now: Duration) -> Option<FiredCheck> {
        if !self.running {
            return None;
        }
        self.clock.set(now);
        Some(self.check(Trigger::Resize))
    }

    /// A mutation batch was observed: restart the debounce window.
    ///
    /// Returns `false` when the batch was ignored (stopped, or the host
    /// reported no mutation observer at start).
    pub fn on_mutations(&mut self, now: Duration) -> bool {
        if !self.running || !self.mutation_watch {
            return false;
        }
        self.clock.set(now);
        let deadline = self.clock.now().saturating_add(self.config.mutation_debounce());
        self.timers.arm(TimerKind::MutationDebounce, deadline);
        self.mutation_batches = self.mutation_batches.saturating_add(1);
        true
    }

    /// User activated the toggle: flip, repaint, and schedule the settle check.
    pub fn on_toggle(&mut self, now: Duration) -> Result<ExpansionState, SyncError> {
        if !self.running {
            return Err(SyncError::NotRunning);
        }
        self.clock.set(now);
        let now = self.clock.now();

        let state = self.toggle.toggle();
        self.toggle.apply(&mut self.view, &self.config);

        // A newer toggle supersedes whatever the previous one was waiting on.
        self.timers.cancel(TimerKind::ExpandSettle);
        self.timers.cancel(TimerKind::CollapseFallback);
        self.collapse = None;

        match self.toggle.settle_plan(&self.config) {
            SettlePlan::After(delay) => {
                self.timers.arm(TimerKind::ExpandSettle, now.saturating_add(delay));
            }
            SettlePlan::AwaitTransition { fallback } => {
                let gate = SettleGate::arm(now, fallback);
                self.timers.arm(TimerKind::CollapseFallback, gate.fallback_at());
                self.collapse = Some(gate);
            }
        }
        Ok(state)
    }

    /// A transition finished somewhere in the document.
    ///
    /// Only the content container's own transition settles a pending
    /// collapse; everything else is ignored.
    pub fn on_transition_end(
        &mut self,
        now: Duration,
        source: TransitionSource,
    ) -> Option<FiredCheck> {
        if !self.running || source != TransitionSource::Content {
            return None;
        }
        self.clock.set(now);
        let gate = self.collapse.take()?;
        self.timers.cancel(TimerKind::CollapseFallback);
        gate.resolve(SettleCause::TransitionEnd, self.clock.now());
        Some(self.check(Trigger::CollapseSettled))
    }

    /// Explicit check requested by the host page.
    pub fn check_now(&mut self, now: Duration) -> Result<FiredCheck, SyncError> {
        if !self.running {
            return Err(SyncError::NotRunning);
        }
        self.clock.set(now);
        Ok(self.check(Trigger::Manual))
    }

    /// Run every deadline due at `now`, earliest first.
    pub fn advance(&mut self, now: Duration) -> Vec<FiredCheck> {
        let mut fired = Vec::new();
        if !self.running {
            return fired;
        }
        self.clock.set(now);
        let now = self.clock.now();

        while let Some((kind, deadline)) = self.timers.pop_due(now) {
            let trigger = match kind {
                TimerKind::Startup => Trigger::Startup,
                TimerKind::MutationDebounce => {
                    trace!(batches = self.mutation_batches, "mutation burst settled");
                    self.mutation_batches = 0;
                    Trigger::Mutation
                }
                TimerKind::Poll => {
                    let interval = self.config.poll_interval();
                    let mut next = deadline.saturating_add(interval);
                    // Coalesce ticks missed while the host was asleep.
                    if next <= now {
                        next = now.saturating_add(interval);
                    }
                    // At the end of the representable timeline there is no later tick.
                    if next > now {
                        self.timers.arm(TimerKind::Poll, next);
                    } else {
                        debug!("poll schedule exhausted");
                    }
                    Trigger::Poll
                }
                TimerKind::ExpandSettle => Trigger::Expand,
                TimerKind::CollapseFallback => {
                    let Some(gate) = self.collapse.take() else {
                        continue;
                    };
                    gate.resolve(SettleCause::Fallback, deadline);
                    Trigger::CollapseFallback
                }
            };
            let mut check = self.check(trigger);
            check.at = deadline;
            fired.push(check);
        }
        fired
    }

    fn check(&mut self, trigger: Trigger) -> FiredCheck {
        let silent = trigger.is_silent();
        let at = self.clock.now();
        let height = match self.reader.read() {
            Ok(height) => height,
            Err(err) => {
                warn!(trigger = trigger.as_str(), error = %err, "height read failed");
                return FiredCheck {
                    trigger,
                    at,
                    outcome: CheckOutcome::ReadFailed,
                };
            }
        };

        if silent {
            trace!(trigger = trigger.as_str(), height, "height check");
        } else {
            debug!(trigger = trigger.as_str(), height, "height check");
        }

        let outcome = if self.filter.maybe_notify(height, silent) {
            let label = format!("{height}{}", self.config.height_label_suffix);
            if let Err(err) = self.view.set_text(&self.config.height_label_id, &label) {
                warn!(error = %err, "height label update failed");
            }
            CheckOutcome::Sent {
                height,
                delivery: self.filter.last_delivery().unwrap_or(Delivery::NoParent),
            }
        } else {
            CheckOutcome::Unchanged(height)
        };
        FiredCheck {
            trigger,
            at,
            outcome,
        }
    }

    /// Earliest time the host must call [`Self::advance`], if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        if self.running {
            self.timers.next_deadline()
        } else {
            None
        }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub const fn expansion(&self) -> ExpansionState {
        self.toggle.state()
    }

    #[must_use]
    pub const fn last_reported(&self) -> u32 {
        self.filter.last_reported()
    }

    /// Whether a collapse is waiting on its transition end or fallback.
    #[must_use]
    pub const fn collapse_pending(&self) -> bool {
        self.collapse.is_some()
    }

    #[must_use]
    pub const fn delivery_stats(&self) -> DeliveryStats {
        self.filter.notifier().stats()
    }

    #[must_use]
    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    #[must_use]
    pub const fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub const fn heights(&self) -> &S {
        self.reader.source()
    }

    pub fn heights_mut(&mut self) -> &mut S {
        self.reader.source_mut()
    }

    pub const fn parent(&self) -> &P {
        self.filter.notifier().context()
    }

    pub fn parent_mut(&mut self) -> &mut P {
        self.filter.notifier_mut().context_mut()
    }

    pub const fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }
}

impl<S, P, V> core::fmt::Debug for HeightSync<S, P, V>
where
    S: HeightSource,
    P: EmbeddingContext,
    V: Presentation,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HeightSync")
            .field("running", &self.running)
            .field("state", &self.toggle.state())
            .field("last_reported", &self.filter.last_reported())
            .field("collapse_pending", &self.collapse.is_some())
            .field("next_deadline", &self.timers.next_deadline())
            .finish()
    }
}
