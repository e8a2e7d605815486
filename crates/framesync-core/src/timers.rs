#![forbid(unsafe_code)]

//! Deterministic deadline bookkeeping.
//!
//! The engine never sleeps. Each scheduled callback is a deadline keyed by
//! [`TimerKind`]; the host reads [`TimerQueue::next_deadline`], wakes at that
//! time and hands the engine the current monotonic timestamp. At most one
//! deadline per kind is pending, so re-arming a kind cancels and replaces
//! its previous deadline (this is what turns the mutation timer into a
//! debounce).

use core::time::Duration;

/// Host monotonic clock, as an offset from when the engine was created.
///
/// Tests drive it by hand; the browser binding sets it from `performance.now()`.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Set current monotonic time. Never moves backwards.
    pub fn set(&mut self, now: Duration) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

/// Which scheduled callback a deadline belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Startup,
    MutationDebounce,
    Poll,
    ExpandSettle,
    CollapseFallback,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    kind: TimerKind,
    deadline: Duration,
    seq: u64,
}

/// Pending deadlines, fired in `(deadline, arming order)` order.
#[derive(Debug, Default, Clone)]
pub struct TimerQueue {
    pending: Vec<Pending>,
    next_seq: u64,
}

impl TimerQueue {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_seq: 0,
        }
    }

    /// Arm `kind` at `deadline`, replacing any pending deadline of that kind.
    ///
    /// Returns `true` if an earlier deadline was replaced.
    pub fn arm(&mut self, kind: TimerKind, deadline: Duration) -> bool {
        let replaced = self.cancel(kind);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending {
            kind,
            deadline,
            seq,
        });
        replaced
    }

    /// Drop the pending deadline of `kind`. Returns whether one existed.
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.kind != kind);
        self.pending.len() != before
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    #[must_use]
    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.pending.iter().any(|p| p.kind == kind)
    }

    #[must_use]
    pub fn deadline(&self, kind: TimerKind) -> Option<Duration> {
        self.pending
            .iter()
            .find(|p| p.kind == kind)
            .map(|p| p.deadline)
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|p| p.deadline).min()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return the earliest deadline that is due at `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerKind, Duration)> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.deadline <= now)
            .min_by_key(|(_, p)| (p.deadline, p.seq))
            .map(|(idx, _)| idx)?;
        let fired = self.pending.swap_remove(idx);
        Some((fired.kind, fired.deadline))
    }
}
