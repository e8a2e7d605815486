#![forbid(unsafe_code)]

//! Duplicate-height suppression.

use tracing::trace;

use crate::notifier::{Delivery, EmbeddingContext, ParentNotifier};

/// Gate in front of [`ParentNotifier`] that only lets changed heights through.
///
/// The baseline starts at `0`, meaning "never reported". The baseline is
/// advanced before the send, so a failed dispatch is not retried for the
/// same height; the next genuine change sends again.
#[derive(Debug)]
pub struct HeightChangeFilter<P> {
    last_reported: u32,
    last_delivery: Option<Delivery>,
    notifier: ParentNotifier<P>,
}

impl<P: EmbeddingContext> HeightChangeFilter<P> {
    pub const fn new(notifier: ParentNotifier<P>) -> Self {
        Self {
            last_reported: 0,
            last_delivery: None,
            notifier,
        }
    }

    /// Forward `height` to the parent if it differs from the last report.
    ///
    /// Returns `true` when a notification was sent.
    pub fn maybe_notify(&mut self, height: u32, silent: bool) -> bool {
        if height == self.last_reported {
            if !silent {
                trace!(height, "height unchanged; not notifying");
            }
            return false;
        }
        self.last_reported = height;
        self.last_delivery = Some(self.notifier.send(height));
        true
    }

    #[must_use]
    pub const fn last_reported(&self) -> u32 {
        self.last_reported
    }

    /// Outcome of the most recent send, if any.
    #[must_use]
    pub const fn last_delivery(&self) -> Option<Delivery> {
        self.last_delivery
    }

    pub const fn notifier(&self) -> &ParentNotifier<P> {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut ParentNotifier<P> {
        &mut self.notifier
    }
}
