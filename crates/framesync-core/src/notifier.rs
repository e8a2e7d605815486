#![forbid(unsafe_code)]

//! Delivery of height messages to the embedding context.

use tracing::{trace, warn};

use crate::error::HostError;
use crate::message::HeightMessage;

/// The outer browsing context, as seen from the embedded document.
pub trait EmbeddingContext {
    /// Whether a parent context distinct from our own exists.
    fn is_embedded(&self) -> bool;

    /// Dispatch `message` to the parent with the given destination origin.
    fn post(&mut self, message: &HeightMessage, target_origin: &str) -> Result<(), HostError>;
}

/// Result of one [`ParentNotifier::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Posted,
    /// Top-level document; nothing to notify.
    NoParent,
    /// The host rejected the dispatch. Logged and swallowed.
    Failed,
}

/// Running totals of send attempts, for host instrumentation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryStats {
    pub posted: u64,
    pub no_parent: u64,
    pub failed: u64,
}

/// Sends [`HeightMessage`]s to the parent, never failing the caller.
#[derive(Debug)]
pub struct ParentNotifier<P> {
    context: P,
    target_origin: String,
    stats: DeliveryStats,
}

impl<P: EmbeddingContext> ParentNotifier<P> {
    pub fn new(context: P, target_origin: impl Into<String>) -> Self {
        Self {
            context,
            target_origin: target_origin.into(),
            stats: DeliveryStats::default(),
        }
    }

    pub fn send(&mut self, height: u32) -> Delivery {
        if !self.context.is_embedded() {
            trace!(height, "not embedded; height not posted");
            self.stats.no_parent += 1;
            return Delivery::NoParent;
        }
        let message = HeightMessage::new(height);
        match self.context.post(&message, &self.target_origin) {
            Ok(()) => {
                let kind = message.kind().as_str();
                trace!(kind, height, origin = %self.target_origin, "posted");
                self.stats.posted += 1;
                Delivery::Posted
            }
            Err(err) => {
                warn!(height, error = %err, "failed to post height to parent");
                self.stats.failed += 1;
                Delivery::Failed
            }
        }
    }

    #[must_use]
    pub const fn stats(&self) -> DeliveryStats {
        self.stats
    }

    #[must_use]
    pub fn target_origin(&self) -> &str {
        &self.target_origin
    }

    pub const fn context(&self) -> &P {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut P {
        &mut self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Recorder {
        embedded: bool,
        fail: bool,
        sent: Vec<(HeightMessage, String)>,
    }

    impl EmbeddingContext for Recorder {
        fn is_embedded(&self) -> bool {
            self.embedded
        }

        fn post(&mut self, message: &HeightMessage, target_origin: &str) -> Result<(), HostError> {
            if self.fail {
                return Err(HostError::new("parent navigated away"));
            }
            self.sent.push((*message, target_origin.to_owned()));
            Ok(())
        }
    }

    #[test]
    fn posts_with_configured_origin() {
        let mut notifier = ParentNotifier::new(
            Recorder {
                embedded: true,
                ..Recorder::default()
            },
            "https://host.test",
        );
        assert_eq!(notifier.send(400), Delivery::Posted);
        assert_eq!(
            notifier.context().sent,
            vec![(HeightMessage::new(400), "https://host.test".to_string())]
        );
        assert_eq!(notifier.stats().posted, 1);
    }

    #[test]
    fn top_level_document_is_a_silent_no_op() {
        let mut notifier = ParentNotifier::new(Recorder::default(), "*");
        assert_eq!(notifier.send(400), Delivery::NoParent);
        assert!(notifier.context().sent.is_empty());
        assert_eq!(notifier.stats().no_parent, 1);
    }

    #[test]
    fn dispatch_failure_is_swallowed() {
        let mut notifier = ParentNotifier::new(
            Recorder {
                embedded: true,
                fail: true,
                ..Recorder::default()
            },
            "*",
        );
        assert_eq!(notifier.send(10), Delivery::Failed);
        assert_eq!(notifier.send(11), Delivery::Failed);
        assert_eq!(
            notifier.stats(),
            DeliveryStats {
                posted: 0,
                no_parent: 0,
                failed: 2,
            }
        );
    }
}
