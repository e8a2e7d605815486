#![forbid(unsafe_code)]

//! The independent triggers that request a height check.

/// Which source asked for a height check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// One-shot check shortly after start.
    Startup,
    /// Viewport resize, checked synchronously.
    Resize,
    /// Debounced DOM mutation batch.
    Mutation,
    /// Background interval.
    Poll,
    /// Fixed delay after entering Expanded.
    Expand,
    /// Content container finished its collapse transition.
    CollapseSettled,
    /// Collapse fallback deadline elapsed without a transition end.
    CollapseFallback,
    /// Explicit request from the host page.
    Manual,
}

impl Trigger {
    /// Silent triggers log at trace level only.
    #[must_use]
    pub const fn is_silent(self) -> bool {
        matches!(self, Self::Mutation | Self::Poll)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Resize => "resize",
            Self::Mutation => "mutation",
            Self::Poll => "poll",
            Self::Expand => "expand",
            Self::CollapseSettled => "collapse_settled",
            Self::CollapseFallback => "collapse_fallback",
            Self::Manual => "manual",
        }
    }
}

/// Element a transition-end notification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionSource {
    /// The content container itself.
    Content,
    /// Any other element (including descendants whose events bubble up).
    Other,
}

/// Optional host facilities, probed once at start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    /// A mutation observer could be attached to the content root.
    pub mutation_observer: bool,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self {
            mutation_observer: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_background_sources_are_silent() {
        let silent: Vec<_> = [
            Trigger::Startup,
            Trigger::Resize,
            Trigger::Mutation,
            Trigger::Poll,
            Trigger::Expand,
            Trigger::CollapseSettled,
            Trigger::CollapseFallback,
            Trigger::Manual,
        ]
        .into_iter()
        .filter(|t| t.is_silent())
        .collect();
        assert_eq!(silent, vec![Trigger::Mutation, Trigger::Poll]);
    }
}
