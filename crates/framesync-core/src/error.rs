#![forbid(unsafe_code)]

//! Error types for the sync engine and its host seams.

use thiserror::Error;

/// Failure reported by a host facility (measurement, messaging, DOM writes).
///
/// The engine never propagates these out of a signal handler; they are
/// logged and the affected check is abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HostError(String);

impl HostError {
    /// Create a host error from any message.
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// The underlying message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// The UI element a lookup was performed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRole {
    Toggle,
    Content,
    Status,
    HeightLabel,
}

impl ElementRole {
    /// Every role that must be present before the engine arms its sources.
    pub const ALL: [Self; 4] = [Self::Toggle, Self::Content, Self::Status, Self::HeightLabel];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Toggle => "toggle control",
            Self::Content => "content container",
            Self::Status => "status label",
            Self::HeightLabel => "height display label",
        }
    }
}

/// Errors surfaced by the engine's setup and control paths.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A required element is absent; initialization is aborted.
    #[error("missing {} (#{id})", .role.label())]
    MissingElement { role: ElementRole, id: String },

    /// The configuration failed validation.
    #[error("invalid config: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    /// The configuration could not be parsed.
    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    /// The engine was stopped or never started.
    #[error("sync engine is not running")]
    NotRunning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_element_names_role_and_id() {
        let err = SyncError::MissingElement {
            role: ElementRole::Content,
            id: "content".into(),
        };
        assert_eq!(err.to_string(), "missing content container (#content)");
    }

    #[test]
    fn invalid_config_joins_problems() {
        let err = SyncError::InvalidConfig(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "invalid config: a; b");
    }
}
