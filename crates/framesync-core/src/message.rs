#![forbid(unsafe_code)]

//! Outbound cross-document message.
//!
//! Wire shape: `{ "type": "height-change", "height": <u32> }`. No sequence
//! number is attached; receivers treat the height as the latest absolute
//! value and must tolerate duplicates and reordering.

use serde::{Deserialize, Serialize};

/// Message discriminator carried in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    #[serde(rename = "height-change")]
    HeightChange,
}

impl MessageKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HeightChange => "height-change",
        }
    }
}

/// Height notification sent to the embedding context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightMessage {
    #[serde(rename = "type")]
    kind: MessageKind,
    height: u32,
}

impl HeightMessage {
    #[must_use]
    pub const fn new(height: u32) -> Self {
        Self {
            kind: MessageKind::HeightChange,
            height,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        self.kind
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Serialize to the JSON wire form posted to the parent.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
