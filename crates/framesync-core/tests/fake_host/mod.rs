//! In-memory host used by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use framesync_core::{
    EmbeddingContext, HeightMessage, HeightSource, HeightSync, HostError, Presentation,
    SyncConfig,
};

#[derive(Debug, Default)]
pub struct FakeHeights {
    pub content: u32,
    pub root: u32,
    pub fail: bool,
}

impl HeightSource for FakeHeights {
    fn content_height(&self) -> Result<u32, HostError> {
        if self.fail {
            return Err(HostError::new("layout unavailable"));
        }
        Ok(self.content)
    }

    fn root_height(&self) -> Result<u32, HostError> {
        Ok(self.root)
    }
}

#[derive(Debug)]
pub struct FakeParent {
    pub embedded: bool,
    pub fail: bool,
    pub sent: Vec<(HeightMessage, String)>,
}

impl Default for FakeParent {
    fn default() -> Self {
        Self {
            embedded: true,
            fail: false,
            sent: Vec::new(),
        }
    }
}

impl FakeParent {
    pub fn heights(&self) -> Vec<u32> {
        self.sent.iter().map(|(m, _)| m.height()).collect()
    }
}

impl EmbeddingContext for FakeParent {
    fn is_embedded(&self) -> bool {
        self.embedded
    }

    fn post(&mut self, message: &HeightMessage, target_origin: &str) -> Result<(), HostError> {
        if self.fail {
            return Err(HostError::new("parent context is gone"));
        }
        self.sent.push((*message, target_origin.to_owned()));
        Ok(())
    }
}

#[derive(Debug)]
pub struct FakeView {
    pub ids: HashSet<String>,
    pub classes: HashSet<(String, String)>,
    pub text: HashMap<String, String>,
}

impl FakeView {
    pub fn with_ids(ids: &[&str]) -> Self {
        Self {
            ids: ids.iter().map(|id| (*id).to_owned()).collect(),
            classes: HashSet::new(),
            text: HashMap::new(),
        }
    }

    pub fn has_class(&self, id: &str, class: &str) -> bool {
        self.classes.contains(&(id.to_owned(), class.to_owned()))
    }

    pub fn text_of(&self, id: &str) -> Option<&str> {
        self.text.get(id).map(String::as_str)
    }
}

impl Default for FakeView {
    fn default() -> Self {
        Self::with_ids(&["toggle-button", "content", "status", "height-display"])
    }
}

impl Presentation for FakeView {
    fn has_element(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    fn set_class(&mut self, id: &str, class: &str, enabled: bool) -> Result<(), HostError> {
        let key = (id.to_owned(), class.to_owned());
        if enabled {
            self.classes.insert(key);
        } else {
            self.classes.remove(&key);
        }
        Ok(())
    }

    fn set_text(&mut self, id: &str, text: &str) -> Result<(), HostError> {
        self.text.insert(id.to_owned(), text.to_owned());
        Ok(())
    }
}

pub type FakeSync = HeightSync<FakeHeights, FakeParent, FakeView>;

pub fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

pub fn engine(config: SyncConfig, content: u32) -> FakeSync {
    HeightSync::new(
        config,
        FakeHeights {
            content,
            ..FakeHeights::default()
        },
        FakeParent::default(),
        FakeView::default(),
    )
    .expect("default config is valid")
}

/// Engine with a poll interval long enough to stay out of the way.
pub fn quiet_engine(content: u32) -> FakeSync {
    engine(
        SyncConfig {
            poll_interval_ms: 60_000,
            ..SyncConfig::default()
        },
        content,
    )
}
