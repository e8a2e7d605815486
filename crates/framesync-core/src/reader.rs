#![forbid(unsafe_code)]

//! Height measurement.

use crate::error::HostError;

/// Host-provided scroll-extent measurements.
pub trait HeightSource {
    /// Scroll height of the top-level content container.
    fn content_height(&self) -> Result<u32, HostError>;

    /// Scroll height of the document root.
    fn root_height(&self) -> Result<u32, HostError>;
}

/// Reads the rendered document height from a [`HeightSource`].
///
/// The content container wins when it reports a non-zero height; otherwise
/// the document root is used. Zero from both is a valid reading (empty or
/// not-yet-laid-out document).
#[derive(Debug, Clone)]
pub struct HeightReader<S> {
    source: S,
}

impl<S: HeightSource> HeightReader<S> {
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    pub fn read(&self) -> Result<u32, HostError> {
        let content = self.source.content_height()?;
        if content != 0 {
            return Ok(content);
        }
        self.source.root_height()
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
