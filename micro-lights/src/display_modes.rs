use alloc::vec::Vec;

#[cfg(feature = "logging")]
use defmt::info;

use crate::error::{ConfigError, RenderError};
use crate::pipeline::RenderState;
use crate::pixel_sink::PixelSink;
use crate::renderer::{DisplayMode, FrameOutcome, Renderer};

/// The display modes of a device and which one is on.
///
/// Each mode keeps its own envelope while inactive, so switching back resumes
/// where it left off.
#[derive(Debug, Clone)]
pub struct DisplayModes {
    modes: Vec<DisplayMode>,
    current: usize,
}

impl DisplayModes {
    pub fn new(modes: Vec<DisplayMode>) -> Result<Self, ConfigError> {
        if modes.is_empty() {
            return Err(ConfigError::NoDisplayModes);
        }
        Ok(Self { modes, current: 0 })
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &DisplayMode {
        &self.modes[self.current]
    }

    pub fn current_mut(&mut self) -> &mut DisplayMode {
        &mut self.modes[self.current]
    }

    /// Steps to the next mode, wrapping around after the last one. Call this
    /// from the mode button handler.
    pub fn next_mode(&mut self) -> usize {
        self.current = (self.current + 1) % self.modes.len();
        #[cfg(feature = "logging")]
        info!(
            "display mode {} of {}: {}",
            self.current + 1,
            self.modes.len(),
            self.modes[self.current].name()
        );
        self.current
    }

    /// Renders one frame with the current mode.
    pub fn render<S: PixelSink>(
        &mut self,
        spectrum: &[f32],
        sink: &mut S,
    ) -> Result<FrameOutcome, RenderError<S::Error>> {
        self.current_mut().render(spectrum, sink)
    }

    pub fn state(&self) -> RenderState {
        self.current().state()
    }
}
