use alloc::{vec, vec::Vec};

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

use crate::color_map::ColorMap;
use crate::display_settings::DisplaySettings;
use crate::error::{ConfigError, RenderError};
use crate::pipeline::{BandPipeline, RenderState};
use crate::pixel_map::{PixelIndexer, PixelMap};
use crate::pixel_sink::PixelSink;
use crate::range_tracker::RangePolicy;
use crate::renderer::{drive_frame, FrameOutcome, Renderer};

/// Scrolling spectrogram: each frame becomes row 0, older frames move one row
/// further away and drop off the far edge.
#[derive(Debug, Clone)]
pub struct Waterfall {
    pipeline: BandPipeline,
    pixel_map: PixelMap,
    color_map: ColorMap,
    // row-major, row 0 newest
    history: Vec<Rgb888>,
}

impl Waterfall {
    /// Waterfall following the total loudness of the room.
    pub fn new(settings: DisplaySettings, color_map: ColorMap) -> Result<Self, ConfigError> {
        Self::with_policy(settings, color_map, RangePolicy::total_power())
    }

    pub fn with_policy(
        settings: DisplaySettings,
        color_map: ColorMap,
        policy: RangePolicy,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        let pixel_map = PixelMap::build_shifted(settings.shape, &settings.wiring, settings.column_shift);
        Ok(Self {
            pipeline: BandPipeline::new(settings, settings.cols(), policy),
            pixel_map,
            color_map,
            history: vec![Rgb888::BLACK; settings.shape.num_pixels()],
        })
    }

    pub fn with_indexer<I: PixelIndexer + ?Sized>(mut self, indexer: &I) -> Self {
        let settings = *self.pipeline.settings();
        self.pixel_map = PixelMap::build_shifted(settings.shape, indexer, settings.column_shift);
        self
    }

    pub fn settings(&self) -> &DisplaySettings {
        self.pipeline.settings()
    }

    /// Row `row` of the history, row 0 being the latest frame.
    pub fn history_row(&self, row: usize) -> &[Rgb888] {
        let cols = self.pixel_map.shape().cols;
        &self.history[row * cols..(row + 1) * cols]
    }
}

impl Renderer for Waterfall {
    fn render<S: PixelSink>(
        &mut self,
        spectrum: &[f32],
        sink: &mut S,
    ) -> Result<FrameOutcome, RenderError<S::Error>> {
        let pixel_map = &self.pixel_map;
        let color_map = &self.color_map;
        let history = &mut self.history;
        drive_frame(&mut self.pipeline, spectrum, sink, |levels, sink| {
            let shape = pixel_map.shape();
            let Some(levels) = levels else {
                for pixel in 0..shape.num_pixels() {
                    sink.set_pixel(pixel_map.index(pixel / shape.cols, pixel % shape.cols), Rgb888::BLACK);
                }
                return;
            };
            history.copy_within(0..(shape.rows - 1) * shape.cols, shape.cols);
            for (slot, level) in history[..shape.cols].iter_mut().zip(levels) {
                *slot = match level {
                    Some(level) => color_map.color(*level, 1.0),
                    None => Rgb888::BLACK,
                };
            }
            for row in 0..shape.rows {
                for col in 0..shape.cols {
                    sink.set_pixel(pixel_map.index(row, col), history[row * shape.cols + col]);
                }
            }
        })
    }

    fn state(&self) -> RenderState {
        self.pipeline.state()
    }
}
