use alloc::{vec, vec::Vec};

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

use crate::color_map::{color_at, to_rgb888, ColorMap};
use crate::display_settings::DisplaySettings;
use crate::ema::{EmaConfig, PixelEma};
use crate::error::{ConfigError, RenderError};
use crate::pipeline::{BandPipeline, RenderState};
use crate::pixel_map::{PixelIndexer, PixelMap};
use crate::pixel_sink::PixelSink;
use crate::range_tracker::RangePolicy;
use crate::renderer::{drive_frame, FrameOutcome, Renderer};
use crate::types::RgbWeights;

/// One band per pixel, lowest frequency in row 0 column 0, counting along the
/// rows. A pixel takes the color of its level and is dimmed by how far the level
/// reaches into its color segment.
#[derive(Debug, Clone)]
pub struct GridDisplay {
    pipeline: BandPipeline,
    pixel_map: PixelMap,
    color_map: ColorMap,
    fade: Option<Vec<PixelEma>>,
}

impl GridDisplay {
    /// Grid display normalizing every band on its own.
    pub fn new(settings: DisplaySettings, color_map: ColorMap) -> Result<Self, ConfigError> {
        Self::with_policy(settings, color_map, RangePolicy::per_band())
    }

    pub fn with_policy(
        settings: DisplaySettings,
        color_map: ColorMap,
        policy: RangePolicy,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        let pixel_map = PixelMap::build_shifted(settings.shape, &settings.wiring, settings.column_shift);
        Ok(Self {
            pipeline: BandPipeline::new(settings, settings.shape.num_pixels(), policy),
            pixel_map,
            color_map,
            fade: None,
        })
    }

    /// Smooths every pixel over time instead of jumping to each new frame.
    pub fn with_fade(mut self, config: EmaConfig) -> Self {
        self.fade = Some(vec![PixelEma::new(config); self.pixel_map.shape().num_pixels()]);
        self
    }

    /// Uses a custom wiring in place of the one named by the settings.
    pub fn with_indexer<I: PixelIndexer + ?Sized>(mut self, indexer: &I) -> Self {
        let settings = *self.pipeline.settings();
        self.pixel_map = PixelMap::build_shifted(settings.shape, indexer, settings.column_shift);
        self
    }

    pub fn settings(&self) -> &DisplaySettings {
        self.pipeline.settings()
    }

    pub fn pixel_map(&self) -> &PixelMap {
        &self.pixel_map
    }
}

impl Renderer for GridDisplay {
    fn render<S: PixelSink>(
        &mut self,
        spectrum: &[f32],
        sink: &mut S,
    ) -> Result<FrameOutcome, RenderError<S::Error>> {
        let pixel_map = &self.pixel_map;
        let color_map = &self.color_map;
        let fade = &mut self.fade;
        drive_frame(&mut self.pipeline, spectrum, sink, |levels, sink| {
            let shape = pixel_map.shape();
            for row in 0..shape.rows {
                for col in 0..shape.cols {
                    let band = row * shape.cols + col;
                    let pixel = pixel_map.index(row, col);
                    let Some(levels) = levels else {
                        sink.set_pixel(pixel, Rgb888::BLACK);
                        continue;
                    };
                    let weights = match levels[band] {
                        Some(level) => {
                            let (segment, weight) = color_map.segment(level);
                            let color = color_at(segment, weight, color_map.colors());
                            RgbWeights::new(color.r * weight, color.g * weight, color.b * weight)
                        }
                        None => RgbWeights::BLACK,
                    };
                    let weights = match fade {
                        Some(fade) => {
                            fade[band].add(weights);
                            fade[band].value()
                        }
                        None => weights,
                    };
                    sink.set_pixel(pixel, to_rgb888(weights, 1.0));
                }
            }
        })
    }

    fn state(&self) -> RenderState {
        self.pipeline.state()
    }
}
