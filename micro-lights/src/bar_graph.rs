#[allow(unused_imports)]
use micromath::F32Ext;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

#[cfg(feature = "logging")]
use defmt::info;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::color_map::{to_rgb888, ColorMap};
use crate::display_settings::DisplaySettings;
use crate::error::{ConfigError, RenderError};
use crate::pipeline::{BandPipeline, RenderState};
use crate::pixel_map::{PixelIndexer, PixelMap};
use crate::pixel_sink::PixelSink;
use crate::range_tracker::RangePolicy;
use crate::renderer::{drive_frame, FrameOutcome, Renderer};

/// Number of lit pixels for a level, and the fill of the topmost one.
///
/// A bar of `rows` pixels is `ceil(rows * level)` tall. The top pixel is dimmed
/// to the part of it the level actually covers.
pub fn bar_height(level: f32, rows: usize) -> (usize, f32) {
    let height = rows as f32 * level;
    let lit = (height.ceil() as usize).min(rows);
    if lit == 0 {
        return (0, 0.0);
    }
    let top_fill = (height - (lit - 1) as f32).clamp(0.0, 1.0);
    (lit, top_fill)
}

/// How the topmost lit pixel of a bar is dimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TopPixelDimming {
    /// By the part of the pixel the level covers.
    #[default]
    Fill,
    /// By the position of the level within its color segment.
    SegmentWeight,
}

/// One band per column, drawn as a bar growing up from row 0.
///
/// Every column keeps its own envelope; a column whose envelope is still flat
/// stays dark.
#[derive(Debug, Clone)]
pub struct BarGraph {
    pipeline: BandPipeline,
    pixel_map: PixelMap,
    color_map: ColorMap,
    top_pixel: TopPixelDimming,
}

impl BarGraph {
    pub fn new(settings: DisplaySettings, color_map: ColorMap) -> Result<Self, ConfigError> {
        Self::with_policy(settings, color_map, RangePolicy::per_column())
    }

    pub fn with_policy(
        settings: DisplaySettings,
        color_map: ColorMap,
        policy: RangePolicy,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        #[cfg(feature = "logging")]
        info!(
            "BarGraph::new called with rows: {}, cols: {}, log scale: {}",
            settings.rows(),
            settings.cols(),
            settings.log_scale
        );
        let pixel_map = PixelMap::build_shifted(settings.shape, &settings.wiring, settings.column_shift);
        Ok(Self {
            pipeline: BandPipeline::new(settings, settings.cols(), policy),
            pixel_map,
            color_map,
            top_pixel: TopPixelDimming::default(),
        })
    }

    pub fn with_indexer<I: PixelIndexer + ?Sized>(mut self, indexer: &I) -> Self {
        let settings = *self.pipeline.settings();
        self.pixel_map = PixelMap::build_shifted(settings.shape, indexer, settings.column_shift);
        self
    }

    pub fn with_top_pixel_dimming(mut self, top_pixel: TopPixelDimming) -> Self {
        self.top_pixel = top_pixel;
        self
    }

    pub fn settings(&self) -> &DisplaySettings {
        self.pipeline.settings()
    }
}

impl Renderer for BarGraph {
    fn render<S: PixelSink>(
        &mut self,
        spectrum: &[f32],
        sink: &mut S,
    ) -> Result<FrameOutcome, RenderError<S::Error>> {
        let pixel_map = &self.pixel_map;
        let color_map = &self.color_map;
        let top_pixel = self.top_pixel;
        drive_frame(&mut self.pipeline, spectrum, sink, |levels, sink| {
            let shape = pixel_map.shape();
            for col in 0..shape.cols {
                let column = pixel_map.column(col);
                let level = levels.and_then(|levels| levels[col]);
                let (lit, top_fill, color) = match level {
                    Some(level) => {
                        let (lit, fill) = bar_height(level, shape.rows);
                        let top_fill = match top_pixel {
                            TopPixelDimming::Fill => fill,
                            TopPixelDimming::SegmentWeight => color_map.segment(level).1,
                        };
                        (lit, top_fill, color_map.weights(level))
                    }
                    None => (0, 0.0, Default::default()),
                };
                for (row, &pixel) in column.iter().enumerate() {
                    let color = if row + 1 < lit {
                        to_rgb888(color, 1.0)
                    } else if row + 1 == lit {
                        to_rgb888(color, top_fill)
                    } else {
                        Rgb888::BLACK
                    };
                    sink.set_pixel(pixel, color);
                }
            }
        })
    }

    fn state(&self) -> RenderState {
        self.pipeline.state()
    }
}
