#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "logging")]
use defmt_rtt as _;

pub mod bar_graph;
pub mod bin_summary_strategy;
pub mod color_map;
pub mod display_modes;
pub mod display_settings;
pub mod ema;
pub mod error;
pub mod grid_display;
pub mod pipeline;
pub mod pixel_map;
pub mod pixel_sink;
pub mod presets;
pub mod range_tracker;
pub mod renderer;
pub mod spectral_band_aggregator;
pub mod types;
pub mod waterfall;

pub use bar_graph::{BarGraph, TopPixelDimming};
pub use color_map::ColorMap;
pub use display_modes::DisplayModes;
pub use display_settings::DisplaySettings;
pub use error::{ColorMapError, ConfigError, RenderError, SpectrumError};
pub use grid_display::GridDisplay;
pub use pipeline::RenderState;
pub use pixel_map::{GridShape, PixelIndexer, PixelMap, Wiring};
pub use pixel_sink::{MatrixSink, PixelBuffer, PixelSink, StripSink};
pub use range_tracker::{RangePolicy, RangeTracker};
pub use renderer::{DisplayMode, FrameOutcome, Renderer};
pub use types::{Level, RgbWeights};
pub use waterfall::Waterfall;
