use alloc::vec;

use crate::bar_graph::BarGraph;
use crate::color_map::ColorMap;
use crate::display_modes::DisplayModes;
use crate::display_settings::DisplaySettings;
use crate::ema::EmaConfig;
use crate::error::ConfigError;
use crate::grid_display::GridDisplay;
use crate::pixel_map::Wiring;
use crate::waterfall::Waterfall;

pub const GRAPH_CUTOFFS: [f32; 6] = [0.03, 0.2, 0.4, 0.6, 0.8, 1.0];
pub const WATERFALL_CUTOFFS: [f32; 6] = [0.05, 0.2, 0.4, 0.6, 0.8, 1.0];

pub const DEFAULT_COLORS: [(f32, f32, f32); 6] = [
    (0.0, 0.0, 0.0),
    (0.2, 0.0, 0.0),
    (0.0, 0.2, 0.0),
    (0.4, 0.4, 0.0),
    (0.0, 0.6, 0.6),
    (1.0, 1.0, 1.0),
];

pub const GREEN_COLORS: [(f32, f32, f32); 6] = [
    (0.0, 0.0, 0.0),
    (0.1, 1.0, 0.1),
    (0.25, 1.0, 0.25),
    (0.4, 1.0, 0.4),
    (0.55, 1.0, 0.55),
    (0.95, 1.0, 0.95),
];

pub const RED_COLORS: [(f32, f32, f32); 6] = [
    (0.0, 0.0, 0.0),
    (1.0, 0.1, 0.1),
    (1.0, 0.3, 0.3),
    (1.0, 0.5, 0.5),
    (0.8, 0.6, 0.9),
    (0.9, 0.7, 1.0),
];

pub const BLUE_COLORS: [(f32, f32, f32); 6] = [
    (0.0, 0.0, 0.0),
    (0.1, 0.1, 1.0),
    (0.3, 0.3, 1.0),
    (0.5, 0.5, 1.0),
    (0.7, 0.7, 1.0),
    (0.9, 0.9, 1.0),
];

pub const PURPLE_COLORS: [(f32, f32, f32); 6] = [
    (0.0, 0.0, 0.0),
    (0.5, 0.0, 0.5),
    (0.6, 0.2, 0.6),
    (0.75, 0.4, 0.75),
    (0.9, 0.6, 0.9),
    (1.0, 0.8, 1.0),
];

pub const WATERFALL_BASE_COLORS: [(f32, f32, f32); 6] = [
    (0.0, 0.0, 0.0),
    (0.25, 0.0, 0.0),
    (0.0, 0.25, 0.0),
    (0.5, 0.5, 0.0),
    (0.0, 0.75, 0.75),
    (1.0, 1.0, 1.0),
];

pub fn rainbow_colormap() -> ColorMap {
    ColorMap::from_static(&DEFAULT_COLORS, &GRAPH_CUTOFFS)
}

pub fn green_colormap() -> ColorMap {
    ColorMap::from_static(&GREEN_COLORS, &GRAPH_CUTOFFS)
}

pub fn red_colormap() -> ColorMap {
    ColorMap::from_static(&RED_COLORS, &GRAPH_CUTOFFS)
}

pub fn blue_colormap() -> ColorMap {
    ColorMap::from_static(&BLUE_COLORS, &GRAPH_CUTOFFS)
}

pub fn purple_colormap() -> ColorMap {
    ColorMap::from_static(&PURPLE_COLORS, &GRAPH_CUTOFFS)
}

pub fn waterfall_colormap() -> ColorMap {
    ColorMap::from_static(&WATERFALL_BASE_COLORS, &WATERFALL_CUTOFFS)
}

/// Panel layouts in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPreset {
    Waterfall32x8,
    Graph8x32,
    NeopixelFeatherGraph8x4,
    NeopixelFeatherWaterfall8x4,
    Graph4x16,
    DotstarFeatherGraph6x12,
    DotstarFeatherWaterfall12x6,
    DotstarFeatherWaterfall6x12,
}

impl DisplayPreset {
    pub const ALL: [DisplayPreset; 8] = [
        DisplayPreset::Waterfall32x8,
        DisplayPreset::Graph8x32,
        DisplayPreset::NeopixelFeatherGraph8x4,
        DisplayPreset::NeopixelFeatherWaterfall8x4,
        DisplayPreset::Graph4x16,
        DisplayPreset::DotstarFeatherGraph6x12,
        DisplayPreset::DotstarFeatherWaterfall12x6,
        DisplayPreset::DotstarFeatherWaterfall6x12,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DisplayPreset::Waterfall32x8 => "32x8 Waterfall",
            DisplayPreset::Graph8x32 => "8x32 Graph",
            DisplayPreset::NeopixelFeatherGraph8x4 => "8x4 Neopixel Feather Graph",
            DisplayPreset::NeopixelFeatherWaterfall8x4 => "8x4 Neopixel Feather Waterfall",
            DisplayPreset::Graph4x16 => "4x16 Graph",
            DisplayPreset::DotstarFeatherGraph6x12 => "6x12 Dotstar Feather Graph",
            DisplayPreset::DotstarFeatherWaterfall12x6 => "12x6 Dotstar Feather Waterfall",
            DisplayPreset::DotstarFeatherWaterfall6x12 => "6x12 Dotstar Feather Waterfall",
        }
    }

    pub fn settings(&self) -> DisplaySettings {
        match self {
            DisplayPreset::Waterfall32x8 => {
                DisplaySettings::new(32, 8, Wiring::SerpentineColumns, false)
            }
            DisplayPreset::Graph8x32 => {
                DisplaySettings::new(8, 32, Wiring::ReversedSerpentineColumns, false)
            }
            DisplayPreset::NeopixelFeatherGraph8x4 | DisplayPreset::NeopixelFeatherWaterfall8x4 => {
                DisplaySettings::new(4, 8, Wiring::FlipColumnOrder, true)
            }
            DisplayPreset::Graph4x16 => {
                DisplaySettings::new(8, 32, Wiring::ReversedSerpentineColumns, true)
            }
            DisplayPreset::DotstarFeatherGraph6x12 | DisplayPreset::DotstarFeatherWaterfall6x12 => {
                DisplaySettings::new(6, 12, Wiring::Standard, true)
            }
            DisplayPreset::DotstarFeatherWaterfall12x6 => {
                DisplaySettings::new(12, 6, Wiring::RowsAreColumns, true)
            }
        }
    }
}

/// Modes of the 8x4 NeoPixel FeatherWing.
pub fn neopixel_feather_wing() -> Result<DisplayModes, ConfigError> {
    let graph = DisplayPreset::NeopixelFeatherGraph8x4.settings();
    DisplayModes::new(vec![
        BarGraph::new(graph, green_colormap())?.into(),
        Waterfall::new(
            DisplayPreset::NeopixelFeatherWaterfall8x4.settings(),
            waterfall_colormap(),
        )?
        .into(),
        GridDisplay::new(graph, purple_colormap())?
            .with_fade(EmaConfig::new(3, 2.66))
            .into(),
        GridDisplay::new(graph, rainbow_colormap())?.into(),
    ])
}

/// Modes of the 32x8 NeoPixel matrix.
pub fn neopixel_32x8_matrix() -> Result<DisplayModes, ConfigError> {
    let graph = DisplayPreset::Graph8x32.settings();
    DisplayModes::new(vec![
        BarGraph::new(graph, green_colormap())?.into(),
        Waterfall::new(DisplayPreset::Waterfall32x8.settings(), waterfall_colormap())?.into(),
        GridDisplay::new(graph, purple_colormap())?
            .with_fade(EmaConfig::new(3, 2.66))
            .into(),
    ])
}

/// Modes of the 6x12 DotStar FeatherWing.
pub fn dotstar_feather_wing() -> Result<DisplayModes, ConfigError> {
    let graph = DisplayPreset::DotstarFeatherGraph6x12.settings();
    let waterfall = DisplayPreset::DotstarFeatherWaterfall6x12.settings();
    DisplayModes::new(vec![
        BarGraph::new(graph, green_colormap())?.into(),
        GridDisplay::new(graph, red_colormap())?
            .with_fade(EmaConfig::new(4, 2.5))
            .into(),
        Waterfall::new(
            DisplayPreset::DotstarFeatherWaterfall12x6.settings(),
            waterfall_colormap(),
        )?
        .into(),
        Waterfall::new(waterfall, waterfall_colormap())?.into(),
        Waterfall::new(waterfall, green_colormap())?.into(),
        GridDisplay::new(graph, rainbow_colormap())?.into(),
        GridDisplay::new(graph, purple_colormap())?.into(),
    ])
}
