#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bin_summary_strategy::BinSummaryStrategy;
use crate::error::ConfigError;
use crate::pixel_map::{GridShape, Wiring};
use crate::spectral_band_aggregator::BandSpreadModeConfig;

/// Layout and band setup of one display mode. Fixed once the mode is built.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplaySettings {
    pub shape: GridShape,
    pub wiring: Wiring,
    /// Spread bands on a logarithmic frequency axis.
    pub log_scale: bool,
    /// Number of low-frequency bands computed but never shown.
    pub cutoff_bands: usize,
    /// Logical columns are rotated right by this many places.
    pub column_shift: usize,
    /// Known spectrum length. When set the band boundaries are computed up front,
    /// otherwise on the first frame.
    pub spectrum_len: Option<usize>,
    pub summary: BinSummaryStrategy,
}

impl DisplaySettings {
    pub const fn new(rows: usize, cols: usize, wiring: Wiring, log_scale: bool) -> Self {
        Self {
            shape: GridShape::new(rows, cols),
            wiring,
            log_scale,
            cutoff_bands: 0,
            column_shift: 0,
            spectrum_len: None,
            summary: BinSummaryStrategy::Sum,
        }
    }

    pub const fn with_cutoff_bands(mut self, cutoff_bands: usize) -> Self {
        self.cutoff_bands = cutoff_bands;
        self
    }

    pub const fn with_column_shift(mut self, column_shift: usize) -> Self {
        self.column_shift = column_shift;
        self
    }

    /// Rotates the columns by half the width, the low bands end up in the middle.
    pub const fn with_centered_columns(self) -> Self {
        let half = self.shape.cols / 2;
        self.with_column_shift(half)
    }

    pub const fn with_spectrum_len(mut self, spectrum_len: usize) -> Self {
        self.spectrum_len = Some(spectrum_len);
        self
    }

    pub const fn with_summary(mut self, summary: BinSummaryStrategy) -> Self {
        self.summary = summary;
        self
    }

    pub const fn rows(&self) -> usize {
        self.shape.rows
    }

    pub const fn cols(&self) -> usize {
        self.shape.cols
    }

    pub fn band_spread(&self) -> BandSpreadModeConfig {
        BandSpreadModeConfig::from_log_scale(self.log_scale)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shape.rows == 0 || self.shape.cols == 0 {
            return Err(ConfigError::EmptyGrid {
                rows: self.shape.rows,
                cols: self.shape.cols,
            });
        }
        if self.spectrum_len == Some(0) {
            return Err(ConfigError::EmptySpectrum);
        }
        Ok(())
    }
}
