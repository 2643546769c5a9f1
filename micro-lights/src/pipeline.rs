use alloc::{vec, vec::Vec};

#[cfg(feature = "logging")]
use defmt::info;

use crate::display_settings::DisplaySettings;
use crate::error::SpectrumError;
use crate::range_tracker::{RangePolicy, RangeTracker};
use crate::spectral_band_aggregator::SpectralBandAggregator;
use crate::types::Level;

/// Lifecycle of a display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// No frame seen yet, band boundaries unknown.
    Uninitialized,
    /// Boundaries known, the envelope is still settling. Frames render dark.
    Calibrating,
    Active,
}

#[derive(Debug, Clone)]
pub struct BandPipeline {
    settings: DisplaySettings,
    visible_bands: usize,
    aggregator: Option<SpectralBandAggregator>,
    band_power: Vec<f32>,
    levels: Vec<Level>,
    tracker: RangeTracker,
    was_ready: bool,
}

impl BandPipeline {
    /// Pipeline for `visible_bands` shown bands, plus the cutoff bands of
    /// `settings` which are computed but never shown.
    pub fn new(settings: DisplaySettings, visible_bands: usize, policy: RangePolicy) -> Self {
        assert!(visible_bands > 0, "display needs at least one visible band");
        let total_bands = visible_bands + settings.cutoff_bands;
        let aggregator = settings
            .spectrum_len
            .map(|len| Self::build_aggregator(&settings, len, total_bands));
        Self {
            settings,
            visible_bands,
            aggregator,
            band_power: vec![0.0; total_bands],
            levels: Vec::with_capacity(visible_bands),
            tracker: RangeTracker::new(visible_bands, policy),
            was_ready: false,
        }
    }

    fn build_aggregator(
        settings: &DisplaySettings,
        spectrum_len: usize,
        total_bands: usize,
    ) -> SpectralBandAggregator {
        let aggregator = SpectralBandAggregator::new(
            spectrum_len,
            total_bands,
            settings.band_spread(),
            settings.summary,
        );
        #[cfg(feature = "logging")]
        info!(
            "band boundaries for {} bins: {}",
            spectrum_len,
            aggregator.boundaries()
        );
        aggregator
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    pub fn visible_bands(&self) -> usize {
        self.visible_bands
    }

    pub fn tracker(&self) -> &RangeTracker {
        &self.tracker
    }

    pub fn boundaries(&self) -> Option<&[usize]> {
        self.aggregator.as_ref().map(SpectralBandAggregator::boundaries)
    }

    /// Powers of the shown bands from the last loaded frame.
    pub fn band_power(&self) -> &[f32] {
        &self.band_power[self.settings.cutoff_bands..]
    }

    pub fn state(&self) -> RenderState {
        if self.aggregator.is_none() {
            RenderState::Uninitialized
        } else if self.tracker.is_ready() {
            RenderState::Active
        } else {
            RenderState::Calibrating
        }
    }

    /// Bins one spectrum frame. The first frame fixes the spectrum length for the
    /// rest of the session.
    pub fn load(&mut self, spectrum: &[f32]) -> Result<(), SpectrumError> {
        if spectrum.is_empty() {
            return Err(SpectrumError::Empty);
        }
        let total_bands = self.band_power.len();
        let settings = &self.settings;
        let aggregator = self
            .aggregator
            .get_or_insert_with(|| Self::build_aggregator(settings, spectrum.len(), total_bands));
        aggregator.reduce_into(spectrum, &mut self.band_power)
    }

    /// Levels of the shown bands for the loaded frame, or `None` while
    /// calibrating. Bands that own no bins repeat the level of the band below.
    pub fn normalize(&mut self) -> Option<&[Level]> {
        let cutoff = self.settings.cutoff_bands;
        if !self
            .tracker
            .normalize_into(&self.band_power[cutoff..], &mut self.levels)
        {
            return None;
        }
        if let Some(aggregator) = &self.aggregator {
            for band in 1..self.visible_bands {
                if aggregator.is_empty_band(cutoff + band) {
                    self.levels[band] = self.levels[band - 1];
                }
            }
        }
        Some(&self.levels)
    }

    /// Folds the loaded frame into the envelope.
    pub fn commit(&mut self) {
        let cutoff = self.settings.cutoff_bands;
        self.tracker.add(&self.band_power[cutoff..]);
        let ready = self.tracker.is_ready();
        if ready != self.was_ready {
            #[cfg(feature = "logging")]
            info!(
                "range tracker ready after {} frames",
                self.tracker.frames_seen()
            );
            self.was_ready = ready;
        }
    }
}
