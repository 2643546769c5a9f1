use alloc::{vec, vec::Vec};

#[allow(unused_imports)]
use micromath::F32Ext;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bin_summary_strategy::BinSummaryStrategy;
use crate::error::SpectrumError;

/// How band boundaries are spread across the spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BandSpreadModeConfig {
    /// Every band covers the same number of bins.
    Even,
    /// Boundaries follow `(exp_factor^t - 1) / (exp_factor - 1)` for `t` in [0, 1].
    Exponential { exp_factor: f32 },
    /// Exponential spread with `exp_factor = spectrum_len + 1`, i.e. a true log axis
    /// over the bin indices.
    Logarithmic,
}

impl BandSpreadModeConfig {
    pub fn from_log_scale(log_scale: bool) -> Self {
        if log_scale {
            BandSpreadModeConfig::Logarithmic
        } else {
            BandSpreadModeConfig::Even
        }
    }
}

/// Computes `num_bands + 1` monotonic bin boundaries over `[0, spectrum_len]`.
///
/// Boundaries are spaced so that every band owns at least one bin whenever
/// `num_bands <= spectrum_len`. When more bands than bins are requested the
/// surplus bands collapse onto the same boundary and come out empty.
///
/// # Panics
/// If `spectrum_len` or `num_bands` is zero, or an exponential factor is not
/// greater than zero.
pub fn compute_boundaries(
    spectrum_len: usize,
    num_bands: usize,
    band_spread_config: BandSpreadModeConfig,
) -> Vec<usize> {
    if spectrum_len == 0 {
        panic!("Spectrum length must be greater than 0");
    }
    if num_bands == 0 {
        panic!("Number of bands must be greater than 0");
    }

    let mut boundaries = match band_spread_config {
        BandSpreadModeConfig::Even => calculate_even_boundaries(spectrum_len, num_bands),
        BandSpreadModeConfig::Exponential { exp_factor } => {
            if exp_factor <= 0.0 {
                panic!(
                    "Exponential factor must be greater than 0. Got: {}",
                    exp_factor
                );
            }
            calculate_exponential_boundaries(spectrum_len, num_bands, exp_factor)
        }
        BandSpreadModeConfig::Logarithmic => {
            calculate_exponential_boundaries(spectrum_len, num_bands, (spectrum_len + 1) as f32)
        }
    };
    space_boundaries(&mut boundaries, spectrum_len);
    boundaries
}

fn calculate_even_boundaries(spectrum_len: usize, num_bands: usize) -> Vec<usize> {
    (0..=num_bands).map(|i| i * spectrum_len / num_bands).collect()
}

fn calculate_exponential_boundaries(
    spectrum_len: usize,
    num_bands: usize,
    exp_factor: f32,
) -> Vec<usize> {
    // (exp_factor - 1.0) == 0 degenerates to the even spread.
    if (exp_factor - 1.0).abs() < f32::EPSILON {
        return calculate_even_boundaries(spectrum_len, num_bands);
    }

    let mut boundaries = vec![0; num_bands + 1];
    for (i, boundary) in boundaries.iter_mut().enumerate() {
        let fraction = i as f32 / num_bands as f32;
        let float_boundary =
            ((exp_factor.powf(fraction) - 1.0) / (exp_factor - 1.0)) * spectrum_len as f32;
        *boundary = (float_boundary.max(0.0).round() as usize).min(spectrum_len);
    }
    boundaries
}

/// Pins the outer boundaries to `0` and `spectrum_len` and pushes collapsed
/// boundaries apart so each band gets at least one bin where the bin count allows.
fn space_boundaries(boundaries: &mut [usize], spectrum_len: usize) {
    let last = boundaries.len() - 1;
    boundaries[0] = 0;
    boundaries[last] = spectrum_len;
    for i in 1..last {
        let lowest = boundaries[i - 1] + 1;
        let highest = spectrum_len.saturating_sub(last - i);
        boundaries[i] = boundaries[i].max(lowest).min(highest).max(boundaries[i - 1]);
    }
}

/// Collapses a power spectrum into one power value per display band.
///
/// Boundaries are computed once for a fixed spectrum length and reused for
/// every frame of the session.
#[derive(Debug, Clone)]
pub struct SpectralBandAggregator {
    spectrum_len: usize,
    boundaries: Vec<usize>,
    bss: BinSummaryStrategy,
}

impl SpectralBandAggregator {
    pub fn new(
        spectrum_len: usize,
        num_bands: usize,
        band_spread_config: BandSpreadModeConfig,
        bss: BinSummaryStrategy,
    ) -> Self {
        let boundaries = compute_boundaries(spectrum_len, num_bands, band_spread_config);
        Self {
            spectrum_len,
            boundaries,
            bss,
        }
    }

    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    pub fn num_bands(&self) -> usize {
        self.boundaries.len() - 1
    }

    pub fn spectrum_len(&self) -> usize {
        self.spectrum_len
    }

    /// True when the band lost all of its bins to its neighbours.
    pub fn is_empty_band(&self, band: usize) -> bool {
        self.boundaries[band] == self.boundaries[band + 1]
    }

    /// Writes one summarized power per band into `out`, which must hold exactly
    /// `num_bands()` values.
    pub fn reduce_into(&self, spectrum: &[f32], out: &mut [f32]) -> Result<(), SpectrumError> {
        self.check_spectrum(spectrum)?;
        if out.len() != self.num_bands() {
            return Err(SpectrumError::OutputLengthMismatch {
                expected: self.num_bands(),
                actual: out.len(),
            });
        }
        for (band, window) in out.iter_mut().zip(self.boundaries.windows(2)) {
            *band = self.bss.calculate(&spectrum[window[0]..window[1]]);
        }
        Ok(())
    }

    /// Allocating variant of [`reduce_into`](Self::reduce_into).
    pub fn reduce(&self, spectrum: &[f32]) -> Result<Vec<f32>, SpectrumError> {
        let mut out = vec![0.0; self.num_bands()];
        self.reduce_into(spectrum, &mut out)?;
        Ok(out)
    }

    fn check_spectrum(&self, spectrum: &[f32]) -> Result<(), SpectrumError> {
        if spectrum.is_empty() {
            return Err(SpectrumError::Empty);
        }
        if spectrum.len() != self.spectrum_len {
            return Err(SpectrumError::LengthMismatch {
                expected: self.spectrum_len,
                actual: spectrum.len(),
            });
        }
        Ok(())
    }
}
