#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::RgbWeights;

/// Window and smoothing of an exponential moving average.
///
/// The blend weight of a new sample is `smoothing / (1 + n)`, where `n` is the
/// number of samples seen so far, capped at `window`. Early samples therefore
/// move the average quickly, later ones settle into a fixed-rate EMA.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EmaConfig {
    pub window: u32,
    pub smoothing: f32,
}

impl EmaConfig {
    pub const fn new(window: u32, smoothing: f32) -> Self {
        Self { window, smoothing }
    }
}

impl Default for EmaConfig {
    fn default() -> Self {
        Self::new(500, 2.0)
    }
}

#[derive(Debug, Clone)]
pub struct Ema {
    config: EmaConfig,
    value: f32,
    samples: u32,
}

impl Ema {
    pub fn new(config: EmaConfig) -> Self {
        Self {
            config,
            value: 0.0,
            samples: 0,
        }
    }

    pub fn add(&mut self, sample: f32) {
        if self.samples == 0 {
            self.value = sample;
            self.samples = 1;
            return;
        }
        self.samples = (self.samples + 1).min(self.config.window.max(1));
        self.value += self.alpha() * (sample - self.value);
    }

    /// Current average, `0.0` before the first sample.
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    fn alpha(&self) -> f32 {
        (self.config.smoothing / (1 + self.samples) as f32).min(1.0)
    }
}

/// One EMA per color channel, used to fade pixels between frames.
#[derive(Debug, Clone)]
pub struct PixelEma {
    r: Ema,
    g: Ema,
    b: Ema,
}

impl PixelEma {
    pub fn new(config: EmaConfig) -> Self {
        Self {
            r: Ema::new(config),
            g: Ema::new(config),
            b: Ema::new(config),
        }
    }

    pub fn add(&mut self, color: RgbWeights) {
        self.r.add(color.r);
        self.g.add(color.g);
        self.b.add(color.b);
    }

    pub fn value(&self) -> RgbWeights {
        RgbWeights::new(self.r.value(), self.g.value(), self.b.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_first_sample_seeds_value() {
        let mut ema = Ema::new(EmaConfig::new(500, 1.1));
        assert_eq!(ema.value(), 0.0);
        ema.add(42.0);
        assert_eq!(ema.value(), 42.0);
        assert_eq!(ema.samples(), 1);
    }

    #[test]
    fn test_constant_input_is_a_fixed_point() {
        let mut ema = Ema::new(EmaConfig::new(10, 1.5));
        for _ in 0..100 {
            ema.add(7.0);
        }
        assert_eq!(ema.value(), 7.0);
        assert_eq!(ema.samples(), 10);
    }

    #[test]
    fn test_moves_toward_new_level() {
        let mut ema = Ema::new(EmaConfig::new(4, 2.0));
        ema.add(0.0);
        // samples = 2, alpha = 2 / 3
        ema.add(3.0);
        assert_abs_diff_eq!(ema.value(), 2.0, epsilon = 1e-6);
        for _ in 0..50 {
            ema.add(10.0);
        }
        assert_abs_diff_eq!(ema.value(), 10.0, epsilon = 1e-3);
    }

    #[test]
    fn test_alpha_never_overshoots() {
        // smoothing larger than 1 + window would overshoot without the cap
        let mut ema = Ema::new(EmaConfig::new(1, 5.0));
        ema.add(0.0);
        ema.add(8.0);
        assert_eq!(ema.value(), 8.0);
    }

    #[test]
    fn test_pixel_ema_tracks_each_channel() {
        let mut pixel = PixelEma::new(EmaConfig::new(3, 2.66));
        pixel.add(RgbWeights::new(1.0, 0.0, 0.5));
        assert_eq!(pixel.value(), RgbWeights::new(1.0, 0.0, 0.5));
        pixel.add(RgbWeights::new(0.0, 0.0, 0.5));
        let faded = pixel.value();
        assert!(faded.r < 1.0 && faded.r > 0.0);
        assert_eq!(faded.g, 0.0);
        assert_eq!(faded.b, 0.5);
    }
}
