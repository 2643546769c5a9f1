use alloc::vec::Vec;

use embedded_graphics::pixelcolor::Rgb888;

use crate::error::ColorMapError;
use crate::types::RgbWeights;

/// Finds the gradient segment a normalized value falls into.
///
/// Returns the smallest `i` with `value <= cutoffs[i]` together with the
/// position of `value` between `cutoffs[i - 1]` (or `0`) and `cutoffs[i]`,
/// remapped to `[0, 1]`.
///
/// # Panics
/// If `value` is outside `[0, 1]`. Normalized levels are clamped upstream, so an
/// out-of-range value here is a normalization bug.
pub fn segment_index(value: f32, cutoffs: &[f32]) -> (usize, f32) {
    assert!(
        (0.0..=1.0).contains(&value),
        "normalized value {} is outside [0, 1]",
        value
    );
    let segment = cutoffs
        .iter()
        .position(|&cutoff| value <= cutoff)
        .unwrap_or(cutoffs.len().saturating_sub(1));
    let lower = if segment == 0 { 0.0 } else { cutoffs[segment - 1] };
    let upper = cutoffs.get(segment).copied().unwrap_or(1.0);
    let width = upper - lower;
    let weight = if width > 0.0 {
        ((value - lower) / width).clamp(0.0, 1.0)
    } else {
        1.0
    };
    (segment, weight)
}

/// Blends `colors[segment]` into `colors[segment + 1]` by `weight`. The last
/// segment has nothing above it and stays at the last color.
pub fn color_at(segment: usize, weight: f32, colors: &[RgbWeights]) -> RgbWeights {
    let last = colors.len() - 1;
    if segment >= last {
        return colors[last];
    }
    colors[segment].lerp(colors[segment + 1], weight)
}

/// Scales color weights by `brightness` into an 8-bit color.
pub fn to_rgb888(weights: RgbWeights, brightness: f32) -> Rgb888 {
    fn channel(weight: f32, brightness: f32) -> u8 {
        (weight * brightness * 255.0 + 0.5).clamp(0.0, 255.0) as u8
    }
    Rgb888::new(
        channel(weights.r, brightness),
        channel(weights.g, brightness),
        channel(weights.b, brightness),
    )
}

/// A piecewise-linear gradient over `[0, 1]`.
///
/// `cutoffs` are strictly ascending, lie in `(0, 1]` and end at `1.0`; there is
/// one color stop per cutoff.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    cutoffs: Vec<f32>,
    colors: Vec<RgbWeights>,
}

impl ColorMap {
    pub fn new(colors: Vec<RgbWeights>, cutoffs: Vec<f32>) -> Result<Self, ColorMapError> {
        if colors.is_empty() {
            return Err(ColorMapError::Empty);
        }
        if cutoffs.len() != colors.len() {
            return Err(ColorMapError::LengthMismatch {
                cutoffs: cutoffs.len(),
                colors: colors.len(),
            });
        }
        let mut previous = 0.0;
        for (index, &value) in cutoffs.iter().enumerate() {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ColorMapError::OutOfRange { index, value });
            }
            if index > 0 && value <= previous {
                return Err(ColorMapError::NotAscending { index, value });
            }
            previous = value;
        }
        if previous != 1.0 {
            return Err(ColorMapError::LastCutoffNotOne(previous));
        }
        Ok(Self { cutoffs, colors })
    }

    /// Spaces the color stops evenly, the last one at `1.0`.
    pub fn evenly_spaced(colors: Vec<RgbWeights>) -> Result<Self, ColorMapError> {
        let n = colors.len();
        let cutoffs = (1..=n).map(|i| i as f32 / n as f32).collect();
        Self::new(colors, cutoffs)
    }

    /// Builds a map from plain `(r, g, b)` tuples, the way the standard maps are written.
    pub fn from_tuples(
        colors: &[(f32, f32, f32)],
        cutoffs: &[f32],
    ) -> Result<Self, ColorMapError> {
        Self::new(
            colors.iter().copied().map(RgbWeights::from).collect(),
            cutoffs.to_vec(),
        )
    }

    /// For the built-in maps, which are checked by the preset tests.
    pub(crate) fn from_static(colors: &[(f32, f32, f32)], cutoffs: &[f32]) -> Self {
        Self {
            cutoffs: cutoffs.to_vec(),
            colors: colors.iter().copied().map(RgbWeights::from).collect(),
        }
    }

    pub fn cutoffs(&self) -> &[f32] {
        &self.cutoffs
    }

    pub fn colors(&self) -> &[RgbWeights] {
        &self.colors
    }

    pub fn segment(&self, value: f32) -> (usize, f32) {
        segment_index(value, &self.cutoffs)
    }

    pub fn weights(&self, value: f32) -> RgbWeights {
        let (segment, weight) = self.segment(value);
        color_at(segment, weight, &self.colors)
    }

    pub fn color(&self, value: f32, brightness: f32) -> Rgb888 {
        to_rgb888(self.weights(value), brightness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use approx::assert_abs_diff_eq;
    use embedded_graphics::prelude::*;

    fn rainbow() -> ColorMap {
        ColorMap::from_tuples(
            &[
                (0.0, 0.0, 0.0),
                (0.2, 0.0, 0.0),
                (0.0, 0.2, 0.0),
                (0.4, 0.4, 0.0),
                (0.0, 0.6, 0.6),
                (1.0, 1.0, 1.0),
            ],
            &[0.03, 0.2, 0.4, 0.6, 0.8, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn test_segment_index_finds_first_cutoff_at_or_above() {
        let cutoffs = [0.25, 0.5, 1.0];
        assert_eq!(segment_index(0.0, &cutoffs), (0, 0.0));
        assert_eq!(segment_index(0.25, &cutoffs), (0, 1.0));
        let (segment, weight) = segment_index(0.375, &cutoffs);
        assert_eq!(segment, 1);
        assert_abs_diff_eq!(weight, 0.5, epsilon = 1e-6);
        let (segment, weight) = segment_index(0.75, &cutoffs);
        assert_eq!(segment, 2);
        assert_abs_diff_eq!(weight, 0.5, epsilon = 1e-6);
        assert_eq!(segment_index(1.0, &cutoffs), (2, 1.0));
    }

    #[test]
    fn test_end_points_hit_first_and_last_color() {
        let map = rainbow();
        let (segment, weight) = segment_index(0.0, map.cutoffs());
        assert_eq!(color_at(segment, weight, map.colors()), map.colors()[0]);
        let (segment, weight) = segment_index(1.0, map.cutoffs());
        assert_eq!(
            color_at(segment, weight, map.colors()),
            *map.colors().last().unwrap()
        );
    }

    #[test]
    fn test_weight_is_monotonic_within_segment() {
        let map = rainbow();
        let mut previous = (0usize, 0.0f32);
        for step in 0..=1000 {
            let value = step as f32 / 1000.0;
            let current = map.segment(value);
            if current.0 == previous.0 && step > 0 {
                assert!(current.1 >= previous.1, "{} {:?} {:?}", value, previous, current);
            } else {
                assert!(current.0 >= previous.0);
            }
            previous = current;
        }
    }

    #[test]
    fn test_color_at_interpolates_between_stops() {
        let colors = [
            RgbWeights::new(0.0, 0.0, 0.0),
            RgbWeights::new(1.0, 0.5, 0.0),
        ];
        let mid = color_at(0, 0.5, &colors);
        assert_abs_diff_eq!(mid.r, 0.5);
        assert_abs_diff_eq!(mid.g, 0.25);
        assert_abs_diff_eq!(mid.b, 0.0);
        assert_eq!(color_at(7, 0.3, &colors), colors[1]);
    }

    #[test]
    #[should_panic(expected = "outside [0, 1]")]
    fn test_value_above_one_panics() {
        rainbow().weights(1.01);
    }

    #[test]
    #[should_panic(expected = "outside [0, 1]")]
    fn test_negative_value_panics() {
        segment_index(-0.1, &[1.0]);
    }

    #[test]
    #[should_panic(expected = "outside [0, 1]")]
    fn test_nan_panics() {
        segment_index(f32::NAN, &[1.0]);
    }

    #[test]
    fn test_rejects_malformed_maps() {
        let two = vec![RgbWeights::BLACK, RgbWeights::new(1.0, 1.0, 1.0)];
        assert_eq!(
            ColorMap::new(vec![], vec![]),
            Err(ColorMapError::Empty)
        );
        assert_eq!(
            ColorMap::new(two.clone(), vec![1.0]),
            Err(ColorMapError::LengthMismatch {
                cutoffs: 1,
                colors: 2
            })
        );
        assert_eq!(
            ColorMap::new(two.clone(), vec![0.6, 0.5]),
            Err(ColorMapError::NotAscending {
                index: 1,
                value: 0.5
            })
        );
        assert_eq!(
            ColorMap::new(two.clone(), vec![0.0, 1.0]),
            Err(ColorMapError::OutOfRange {
                index: 0,
                value: 0.0
            })
        );
        assert_eq!(
            ColorMap::new(two, vec![0.2, 0.9]),
            Err(ColorMapError::LastCutoffNotOne(0.9))
        );
    }

    #[test]
    fn test_evenly_spaced_cutoffs() {
        let map = ColorMap::evenly_spaced(vec![
            RgbWeights::BLACK,
            RgbWeights::new(0.5, 0.5, 0.5),
            RgbWeights::new(1.0, 1.0, 1.0),
            RgbWeights::new(1.0, 0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(map.cutoffs(), &[0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_to_rgb888_applies_brightness() {
        let white = RgbWeights::new(1.0, 1.0, 1.0);
        assert_eq!(to_rgb888(white, 1.0), Rgb888::WHITE);
        assert_eq!(to_rgb888(white, 0.0), Rgb888::BLACK);
        assert_eq!(to_rgb888(white, 0.5), Rgb888::new(128, 128, 128));
        assert_eq!(
            to_rgb888(RgbWeights::new(2.0, -1.0, 0.2), 1.0),
            Rgb888::new(255, 0, 51)
        );
    }
}
