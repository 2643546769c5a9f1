use alloc::{vec, vec::Vec};

#[allow(unused_imports)]
use micromath::F32Ext;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ema::{Ema, EmaConfig};
use crate::types::Level;

/// Tuning of the global total-power policy.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TotalPowerConfig {
    /// Moving average of the total power of a frame.
    pub ema: EmaConfig,
    /// Per-frame growth of the tracked minimum toward louder levels.
    pub min_growth: f32,
    /// Per-frame decay of the tracked maximum toward quieter levels.
    pub max_decay: f32,
    /// The tracked minimum never drops below this power.
    pub min_floor: f32,
    /// Lower edge of the display range, as a fraction of the tracked minimum.
    pub floor_ratio: f32,
    /// Upper edge of the display range, as a multiple of the tracked maximum.
    pub ceiling_ratio: f32,
}

impl Default for TotalPowerConfig {
    fn default() -> Self {
        Self {
            ema: EmaConfig::new(500, 1.1),
            min_growth: 1.005,
            max_decay: 0.995,
            min_floor: 0.0,
            floor_ratio: 0.5,
            ceiling_ratio: 1.5,
        }
    }
}

/// Tuning of the per-band min/max policy.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PerBandConfig {
    /// Band powers are raised to this exponent before tracking.
    pub exponent: f32,
    /// Per-frame decay of each band's maximum.
    pub max_decay: f32,
}

impl Default for PerBandConfig {
    fn default() -> Self {
        Self {
            exponent: 1.5,
            max_decay: 0.999,
        }
    }
}

/// Tuning of the per-column policy used by bar graphs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PerColumnConfig {
    pub ema: EmaConfig,
    /// The previous minimum is inflated by this factor before it scales a value.
    pub min_softening: f32,
    /// The previous maximum is deflated by this factor before it scales a value.
    pub max_softening: f32,
    pub min_growth: f32,
    pub max_decay: f32,
}

impl Default for PerColumnConfig {
    fn default() -> Self {
        Self {
            ema: EmaConfig::new(500, 1.5),
            min_softening: 1.05,
            max_softening: 0.95,
            min_growth: 1.0005,
            max_decay: 0.9995,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RangePolicy {
    /// One envelope over the total power of the frame; bands keep their
    /// relative shares.
    TotalPower(TotalPowerConfig),
    /// Every band normalizes against its own decaying maximum.
    PerBand(PerBandConfig),
    /// Every column keeps its own softened min/max envelope.
    PerColumn(PerColumnConfig),
}

impl RangePolicy {
    pub fn total_power() -> Self {
        RangePolicy::TotalPower(TotalPowerConfig::default())
    }

    pub fn per_band() -> Self {
        RangePolicy::PerBand(PerBandConfig::default())
    }

    pub fn per_column() -> Self {
        RangePolicy::PerColumn(PerColumnConfig::default())
    }
}

#[derive(Debug, Clone)]
struct TotalPowerEnvelope {
    config: TotalPowerConfig,
    ema_total_power: Ema,
    last_min_total_power: f32,
    last_max_total_power: f32,
    /// Largest band power relative to the total power average, from the last add.
    peak_band_share: Option<f32>,
}

#[derive(Debug, Clone)]
struct PerBandEnvelope {
    config: PerBandConfig,
    /// `(min, max)` per band, empty until the first add.
    bands: Vec<(f32, f32)>,
}

#[derive(Debug, Clone)]
struct PerColumnEnvelope {
    config: PerColumnConfig,
    averages: Vec<Ema>,
    /// `(min, max)` per column, `None` until the column saw its first value.
    columns: Vec<Option<(f32, f32)>>,
}

#[derive(Debug, Clone)]
enum EnvelopeState {
    TotalPower(TotalPowerEnvelope),
    PerBand(PerBandEnvelope),
    PerColumn(PerColumnEnvelope),
}

/// Stateful normalizer for a fixed number of bands.
#[derive(Debug, Clone)]
pub struct RangeTracker {
    num_bands: usize,
    frames_seen: u32,
    state: EnvelopeState,
}

impl RangeTracker {
    pub fn new(num_bands: usize, policy: RangePolicy) -> Self {
        let state = match policy {
            RangePolicy::TotalPower(config) => EnvelopeState::TotalPower(TotalPowerEnvelope {
                config,
                ema_total_power: Ema::new(config.ema),
                last_min_total_power: 0.0,
                last_max_total_power: 0.0,
                peak_band_share: None,
            }),
            RangePolicy::PerBand(config) => EnvelopeState::PerBand(PerBandEnvelope {
                config,
                bands: Vec::new(),
            }),
            RangePolicy::PerColumn(config) => EnvelopeState::PerColumn(PerColumnEnvelope {
                config,
                averages: vec![Ema::new(config.ema); num_bands],
                columns: vec![None; num_bands],
            }),
        };
        Self {
            num_bands,
            frames_seen: 0,
            state,
        }
    }

    pub fn num_bands(&self) -> usize {
        self.num_bands
    }

    pub fn frames_seen(&self) -> u32 {
        self.frames_seen
    }

    /// Whether [`normalize`](Self::normalize) produces output yet.
    pub fn is_ready(&self) -> bool {
        match &self.state {
            EnvelopeState::TotalPower(_) | EnvelopeState::PerBand(_) => self.frames_seen > 0,
            EnvelopeState::PerColumn(envelope) => {
                (0..self.num_bands).any(|column| envelope.softened(column).is_some())
            }
        }
    }

    /// Folds one frame of band powers into the envelope.
    ///
    /// # Panics
    /// If the frame does not have exactly `num_bands()` values; the aggregator
    /// and tracker disagree about the band layout.
    pub fn add(&mut self, band_power: &[f32]) {
        self.check_len(band_power);
        match &mut self.state {
            EnvelopeState::TotalPower(envelope) => envelope.add(band_power, self.frames_seen == 0),
            EnvelopeState::PerBand(envelope) => envelope.add(band_power),
            EnvelopeState::PerColumn(envelope) => envelope.add(band_power),
        }
        self.frames_seen = self.frames_seen.saturating_add(1);
    }

    /// Normalizes `band_power` against the current envelope into `out`, which is
    /// resized to `num_bands()` on first use.
    ///
    /// Returns `false` and leaves `out` untouched while the tracker is not ready.
    pub fn normalize_into(&self, band_power: &[f32], out: &mut Vec<Level>) -> bool {
        self.check_len(band_power);
        if !self.is_ready() {
            return false;
        }
        out.resize(self.num_bands, None);
        match &self.state {
            EnvelopeState::TotalPower(envelope) => envelope.normalize(band_power, out),
            EnvelopeState::PerBand(envelope) => envelope.normalize(band_power, out),
            EnvelopeState::PerColumn(envelope) => envelope.normalize(band_power, out),
        }
        true
    }

    /// Allocating variant of [`normalize_into`](Self::normalize_into).
    pub fn normalize(&self, band_power: &[f32]) -> Option<Vec<Level>> {
        let mut out = Vec::with_capacity(self.num_bands);
        self.normalize_into(band_power, &mut out).then_some(out)
    }

    /// Tracked `(min, max)` of the total power, for the total-power policy.
    pub fn total_power_envelope(&self) -> Option<(f32, f32)> {
        match &self.state {
            EnvelopeState::TotalPower(envelope) if self.frames_seen > 0 => Some((
                envelope.last_min_total_power,
                envelope.last_max_total_power,
            )),
            _ => None,
        }
    }

    /// Tracked `(min, max)` of one band or column, for the per-band and
    /// per-column policies.
    pub fn band_envelope(&self, band: usize) -> Option<(f32, f32)> {
        match &self.state {
            EnvelopeState::TotalPower(_) => None,
            EnvelopeState::PerBand(envelope) => envelope.bands.get(band).copied(),
            EnvelopeState::PerColumn(envelope) => envelope.columns.get(band).copied().flatten(),
        }
    }

    fn check_len(&self, band_power: &[f32]) {
        assert_eq!(
            band_power.len(),
            self.num_bands,
            "range tracker expects {} bands, got {}",
            self.num_bands,
            band_power.len()
        );
    }
}

impl TotalPowerEnvelope {
    fn add(&mut self, band_power: &[f32], first: bool) {
        let total_power: f32 = band_power.iter().sum();
        self.ema_total_power.add(total_power);
        let average = self.ema_total_power.value();

        self.peak_band_share = if average > 0.0 {
            Some(band_power.iter().fold(0.0f32, |peak, &p| peak.max(p / average)))
        } else {
            None
        };

        let (min, max) = if first {
            (total_power.min(average), total_power.max(average))
        } else {
            (
                (self.last_min_total_power * self.config.min_growth)
                    .min(total_power)
                    .min(average),
                (self.last_max_total_power * self.config.max_decay)
                    .max(total_power)
                    .max(average),
            )
        };
        self.last_min_total_power = min.max(self.config.min_floor);
        self.last_max_total_power = max.max(self.last_min_total_power);
    }

    fn normalize(&self, band_power: &[f32], out: &mut [Level]) {
        let lo = self.last_min_total_power * self.config.floor_ratio;
        let hi = self.last_max_total_power * self.config.ceiling_ratio;
        let average = self.ema_total_power.value();

        let scale = match self.peak_band_share {
            Some(peak) if peak > 0.0 && average > 0.0 && hi > lo => {
                let total_power: f32 = band_power.iter().sum();
                let scaled_total_power = unit_level((total_power - lo) / (hi - lo));
                Some((scaled_total_power, average * peak))
            }
            _ => None,
        };

        match scale {
            Some((scaled_total_power, peak_power)) => {
                for (level, &power) in out.iter_mut().zip(band_power) {
                    *level = Some(unit_level(power / peak_power * scaled_total_power));
                }
            }
            // Silence so far: nothing to scale against, keep the display dark.
            None => out.fill(Some(0.0)),
        }
    }
}

/// Clamps a normalized value into `[0, 1]`. Overflowed arithmetic reads as 0.
fn unit_level(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Raises `power` to `exponent`, saturating at `f32::MAX`.
fn compress(power: f32, exponent: f32) -> f32 {
    if power <= 0.0 {
        return 0.0;
    }
    let compressed = power.powf(exponent);
    if compressed.is_finite() {
        compressed
    } else {
        f32::MAX
    }
}

impl PerBandEnvelope {
    fn add(&mut self, band_power: &[f32]) {
        let exponent = self.config.exponent;
        if self.bands.is_empty() {
            self.bands = band_power
                .iter()
                .map(|&p| {
                    let v = compress(p, exponent);
                    (v, v)
                })
                .collect();
            return;
        }
        for ((min, max), &power) in self.bands.iter_mut().zip(band_power) {
            let v = compress(power, exponent);
            *max = v.max(*max * self.config.max_decay);
            *min = v.min(*min);
        }
    }

    fn normalize(&self, band_power: &[f32], out: &mut [Level]) {
        for ((level, &(min, max)), &power) in out.iter_mut().zip(&self.bands).zip(band_power) {
            let v = compress(power, self.config.exponent);
            *level = if max > 0.0 {
                Some(unit_level((v - min) / max))
            } else {
                Some(0.0)
            };
        }
    }
}

impl PerColumnEnvelope {
    fn softened(&self, column: usize) -> Option<(f32, f32)> {
        let (min, max) = self.columns[column]?;
        let lo = min * self.config.min_softening;
        let hi = max * self.config.max_softening;
        // A collapsed envelope has no range to draw in yet.
        (hi > lo).then_some((lo, hi))
    }

    fn add(&mut self, band_power: &[f32]) {
        for (column, &power) in band_power.iter().enumerate() {
            let average = &mut self.averages[column];
            average.add(power);
            let mean = average.value();
            let envelope = match self.columns[column] {
                None => (power.min(mean), power.max(mean)),
                Some((min, max)) => (
                    (min * self.config.min_growth).min(power).min(mean),
                    (max * self.config.max_decay).max(power).max(mean),
                ),
            };
            self.columns[column] = Some(envelope);
        }
    }

    fn normalize(&self, band_power: &[f32], out: &mut [Level]) {
        for (column, (level, &power)) in out.iter_mut().zip(band_power).enumerate() {
            *level = self
                .softened(column)
                .map(|(lo, hi)| unit_level((power - lo) / (hi - lo)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn levels(tracker: &RangeTracker, band_power: &[f32]) -> Vec<f32> {
        tracker
            .normalize(band_power)
            .expect("tracker should be ready")
            .into_iter()
            .map(|level| level.expect("band should be calibrated"))
            .collect()
    }

    #[test]
    fn test_not_ready_before_first_add() {
        for policy in [
            RangePolicy::total_power(),
            RangePolicy::per_band(),
            RangePolicy::per_column(),
        ] {
            let tracker = RangeTracker::new(4, policy);
            assert!(!tracker.is_ready());
            assert!(tracker.normalize(&[1.0, 2.0, 3.0, 4.0]).is_none());
        }
    }

    #[test]
    #[should_panic(expected = "range tracker expects 4 bands, got 3")]
    fn test_add_with_wrong_band_count_panics() {
        let mut tracker = RangeTracker::new(4, RangePolicy::per_band());
        tracker.add(&[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_normalize_into_keeps_buffer() {
        let mut tracker = RangeTracker::new(3, RangePolicy::per_band());
        let mut out = Vec::new();
        assert!(!tracker.normalize_into(&[1.0, 1.0, 1.0], &mut out));
        assert!(out.is_empty());
        tracker.add(&[1.0, 2.0, 3.0]);
        assert!(tracker.normalize_into(&[1.0, 2.0, 3.0], &mut out));
        assert_eq!(out.len(), 3);
        let capacity = out.capacity();
        assert!(tracker.normalize_into(&[3.0, 2.0, 1.0], &mut out));
        assert_eq!(out.capacity(), capacity);
    }

    #[test]
    fn test_total_power_steady_input_sits_mid_scale() {
        let mut tracker = RangeTracker::new(4, RangePolicy::total_power());
        let frame = [10.0, 10.0, 10.0, 10.0];
        for _ in 0..50 {
            tracker.add(&frame);
        }
        for level in levels(&tracker, &frame) {
            assert_abs_diff_eq!(level, 0.5, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_total_power_keeps_band_shares() {
        let mut tracker = RangeTracker::new(4, RangePolicy::total_power());
        let frame = [40.0, 20.0, 10.0, 0.0];
        for _ in 0..20 {
            tracker.add(&frame);
        }
        let out = levels(&tracker, &frame);
        assert_abs_diff_eq!(out[0], 0.5, epsilon = 1e-4);
        assert_abs_diff_eq!(out[1], 0.25, epsilon = 1e-4);
        assert_abs_diff_eq!(out[2], 0.125, epsilon = 1e-4);
        assert_eq!(out[3], 0.0);
    }

    #[test]
    fn test_total_power_louder_frame_reads_higher() {
        let mut tracker = RangeTracker::new(2, RangePolicy::total_power());
        for _ in 0..20 {
            tracker.add(&[10.0, 10.0]);
        }
        let quiet = levels(&tracker, &[10.0, 10.0]);
        let loud = levels(&tracker, &[14.0, 14.0]);
        assert!(loud[0] > quiet[0]);
    }

    #[test]
    fn test_total_power_silence_stays_dark() {
        let mut tracker = RangeTracker::new(3, RangePolicy::total_power());
        tracker.add(&[0.0, 0.0, 0.0]);
        assert_eq!(
            tracker.normalize(&[0.0, 0.0, 0.0]),
            Some(vec![Some(0.0), Some(0.0), Some(0.0)])
        );
    }

    #[test]
    fn test_total_power_min_floor() {
        let config = TotalPowerConfig {
            min_floor: 200.0,
            ..TotalPowerConfig::default()
        };
        let mut tracker = RangeTracker::new(2, RangePolicy::TotalPower(config));
        tracker.add(&[10.0, 10.0]);
        let (min, max) = tracker.total_power_envelope().unwrap();
        assert_eq!(min, 200.0);
        assert_eq!(max, 200.0);
    }

    #[test]
    fn test_total_power_max_returns_to_ambient() {
        let mut tracker = RangeTracker::new(2, RangePolicy::total_power());
        tracker.add(&[10_000.0, 0.0]);
        for _ in 0..500 {
            tracker.add(&[0.0, 0.0]);
        }
        let (_, max) = tracker.total_power_envelope().unwrap();
        assert!(max < 5_000.0, "max stuck at {}", max);
    }

    #[test]
    fn test_per_band_first_frame_normalizes_to_zero() {
        let mut tracker = RangeTracker::new(2, RangePolicy::per_band());
        tracker.add(&[4.0, 9.0]);
        assert_eq!(levels(&tracker, &[4.0, 9.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_per_band_tracks_each_band() {
        let mut tracker = RangeTracker::new(2, RangePolicy::per_band());
        tracker.add(&[0.0, 4.0]);
        tracker.add(&[4.0, 4.0]);
        // band 0: min 0, max 8 (4^1.5); band 1: min = max = 8
        let out = levels(&tracker, &[4.0, 4.0]);
        assert_abs_diff_eq!(out[0], 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(out[1], 0.0, epsilon = 1e-3);
        let (min, max) = tracker.band_envelope(0).unwrap();
        assert_eq!(min, 0.0);
        assert_abs_diff_eq!(max, 8.0, epsilon = 0.05);
    }

    #[test]
    fn test_per_band_max_decays_min_does_not() {
        let mut tracker = RangeTracker::new(1, RangePolicy::per_band());
        tracker.add(&[1.0]);
        tracker.add(&[100.0]);
        let (_, peak) = tracker.band_envelope(0).unwrap();
        for _ in 0..100 {
            tracker.add(&[50.0]);
        }
        let (min, max) = tracker.band_envelope(0).unwrap();
        assert!(max < peak);
        assert_abs_diff_eq!(min, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_per_band_output_always_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut tracker = RangeTracker::new(6, RangePolicy::per_band());
        for _ in 0..300 {
            let frame: Vec<f32> = (0..6).map(|_| rng.random_range(0.0..1_000.0)).collect();
            if let Some(out) = tracker.normalize(&frame) {
                for level in out {
                    let level = level.unwrap();
                    assert!((0.0..=1.0).contains(&level), "{}", level);
                }
            }
            tracker.add(&frame);
        }
    }

    #[test]
    fn test_huge_powers_stay_in_unit_range() {
        for policy in [
            RangePolicy::total_power(),
            RangePolicy::per_band(),
            RangePolicy::per_column(),
        ] {
            let mut tracker = RangeTracker::new(2, policy);
            for frame in [[1e27, 1.0], [1e27, 2.0], [f32::MAX, 1.0], [1e27, 1.0]] {
                if let Some(out) = tracker.normalize(&frame) {
                    for level in out.into_iter().flatten() {
                        assert!((0.0..=1.0).contains(&level), "{:?}: {}", policy, level);
                    }
                }
                tracker.add(&frame);
            }
        }
    }

    #[test]
    fn test_per_band_saturates_overflowing_band() {
        let mut tracker = RangeTracker::new(1, RangePolicy::per_band());
        tracker.add(&[1e27]);
        let (min, max) = tracker.band_envelope(0).unwrap();
        assert!(min.is_finite() && max.is_finite());
        assert_eq!(tracker.normalize(&[1e27]), Some(vec![Some(0.0)]));
    }

    #[test]
    fn test_per_column_constant_column_stays_uncalibrated() {
        let mut tracker = RangeTracker::new(2, RangePolicy::per_column());
        for _ in 0..100 {
            tracker.add(&[5.0, 5.0]);
        }
        assert!(!tracker.is_ready());
        assert!(tracker.normalize(&[5.0, 5.0]).is_none());
        let (min, max) = tracker.band_envelope(0).unwrap();
        assert_eq!(min, max);
    }

    #[test]
    fn test_per_column_skips_only_collapsed_columns() {
        let mut tracker = RangeTracker::new(2, RangePolicy::per_column());
        tracker.add(&[5.0, 1.0]);
        tracker.add(&[5.0, 10.0]);
        assert!(tracker.is_ready());
        let out = tracker.normalize(&[5.0, 10.0]).unwrap();
        assert_eq!(out[0], None);
        let level = out[1].unwrap();
        assert!((0.0..=1.0).contains(&level));
        assert_abs_diff_eq!(level, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_per_column_uses_softened_previous_envelope() {
        let mut tracker = RangeTracker::new(1, RangePolicy::per_column());
        tracker.add(&[10.0]);
        tracker.add(&[100.0]);
        let (min, max) = tracker.band_envelope(0).unwrap();
        // the minimum creeps up toward the ambient level
        assert_abs_diff_eq!(min, 10.0 * 1.0005, epsilon = 1e-5);
        assert_eq!(max, 100.0);
        let lo = min * 1.05;
        let hi = max * 0.95;
        let expected = (50.0 - lo) / (hi - lo);
        let out = tracker.normalize(&[50.0]).unwrap();
        assert_abs_diff_eq!(out[0].unwrap(), expected, epsilon = 1e-6);
    }
}
