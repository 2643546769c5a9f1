#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A normalized band level in [0, 1], or `None` when the band has no usable
/// envelope yet and must be left dark for this frame.
pub type Level = Option<f32>;

/// Red, green and blue weights of a color stop, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RgbWeights {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl RgbWeights {
    pub const BLACK: RgbWeights = RgbWeights::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn lerp(self, other: RgbWeights, t: f32) -> RgbWeights {
        RgbWeights {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }
}

impl From<(f32, f32, f32)> for RgbWeights {
    fn from((r, g, b): (f32, f32, f32)) -> Self {
        Self { r, g, b }
    }
}
