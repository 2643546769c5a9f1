#[allow(unused_imports)]
use micromath::F32Ext;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the bins that fall into one band are collapsed into a single band power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BinSummaryStrategy {
    #[default]
    Sum,             // Total power of the bins, keeps the spectrum's energy intact
    Average,         // Use the average value of the bins
    WeightedAverage, // Use a weighted average of the bins
    Max,             // Use the maximum value of the bins
    RMS,             // Use the root mean square of the bins
}

impl BinSummaryStrategy {
    pub fn calculate(&self, bin_slice: &[f32]) -> f32 {
        if bin_slice.is_empty() {
            return 0.0;
        }
        let num_elements = bin_slice.len() as f32;

        match *self {
            BinSummaryStrategy::Sum => bin_slice.iter().copied().sum(),
            BinSummaryStrategy::Average => bin_slice.iter().copied().sum::<f32>() / num_elements,
            BinSummaryStrategy::Max => bin_slice
                .iter()
                .copied()
                .fold(f32::NEG_INFINITY, f32::max)
                .max(0.0),
            BinSummaryStrategy::RMS => {
                let sum_of_squares: f32 = bin_slice.iter().map(|&x| x * x).sum();
                (sum_of_squares / num_elements).sqrt()
            }
            BinSummaryStrategy::WeightedAverage => {
                // Higher bins inside a band count more.
                let mut weighted_sum: f32 = 0.0;
                let mut total_weight: f32 = 0.0;
                for (i, &x) in bin_slice.iter().enumerate() {
                    let weight = i as f32 + 1.0;
                    weighted_sum += x * weight;
                    total_weight += weight;
                }
                weighted_sum / total_weight
            }
        }
    }
}
