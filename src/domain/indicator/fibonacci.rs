//! Fibonacci retracement levels over a trailing swing window.
//!
//! For each index from `lookback` on, the swing is the highest high and
//! lowest low of the last `lookback` bars (window ending at the current
//! bar). In an uptrend levels descend from the swing high
//! (`level = high - ratio × range`); in a downtrend they ascend from the
//! swing low. Level 0.0 is therefore the extreme the trend is retracing
//! from and level 1.0 the opposite extreme.

use crate::domain::error::VistraderError;
use crate::domain::indicator::{validate_aligned, validate_input};

pub const FIB_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

#[derive(Debug, Clone)]
pub struct FibonacciOutput {
    /// One series per ratio in [`FIB_RATIOS`], index-aligned with the input.
    pub levels: [Vec<f64>; 7],
}

impl FibonacciOutput {
    /// Series for the ratio closest to `ratio` (the wire format carries
    /// levels as plain numbers like 0.618).
    pub fn level(&self, ratio: f64) -> &[f64] {
        let mut best = 0;
        let mut best_dist = f64::MAX;
        for (idx, r) in FIB_RATIOS.iter().enumerate() {
            let dist = (r - ratio).abs();
            if dist < best_dist {
                best = idx;
                best_dist = dist;
            }
        }
        &self.levels[best]
    }
}

pub fn fibonacci_retracement(
    high: &[f64],
    low: &[f64],
    uptrend: bool,
    lookback: usize,
) -> Result<FibonacciOutput, VistraderError> {
    validate_input("fibonacci_retracement", high, lookback)?;
    validate_input("fibonacci_retracement", low, lookback)?;
    validate_aligned("fibonacci_retracement", &[high, low])?;

    let n = high.len();
    let mut levels: [Vec<f64>; 7] = std::array::from_fn(|_| vec![f64::NAN; n]);

    for i in lookback..n {
        let window = i + 1 - lookback..=i;
        let highest = high[window.clone()].iter().cloned().fold(f64::MIN, f64::max);
        let lowest = low[window].iter().cloned().fold(f64::MAX, f64::min);
        let range = highest - lowest;

        for (slot, ratio) in levels.iter_mut().zip(FIB_RATIOS) {
            slot[i] = if uptrend {
                highest - ratio * range
            } else {
                lowest + ratio * range
            };
        }
    }

    Ok(FibonacciOutput { levels })
}
