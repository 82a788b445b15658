//! Stochastic oscillator (%K / %D).
//!
//! %K = 100 × (close - lowest low) / (highest high - lowest low) over the
//! trailing `k_period` bars; %D = SMA(%K, d_period). %K is defined from
//! index `k_period-1`, %D from `k_period + d_period - 2`.

use crate::domain::error::VistraderError;
use crate::domain::indicator::moving_average::sma;
use crate::domain::indicator::{validate_aligned, validate_input};

#[derive(Debug, Clone)]
pub struct StochasticOutput {
    pub percent_k: Vec<f64>,
    pub percent_d: Vec<f64>,
}

pub fn stochastic(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    k_period: usize,
    d_period: usize,
) -> Result<StochasticOutput, VistraderError> {
    validate_input("stochastic", high, k_period)?;
    validate_input("stochastic", low, k_period)?;
    validate_input("stochastic", close, k_period)?;
    validate_input("stochastic", close, d_period)?;
    validate_aligned("stochastic", &[high, low, close])?;

    let mut percent_k = vec![f64::NAN; close.len()];
    for i in k_period - 1..close.len() {
        let window = i + 1 - k_period..=i;
        let highest = high[window.clone()].iter().cloned().fold(f64::MIN, f64::max);
        let lowest = low[window].iter().cloned().fold(f64::MAX, f64::min);
        percent_k[i] = if highest > lowest {
            (close[i] - lowest) / (highest - lowest) * 100.0
        } else {
            // flat window, oscillator undefined; treat as mid-scale
            50.0
        };
    }

    let percent_d = sma(&percent_k, d_period)?;

    Ok(StochasticOutput {
        percent_k,
        percent_d,
    })
}
