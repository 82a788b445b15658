//! Simple and exponential moving averages.
//!
//! Both averages tolerate a leading NaN prefix in the input so they can be
//! applied to other indicators' outputs (MACD signal line, stochastic %D):
//! the window starts at the first finite value instead of poisoning every
//! later position.
//!
//! SMA warmup: first `window-1` positions after the prefix are NaN.
//! EMA: seeded with the SMA of the first full window, then
//! `ema[i] = alpha * price[i] + (1 - alpha) * ema[i-1]` with
//! `alpha = 2 / (window + 1)`. When fewer than `window` values exist the
//! seed falls back to the first raw value so short histories still produce
//! a (rough) average.

use crate::domain::error::VistraderError;
use crate::domain::indicator::validate_input;

pub fn sma(prices: &[f64], window: usize) -> Result<Vec<f64>, VistraderError> {
    validate_input("sma", prices, window)?;

    let mut out = vec![f64::NAN; prices.len()];
    let start = match prices.iter().position(|v| !v.is_nan()) {
        Some(idx) => idx,
        None => return Ok(out),
    };

    let mut sum = 0.0;
    for i in start..prices.len() {
        sum += prices[i];
        if i >= start + window {
            sum -= prices[i - window];
        }
        if i + 1 >= start + window {
            out[i] = sum / window as f64;
        }
    }

    Ok(out)
}

pub fn ema(prices: &[f64], window: usize) -> Result<Vec<f64>, VistraderError> {
    validate_input("ema", prices, window)?;

    let mut out = vec![f64::NAN; prices.len()];
    let start = match prices.iter().position(|v| !v.is_nan()) {
        Some(idx) => idx,
        None => return Ok(out),
    };

    let alpha = 2.0 / (window as f64 + 1.0);
    let available = prices.len() - start;

    if available >= window {
        let seed_idx = start + window - 1;
        let seed: f64 = prices[start..=seed_idx].iter().sum::<f64>() / window as f64;
        out[seed_idx] = seed;
        for i in seed_idx + 1..prices.len() {
            out[i] = alpha * prices[i] + (1.0 - alpha) * out[i - 1];
        }
    } else {
        out[start] = prices[start];
        for i in start + 1..prices.len() {
            out[i] = alpha * prices[i] + (1.0 - alpha) * out[i - 1];
        }
    }

    Ok(out)
}
