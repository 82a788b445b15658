//! RSI (Relative Strength Index), Wilder smoothing.
//!
//! First average gain/loss: simple mean over the first `window` deltas.
//! Subsequent: `avg = ((window-1) * avg + new) / window`.
//! RSI = 100 - 100 / (1 + avg_gain / (avg_loss + 1e-10)); the epsilon keeps
//! an all-gains series finite instead of dividing by zero.
//!
//! Warmup: indices 0..window are NaN; the first defined value sits at
//! index `window` (one delta per bar after the first).

use crate::domain::error::VistraderError;
use crate::domain::indicator::validate_input;

const LOSS_EPSILON: f64 = 1e-10;

pub fn rsi(prices: &[f64], window: usize) -> Result<Vec<f64>, VistraderError> {
    validate_input("rsi", prices, window)?;
    if prices.len() <= window {
        return Err(VistraderError::IndicatorInput {
            reason: format!(
                "rsi: need more than {window} prices, got {}",
                prices.len()
            ),
        });
    }

    let mut gains = Vec::with_capacity(prices.len() - 1);
    let mut losses = Vec::with_capacity(prices.len() - 1);
    for pair in prices.windows(2) {
        let delta = pair[1] - pair[0];
        gains.push(delta.max(0.0));
        losses.push((-delta).max(0.0));
    }

    let mut out = vec![f64::NAN; prices.len()];

    let mut avg_gain: f64 = gains[..window].iter().sum::<f64>() / window as f64;
    let mut avg_loss: f64 = losses[..window].iter().sum::<f64>() / window as f64;
    out[window] = 100.0 - 100.0 / (1.0 + avg_gain / (avg_loss + LOSS_EPSILON));

    for i in window + 1..prices.len() {
        avg_gain = ((window - 1) as f64 * avg_gain + gains[i - 1]) / window as f64;
        avg_loss = ((window - 1) as f64 * avg_loss + losses[i - 1]) / window as f64;
        out[i] = 100.0 - 100.0 / (1.0 + avg_gain / (avg_loss + LOSS_EPSILON));
    }

    Ok(out)
}
