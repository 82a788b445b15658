//! ATR (Average True Range), Wilder smoothing.
//!
//! True range: max(high - low, |high - prev_close|, |low - prev_close|),
//! with tr[0] = high[0] - low[0]. Seed at index `window-1` with the simple
//! mean of the first `window` true ranges, then
//! `atr[i] = ((window-1) * atr[i-1] + tr[i]) / window`.

use crate::domain::error::VistraderError;
use crate::domain::indicator::{validate_aligned, validate_input};

pub fn atr(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    window: usize,
) -> Result<Vec<f64>, VistraderError> {
    validate_input("atr", high, window)?;
    validate_input("atr", low, window)?;
    validate_input("atr", close, window)?;
    validate_aligned("atr", &[high, low, close])?;
    if close.len() < window {
        return Err(VistraderError::IndicatorInput {
            reason: format!("atr: need at least {window} bars, got {}", close.len()),
        });
    }

    let mut tr = vec![0.0; close.len()];
    tr[0] = high[0] - low[0];
    for i in 1..close.len() {
        let prev_close = close[i - 1];
        tr[i] = (high[i] - low[i])
            .max((high[i] - prev_close).abs())
            .max((low[i] - prev_close).abs());
    }

    let mut out = vec![f64::NAN; close.len()];
    out[window - 1] = tr[..window].iter().sum::<f64>() / window as f64;
    for i in window..tr.len() {
        out[i] = ((window - 1) as f64 * out[i - 1] + tr[i]) / window as f64;
    }

    Ok(out)
}
