//! OBV (On-Balance Volume).
//!
//! Running total seeded with volume[0]: adds volume on an up close,
//! subtracts on a down close, carries unchanged on a flat close. No warmup,
//! every position is defined.

use crate::domain::error::VistraderError;
use crate::domain::indicator::{validate_aligned, validate_input};

pub fn obv(close: &[f64], volume: &[f64]) -> Result<Vec<f64>, VistraderError> {
    validate_input("obv", close, 1)?;
    validate_input("obv", volume, 1)?;
    validate_aligned("obv", &[close, volume])?;

    let mut out = Vec::with_capacity(close.len());
    out.push(volume[0]);
    for i in 1..close.len() {
        let prev = out[i - 1];
        let next = if close[i] > close[i - 1] {
            prev + volume[i]
        } else if close[i] < close[i - 1] {
            prev - volume[i]
        } else {
            prev
        };
        out.push(next);
    }

    Ok(out)
}
