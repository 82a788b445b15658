//! DMI (Directional Movement Index) with ADX.
//!
//! Directional movement per bar (index 0 contributes zero):
//! +DM = up-move when it exceeds the down-move and is positive, else 0;
//! -DM mirrored. +DM, -DM and TR are summed over the first `period` bars,
//! then Wilder-smoothed as `s = s - s/period + x`.
//!
//! ±DI = 100 × smoothed DM / smoothed TR, defined from index `period-1`.
//! DX = 100 × |+DI - -DI| / (+DI + -DI), same range.
//! ADX seeds at index `2*period-2` with the mean of the first `period` DX
//! values, then follows the Wilder recurrence.

use crate::domain::error::VistraderError;
use crate::domain::indicator::{validate_aligned, validate_input};

#[derive(Debug, Clone)]
pub struct DmiOutput {
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
    pub dx: Vec<f64>,
    pub adx: Vec<f64>,
}

pub fn dmi(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    period: usize,
) -> Result<DmiOutput, VistraderError> {
    validate_input("dmi", high, period)?;
    validate_input("dmi", low, period)?;
    validate_input("dmi", close, period)?;
    validate_aligned("dmi", &[high, low, close])?;

    let n = close.len();
    let mut plus_di = vec![f64::NAN; n];
    let mut minus_di = vec![f64::NAN; n];
    let mut dx = vec![f64::NAN; n];
    let mut adx = vec![f64::NAN; n];

    if n < period {
        return Ok(DmiOutput {
            plus_di,
            minus_di,
            dx,
            adx,
        });
    }

    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];
    let mut tr = vec![0.0; n];
    tr[0] = high[0] - low[0];
    for i in 1..n {
        let up = high[i] - high[i - 1];
        let down = low[i - 1] - low[i];
        if up > down && up > 0.0 {
            plus_dm[i] = up;
        }
        if down > up && down > 0.0 {
            minus_dm[i] = down;
        }
        let prev_close = close[i - 1];
        tr[i] = (high[i] - low[i])
            .max((high[i] - prev_close).abs())
            .max((low[i] - prev_close).abs());
    }

    let mut s_plus: f64 = plus_dm[..period].iter().sum();
    let mut s_minus: f64 = minus_dm[..period].iter().sum();
    let mut s_tr: f64 = tr[..period].iter().sum();

    let di_at = |s_dm: f64, s_tr: f64| if s_tr > 0.0 { 100.0 * s_dm / s_tr } else { 0.0 };

    for i in period - 1..n {
        if i > period - 1 {
            s_plus = s_plus - s_plus / period as f64 + plus_dm[i];
            s_minus = s_minus - s_minus / period as f64 + minus_dm[i];
            s_tr = s_tr - s_tr / period as f64 + tr[i];
        }
        let pdi = di_at(s_plus, s_tr);
        let mdi = di_at(s_minus, s_tr);
        plus_di[i] = pdi;
        minus_di[i] = mdi;
        dx[i] = if pdi + mdi > 0.0 {
            100.0 * (pdi - mdi).abs() / (pdi + mdi)
        } else {
            0.0
        };
    }

    let adx_start = 2 * period - 2;
    if adx_start < n {
        adx[adx_start] = dx[period - 1..=adx_start].iter().sum::<f64>() / period as f64;
        for i in adx_start + 1..n {
            adx[i] = ((period - 1) as f64 * adx[i - 1] + dx[i]) / period as f64;
        }
    }

    Ok(DmiOutput {
        plus_di,
        minus_di,
        dx,
        adx,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn trending() -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let high: Vec<f64> = (10..27).map(f64::from).collect();
        let low: Vec<f64> = (8..25).map(f64::from).collect();
        let close: Vec<f64> = (9..26).map(f64::from).collect();
        (high, low, close)
    }

    #[test]
    fn di_warmup_and_seed_values() {
        let (high, low, close) = trending();
        let result = dmi(&high, &low, &close, 5).unwrap();

        assert!(result.plus_di[3].is_nan());
        assert!(result.minus_di[3].is_nan());
        assert!(result.dx[3].is_nan());

        assert_relative_eq!(result.plus_di[4], 40.0, epsilon = 1e-4);
        assert_relative_eq!(result.minus_di[4], 0.0, epsilon = 1e-4);
        assert_relative_eq!(result.dx[4], 100.0, epsilon = 1e-4);
    }

    #[test]
    fn adx_warmup_and_value() {
        let (high, low, close) = trending();
        let result = dmi(&high, &low, &close, 5).unwrap();

        assert!(result.adx[7].is_nan());
        assert!(!result.adx[8].is_nan());
        assert_relative_eq!(result.adx[9], 100.0, epsilon = 1e-4);
    }

    #[test]
    fn short_series_is_all_nan() {
        let high = [10.0, 11.0];
        let low = [8.0, 9.0];
        let close = [9.0, 10.0];
        let result = dmi(&high, &low, &close, 5).unwrap();
        assert!(result.plus_di.iter().all(|v| v.is_nan()));
        assert!(result.adx.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn dmi_rejects_mismatched_lengths() {
        let (high, low, _) = trending();
        assert!(dmi(&high, &low, &[1.0; 3], 5).is_err());
    }
}
