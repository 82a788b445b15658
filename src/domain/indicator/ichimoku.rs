//! Ichimoku Cloud components.
//!
//! Tenkan-sen / kijun-sen: midpoint of the highest high and lowest low over
//! their trailing windows. Senkou span A = (tenkan + kijun) / 2 plotted
//! `kijun_period` bars forward; senkou span B = the `chikou_period`
//! midpoint plotted the same distance forward; chikou span = close plotted
//! `kijun_period` bars back (so its tail positions are NaN).

use crate::domain::error::VistraderError;
use crate::domain::indicator::{validate_aligned, validate_input};

#[derive(Debug, Clone)]
pub struct IchimokuOutput {
    pub tenkan_sen: Vec<f64>,
    pub kijun_sen: Vec<f64>,
    pub senkou_span_a: Vec<f64>,
    pub senkou_span_b: Vec<f64>,
    pub chikou_span: Vec<f64>,
}

fn midpoint_series(high: &[f64], low: &[f64], window: usize) -> Vec<f64> {
    let n = high.len();
    let mut out = vec![f64::NAN; n];
    for i in window - 1..n {
        let range = i + 1 - window..=i;
        let highest = high[range.clone()].iter().cloned().fold(f64::MIN, f64::max);
        let lowest = low[range].iter().cloned().fold(f64::MAX, f64::min);
        out[i] = (highest + lowest) / 2.0;
    }
    out
}

pub fn ichimoku_cloud(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    tenkan_period: usize,
    kijun_period: usize,
    chikou_period: usize,
) -> Result<IchimokuOutput, VistraderError> {
    validate_input("ichimoku_cloud", high, tenkan_period)?;
    validate_input("ichimoku_cloud", low, kijun_period)?;
    validate_input("ichimoku_cloud", close, chikou_period)?;
    validate_aligned("ichimoku_cloud", &[high, low, close])?;

    let n = close.len();
    let tenkan_sen = if n >= tenkan_period {
        midpoint_series(high, low, tenkan_period)
    } else {
        vec![f64::NAN; n]
    };
    let kijun_sen = if n >= kijun_period {
        midpoint_series(high, low, kijun_period)
    } else {
        vec![f64::NAN; n]
    };
    let span_b_mid = if n >= chikou_period {
        midpoint_series(high, low, chikou_period)
    } else {
        vec![f64::NAN; n]
    };

    let mut senkou_span_a = vec![f64::NAN; n];
    let mut senkou_span_b = vec![f64::NAN; n];
    for i in kijun_period..n {
        let src = i - kijun_period;
        if !tenkan_sen[src].is_nan() && !kijun_sen[src].is_nan() {
            senkou_span_a[i] = (tenkan_sen[src] + kijun_sen[src]) / 2.0;
        }
        senkou_span_b[i] = span_b_mid[src];
    }

    let mut chikou_span = vec![f64::NAN; n];
    for i in 0..n.saturating_sub(kijun_period) {
        chikou_span[i] = close[i + kijun_period];
    }

    Ok(IchimokuOutput {
        tenkan_sen,
        kijun_sen,
        senkou_span_a,
        senkou_span_b,
        chikou_span,
    })
}
