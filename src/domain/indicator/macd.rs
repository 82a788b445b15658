//! MACD (Moving Average Convergence Divergence).
//!
//! MACD line = EMA(fast) - EMA(slow); signal line = EMA(MACD line, signal);
//! histogram = MACD line - signal line. The slow period must exceed the
//! fast period. The signal line rides on a NaN-prefixed input, so its first
//! defined value sits at index `slow + signal - 2`.

use crate::domain::error::VistraderError;
use crate::domain::indicator::moving_average::ema;
use crate::domain::indicator::validate_input;

#[derive(Debug, Clone)]
pub struct MacdOutput {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(
    prices: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Result<MacdOutput, VistraderError> {
    validate_input("macd", prices, fast.min(slow).min(signal))?;
    if slow <= fast {
        return Err(VistraderError::IndicatorInput {
            reason: format!("macd: slow period ({slow}) must be greater than fast period ({fast})"),
        });
    }

    let ema_fast = ema(prices, fast)?;
    let ema_slow = ema(prices, slow)?;

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| if f.is_nan() || s.is_nan() { f64::NAN } else { f - s })
        .collect();

    let signal_line = ema(&macd_line, signal)?;

    let histogram: Vec<f64> = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| if m.is_nan() || s.is_nan() { f64::NAN } else { m - s })
        .collect();

    Ok(MacdOutput {
        macd_line,
        signal_line,
        histogram,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn macd_line_warmup_at_slow_period() {
        let prices: Vec<f64> = (10..46).map(f64::from).collect();
        let result = macd(&prices, 12, 26, 9).unwrap();

        assert!(result.macd_line[24].is_nan());
        assert!(!result.macd_line[25].is_nan());
    }

    #[test]
    fn histogram_is_line_minus_signal() {
        let prices: Vec<f64> = (10..46).map(f64::from).collect();
        let result = macd(&prices, 5, 10, 3).unwrap();

        // signal warmup: slow + signal - 2
        assert!(result.signal_line[10].is_nan());
        assert!(!result.signal_line[11].is_nan());

        for i in 11..prices.len() {
            assert_relative_eq!(
                result.histogram[i],
                result.macd_line[i] - result.signal_line[i],
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn macd_rejects_slow_not_greater_than_fast() {
        let prices: Vec<f64> = (10..46).map(f64::from).collect();
        assert!(macd(&prices, 26, 12, 9).is_err());
        assert!(macd(&prices, 12, 12, 9).is_err());
    }

    #[test]
    fn constant_trend_has_flat_macd() {
        // Linear prices: both EMAs converge to a fixed offset, MACD settles.
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let result = macd(&prices, 5, 10, 3).unwrap();
        let last = prices.len() - 1;
        assert_relative_eq!(result.macd_line[last], result.macd_line[last - 1], epsilon = 0.01);
    }
}
