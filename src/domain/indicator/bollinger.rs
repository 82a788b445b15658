//! Bollinger Bands.
//!
//! Middle band = SMA(window); upper/lower = middle ± num_std × population
//! standard deviation over the same trailing window.

use crate::domain::error::VistraderError;
use crate::domain::indicator::moving_average::sma;
use crate::domain::indicator::validate_input;

#[derive(Debug, Clone)]
pub struct BollingerOutput {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
    pub std_dev: Vec<f64>,
}

pub fn bollinger_bands(
    prices: &[f64],
    window: usize,
    num_std: f64,
) -> Result<BollingerOutput, VistraderError> {
    validate_input("bollinger_bands", prices, window)?;

    let middle = sma(prices, window)?;
    let mut upper = vec![f64::NAN; prices.len()];
    let mut lower = vec![f64::NAN; prices.len()];
    let mut std_dev = vec![f64::NAN; prices.len()];

    for i in 0..prices.len() {
        if middle[i].is_nan() {
            continue;
        }
        let sum_sq: f64 = prices[i + 1 - window..=i]
            .iter()
            .map(|p| {
                let diff = p - middle[i];
                diff * diff
            })
            .sum();
        let sd = (sum_sq / window as f64).sqrt();
        std_dev[i] = sd;
        upper[i] = middle[i] + num_std * sd;
        lower[i] = middle[i] - num_std * sd;
    }

    Ok(BollingerOutput {
        upper,
        middle,
        lower,
        std_dev,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bands_warmup() {
        let prices: Vec<f64> = (10..31).map(f64::from).collect();
        let result = bollinger_bands(&prices, 20, 2.0).unwrap();

        assert!(result.upper[18].is_nan());
        assert!(result.middle[18].is_nan());
        assert!(result.lower[18].is_nan());
        assert!(!result.upper[19].is_nan());
        assert!(!result.lower[19].is_nan());
    }

    #[test]
    fn bands_bracket_the_middle() {
        let prices: Vec<f64> = (10..31).map(f64::from).collect();
        let result = bollinger_bands(&prices, 5, 1.0).unwrap();

        for i in 4..prices.len() {
            let expected_sma: f64 = prices[i - 4..=i].iter().sum::<f64>() / 5.0;
            assert_relative_eq!(result.middle[i], expected_sma, epsilon = 1e-9);
            assert_relative_eq!(
                result.upper[i],
                result.middle[i] + result.std_dev[i],
                epsilon = 1e-9
            );
            assert_relative_eq!(
                result.lower[i],
                result.middle[i] - result.std_dev[i],
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn constant_prices_collapse_the_bands() {
        let prices = vec![50.0; 10];
        let result = bollinger_bands(&prices, 5, 2.0).unwrap();
        assert_relative_eq!(result.upper[9], 50.0, epsilon = 1e-9);
        assert_relative_eq!(result.lower[9], 50.0, epsilon = 1e-9);
    }
}
