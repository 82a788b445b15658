//! ROC (Rate of Change).
//!
//! roc[i] = (price[i] - price[i-period]) / price[i-period] × 100.
//! Defined from index `period`.

use crate::domain::error::VistraderError;
use crate::domain::indicator::validate_input;

pub fn roc(prices: &[f64], period: usize) -> Result<Vec<f64>, VistraderError> {
    validate_input("roc", prices, period)?;

    let mut out = vec![f64::NAN; prices.len()];
    for i in period..prices.len() {
        out[i] = (prices[i] - prices[i - period]) / prices[i - period] * 100.0;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn roc_known_values() {
        let prices: Vec<f64> = (10..21).map(f64::from).collect();
        let result = roc(&prices, 3).unwrap();

        assert!(result[2].is_nan());
        assert_relative_eq!(result[3], 30.0, epsilon = 1e-4);
        assert_relative_eq!(result[4], 27.27, epsilon = 0.01);
        assert_relative_eq!(result[5], 25.0, epsilon = 1e-4);
    }

    #[test]
    fn roc_is_zero_on_flat_prices() {
        let prices = vec![42.0; 8];
        let result = roc(&prices, 2).unwrap();
        for v in result.iter().skip(2) {
            assert_relative_eq!(*v, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn roc_rejects_bad_input() {
        assert!(roc(&[], 3).is_err());
        assert!(roc(&[1.0], 0).is_err());
    }
}
