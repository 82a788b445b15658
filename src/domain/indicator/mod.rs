//! Technical indicator implementations.
//!
//! Every function here is pure: it takes `&[f64]` input arrays, allocates a
//! fresh output aligned index-for-index with the input, and NaN-pads the
//! warm-up positions where not enough history exists. Callers treat NaN as
//! "undefined, skip". Structurally invalid input (empty arrays, zero
//! windows, mismatched lengths) fails fast with an error.

pub mod atr;
pub mod bollinger;
pub mod dmi;
pub mod fibonacci;
pub mod ichimoku;
pub mod macd;
pub mod moving_average;
pub mod obv;
pub mod pivot;
pub mod roc;
pub mod rsi;
pub mod stochastic;

pub use atr::atr;
pub use bollinger::{bollinger_bands, BollingerOutput};
pub use dmi::{dmi, DmiOutput};
pub use fibonacci::{fibonacci_retracement, FibonacciOutput};
pub use ichimoku::{ichimoku_cloud, IchimokuOutput};
pub use macd::{macd, MacdOutput};
pub use moving_average::{ema, sma};
pub use obv::obv;
pub use pivot::{pivot_points, PivotOutput, PivotType};
pub use roc::roc;
pub use rsi::rsi;
pub use stochastic::{stochastic, StochasticOutput};

use crate::domain::error::VistraderError;

/// Reject empty inputs and non-positive windows.
pub(crate) fn validate_input(
    name: &str,
    values: &[f64],
    window: usize,
) -> Result<(), VistraderError> {
    if window == 0 {
        return Err(VistraderError::IndicatorInput {
            reason: format!("{name}: window must be greater than 0"),
        });
    }
    if values.is_empty() {
        return Err(VistraderError::IndicatorInput {
            reason: format!("{name}: input array is empty"),
        });
    }
    Ok(())
}

/// Reject high/low/close (or similar) arrays of differing lengths.
pub(crate) fn validate_aligned(
    name: &str,
    arrays: &[&[f64]],
) -> Result<(), VistraderError> {
    if let Some(first) = arrays.first() {
        if arrays.iter().any(|a| a.len() != first.len()) {
            return Err(VistraderError::IndicatorInput {
                reason: format!("{name}: input arrays must be of the same length"),
            });
        }
    }
    Ok(())
}
