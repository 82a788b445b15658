//! Backtest request/result types and the bar-by-bar simulation loop.
//!
//! The simulator is a two-state machine (flat / long). On each bar from
//! index 1 it checks exit-then-entry, marks equity to market, and finally
//! force-closes any open position at the last close. Fills happen at the
//! bar close with no slippage model; `risk_per_trade`, `slippage_percent`
//! and `allow_short` are accepted and validated but do not alter the loop,
//! keeping results comparable with the system this replaces.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::error::VistraderError;
use crate::domain::market::MarketData;
use crate::domain::strategy::Strategy;
use crate::domain::strategy_builder::ConditionConfig;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackTestRequest {
    pub initial_capital: f64,
    #[serde(default)]
    pub risk_per_trade: f64,
    #[serde(default)]
    pub commission_rate: f64,
    #[serde(default)]
    pub slippage_percent: f64,
    #[serde(default)]
    pub allow_short: bool,
    #[serde(default)]
    pub entry_conditions: Vec<ConditionConfig>,
    #[serde(default)]
    pub exit_conditions: Vec<ConditionConfig>,
    #[serde(default = "default_true")]
    pub require_all_entry_conditions: bool,
    #[serde(default)]
    pub require_all_exit_conditions: bool,
}

impl BackTestRequest {
    /// Structural validation, run before any strategy is built.
    pub fn validate(&self) -> Result<(), VistraderError> {
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(VistraderError::InvalidRequest {
                reason: format!(
                    "initialCapital must be positive, got {}",
                    self.initial_capital
                ),
            });
        }
        if !(0.0..1.0).contains(&self.commission_rate) {
            return Err(VistraderError::InvalidRequest {
                reason: format!(
                    "commissionRate must be in [0, 1), got {}",
                    self.commission_rate
                ),
            });
        }
        if self.risk_per_trade < 0.0 || self.slippage_percent < 0.0 {
            return Err(VistraderError::InvalidRequest {
                reason: "riskPerTrade and slippagePercent must be non-negative".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub entry_price: f64,
    pub exit_price: f64,
    pub position_size: f64,
    pub pnl: f64,
    pub exit_time: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackTestResult {
    /// Percentage return over the whole run.
    pub total_return: f64,
    pub final_capital: f64,
    pub trade_count: usize,
    pub win_ratio: f64,
    pub max_drawdown: f64,
    pub trades: Vec<Trade>,
    /// One value per bar; the first entry is the initial capital.
    pub equity_curve: Vec<f64>,
}

pub fn run_backtest(
    strategy: &Strategy,
    data: &MarketData,
    request: &BackTestRequest,
) -> Result<BackTestResult, VistraderError> {
    if data.is_empty() {
        return Err(VistraderError::InvalidRequest {
            reason: "market data has no bars".into(),
        });
    }

    let close = data.close();
    let initial_capital = request.initial_capital;
    let mut capital = initial_capital;
    let mut in_position = false;
    let mut entry_price = 0.0;

    let mut trades: Vec<Trade> = Vec::new();
    let mut equity_curve = Vec::with_capacity(close.len());
    equity_curve.push(initial_capital);

    for i in 1..close.len() {
        let current_price = close[i];

        if in_position && strategy.should_exit(data, i) {
            let position_size = if entry_price > 0.0 {
                capital / entry_price
            } else {
                0.0
            };
            let exit_value = position_size * current_price;
            let mut pnl = exit_value - position_size * entry_price;
            pnl -= exit_value * request.commission_rate;
            capital += pnl;
            trades.push(Trade {
                entry_price,
                exit_price: current_price,
                position_size,
                pnl,
                exit_time: data.points()[i].timestamp,
            });
            in_position = false;
        } else if !in_position && strategy.should_enter(data, i) {
            entry_price = current_price;
            in_position = true;
        }

        if in_position {
            let position_size = if entry_price > 0.0 {
                capital / entry_price
            } else {
                0.0
            };
            equity_curve.push(position_size * current_price);
        } else {
            equity_curve.push(capital);
        }
    }

    if in_position {
        let last = close.len() - 1;
        let position_size = if entry_price > 0.0 {
            capital / entry_price
        } else {
            0.0
        };
        let final_value = position_size * close[last];
        let mut pnl = final_value - position_size * entry_price;
        pnl -= final_value * request.commission_rate;
        capital += pnl;
        trades.push(Trade {
            entry_price,
            exit_price: close[last],
            position_size,
            pnl,
            exit_time: data.points()[last].timestamp,
        });
    }

    let total_return = (capital - initial_capital) / initial_capital * 100.0;
    let win_count = trades.iter().filter(|t| t.pnl > 0.0).count();
    let win_ratio = if trades.is_empty() {
        0.0
    } else {
        win_count as f64 / trades.len() as f64
    };
    let max_drawdown = max_drawdown(&equity_curve);

    Ok(BackTestResult {
        total_return,
        final_capital: capital,
        trade_count: trades.len(),
        win_ratio,
        max_drawdown,
        trades,
        equity_curve,
    })
}

/// Largest peak-to-trough decline over the equity curve, as a fraction of
/// the running peak.
fn max_drawdown(equity: &[f64]) -> f64 {
    let mut peak = match equity.first() {
        Some(first) => *first,
        None => return 0.0,
    };
    let mut max_drawn: f64 = 0.0;
    for &value in equity {
        if value > peak {
            peak = value;
        }
        let drawn = (peak - value) / peak;
        if drawn > max_drawn {
            max_drawn = drawn;
        }
    }
    max_drawn
}
