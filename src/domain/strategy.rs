//! Trading strategy: entry and exit condition lists with combination
//! policies.
//!
//! `require_all_*` selects AND across the list; otherwise any single
//! condition suffices. An empty list never signals, so a strategy without
//! exit conditions simply holds until the simulation force-closes.

use crate::domain::condition::Condition;
use crate::domain::condition_eval::{evaluate, evaluate_series};
use crate::domain::market::MarketData;

#[derive(Debug, Clone)]
pub struct Strategy {
    pub entry_conditions: Vec<Condition>,
    pub exit_conditions: Vec<Condition>,
    pub require_all_entry_conditions: bool,
    pub require_all_exit_conditions: bool,
}

impl Strategy {
    pub fn should_enter(&self, data: &MarketData, index: usize) -> bool {
        combine_at(
            &self.entry_conditions,
            self.require_all_entry_conditions,
            data,
            index,
        )
    }

    pub fn should_exit(&self, data: &MarketData, index: usize) -> bool {
        combine_at(
            &self.exit_conditions,
            self.require_all_exit_conditions,
            data,
            index,
        )
    }

    /// Whole-series entry signals; agrees with [`Self::should_enter`] at
    /// every index.
    pub fn entry_signals(&self, data: &MarketData) -> Vec<bool> {
        combine_series(
            &self.entry_conditions,
            self.require_all_entry_conditions,
            data,
        )
    }

    pub fn exit_signals(&self, data: &MarketData) -> Vec<bool> {
        combine_series(
            &self.exit_conditions,
            self.require_all_exit_conditions,
            data,
        )
    }
}

fn combine_at(conditions: &[Condition], require_all: bool, data: &MarketData, index: usize) -> bool {
    if conditions.is_empty() {
        return false;
    }
    if require_all {
        conditions.iter().all(|c| evaluate(c, data, index))
    } else {
        conditions.iter().any(|c| evaluate(c, data, index))
    }
}

fn combine_series(conditions: &[Condition], require_all: bool, data: &MarketData) -> Vec<bool> {
    let n = data.len();
    if conditions.is_empty() {
        return vec![false; n];
    }
    let mut out = vec![require_all; n];
    for condition in conditions {
        for (slot, v) in out.iter_mut().zip(evaluate_series(condition, data)) {
            *slot = if require_all { *slot && v } else { *slot || v };
        }
    }
    out
}
