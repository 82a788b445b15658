//! Core domain types and logic.

pub mod backtest;
pub mod condition;
pub mod condition_eval;
pub mod error;
pub mod indicator;
pub mod market;
pub mod strategy;
pub mod strategy_builder;
