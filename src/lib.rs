//! vistrader — rule-based trading strategy backtester.
//!
//! Pure domain logic in [`domain`], I/O adapters in [`adapters`], bounded
//! concurrent execution in [`orchestrator`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod orchestrator;
