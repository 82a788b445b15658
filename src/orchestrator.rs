//! Concurrent backtest orchestration.
//!
//! Runs a batch of backtest requests against one shared CSV payload with
//! bounded concurrency. The batch is all-or-nothing: the first failing
//! request cancels the remaining tasks and fails the whole call. Results
//! come back in the order the requests were given, not completion order.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::adapters::csv_importer::import_csv;
use crate::domain::backtest::{run_backtest, BackTestRequest, BackTestResult};
use crate::domain::error::VistraderError;
use crate::domain::strategy_builder::build_strategy;

/// Hard cap on requests per batch, independent of the concurrency limit.
pub const MAX_BACKTEST_REQUESTS: usize = 5;

pub struct Orchestrator {
    max_concurrency: usize,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(MAX_BACKTEST_REQUESTS)
    }
}

impl Orchestrator {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.clamp(1, MAX_BACKTEST_REQUESTS),
        }
    }

    /// Run every request against the shared CSV bytes.
    ///
    /// The request list is validated before any CSV parsing or simulation
    /// happens, so an oversized batch never touches the importer.
    pub async fn run(
        &self,
        csv_bytes: Arc<[u8]>,
        requests: Vec<BackTestRequest>,
    ) -> Result<Vec<BackTestResult>, VistraderError> {
        if requests.is_empty() {
            return Err(VistraderError::InvalidRequest {
                reason: "request list is empty".into(),
            });
        }
        if requests.len() > MAX_BACKTEST_REQUESTS {
            return Err(VistraderError::InvalidRequest {
                reason: format!(
                    "too many requests: {} exceeds the maximum of {MAX_BACKTEST_REQUESTS}",
                    requests.len()
                ),
            });
        }

        info!(
            requests = requests.len(),
            max_concurrency = self.max_concurrency,
            "starting backtest batch"
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks: JoinSet<(usize, Result<BackTestResult, VistraderError>)> = JoinSet::new();

        for (index, request) in requests.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let bytes = Arc::clone(&csv_bytes);
            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (
                            index,
                            Err(VistraderError::ExecutionFailure {
                                reason: "scheduler shut down".into(),
                            }),
                        );
                    }
                };
                debug!(index, "backtest task running");
                (index, run_single(&bytes, &request))
            });
        }

        let mut slots: Vec<Option<BackTestResult>> = Vec::new();
        slots.resize_with(tasks.len(), || None);

        while let Some(joined) = tasks.join_next().await {
            let (index, outcome) = match joined {
                Ok(pair) => pair,
                Err(join_error) => {
                    tasks.abort_all();
                    error!(%join_error, "backtest task crashed");
                    return Err(VistraderError::ExecutionFailure {
                        reason: format!("backtest task crashed: {join_error}"),
                    });
                }
            };
            match outcome {
                Ok(result) => {
                    slots[index] = Some(result);
                }
                Err(err) => {
                    tasks.abort_all();
                    error!(index, %err, "backtest failed, cancelling batch");
                    return Err(err);
                }
            }
        }

        // Every task either filled its slot or failed the batch above.
        let results = slots
            .into_iter()
            .map(|slot| {
                slot.ok_or_else(|| VistraderError::ExecutionFailure {
                    reason: "a backtest task produced no result".into(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(results = results.len(), "backtest batch finished");
        Ok(results)
    }
}

/// One request end to end: parse the shared bytes, build the strategy, run
/// the simulation. Each task parses its own copy of the market data so no
/// locking is needed.
fn run_single(
    csv_bytes: &[u8],
    request: &BackTestRequest,
) -> Result<BackTestResult, VistraderError> {
    let data = import_csv(csv_bytes)?;
    let strategy = build_strategy(request)?;
    run_backtest(&strategy, &data, request)
}
