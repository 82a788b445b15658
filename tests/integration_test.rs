//! End-to-end pipeline tests: CSV file on disk through the importer, the
//! strategy builder and the simulator, plus orchestrated batches.

use std::io::Write;
use std::sync::Arc;

use approx::assert_relative_eq;
use serde_json::json;

use vistrader::adapters::csv_importer::import_csv;
use vistrader::domain::backtest::{run_backtest, BackTestRequest};
use vistrader::domain::strategy_builder::build_strategy;
use vistrader::orchestrator::{Orchestrator, MAX_BACKTEST_REQUESTS};

/// 20 daily bars that ramp above 11, fall back under 10.5, then recover.
fn sample_csv() -> String {
    let closes = [
        10.0, 10.2, 10.4, 10.8, 11.2, 11.6, 12.0, 12.4, 12.0, 11.5, 11.0, 10.4, 10.2, 10.6, 11.1,
        11.5, 11.9, 12.3, 12.6, 12.9,
    ];
    let mut csv = String::from("timestamp,open,high,low,close,volume\n");
    for (i, close) in closes.iter().enumerate() {
        csv.push_str(&format!(
            "2024-01-{:02},{close},{},{},{close},1000\n",
            i + 1,
            close + 0.5,
            close - 0.5,
        ));
    }
    csv
}

fn write_temp_csv(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn threshold_request() -> BackTestRequest {
    serde_json::from_value(json!({
        "initialCapital": 10_000.0,
        "commissionRate": 0.001,
        "entryConditions": [
            {"type": "PRICE_THRESHOLD", "parameters": {"threshold": 11.0, "above": true}}
        ],
        "exitConditions": [
            {"type": "PRICE_THRESHOLD", "parameters": {"threshold": 10.5, "above": false}}
        ]
    }))
    .unwrap()
}

#[test]
fn full_pipeline_from_csv_file() {
    let file = write_temp_csv(&sample_csv());
    let bytes = std::fs::read(file.path()).unwrap();

    let data = import_csv(&bytes).unwrap();
    assert_eq!(data.len(), 20);

    let request = threshold_request();
    let strategy = build_strategy(&request).unwrap();
    let result = run_backtest(&strategy, &data, &request).unwrap();

    // Enters above 11, exits below 10.5, re-enters on the recovery and is
    // force-closed at the end.
    assert!(result.trade_count >= 1);
    assert_eq!(result.equity_curve.len(), 20);
    assert_relative_eq!(result.equity_curve[0], 10_000.0, epsilon = 1e-9);
    assert!(result.max_drawdown >= 0.0 && result.max_drawdown < 1.0);
    assert!(result.win_ratio >= 0.0 && result.win_ratio <= 1.0);
    assert_relative_eq!(
        result.total_return,
        (result.final_capital - 10_000.0) / 10_000.0 * 100.0,
        epsilon = 1e-9
    );
}

#[test]
fn indicator_conditions_build_and_run_end_to_end() {
    let data = import_csv(sample_csv().as_bytes()).unwrap();
    let request: BackTestRequest = serde_json::from_value(json!({
        "initialCapital": 10_000.0,
        "entryConditions": [
            {"type": "AND", "parameters": {"conditions": [
                {"type": "SMA_CROSSOVER", "parameters": {
                    "fastPeriod": 3, "slowPeriod": 6, "crossAbove": true
                }},
                {"type": "NOT", "parameters": {"condition":
                    {"type": "RSI_THRESHOLD", "parameters": {
                        "period": 5, "upperThreshold": 70.0,
                        "lowerThreshold": 30.0, "checkOverbought": true
                    }}
                }}
            ]}}
        ],
        "exitConditions": [
            {"type": "SMA_CROSSOVER", "parameters": {
                "fastPeriod": 3, "slowPeriod": 6, "crossAbove": false
            }}
        ]
    }))
    .unwrap();

    let strategy = build_strategy(&request).unwrap();
    let result = run_backtest(&strategy, &data, &request).unwrap();
    assert_eq!(result.equity_curve.len(), 20);
}

#[tokio::test]
async fn orchestrated_batch_matches_direct_execution() {
    let csv = sample_csv();
    let bytes: Arc<[u8]> = csv.as_bytes().to_vec().into();

    let direct = {
        let data = import_csv(csv.as_bytes()).unwrap();
        let request = threshold_request();
        let strategy = build_strategy(&request).unwrap();
        run_backtest(&strategy, &data, &request).unwrap()
    };

    let requests: Vec<BackTestRequest> = (0..MAX_BACKTEST_REQUESTS)
        .map(|_| threshold_request())
        .collect();
    let results = Orchestrator::default().run(bytes, requests).await.unwrap();

    assert_eq!(results.len(), MAX_BACKTEST_REQUESTS);
    for result in &results {
        assert_eq!(result.trade_count, direct.trade_count);
        assert_relative_eq!(result.final_capital, direct.final_capital, epsilon = 1e-9);
        assert_relative_eq!(result.max_drawdown, direct.max_drawdown, epsilon = 1e-9);
    }
}

#[tokio::test]
async fn batch_over_the_cap_is_rejected() {
    let bytes: Arc<[u8]> = sample_csv().as_bytes().to_vec().into();
    let requests: Vec<BackTestRequest> = (0..MAX_BACKTEST_REQUESTS + 1)
        .map(|_| threshold_request())
        .collect();
    let err = Orchestrator::default().run(bytes, requests).await.unwrap_err();
    assert!(err.is_invalid_request());
}

#[test]
fn result_serializes_with_wire_field_names() {
    let data = import_csv(sample_csv().as_bytes()).unwrap();
    let request = threshold_request();
    let strategy = build_strategy(&request).unwrap();
    let result = run_backtest(&strategy, &data, &request).unwrap();

    let rendered = serde_json::to_string(&result).unwrap();
    for field in [
        "totalReturn",
        "finalCapital",
        "tradeCount",
        "winRatio",
        "maxDrawdown",
        "trades",
        "equityCurve",
    ] {
        assert!(rendered.contains(field), "missing field {field}");
    }
}
