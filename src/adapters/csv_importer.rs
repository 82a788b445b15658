//! CSV market data importer.
//!
//! Accepts time-series exports with at least `timestamp`, `open`, `high`,
//! `low` and `close` columns (case-insensitive, any order). Optional
//! columns `adjusted_close`, `volume`, `dividend_amount` and
//! `split_coefficient` fall back to sensible defaults. Malformed rows are
//! skipped and counted rather than failing the import; only a file that
//! yields zero valid rows is an error. Rows come out sorted by timestamp
//! ascending regardless of file order.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::domain::error::VistraderError;
use crate::domain::market::{MarketData, MarketDataPoint};

const REQUIRED_HEADERS: [&str; 5] = ["timestamp", "open", "high", "low", "close"];

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d"];

/// Counters for one import run, logged at the end.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    pub total_rows: usize,
    pub imported_rows: usize,
    pub skipped_rows: usize,
}

/// Parse CSV bytes into bar series market data.
pub fn import_csv(bytes: &[u8]) -> Result<MarketData, VistraderError> {
    import_csv_with_stats(bytes).map(|(data, _)| data)
}

pub fn import_csv_with_stats(bytes: &[u8]) -> Result<(MarketData, ImportStats), VistraderError> {
    let bytes = strip_bom(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| {
            warn!(error = %e, "cannot read CSV header row");
            VistraderError::CsvEmpty
        })?
        .clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut stats = ImportStats::default();
    let mut detected_format: Option<&'static str> = None;
    let mut points: Vec<MarketDataPoint> = Vec::new();

    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                stats.total_rows += 1;
                stats.skipped_rows += 1;
                warn!(error = %e, "skipping unreadable CSV record");
                continue;
            }
        };
        stats.total_rows += 1;

        match parse_row(&record, &columns, &mut detected_format) {
            Ok(point) => {
                stats.imported_rows += 1;
                points.push(point);
            }
            Err(reason) => {
                stats.skipped_rows += 1;
                warn!(row = stats.total_rows, reason, "skipping invalid CSV row");
            }
        }
    }

    if points.is_empty() {
        warn!(
            total = stats.total_rows,
            skipped = stats.skipped_rows,
            "CSV yielded no valid data rows"
        );
        return Err(VistraderError::CsvEmpty);
    }

    if points.len() >= 2 && points[0].timestamp > points[1].timestamp {
        debug!("input is newest-first");
    }
    // ascending timestamps are a MarketData invariant, whatever the file order
    points.sort_by_key(|p| p.timestamp);

    info!(
        total = stats.total_rows,
        imported = stats.imported_rows,
        skipped = stats.skipped_rows,
        "CSV import finished"
    );
    Ok((MarketData::new(points), stats))
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes)
}

/// Resolved column indices for one file.
struct ColumnMap {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    adjusted_close: Option<usize>,
    volume: Option<usize>,
    dividend_amount: Option<usize>,
    split_coefficient: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, VistraderError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let missing: Vec<String> = REQUIRED_HEADERS
            .iter()
            .filter(|name| find(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(VistraderError::CsvMissingHeaders {
                missing: missing.join(", "),
            });
        }

        Ok(Self {
            timestamp: find("timestamp").unwrap_or_default(),
            open: find("open").unwrap_or_default(),
            high: find("high").unwrap_or_default(),
            low: find("low").unwrap_or_default(),
            close: find("close").unwrap_or_default(),
            adjusted_close: find("adjusted_close"),
            volume: find("volume"),
            dividend_amount: find("dividend_amount"),
            split_coefficient: find("split_coefficient"),
        })
    }
}

fn parse_row(
    record: &csv::StringRecord,
    columns: &ColumnMap,
    detected_format: &mut Option<&'static str>,
) -> Result<MarketDataPoint, String> {
    let field = |index: usize, name: &str| -> Result<&str, String> {
        let raw = record.get(index).unwrap_or("").trim();
        if raw.is_empty() {
            return Err(format!("empty {name} field"));
        }
        Ok(raw)
    };
    let required_f64 = |index: usize, name: &str| -> Result<f64, String> {
        let raw = field(index, name)?;
        raw.parse::<f64>()
            .map_err(|_| format!("non-numeric {name} value '{raw}'"))
    };
    let optional_f64 = |index: Option<usize>, default: f64| -> Result<f64, String> {
        match index {
            Some(index) => {
                let raw = record.get(index).unwrap_or("").trim();
                if raw.is_empty() {
                    Ok(default)
                } else {
                    raw.parse::<f64>()
                        .map_err(|_| format!("non-numeric optional value '{raw}'"))
                }
            }
            None => Ok(default),
        }
    };

    let timestamp = parse_timestamp(field(columns.timestamp, "timestamp")?, detected_format)?;
    let open = required_f64(columns.open, "open")?;
    let high = required_f64(columns.high, "high")?;
    let low = required_f64(columns.low, "low")?;
    let close = required_f64(columns.close, "close")?;

    if high < low {
        return Err(format!("high {high} below low {low}"));
    }
    if open < low || open > high || close < low || close > high {
        return Err("open/close outside the high-low range".into());
    }

    let adjusted_close = optional_f64(columns.adjusted_close, close)?;
    let dividend_amount = optional_f64(columns.dividend_amount, 0.0)?;
    let split_coefficient = optional_f64(columns.split_coefficient, 1.0)?;

    let volume = match columns.volume {
        Some(index) => {
            let raw = record.get(index).unwrap_or("").trim();
            if raw.is_empty() {
                0
            } else {
                raw.parse::<i64>()
                    .map_err(|_| format!("non-numeric volume value '{raw}'"))?
            }
        }
        None => 0,
    };
    if volume < 0 {
        return Err(format!("negative volume {volume}"));
    }

    Ok(MarketDataPoint {
        timestamp,
        open,
        high,
        low,
        close,
        adjusted_close,
        volume,
        dividend_amount,
        split_coefficient,
    })
}

/// Detect the timestamp format once from the first parseable value and
/// reuse it. A row that breaks the detected format gets one retry across
/// all known formats before being skipped.
fn parse_timestamp(
    raw: &str,
    detected_format: &mut Option<&'static str>,
) -> Result<NaiveDateTime, String> {
    if let Some(format) = *detected_format {
        if let Some(ts) = parse_with(raw, format) {
            return Ok(ts);
        }
    }
    for &format in DATETIME_FORMATS.iter().chain(DATE_FORMATS.iter()) {
        if let Some(ts) = parse_with(raw, format) {
            *detected_format = Some(format);
            return Ok(ts);
        }
    }
    Err(format!("unparseable timestamp '{raw}'"))
}

fn parse_with(raw: &str, format: &str) -> Option<NaiveDateTime> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
        return Some(ts);
    }
    NaiveDate::parse_from_str(raw, format)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
