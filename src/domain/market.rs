//! Market data series.
//!
//! A `MarketData` owns a timestamp-ascending run of bars plus parallel
//! `f64` arrays derived once at construction. The arrays are what the
//! indicator functions consume; index i in every array refers to the same
//! bar. Nothing mutates a series after construction.

use chrono::NaiveDateTime;

/// One OHLCV bar as produced by the CSV importer.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketDataPoint {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adjusted_close: f64,
    pub volume: i64,
    pub dividend_amount: f64,
    pub split_coefficient: f64,
}

/// An immutable price series with pre-extracted per-field arrays.
#[derive(Debug, Clone)]
pub struct MarketData {
    points: Vec<MarketDataPoint>,
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
    volume: Vec<f64>,
}

impl MarketData {
    pub fn new(points: Vec<MarketDataPoint>) -> Self {
        let open = points.iter().map(|p| p.open).collect();
        let high = points.iter().map(|p| p.high).collect();
        let low = points.iter().map(|p| p.low).collect();
        let close = points.iter().map(|p| p.close).collect();
        let volume = points.iter().map(|p| p.volume as f64).collect();
        MarketData {
            points,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[MarketDataPoint] {
        &self.points
    }

    pub fn open(&self) -> &[f64] {
        &self.open
    }

    pub fn high(&self) -> &[f64] {
        &self.high
    }

    pub fn low(&self) -> &[f64] {
        &self.low
    }

    pub fn close(&self) -> &[f64] {
        &self.close
    }

    /// Volumes widened to f64 so volume-based indicators share the same
    /// array shape as price-based ones.
    pub fn volume(&self) -> &[f64] {
        &self.volume
    }
}
