//! Pivot point levels.
//!
//! Every level at index i is computed from bar i-1, so index 0 is NaN.
//! Five published variants are supported; DeMark defines only PP/R1/S1 and
//! leaves the remaining levels NaN.

use std::str::FromStr;

use crate::domain::error::VistraderError;
use crate::domain::indicator::{validate_aligned, validate_input};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotType {
    Standard,
    Fibonacci,
    Woodie,
    Camarilla,
    DeMark,
}

impl FromStr for PivotType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "STANDARD" => Ok(PivotType::Standard),
            "FIBONACCI" => Ok(PivotType::Fibonacci),
            "WOODIE" => Ok(PivotType::Woodie),
            "CAMARILLA" => Ok(PivotType::Camarilla),
            "DEMARK" => Ok(PivotType::DeMark),
            other => Err(format!("unknown pivot type: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PivotOutput {
    pub pivot: Vec<f64>,
    pub r1: Vec<f64>,
    pub r2: Vec<f64>,
    pub r3: Vec<f64>,
    pub s1: Vec<f64>,
    pub s2: Vec<f64>,
    pub s3: Vec<f64>,
}

pub fn pivot_points(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    open: &[f64],
    pivot_type: PivotType,
) -> Result<PivotOutput, VistraderError> {
    validate_input("pivot_points", high, 1)?;
    validate_input("pivot_points", low, 1)?;
    validate_input("pivot_points", close, 1)?;
    validate_input("pivot_points", open, 1)?;
    validate_aligned("pivot_points", &[high, low, close, open])?;

    let n = close.len();
    let mut out = PivotOutput {
        pivot: vec![f64::NAN; n],
        r1: vec![f64::NAN; n],
        r2: vec![f64::NAN; n],
        r3: vec![f64::NAN; n],
        s1: vec![f64::NAN; n],
        s2: vec![f64::NAN; n],
        s3: vec![f64::NAN; n],
    };

    for i in 1..n {
        let (h, l, c, o) = (high[i - 1], low[i - 1], close[i - 1], open[i - 1]);
        let range = h - l;

        match pivot_type {
            PivotType::Standard => {
                let pp = (h + l + c) / 3.0;
                out.pivot[i] = pp;
                out.r1[i] = 2.0 * pp - l;
                out.s1[i] = 2.0 * pp - h;
                out.r2[i] = pp + range;
                out.s2[i] = pp - range;
                out.r3[i] = h + 2.0 * (pp - l);
                out.s3[i] = l - 2.0 * (h - pp);
            }
            PivotType::Fibonacci => {
                let pp = (h + l + c) / 3.0;
                out.pivot[i] = pp;
                out.r1[i] = pp + 0.382 * range;
                out.s1[i] = pp - 0.382 * range;
                out.r2[i] = pp + 0.618 * range;
                out.s2[i] = pp - 0.618 * range;
                out.r3[i] = pp + range;
                out.s3[i] = pp - range;
            }
            PivotType::Woodie => {
                let pp = (h + l + 2.0 * c) / 4.0;
                out.pivot[i] = pp;
                out.r1[i] = 2.0 * pp - l;
                out.s1[i] = 2.0 * pp - h;
                out.r2[i] = pp + range;
                out.s2[i] = pp - range;
                out.r3[i] = h + 2.0 * (pp - l);
                out.s3[i] = l - 2.0 * (h - pp);
            }
            PivotType::Camarilla => {
                let pp = (h + l + c) / 3.0;
                out.pivot[i] = pp;
                out.r1[i] = c + range * 1.1 / 12.0;
                out.s1[i] = c - range * 1.1 / 12.0;
                out.r2[i] = c + range * 1.1 / 6.0;
                out.s2[i] = c - range * 1.1 / 6.0;
                out.r3[i] = c + range * 1.1 / 4.0;
                out.s3[i] = c - range * 1.1 / 4.0;
            }
            PivotType::DeMark => {
                let x = if c < o {
                    h + 2.0 * l + c
                } else if c > o {
                    2.0 * h + l + c
                } else {
                    h + l + 2.0 * c
                };
                out.pivot[i] = x / 4.0;
                out.r1[i] = x / 2.0 - l;
                out.s1[i] = x / 2.0 - h;
            }
        }
    }

    Ok(out)
}
