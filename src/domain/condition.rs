//! Strategy condition AST.
//!
//! A condition is a recursive sum type: primitive indicator signals plus
//! `And`/`Or`/`Not` composites that wrap other conditions to any depth.
//! Conditions are built once by the strategy builder and are stateless
//! afterward; evaluation lives in [`condition_eval`](super::condition_eval).

use std::str::FromStr;

use crate::domain::indicator::PivotType;

/// Named DMI/ADX signal patterns. Closed set; the builder rejects anything
/// else by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmiSignalType {
    PlusDiAboveMinusDi,
    MinusDiAbovePlusDi,
    PlusDiCrossesAboveMinusDi,
    MinusDiCrossesAbovePlusDi,
    AdxAboveThreshold,
    AdxBelowThreshold,
    AdxRising,
    AdxFalling,
    StrongTrend,
    WeakTrend,
    StrongBullish,
    StrongBearish,
    DiDivergence,
}

impl FromStr for DmiSignalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PLUS_DI_ABOVE_MINUS_DI" => Ok(Self::PlusDiAboveMinusDi),
            "MINUS_DI_ABOVE_PLUS_DI" => Ok(Self::MinusDiAbovePlusDi),
            "PLUS_DI_CROSSES_ABOVE_MINUS_DI" => Ok(Self::PlusDiCrossesAboveMinusDi),
            "MINUS_DI_CROSSES_ABOVE_PLUS_DI" => Ok(Self::MinusDiCrossesAbovePlusDi),
            "ADX_ABOVE_THRESHOLD" => Ok(Self::AdxAboveThreshold),
            "ADX_BELOW_THRESHOLD" => Ok(Self::AdxBelowThreshold),
            "ADX_RISING" => Ok(Self::AdxRising),
            "ADX_FALLING" => Ok(Self::AdxFalling),
            "STRONG_TREND" => Ok(Self::StrongTrend),
            "WEAK_TREND" => Ok(Self::WeakTrend),
            "STRONG_BULLISH" => Ok(Self::StrongBullish),
            "STRONG_BEARISH" => Ok(Self::StrongBearish),
            "DI_DIVERGENCE" => Ok(Self::DiDivergence),
            other => Err(format!("unknown DMI signal type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IchimokuSignalType {
    TenkanCrossesAboveKijun,
    TenkanCrossesBelowKijun,
    PriceAboveCloud,
    PriceBelowCloud,
    PriceInCloud,
    BullishCloud,
    BearishCloud,
    ChikouAbovePrice,
    ChikouBelowPrice,
    StrongBullish,
    StrongBearish,
}

impl FromStr for IchimokuSignalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TENKAN_CROSSES_ABOVE_KIJUN" => Ok(Self::TenkanCrossesAboveKijun),
            "TENKAN_CROSSES_BELOW_KIJUN" => Ok(Self::TenkanCrossesBelowKijun),
            "PRICE_ABOVE_CLOUD" => Ok(Self::PriceAboveCloud),
            "PRICE_BELOW_CLOUD" => Ok(Self::PriceBelowCloud),
            "PRICE_IN_CLOUD" => Ok(Self::PriceInCloud),
            "BULLISH_CLOUD" => Ok(Self::BullishCloud),
            "BEARISH_CLOUD" => Ok(Self::BearishCloud),
            "CHIKOU_ABOVE_PRICE" => Ok(Self::ChikouAbovePrice),
            "CHIKOU_BELOW_PRICE" => Ok(Self::ChikouBelowPrice),
            "STRONG_BULLISH" => Ok(Self::StrongBullish),
            "STRONG_BEARISH" => Ok(Self::StrongBearish),
            other => Err(format!("unknown Ichimoku signal type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RocDirection {
    Above,
    Below,
    Equal,
    CrossingAbove,
    CrossingBelow,
}

impl FromStr for RocDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ABOVE" => Ok(Self::Above),
            "BELOW" => Ok(Self::Below),
            "EQUAL" => Ok(Self::Equal),
            "CROSSING_ABOVE" => Ok(Self::CrossingAbove),
            "CROSSING_BELOW" => Ok(Self::CrossingBelow),
            other => Err(format!("unknown ROC direction: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObvSignalType {
    AboveMa,
    BelowMa,
    CrossAboveMa,
    CrossBelowMa,
    Increasing,
    Decreasing,
}

impl ObvSignalType {
    /// The MA-relative signals need the OBV moving average; the raw trend
    /// signals do not.
    pub fn uses_moving_average(self) -> bool {
        !matches!(self, ObvSignalType::Increasing | ObvSignalType::Decreasing)
    }
}

impl FromStr for ObvSignalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ABOVE_MA" => Ok(Self::AboveMa),
            "BELOW_MA" => Ok(Self::BelowMa),
            "CROSS_ABOVE_MA" => Ok(Self::CrossAboveMa),
            "CROSS_BELOW_MA" => Ok(Self::CrossBelowMa),
            "INCREASING" => Ok(Self::Increasing),
            "DECREASING" => Ok(Self::Decreasing),
            other => Err(format!("unknown OBV signal type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotLevel {
    Pp,
    R1,
    R2,
    R3,
    S1,
    S2,
    S3,
}

impl FromStr for PivotLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PP" => Ok(Self::Pp),
            "R1" => Ok(Self::R1),
            "R2" => Ok(Self::R2),
            "R3" => Ok(Self::R3),
            "S1" => Ok(Self::S1),
            "S2" => Ok(Self::S2),
            "S3" => Ok(Self::S3),
            other => Err(format!("unknown pivot level: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    SmaCrossover {
        fast_period: usize,
        slow_period: usize,
        cross_above: bool,
    },
    RsiThreshold {
        period: usize,
        upper_threshold: f64,
        lower_threshold: f64,
        check_overbought: bool,
    },
    MacdCrossover {
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
        cross_above: bool,
    },
    BollingerBands {
        period: usize,
        num_std: f64,
        check_upper: bool,
    },
    Atr {
        period: usize,
        /// Price-move multiplier when `compare_with_price`, otherwise a
        /// direct ATR threshold.
        multiplier: f64,
        is_above: bool,
        compare_with_price: bool,
    },
    Stochastic {
        k_period: usize,
        d_period: usize,
        upper_threshold: f64,
        lower_threshold: f64,
        check_overbought: bool,
    },
    Dmi {
        period: usize,
        signal_type: DmiSignalType,
        threshold: f64,
        divergence_threshold: f64,
    },
    Roc {
        period: usize,
        threshold: f64,
        direction: RocDirection,
    },
    /// Price/momentum divergence: price prints a lower low while ROC prints
    /// a higher low (bullish), or a higher high against a lower ROC high
    /// (bearish), over the two most recent local extrema in the window.
    RocDivergence {
        period: usize,
        divergence_period: usize,
        bullish: bool,
    },
    FibonacciRetracement {
        lookback_period: usize,
        level: f64,
        is_bullish: bool,
        tolerance: f64,
    },
    Obv {
        period: usize,
        signal_type: ObvSignalType,
    },
    IchimokuCloud {
        tenkan_period: usize,
        kijun_period: usize,
        chikou_period: usize,
        signal_type: IchimokuSignalType,
    },
    PivotPoints {
        pivot_type: PivotType,
        pivot_level: PivotLevel,
        cross_above: bool,
        use_close: bool,
    },
    PriceThreshold {
        threshold: f64,
        above: bool,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_enums_parse_wire_names() {
        assert_eq!(
            "PLUS_DI_CROSSES_ABOVE_MINUS_DI".parse::<DmiSignalType>().unwrap(),
            DmiSignalType::PlusDiCrossesAboveMinusDi
        );
        assert_eq!(
            "chikou_above_price".parse::<IchimokuSignalType>().unwrap(),
            IchimokuSignalType::ChikouAbovePrice
        );
        assert_eq!(
            "CROSSING_BELOW".parse::<RocDirection>().unwrap(),
            RocDirection::CrossingBelow
        );
        assert_eq!("cross_above_ma".parse::<ObvSignalType>().unwrap(), ObvSignalType::CrossAboveMa);
        assert_eq!("s2".parse::<PivotLevel>().unwrap(), PivotLevel::S2);
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!("SIDEWAYS".parse::<DmiSignalType>().is_err());
        assert!("".parse::<RocDirection>().is_err());
        assert!("R4".parse::<PivotLevel>().is_err());
    }

    #[test]
    fn obv_ma_usage() {
        assert!(ObvSignalType::CrossBelowMa.uses_moving_average());
        assert!(!ObvSignalType::Increasing.uses_moving_average());
    }

    #[test]
    fn conditions_nest() {
        let cond = Condition::And(vec![
            Condition::PriceThreshold {
                threshold: 10.0,
                above: true,
            },
            Condition::Not(Box::new(Condition::Or(vec![]))),
        ]);
        match cond {
            Condition::And(children) => assert_eq!(children.len(), 2),
            _ => panic!("expected And"),
        }
    }
}
