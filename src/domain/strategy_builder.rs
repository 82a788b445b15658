//! Declarative strategy configuration and the condition builder.
//!
//! The wire shape is `{ "type": "...", "parameters": { ... } }`, nested
//! recursively for composites (`AND`/`OR` carry `parameters.conditions`,
//! `NOT` carries `parameters.condition`). Building fails fast on the first
//! malformed condition with an error naming the condition type and the
//! offending parameter. Numeric parameters accept JSON numbers or numeric
//! strings; booleans accept JSON booleans or "true"/"false".

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::backtest::BackTestRequest;
use crate::domain::condition::Condition;
use crate::domain::error::VistraderError;
use crate::domain::indicator::PivotType;
use crate::domain::strategy::Strategy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionConfig {
    #[serde(rename = "type")]
    pub condition_type: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

/// Build an evaluable strategy from a validated request.
pub fn build_strategy(request: &BackTestRequest) -> Result<Strategy, VistraderError> {
    request.validate()?;

    let entry_conditions = request
        .entry_conditions
        .iter()
        .map(build_condition)
        .collect::<Result<Vec<_>, _>>()?;
    let exit_conditions = request
        .exit_conditions
        .iter()
        .map(build_condition)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Strategy {
        entry_conditions,
        exit_conditions,
        require_all_entry_conditions: request.require_all_entry_conditions,
        require_all_exit_conditions: request.require_all_exit_conditions,
    })
}

/// Build one condition (recursively, for composites) from its config.
pub fn build_condition(config: &ConditionConfig) -> Result<Condition, VistraderError> {
    let p = Params {
        condition_type: &config.condition_type,
        parameters: &config.parameters,
    };

    match config.condition_type.to_ascii_uppercase().as_str() {
        "AND" => Ok(Condition::And(p.nested_conditions("conditions")?)),
        "OR" => Ok(Condition::Or(p.nested_conditions("conditions")?)),
        "NOT" => {
            let inner = p.nested_condition("condition")?;
            Ok(Condition::Not(Box::new(inner)))
        }

        "SMA_CROSSOVER" => Ok(Condition::SmaCrossover {
            fast_period: p.period("fastPeriod")?,
            slow_period: p.period("slowPeriod")?,
            cross_above: p.bool("crossAbove")?,
        }),

        "RSI_THRESHOLD" => Ok(Condition::RsiThreshold {
            period: p.period("period")?,
            upper_threshold: p.f64("upperThreshold")?,
            lower_threshold: p.f64("lowerThreshold")?,
            check_overbought: p.bool("checkOverbought")?,
        }),

        "MACD_CROSSOVER" => Ok(Condition::MacdCrossover {
            fast_period: p.period("fastPeriod")?,
            slow_period: p.period("slowPeriod")?,
            signal_period: p.period("signalPeriod")?,
            cross_above: p.bool("crossAbove")?,
        }),

        "BOLLINGER_BANDS" => Ok(Condition::BollingerBands {
            period: p.period("period")?,
            num_std: p.f64("numStd")?,
            check_upper: p.bool("checkUpper")?,
        }),

        "ATR" => Ok(Condition::Atr {
            period: p.period("period")?,
            multiplier: p.f64("multiplier")?,
            is_above: p.bool("isAbove")?,
            compare_with_price: p.bool("compareWithPrice")?,
        }),

        "STOCHASTIC" => Ok(Condition::Stochastic {
            k_period: p.period("kPeriod")?,
            d_period: p.period("dPeriod")?,
            upper_threshold: p.f64("upperThreshold")?,
            lower_threshold: p.f64("lowerThreshold")?,
            check_overbought: p.bool("checkOverbought")?,
        }),

        "DMI" => Ok(Condition::Dmi {
            period: p.period_or("period", 14)?,
            signal_type: p.parsed("signalType")?,
            threshold: p.f64_or("threshold", 25.0)?,
            divergence_threshold: p.f64_or("divergenceThreshold", 10.0)?,
        }),

        "ROC" => Ok(Condition::Roc {
            period: p.period("period")?,
            threshold: p.f64("threshold")?,
            direction: p.parsed("direction")?,
        }),

        "ROC_DIVERGENCE" => Ok(Condition::RocDivergence {
            period: p.period_or("period", 12)?,
            divergence_period: p.period_or("divergencePeriod", 20)?,
            bullish: p.bool_or("bullish", true)?,
        }),

        "FIBONACCI_RETRACEMENT" => Ok(Condition::FibonacciRetracement {
            lookback_period: p.period("lookbackPeriod")?,
            level: p.f64("level")?,
            is_bullish: p.bool("isBullish")?,
            tolerance: p.f64("tolerance")?,
        }),

        "OBV" => Ok(Condition::Obv {
            period: p.period_or("period", 20)?,
            signal_type: p.parsed("signalType")?,
        }),

        "ICHIMOKU_CLOUD" => Ok(Condition::IchimokuCloud {
            tenkan_period: p.period_or("tenkanPeriod", 9)?,
            kijun_period: p.period_or("kijunPeriod", 26)?,
            chikou_period: p.period_or("chikouPeriod", 52)?,
            signal_type: p.parsed("signalType")?,
        }),

        "PIVOT_POINTS" => Ok(Condition::PivotPoints {
            pivot_type: p.parsed_or("pivotType", PivotType::Standard)?,
            pivot_level: p.parsed("pivotLevel")?,
            cross_above: p.bool("crossAbove")?,
            use_close: p.bool("useClose")?,
        }),

        "PRICE_THRESHOLD" => Ok(Condition::PriceThreshold {
            threshold: p.f64("threshold")?,
            above: p.bool("above")?,
        }),

        _ => Err(VistraderError::UnknownConditionType {
            condition_type: config.condition_type.clone(),
        }),
    }
}

/// Type-coercing parameter access scoped to one condition config, so every
/// error carries the owning condition type.
struct Params<'a> {
    condition_type: &'a str,
    parameters: &'a Map<String, Value>,
}

impl Params<'_> {
    fn missing(&self, parameter: &str) -> VistraderError {
        VistraderError::MissingParameter {
            condition_type: self.condition_type.to_string(),
            parameter: parameter.to_string(),
        }
    }

    fn invalid(&self, parameter: &str, reason: impl Into<String>) -> VistraderError {
        VistraderError::InvalidParameter {
            condition_type: self.condition_type.to_string(),
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }

    fn f64(&self, name: &str) -> Result<f64, VistraderError> {
        let value = self.parameters.get(name).ok_or_else(|| self.missing(name))?;
        self.coerce_f64(name, value)
    }

    fn f64_or(&self, name: &str, default: f64) -> Result<f64, VistraderError> {
        match self.parameters.get(name) {
            Some(value) => self.coerce_f64(name, value),
            None => Ok(default),
        }
    }

    fn coerce_f64(&self, name: &str, value: &Value) -> Result<f64, VistraderError> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| self.invalid(name, "not a finite number")),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| self.invalid(name, format!("cannot parse '{s}' as a number"))),
            other => Err(self.invalid(name, format!("expected a number, got {other}"))),
        }
    }

    /// A window/period parameter: a positive integer.
    fn period(&self, name: &str) -> Result<usize, VistraderError> {
        let value = self.f64(name)?;
        self.coerce_period(name, value)
    }

    fn period_or(&self, name: &str, default: usize) -> Result<usize, VistraderError> {
        match self.parameters.get(name) {
            Some(value) => {
                let value = self.coerce_f64(name, value)?;
                self.coerce_period(name, value)
            }
            None => Ok(default),
        }
    }

    fn coerce_period(&self, name: &str, value: f64) -> Result<usize, VistraderError> {
        if value < 1.0 || value.fract() != 0.0 || value > usize::MAX as f64 {
            return Err(self.invalid(name, format!("expected a positive integer, got {value}")));
        }
        Ok(value as usize)
    }

    fn bool(&self, name: &str) -> Result<bool, VistraderError> {
        let value = self.parameters.get(name).ok_or_else(|| self.missing(name))?;
        match value {
            Value::Bool(b) => Ok(*b),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(self.invalid(name, format!("cannot parse '{s}' as a boolean"))),
            },
            other => Err(self.invalid(name, format!("expected a boolean, got {other}"))),
        }
    }

    fn bool_or(&self, name: &str, default: bool) -> Result<bool, VistraderError> {
        if self.parameters.contains_key(name) {
            self.bool(name)
        } else {
            Ok(default)
        }
    }

    fn str(&self, name: &str) -> Result<&str, VistraderError> {
        let value = self.parameters.get(name).ok_or_else(|| self.missing(name))?;
        value
            .as_str()
            .ok_or_else(|| self.invalid(name, "expected a string"))
    }

    fn parsed<T>(&self, name: &str) -> Result<T, VistraderError>
    where
        T: FromStr<Err = String>,
    {
        let raw = self.str(name)?;
        raw.parse::<T>().map_err(|e| self.invalid(name, e))
    }

    fn parsed_or<T>(&self, name: &str, default: T) -> Result<T, VistraderError>
    where
        T: FromStr<Err = String>,
    {
        if self.parameters.contains_key(name) {
            self.parsed(name)
        } else {
            Ok(default)
        }
    }

    fn nested_conditions(&self, name: &str) -> Result<Vec<Condition>, VistraderError> {
        let value = self.parameters.get(name).ok_or_else(|| self.missing(name))?;
        let array = value
            .as_array()
            .ok_or_else(|| self.invalid(name, "expected an array of condition configs"))?;
        array
            .iter()
            .map(|v| self.nested_from_value(name, v))
            .collect()
    }

    fn nested_condition(&self, name: &str) -> Result<Condition, VistraderError> {
        let value = self.parameters.get(name).ok_or_else(|| self.missing(name))?;
        self.nested_from_value(name, value)
    }

    fn nested_from_value(&self, name: &str, value: &Value) -> Result<Condition, VistraderError> {
        let config: ConditionConfig = serde_json::from_value(value.clone())
            .map_err(|e| self.invalid(name, format!("malformed condition config: {e}")))?;
        build_condition(&config)
    }
}
