//! Condition evaluation.
//!
//! Evaluation is total: insufficient history, indicator computation errors
//! and NaN values all degrade to `false`, never to an error. Two modes
//! share one signal implementation per primitive — [`evaluate`] recomputes
//! the indicator arrays for a single index, [`evaluate_series`] computes
//! them once and stamps booleans across the whole series — so the modes
//! cannot disagree.

use crate::domain::condition::{
    Condition, DmiSignalType, IchimokuSignalType, ObvSignalType, PivotLevel, RocDirection,
};
use crate::domain::error::VistraderError;
use crate::domain::indicator::{
    atr, bollinger_bands, dmi, ichimoku_cloud, macd, obv, pivot_points, roc, rsi, sma, stochastic,
};
use crate::domain::market::MarketData;

/// Evaluate one condition at one bar index.
pub fn evaluate(condition: &Condition, data: &MarketData, index: usize) -> bool {
    if index >= data.len() {
        return false;
    }
    match condition {
        Condition::And(children) => children.iter().all(|c| evaluate(c, data, index)),
        Condition::Or(children) => children.iter().any(|c| evaluate(c, data, index)),
        Condition::Not(child) => !evaluate(child, data, index),
        primitive => match primitive_signal(primitive, data) {
            Ok(signal) => signal(index),
            Err(_) => false,
        },
    }
}

/// Evaluate one condition at every bar index.
pub fn evaluate_series(condition: &Condition, data: &MarketData) -> Vec<bool> {
    let n = data.len();
    match condition {
        Condition::And(children) => {
            let mut out = vec![true; n];
            for child in children {
                for (slot, v) in out.iter_mut().zip(evaluate_series(child, data)) {
                    *slot = *slot && v;
                }
            }
            out
        }
        Condition::Or(children) => {
            let mut out = vec![false; n];
            for child in children {
                for (slot, v) in out.iter_mut().zip(evaluate_series(child, data)) {
                    *slot = *slot || v;
                }
            }
            out
        }
        Condition::Not(child) => evaluate_series(child, data).iter().map(|v| !v).collect(),
        primitive => match primitive_signal(primitive, data) {
            Ok(signal) => (0..n).map(|i| signal(i)).collect(),
            Err(_) => vec![false; n],
        },
    }
}

type SignalFn<'a> = Box<dyn Fn(usize) -> bool + 'a>;

fn crosses(prev_a: f64, prev_b: f64, cur_a: f64, cur_b: f64, above: bool) -> bool {
    if above {
        prev_a <= prev_b && cur_a > cur_b
    } else {
        prev_a >= prev_b && cur_a < cur_b
    }
}

/// Precompute the indicator arrays a primitive needs and return a closure
/// evaluating its signal at an index. Composite variants never reach here.
fn primitive_signal<'a>(
    condition: &Condition,
    data: &'a MarketData,
) -> Result<SignalFn<'a>, VistraderError> {
    match condition {
        Condition::SmaCrossover {
            fast_period,
            slow_period,
            cross_above,
        } => {
            let fast = sma(data.close(), *fast_period)?;
            let slow = sma(data.close(), *slow_period)?;
            let cross_above = *cross_above;
            Ok(Box::new(move |i| {
                i >= 1
                    && !fast[i].is_nan()
                    && !slow[i].is_nan()
                    && !fast[i - 1].is_nan()
                    && !slow[i - 1].is_nan()
                    && crosses(fast[i - 1], slow[i - 1], fast[i], slow[i], cross_above)
            }))
        }

        Condition::RsiThreshold {
            period,
            upper_threshold,
            lower_threshold,
            check_overbought,
        } => {
            let values = rsi(data.close(), *period)?;
            let (upper, lower, overbought) =
                (*upper_threshold, *lower_threshold, *check_overbought);
            Ok(Box::new(move |i| {
                if values[i].is_nan() {
                    return false;
                }
                if overbought {
                    values[i] > upper
                } else {
                    values[i] < lower
                }
            }))
        }

        Condition::MacdCrossover {
            fast_period,
            slow_period,
            signal_period,
            cross_above,
        } => {
            let out = macd(data.close(), *fast_period, *slow_period, *signal_period)?;
            let cross_above = *cross_above;
            Ok(Box::new(move |i| {
                let (line, signal) = (&out.macd_line, &out.signal_line);
                i >= 1
                    && !line[i].is_nan()
                    && !signal[i].is_nan()
                    && !line[i - 1].is_nan()
                    && !signal[i - 1].is_nan()
                    && crosses(line[i - 1], signal[i - 1], line[i], signal[i], cross_above)
            }))
        }

        Condition::BollingerBands {
            period,
            num_std,
            check_upper,
        } => {
            let bands = bollinger_bands(data.close(), *period, *num_std)?;
            let check_upper = *check_upper;
            Ok(Box::new(move |i| {
                if bands.upper[i].is_nan() || bands.lower[i].is_nan() {
                    return false;
                }
                let price = data.close()[i];
                if check_upper {
                    price > bands.upper[i]
                } else {
                    price < bands.lower[i]
                }
            }))
        }

        Condition::Atr {
            period,
            multiplier,
            is_above,
            compare_with_price,
        } => {
            let values = atr(data.high(), data.low(), data.close(), *period)?;
            let (period, multiplier, is_above, with_price) =
                (*period, *multiplier, *is_above, *compare_with_price);
            Ok(Box::new(move |i| {
                if i < period || values[i].is_nan() {
                    return false;
                }
                if with_price {
                    let price_move = (data.close()[i] - data.close()[i - 1]).abs();
                    let threshold = values[i] * multiplier;
                    if is_above {
                        price_move > threshold
                    } else {
                        price_move < threshold
                    }
                } else if is_above {
                    values[i] > multiplier
                } else {
                    values[i] < multiplier
                }
            }))
        }

        Condition::Stochastic {
            k_period,
            d_period,
            upper_threshold,
            lower_threshold,
            check_overbought,
        } => {
            let out = stochastic(data.high(), data.low(), data.close(), *k_period, *d_period)?;
            let (upper, lower, overbought) =
                (*upper_threshold, *lower_threshold, *check_overbought);
            Ok(Box::new(move |i| {
                let (k, d) = (out.percent_k[i], out.percent_d[i]);
                if k.is_nan() || d.is_nan() {
                    return false;
                }
                if overbought {
                    k > upper && d > upper
                } else {
                    k < lower && d < lower
                }
            }))
        }

        Condition::Dmi {
            period,
            signal_type,
            threshold,
            divergence_threshold,
        } => {
            let out = dmi(data.high(), data.low(), data.close(), *period)?;
            let (period, signal_type, threshold, divergence) =
                (*period, *signal_type, *threshold, *divergence_threshold);
            Ok(Box::new(move |i| {
                // ADX needs 2*period-1 bars
                if i < 2 * period - 1 {
                    return false;
                }
                let (pdi, mdi, adx) = (&out.plus_di, &out.minus_di, &out.adx);
                if pdi[i].is_nan() || mdi[i].is_nan() || adx[i].is_nan() {
                    return false;
                }
                match signal_type {
                    DmiSignalType::PlusDiAboveMinusDi => pdi[i] > mdi[i],
                    DmiSignalType::MinusDiAbovePlusDi => mdi[i] > pdi[i],
                    DmiSignalType::PlusDiCrossesAboveMinusDi => {
                        crosses(pdi[i - 1], mdi[i - 1], pdi[i], mdi[i], true)
                    }
                    DmiSignalType::MinusDiCrossesAbovePlusDi => {
                        crosses(mdi[i - 1], pdi[i - 1], mdi[i], pdi[i], true)
                    }
                    DmiSignalType::AdxAboveThreshold => adx[i] > threshold,
                    DmiSignalType::AdxBelowThreshold => adx[i] < threshold,
                    DmiSignalType::AdxRising => adx[i] > adx[i - 1],
                    DmiSignalType::AdxFalling => adx[i] < adx[i - 1],
                    DmiSignalType::StrongTrend => {
                        adx[i] > threshold && (pdi[i] - mdi[i]).abs() > divergence
                    }
                    DmiSignalType::WeakTrend => {
                        adx[i] < threshold && (pdi[i] - mdi[i]).abs() < divergence
                    }
                    DmiSignalType::StrongBullish => {
                        adx[i] > threshold
                            && pdi[i] > mdi[i]
                            && (pdi[i] - mdi[i]) > divergence
                    }
                    DmiSignalType::StrongBearish => {
                        adx[i] > threshold
                            && mdi[i] > pdi[i]
                            && (mdi[i] - pdi[i]) > divergence
                    }
                    DmiSignalType::DiDivergence => {
                        i > period
                            && (pdi[i] - mdi[i]).abs() > (pdi[i - period] - mdi[i - period]).abs()
                    }
                }
            }))
        }

        Condition::Roc {
            period,
            threshold,
            direction,
        } => {
            let values = roc(data.close(), *period)?;
            let (period, threshold, direction) = (*period, *threshold, *direction);
            Ok(Box::new(move |i| {
                if i < period || values[i].is_nan() {
                    return false;
                }
                match direction {
                    RocDirection::Above => values[i] > threshold,
                    RocDirection::Below => values[i] < threshold,
                    RocDirection::Equal => (values[i] - threshold).abs() < 1e-4,
                    RocDirection::CrossingAbove => {
                        !values[i - 1].is_nan()
                            && values[i - 1] <= threshold
                            && values[i] > threshold
                    }
                    RocDirection::CrossingBelow => {
                        !values[i - 1].is_nan()
                            && values[i - 1] >= threshold
                            && values[i] < threshold
                    }
                }
            }))
        }

        Condition::RocDivergence {
            period,
            divergence_period,
            bullish,
        } => {
            let values = roc(data.close(), *period)?;
            let extrema = local_extrema(data.close(), *bullish);
            let (period, divergence_period, bullish) = (*period, *divergence_period, *bullish);
            Ok(Box::new(move |i| {
                if i < period + divergence_period {
                    return false;
                }
                // two most recent extrema inside the divergence window
                let start = i - divergence_period;
                let (mut newer, mut older) = (None, None);
                for &idx in extrema.iter().rev() {
                    if idx > i {
                        continue;
                    }
                    if idx < start {
                        break;
                    }
                    if newer.is_none() {
                        newer = Some(idx);
                    } else {
                        older = Some(idx);
                        break;
                    }
                }
                let (Some(newer), Some(older)) = (newer, older) else {
                    return false;
                };
                if values[newer].is_nan() || values[older].is_nan() {
                    return false;
                }
                let close = data.close();
                if bullish {
                    close[newer] < close[older] && values[newer] > values[older]
                } else {
                    close[newer] > close[older] && values[newer] < values[older]
                }
            }))
        }

        Condition::FibonacciRetracement {
            lookback_period,
            level,
            is_bullish,
            tolerance,
        } => {
            let (lookback, level, is_bullish, tolerance) =
                (*lookback_period, *level, *is_bullish, *tolerance);
            Ok(Box::new(move |i| {
                fibonacci_bounce_at(data, i, lookback, level, is_bullish, tolerance)
            }))
        }

        Condition::Obv {
            period,
            signal_type,
        } => {
            let values = obv(data.close(), data.volume())?;
            let ma = if signal_type.uses_moving_average() {
                Some(sma(&values, *period)?)
            } else {
                None
            };
            let signal_type = *signal_type;
            Ok(Box::new(move |i| {
                if i < 1 {
                    return false;
                }
                match (&ma, signal_type) {
                    (Some(ma), ObvSignalType::AboveMa) => {
                        !ma[i].is_nan() && values[i] > ma[i]
                    }
                    (Some(ma), ObvSignalType::BelowMa) => {
                        !ma[i].is_nan() && values[i] < ma[i]
                    }
                    (Some(ma), ObvSignalType::CrossAboveMa) => {
                        !ma[i].is_nan()
                            && values[i] > ma[i]
                            && values[i - 1] <= ma[i - 1]
                    }
                    (Some(ma), ObvSignalType::CrossBelowMa) => {
                        !ma[i].is_nan()
                            && values[i] < ma[i]
                            && values[i - 1] >= ma[i - 1]
                    }
                    (None, ObvSignalType::Increasing) => values[i] > values[i - 1],
                    (None, ObvSignalType::Decreasing) => values[i] < values[i - 1],
                    _ => false,
                }
            }))
        }

        Condition::IchimokuCloud {
            tenkan_period,
            kijun_period,
            chikou_period,
            signal_type,
        } => {
            let out = ichimoku_cloud(
                data.high(),
                data.low(),
                data.close(),
                *tenkan_period,
                *kijun_period,
                *chikou_period,
            )?;
            let min_index = (*tenkan_period).max(*kijun_period).max(*chikou_period);
            let (kijun_period, signal_type) = (*kijun_period, *signal_type);
            Ok(Box::new(move |i| {
                if i < min_index {
                    return false;
                }
                if out.tenkan_sen[i].is_nan()
                    || out.kijun_sen[i].is_nan()
                    || out.senkou_span_a[i].is_nan()
                    || out.senkou_span_b[i].is_nan()
                {
                    return false;
                }
                ichimoku_signal_at(&out, data.close(), kijun_period, signal_type, i)
            }))
        }

        Condition::PivotPoints {
            pivot_type,
            pivot_level,
            cross_above,
            use_close,
        } => {
            let out = pivot_points(
                data.high(),
                data.low(),
                data.close(),
                data.open(),
                *pivot_type,
            )?;
            let levels = match pivot_level {
                PivotLevel::Pp => out.pivot,
                PivotLevel::R1 => out.r1,
                PivotLevel::R2 => out.r2,
                PivotLevel::R3 => out.r3,
                PivotLevel::S1 => out.s1,
                PivotLevel::S2 => out.s2,
                PivotLevel::S3 => out.s3,
            };
            let (cross_above, use_close) = (*cross_above, *use_close);
            Ok(Box::new(move |i| {
                if i < 1 || levels[i].is_nan() || levels[i - 1].is_nan() {
                    return false;
                }
                let (prev_price, cur_price) = if use_close {
                    (data.close()[i - 1], data.close()[i])
                } else if cross_above {
                    (data.low()[i - 1], data.high()[i])
                } else {
                    (data.high()[i - 1], data.low()[i])
                };
                // strict on both sides: touching the level is not a cross
                if cross_above {
                    prev_price < levels[i - 1] && cur_price > levels[i]
                } else {
                    prev_price > levels[i - 1] && cur_price < levels[i]
                }
            }))
        }

        Condition::PriceThreshold { threshold, above } => {
            let (threshold, above) = (*threshold, *above);
            Ok(Box::new(move |i| {
                let price = data.close()[i];
                if above {
                    price > threshold
                } else {
                    price < threshold
                }
            }))
        }

        Condition::And(_) | Condition::Or(_) | Condition::Not(_) => {
            unreachable!("composites are handled by the callers")
        }
    }
}

/// Indices of the local minima (`lows` true) or maxima of a series, both
/// neighbors strictly beyond the point. Endpoints are never extrema.
fn local_extrema(prices: &[f64], lows: bool) -> Vec<usize> {
    let mut out = Vec::new();
    for i in 1..prices.len().saturating_sub(1) {
        let is_extremum = if lows {
            prices[i] < prices[i - 1] && prices[i] < prices[i + 1]
        } else {
            prices[i] > prices[i - 1] && prices[i] > prices[i + 1]
        };
        if is_extremum {
            out.push(i);
        }
    }
    out
}

fn ichimoku_signal_at(
    out: &crate::domain::indicator::IchimokuOutput,
    close: &[f64],
    kijun_period: usize,
    signal_type: IchimokuSignalType,
    i: usize,
) -> bool {
    let price = close[i];
    let span_a = out.senkou_span_a[i];
    let span_b = out.senkou_span_b[i];
    match signal_type {
        IchimokuSignalType::TenkanCrossesAboveKijun => {
            i > 0
                && crosses(
                    out.tenkan_sen[i - 1],
                    out.kijun_sen[i - 1],
                    out.tenkan_sen[i],
                    out.kijun_sen[i],
                    true,
                )
        }
        IchimokuSignalType::TenkanCrossesBelowKijun => {
            i > 0
                && crosses(
                    out.tenkan_sen[i - 1],
                    out.kijun_sen[i - 1],
                    out.tenkan_sen[i],
                    out.kijun_sen[i],
                    false,
                )
        }
        IchimokuSignalType::PriceAboveCloud => price > span_a.max(span_b),
        IchimokuSignalType::PriceBelowCloud => price < span_a.min(span_b),
        IchimokuSignalType::PriceInCloud => {
            price >= span_a.min(span_b) && price <= span_a.max(span_b)
        }
        IchimokuSignalType::BullishCloud => span_a > span_b,
        IchimokuSignalType::BearishCloud => span_a < span_b,
        IchimokuSignalType::ChikouAbovePrice => {
            i >= kijun_period && {
                let chikou_index = i - kijun_period;
                !out.chikou_span[chikou_index].is_nan()
                    && out.chikou_span[chikou_index] > close[chikou_index]
            }
        }
        IchimokuSignalType::ChikouBelowPrice => {
            i >= kijun_period && {
                let chikou_index = i - kijun_period;
                !out.chikou_span[chikou_index].is_nan()
                    && out.chikou_span[chikou_index] < close[chikou_index]
            }
        }
        IchimokuSignalType::StrongBullish => {
            ichimoku_signal_at(out, close, kijun_period, IchimokuSignalType::PriceAboveCloud, i)
                && ichimoku_signal_at(out, close, kijun_period, IchimokuSignalType::BullishCloud, i)
                && ichimoku_signal_at(
                    out,
                    close,
                    kijun_period,
                    IchimokuSignalType::TenkanCrossesAboveKijun,
                    i,
                )
        }
        IchimokuSignalType::StrongBearish => {
            ichimoku_signal_at(out, close, kijun_period, IchimokuSignalType::PriceBelowCloud, i)
                && ichimoku_signal_at(out, close, kijun_period, IchimokuSignalType::BearishCloud, i)
                && ichimoku_signal_at(
                    out,
                    close,
                    kijun_period,
                    IchimokuSignalType::TenkanCrossesBelowKijun,
                    i,
                )
        }
    }
}

/// Price bouncing off a retracement level of the most recent swing. The
/// swing is scanned over `[i - lookback, i)`; the swing's own direction
/// must match `is_bullish`, the close must sit within `tolerance` of the
/// level, and the bar must move in the trend direction.
fn fibonacci_bounce_at(
    data: &MarketData,
    i: usize,
    lookback: usize,
    level: f64,
    is_bullish: bool,
    tolerance: f64,
) -> bool {
    if i < lookback || i < 1 {
        return false;
    }

    let high = data.high();
    let low = data.low();
    let close = data.close();

    let mut swing_high = f64::MIN;
    let mut swing_low = f64::MAX;
    let mut swing_high_index = 0usize;
    let mut swing_low_index = 0usize;
    for j in i - lookback..i {
        if high[j] > swing_high {
            swing_high = high[j];
            swing_high_index = j;
        }
        if low[j] < swing_low {
            swing_low = low[j];
            swing_low_index = j;
        }
    }

    let recent_trend_is_bullish = swing_high_index > swing_low_index;
    if is_bullish != recent_trend_is_bullish {
        return false;
    }

    let retracement = if is_bullish {
        swing_high - (swing_high - swing_low) * level
    } else {
        swing_low + (swing_high - swing_low) * level
    };
    let lower_bound = retracement * (1.0 - tolerance);
    let upper_bound = retracement * (1.0 + tolerance);
    let price = close[i];

    if !(lower_bound..=upper_bound).contains(&price) {
        return false;
    }

    if is_bullish {
        close[i] > close[i - 1]
    } else {
        close[i] < close[i - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::test_support::{data_from_closes, data_from_ohlcv};

    fn assert_modes_agree(condition: &Condition, data: &MarketData) {
        let series = evaluate_series(condition, data);
        for i in 0..data.len() {
            assert_eq!(
                series[i],
                evaluate(condition, data, i),
                "per-index and batch evaluation disagree at {i}"
            );
        }
    }

    fn oscillating_closes(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + ((i % 9) as f64 - 4.0) * 1.5 + i as f64 * 0.1)
            .collect()
    }

    #[test]
    fn price_threshold_signals() {
        let data = data_from_closes(&[10.0, 11.5, 10.2]);
        let above = Condition::PriceThreshold {
            threshold: 11.0,
            above: true,
        };
        assert!(!evaluate(&above, &data, 0));
        assert!(evaluate(&above, &data, 1));
        assert!(!evaluate(&above, &data, 2));
        assert!(!evaluate(&above, &data, 99));
    }

    #[test]
    fn sma_crossover_fires_on_the_crossing_bar() {
        // Fast average overtakes the slow one when prices turn up.
        let mut closes = vec![20.0, 19.0, 18.0, 17.0, 16.0, 15.0];
        closes.extend([16.0, 18.0, 20.0, 22.0, 24.0, 26.0]);
        let data = data_from_closes(&closes);
        let cond = Condition::SmaCrossover {
            fast_period: 2,
            slow_period: 4,
            cross_above: true,
        };
        let series = evaluate_series(&cond, &data);
        assert_eq!(series.iter().filter(|v| **v).count(), 1);
        assert_modes_agree(&cond, &data);
    }

    #[test]
    fn rsi_threshold_degrades_to_false_on_short_series() {
        let data = data_from_closes(&[10.0, 11.0]);
        let cond = Condition::RsiThreshold {
            period: 14,
            upper_threshold: 70.0,
            lower_threshold: 30.0,
            check_overbought: true,
        };
        assert!(!evaluate(&cond, &data, 1));
        assert_eq!(evaluate_series(&cond, &data), vec![false, false]);
    }

    #[test]
    fn empty_and_is_true_empty_or_is_false() {
        let data = data_from_closes(&[10.0, 11.0, 12.0]);
        assert_eq!(
            evaluate_series(&Condition::And(vec![]), &data),
            vec![true; 3]
        );
        assert_eq!(
            evaluate_series(&Condition::Or(vec![]), &data),
            vec![false; 3]
        );
        assert!(evaluate(&Condition::And(vec![]), &data, 0));
        assert!(!evaluate(&Condition::Or(vec![]), &data, 0));
    }

    #[test]
    fn double_negation_is_identity() {
        let data = data_from_closes(&oscillating_closes(30));
        let inner = Condition::PriceThreshold {
            threshold: 100.0,
            above: true,
        };
        let doubled = Condition::Not(Box::new(Condition::Not(Box::new(inner.clone()))));
        assert_eq!(
            evaluate_series(&inner, &data),
            evaluate_series(&doubled, &data)
        );
    }

    #[test]
    fn composites_combine_children() {
        let data = data_from_closes(&[10.0, 12.0, 14.0]);
        let above_11 = Condition::PriceThreshold {
            threshold: 11.0,
            above: true,
        };
        let below_13 = Condition::PriceThreshold {
            threshold: 13.0,
            above: false,
        };
        let both = Condition::And(vec![above_11.clone(), below_13.clone()]);
        let either = Condition::Or(vec![above_11, below_13]);

        assert_eq!(evaluate_series(&both, &data), vec![false, true, false]);
        assert_eq!(evaluate_series(&either, &data), vec![true, true, true]);
    }

    #[test]
    fn modes_agree_for_every_primitive() {
        let closes = oscillating_closes(80);
        let data = data_from_closes(&closes);

        let conditions = vec![
            Condition::SmaCrossover {
                fast_period: 3,
                slow_period: 8,
                cross_above: true,
            },
            Condition::RsiThreshold {
                period: 14,
                upper_threshold: 60.0,
                lower_threshold: 40.0,
                check_overbought: false,
            },
            Condition::MacdCrossover {
                fast_period: 5,
                slow_period: 10,
                signal_period: 3,
                cross_above: false,
            },
            Condition::BollingerBands {
                period: 10,
                num_std: 1.5,
                check_upper: true,
            },
            Condition::Atr {
                period: 5,
                multiplier: 0.8,
                is_above: true,
                compare_with_price: true,
            },
            Condition::Stochastic {
                k_period: 5,
                d_period: 3,
                upper_threshold: 80.0,
                lower_threshold: 20.0,
                check_overbought: false,
            },
            Condition::Dmi {
                period: 5,
                signal_type: DmiSignalType::AdxRising,
                threshold: 25.0,
                divergence_threshold: 10.0,
            },
            Condition::Roc {
                period: 4,
                threshold: 1.0,
                direction: RocDirection::CrossingAbove,
            },
            Condition::RocDivergence {
                period: 3,
                divergence_period: 10,
                bullish: true,
            },
            Condition::FibonacciRetracement {
                lookback_period: 10,
                level: 0.5,
                is_bullish: true,
                tolerance: 0.05,
            },
            Condition::Obv {
                period: 5,
                signal_type: ObvSignalType::CrossAboveMa,
            },
            Condition::IchimokuCloud {
                tenkan_period: 3,
                kijun_period: 6,
                chikou_period: 12,
                signal_type: IchimokuSignalType::PriceAboveCloud,
            },
            Condition::PivotPoints {
                pivot_type: crate::domain::indicator::PivotType::Standard,
                pivot_level: PivotLevel::R1,
                cross_above: true,
                use_close: true,
            },
            Condition::PriceThreshold {
                threshold: 101.0,
                above: true,
            },
        ];

        for condition in &conditions {
            assert_modes_agree(condition, &data);
        }

        let nested = Condition::And(vec![
            Condition::Or(conditions.clone()),
            Condition::Not(Box::new(conditions[0].clone())),
        ]);
        assert_modes_agree(&nested, &data);
    }

    #[test]
    fn roc_divergence_fires_on_lower_low_with_higher_roc_low() {
        // Steep drop into the first trough, shallow drift into a slightly
        // lower second trough: price makes a lower low while 2-bar ROC
        // makes a much higher low.
        let closes = [100.0, 95.0, 90.0, 93.0, 92.0, 91.0, 89.5, 92.0, 93.0];
        let data = data_from_closes(&closes);
        let cond = Condition::RocDivergence {
            period: 2,
            divergence_period: 6,
            bullish: true,
        };

        assert!(!evaluate(&cond, &data, 7), "still inside the warm-up");
        assert!(evaluate(&cond, &data, 8));
        assert_modes_agree(&cond, &data);
    }

    #[test]
    fn roc_divergence_bearish_mirrors_with_highs() {
        // Sharp rally to the first peak, grinding rise to a higher second
        // peak on fading momentum.
        let closes = [100.0, 105.0, 110.0, 107.0, 108.0, 109.0, 110.5, 108.0, 107.0];
        let data = data_from_closes(&closes);
        let bearish = Condition::RocDivergence {
            period: 2,
            divergence_period: 6,
            bullish: false,
        };
        let bullish = Condition::RocDivergence {
            period: 2,
            divergence_period: 6,
            bullish: true,
        };

        assert!(evaluate(&bearish, &data, 8));
        assert!(!evaluate(&bullish, &data, 8), "only one trough in the window");
        assert_modes_agree(&bearish, &data);
    }

    #[test]
    fn roc_divergence_needs_two_extrema() {
        // Monotonic series has no interior troughs at all.
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let data = data_from_closes(&closes);
        let cond = Condition::RocDivergence {
            period: 2,
            divergence_period: 10,
            bullish: true,
        };
        assert_eq!(evaluate_series(&cond, &data), vec![false; 20]);
    }

    #[test]
    fn obv_increasing_tracks_volume_direction() {
        let data = data_from_ohlcv(
            &[11.0, 12.0, 13.0, 12.5],
            &[9.0, 10.0, 11.0, 10.5],
            &[10.0, 11.0, 12.0, 11.0],
            &[1000, 2000, 1500, 800],
        );
        let cond = Condition::Obv {
            period: 2,
            signal_type: ObvSignalType::Increasing,
        };
        let series = evaluate_series(&cond, &data);
        assert_eq!(series, vec![false, true, true, false]);
        assert_modes_agree(&cond, &data);
    }

    #[test]
    fn dmi_strong_bullish_in_steady_uptrend() {
        let n = 30;
        let high: Vec<f64> = (0..n).map(|i| 10.0 + i as f64).collect();
        let low: Vec<f64> = (0..n).map(|i| 8.0 + i as f64).collect();
        let close: Vec<f64> = (0..n).map(|i| 9.0 + i as f64).collect();
        let volume = vec![1000i64; n];
        let data = data_from_ohlcv(&high, &low, &close, &volume);

        let cond = Condition::Dmi {
            period: 5,
            signal_type: DmiSignalType::StrongBullish,
            threshold: 25.0,
            divergence_threshold: 10.0,
        };
        assert!(evaluate(&cond, &data, n - 1));
        assert!(!evaluate(&cond, &data, 3));
        assert_modes_agree(&cond, &data);
    }
}
