//! Momentum and trend indicators over daily closes
//!
//! RSI uses simple averages of the last `period` gains and losses. Bands use
//! the sample standard deviation (n - 1) of the moving-average window.

use crate::market::PriceBar;
use serde::Serialize;
use ta::Next;
use ta::indicators::SimpleMovingAverage;
use thiserror::Error;

/// RSI lookback
pub const RSI_PERIOD: usize = 14;

/// Moving-average and band window
pub const MA_PERIOD: usize = 20;

/// Band half-width in standard deviations
pub const BAND_WIDTH: f64 = 2.0;

/// Why indicators could not be computed
#[derive(Debug, Clone, Error, PartialEq)]
pub enum IndicatorError {
    #[error("need at least {needed} closes, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("close at position {index} is not a positive finite price: {value}")]
    InvalidPrice { index: usize, value: f64 },

    #[error("bars are not in ascending date order at position {index}")]
    OutOfOrder { index: usize },

    #[error("indicator error: {0}")]
    Indicator(String),
}

/// Indicator values for the latest bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub rsi: f64,
    pub ma20: f64,
    pub stdev20: f64,
    /// Latest close as a percentage of MA20
    pub disparity: f64,
    pub upper_band: f64,
    pub lower_band: f64,
}

/// Relative strength index of the last `period` price changes
///
/// A window without losses yields 100 when it has gains and 50 when flat.
pub fn rsi(closes: &[f64], period: usize) -> Result<f64, IndicatorError> {
    if period == 0 || closes.len() < period + 1 {
        return Err(IndicatorError::InsufficientData {
            needed: period + 1,
            got: closes.len(),
        });
    }

    let window = &closes[closes.len() - period - 1..];
    let (gains, losses) = window
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold((0.0, 0.0), |(g, l), delta| {
            if delta > 0.0 {
                (g + delta, l)
            } else {
                (g, l - delta)
            }
        });

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return Ok(if avg_gain > 0.0 { 100.0 } else { 50.0 });
    }

    let rs = avg_gain / avg_loss;
    Ok(100.0 - 100.0 / (1.0 + rs))
}

/// Simple moving average of the last `period` closes
pub fn moving_average(closes: &[f64], period: usize) -> Result<f64, IndicatorError> {
    if period == 0 || closes.len() < period {
        return Err(IndicatorError::InsufficientData {
            needed: period.max(1),
            got: closes.len(),
        });
    }

    let mut sma =
        SimpleMovingAverage::new(period).map_err(|e| IndicatorError::Indicator(e.to_string()))?;

    let mut value = 0.0;
    for &close in &closes[closes.len() - period..] {
        value = sma.next(close);
    }
    Ok(value)
}

/// Sample standard deviation around a known mean
pub fn sample_stdev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Compute every indicator for the latest bar
///
/// Bars must be in ascending date order with positive finite closes.
pub fn snapshot(bars: &[PriceBar]) -> Result<IndicatorSnapshot, IndicatorError> {
    for (index, bar) in bars.iter().enumerate() {
        if !bar.close.is_finite() || bar.close <= 0.0 {
            return Err(IndicatorError::InvalidPrice {
                index,
                value: bar.close,
            });
        }
        if index > 0 && bars[index - 1].date >= bar.date {
            return Err(IndicatorError::OutOfOrder { index });
        }
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let needed = MA_PERIOD.max(RSI_PERIOD + 1);
    let Some(&close) = closes.last().filter(|_| closes.len() >= needed) else {
        return Err(IndicatorError::InsufficientData {
            needed,
            got: closes.len(),
        });
    };

    let rsi = rsi(&closes, RSI_PERIOD)?;
    let ma20 = moving_average(&closes, MA_PERIOD)?;
    let stdev20 = sample_stdev(&closes[closes.len() - MA_PERIOD..], ma20);

    Ok(IndicatorSnapshot {
        close,
        rsi,
        ma20,
        stdev20,
        disparity: close / ma20 * 100.0,
        upper_band: ma20 + BAND_WIDTH * stdev20,
        lower_band: ma20 - BAND_WIDTH * stdev20,
    })
}
