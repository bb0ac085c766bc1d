//! Daily price series and the provider boundary

mod cache;

pub use cache::CachedPriceProvider;

use crate::error::PriceError;
use crate::model::EquityCode;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily OHLCV bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: u64,
}

/// Source of recent daily bars
///
/// Implementations return bars in ascending date order. Session handling and
/// credentials belong to the implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSeriesProvider: Send + Sync {
    /// Up to `lookback_days` most recent bars for `identifier`
    async fn daily_bars(
        &self,
        identifier: &EquityCode,
        lookback_days: usize,
    ) -> Result<Vec<PriceBar>, PriceError>;
}
