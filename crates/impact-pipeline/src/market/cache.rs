//! Time-bounded cache in front of a price provider

use super::{PriceBar, PriceSeriesProvider};
use crate::error::PriceError;
use crate::model::EquityCode;
use async_trait::async_trait;
use cached::{Cached, TimedCache};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Default lifetime of a cached series
pub const DEFAULT_PRICE_TTL: Duration = Duration::from_secs(300);

type CacheKey = (EquityCode, usize);

/// Wraps a [`PriceSeriesProvider`] and remembers successful lookups
///
/// Clones share one cache, so concurrent runs reuse each other's bars.
/// Failures are never cached.
pub struct CachedPriceProvider {
    inner: Arc<dyn PriceSeriesProvider>,
    cache: Arc<RwLock<TimedCache<CacheKey, Vec<PriceBar>>>>,
}

impl CachedPriceProvider {
    /// Cache with [`DEFAULT_PRICE_TTL`]
    pub fn new(inner: Arc<dyn PriceSeriesProvider>) -> Self {
        Self::with_ttl(inner, DEFAULT_PRICE_TTL)
    }

    /// Cache with a custom lifetime
    pub fn with_ttl(inner: Arc<dyn PriceSeriesProvider>, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Number of cached series
    pub async fn len(&self) -> usize {
        self.cache.read().await.cache_size()
    }

    /// Whether nothing is cached
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every cached series
    pub async fn clear(&self) {
        self.cache.write().await.cache_clear();
    }
}

impl Clone for CachedPriceProvider {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            cache: Arc::clone(&self.cache),
        }
    }
}

#[async_trait]
impl PriceSeriesProvider for CachedPriceProvider {
    async fn daily_bars(
        &self,
        identifier: &EquityCode,
        lookback_days: usize,
    ) -> Result<Vec<PriceBar>, PriceError> {
        let key = (identifier.clone(), lookback_days);

        // TimedCache::cache_get refreshes expiry bookkeeping, so it needs &mut
        if let Some(bars) = self.cache.write().await.cache_get(&key).cloned() {
            debug!(%identifier, lookback_days, "price cache hit");
            return Ok(bars);
        }

        debug!(%identifier, lookback_days, "price cache miss");
        let bars = self.inner.daily_bars(identifier, lookback_days).await?;
        let _ = self.cache.write().await.cache_set(key, bars.clone());
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MockPriceSeriesProvider;
    use chrono::NaiveDate;

    fn bars(n: usize) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| PriceBar {
                date: start + chrono::Days::new(i as u64),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0,
                volume: 1_000,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let mut mock = MockPriceSeriesProvider::new();
        mock.expect_daily_bars()
            .times(1)
            .returning(|_, n| Ok(bars(n)));

        let provider = CachedPriceProvider::new(Arc::new(mock));
        let code = EquityCode::parse("005930").unwrap();

        let first = provider.daily_bars(&code, 40).await.unwrap();
        let second = provider.clone().daily_bars(&code, 40).await.unwrap();

        assert_eq!(first.len(), 40);
        assert_eq!(first, second);
        assert_eq!(provider.len().await, 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let mut mock = MockPriceSeriesProvider::new();
        mock.expect_daily_bars()
            .times(2)
            .returning(|_, _| Err(PriceError::Transport("timeout".to_string())));

        let provider = CachedPriceProvider::new(Arc::new(mock));
        let code = EquityCode::parse("000660").unwrap();

        assert!(provider.daily_bars(&code, 100).await.is_err());
        assert!(provider.daily_bars(&code, 100).await.is_err());
        assert!(provider.is_empty().await);
    }

    #[tokio::test]
    async fn test_clear() {
        let mut mock = MockPriceSeriesProvider::new();
        mock.expect_daily_bars().returning(|_, n| Ok(bars(n)));

        let provider = CachedPriceProvider::new(Arc::new(mock));
        let code = EquityCode::parse("035720").unwrap();
        provider.daily_bars(&code, 30).await.unwrap();
        provider.clear().await;
        assert!(provider.is_empty().await);
    }
}
