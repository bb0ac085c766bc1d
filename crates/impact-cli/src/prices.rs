//! Price series read from a directory of JSON files

use async_trait::async_trait;
use impact_pipeline::{EquityCode, PriceBar, PriceError, PriceSeriesProvider};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

/// Reads `<dir>/<identifier>.json`, each holding an array of daily bars
#[derive(Debug, Clone)]
pub struct FilePriceProvider {
    dir: PathBuf,
}

impl FilePriceProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl PriceSeriesProvider for FilePriceProvider {
    async fn daily_bars(
        &self,
        identifier: &EquityCode,
        lookback_days: usize,
    ) -> Result<Vec<PriceBar>, PriceError> {
        let path = self.dir.join(format!("{identifier}.json"));
        debug!(path = %path.display(), "reading price file");

        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => PriceError::Unavailable {
                identifier: identifier.to_string(),
                reason: format!("no file at {}", path.display()),
            },
            _ => PriceError::Transport(format!("{}: {e}", path.display())),
        })?;

        let mut bars: Vec<PriceBar> =
            serde_json::from_str(&raw).map_err(|e| PriceError::Malformed {
                identifier: identifier.to_string(),
                reason: e.to_string(),
            })?;

        bars.sort_by_key(|bar| bar.date);
        let skip = bars.len().saturating_sub(lookback_days);
        Ok(bars.split_off(skip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;
    use tempfile::tempdir;

    async fn write(dir: &Path, name: &str, body: &str) {
        tokio::fs::write(dir.join(name), body).await.unwrap();
    }

    fn code(raw: &str) -> EquityCode {
        EquityCode::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_reads_sorted_and_trimmed() {
        let dir = tempdir().unwrap();
        let bars = json!([
            {"date": "2024-10-03", "open": 3.0, "high": 3.0, "low": 3.0, "close": 3.0},
            {"date": "2024-10-01", "open": 1.0, "high": 1.0, "low": 1.0, "close": 1.0},
            {"date": "2024-10-02", "open": 2.0, "high": 2.0, "low": 2.0, "close": 2.0, "volume": 500}
        ]);
        write(dir.path(), "005930.json", &bars.to_string()).await;

        let provider = FilePriceProvider::new(dir.path());
        let series = provider.daily_bars(&code("005930"), 2).await.unwrap();

        let closes: Vec<f64> = series.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![2.0, 3.0]);
        assert_eq!(series[0].volume, 500);
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let dir = tempdir().unwrap();
        let err = FilePriceProvider::new(dir.path())
            .daily_bars(&code("000660"), 100)
            .await
            .unwrap_err();

        assert!(matches!(err, PriceError::Unavailable { ref identifier, .. } if identifier == "000660"));
    }

    #[tokio::test]
    async fn test_garbage_is_malformed() {
        let dir = tempdir().unwrap();
        write(dir.path(), "035420.json", "{\"close\": 1}").await;

        let err = FilePriceProvider::new(dir.path())
            .daily_bars(&code("035420"), 100)
            .await
            .unwrap_err();

        assert!(matches!(err, PriceError::Malformed { .. }));
    }
}
