//! Report persistence to a local directory

use async_trait::async_trait;
use impact_pipeline::{PersistError, ReportAssembler, ReportDraft};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

#[derive(Serialize)]
struct StoredReport<'a> {
    id: &'a str,
    #[serde(flatten)]
    draft: &'a ReportDraft,
}

/// Writes each report to `<dir>/<report-id>.json`
///
/// The file is written under a temporary name and renamed into place, so a
/// failed write never leaves a partial report behind.
#[derive(Debug, Clone)]
pub struct JsonFileReportStore {
    dir: PathBuf,
}

impl JsonFileReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, report_id: &str) -> PathBuf {
        self.dir.join(format!("{report_id}.json"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn storage(context: &str, path: &Path, e: &std::io::Error) -> PersistError {
    PersistError::Storage(format!("{context} {}: {e}", path.display()))
}

/// Write `body` to `partial` and move it onto `target`, removing `partial` on any failure
async fn write_then_rename(partial: &Path, target: &Path, body: Vec<u8>) -> Result<(), PersistError> {
    if let Err(e) = tokio::fs::write(partial, body).await {
        let _ = tokio::fs::remove_file(partial).await;
        return Err(storage("cannot write", partial, &e));
    }
    if let Err(e) = tokio::fs::rename(partial, target).await {
        let _ = tokio::fs::remove_file(partial).await;
        return Err(storage("cannot move report to", target, &e));
    }
    Ok(())
}

#[async_trait]
impl ReportAssembler for JsonFileReportStore {
    async fn persist(&self, draft: &ReportDraft) -> Result<String, PersistError> {
        let report_id = Uuid::new_v4().to_string();
        let body = serde_json::to_vec_pretty(&StoredReport {
            id: &report_id,
            draft,
        })?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| storage("cannot create", &self.dir, &e))?;

        let target = self.path_for(&report_id);
        let partial = self.dir.join(format!(".{report_id}.json.partial"));
        write_then_rename(&partial, &target, body).await?;

        info!(%report_id, path = %target.display(), "report written");
        Ok(report_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use impact_pipeline::{IssueCategory, RunMetrics, SentimentLabel};

    fn draft() -> ReportDraft {
        let run_id = Uuid::new_v4();
        ReportDraft {
            run_id,
            analysis_date: NaiveDate::from_ymd_opt(2024, 10, 11).unwrap(),
            title: "2024-10-11 news impact analysis".to_string(),
            digest: "Rates were cut.".to_string(),
            sentiment_score: 0.6,
            sentiment_label: SentimentLabel::Positive,
            keywords: vec!["rate cut".to_string()],
            issue_category: IssueCategory::InterestRate,
            sources: vec!["Base rate cut".to_string()],
            groups: vec![],
            primary_validated: true,
            secondary_validated: true,
            warnings: vec![],
            metrics: RunMetrics::new(run_id),
        }
    }

    async fn entry_count(dir: &Path) -> usize {
        let mut entries = tokio::fs::read_dir(dir).await.unwrap();
        let mut count = 0;
        while entries.next_entry().await.unwrap().is_some() {
            count += 1;
        }
        count
    }

    #[tokio::test]
    async fn test_persist_writes_one_file() {
        let scratch = tempfile::tempdir().unwrap();
        let dir = scratch.path().join("reports");
        let store = JsonFileReportStore::new(&dir);

        let report_id = store.persist(&draft()).await.unwrap();

        let written = tokio::fs::read_to_string(store.path_for(&report_id)).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["id"], report_id.as_str());
        assert_eq!(value["title"], "2024-10-11 news impact analysis");
        assert_eq!(value["issue_category"], serde_json::to_value(IssueCategory::InterestRate).unwrap());

        assert_eq!(entry_count(&dir).await, 1);
    }

    #[tokio::test]
    async fn test_unwritable_dir_is_storage_error() {
        let file = tempfile::NamedTempFile::new().unwrap();

        let err = JsonFileReportStore::new(file.path())
            .persist(&draft())
            .await
            .unwrap_err();
        assert!(matches!(err, PersistError::Storage(_)));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_partial() {
        let dir = tempfile::tempdir().unwrap();
        let partial = dir.path().join("missing").join(".r.json.partial");
        let target = dir.path().join("r.json");

        let err = write_then_rename(&partial, &target, b"{}".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, PersistError::Storage(ref m) if m.starts_with("cannot write")));
        assert_eq!(entry_count(dir.path()).await, 0);
    }

    #[tokio::test]
    async fn test_failed_rename_leaves_no_partial() {
        let dir = tempfile::tempdir().unwrap();
        let partial = dir.path().join(".r.json.partial");
        let target = dir.path().join("r.json");
        tokio::fs::create_dir(&target).await.unwrap();
        tokio::fs::write(target.join("occupied"), b"x").await.unwrap();

        let err = write_then_rename(&partial, &target, b"{}".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, PersistError::Storage(ref m) if m.starts_with("cannot move")));
        assert!(!partial.exists());
        assert_eq!(entry_count(dir.path()).await, 1);
    }
}
