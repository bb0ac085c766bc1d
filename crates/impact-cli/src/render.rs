//! Terminal tables for a finished run

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use impact_pipeline::{CandidateEquity, PipelineState, TechnicalStatus};

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

pub fn summary_table(state: &PipelineState) -> Table {
    let mut t = table(&["Field", "Value"]);
    if let Some(summary) = state.summary() {
        t.add_row(vec!["Issue".to_string(), summary.issue_category().to_string()]);
        t.add_row(vec![
            "Sentiment".to_string(),
            format!("{:+.2} ({})", summary.sentiment_score(), summary.sentiment_label()),
        ]);
        t.add_row(vec!["Keywords".to_string(), summary.keywords().join(", ")]);
        t.add_row(vec!["Digest".to_string(), summary.digest().to_string()]);
    }
    let metrics = state.metrics();
    t.add_row(vec![
        "Attempts".to_string(),
        format!(
            "primary {} ({}), secondary {} ({})",
            state.primary_retry_count(),
            verdict(state.is_primary_valid()),
            state.secondary_retry_count(),
            verdict(state.is_secondary_valid())
        ),
    ]);
    t.add_row(vec!["Reasoning calls".to_string(), metrics.reasoning_calls.to_string()]);
    if let Some(elapsed) = metrics.elapsed() {
        t.add_row(vec![
            "Elapsed".to_string(),
            format!("{:.1}s", elapsed.num_milliseconds() as f64 / 1000.0),
        ]);
    }
    t
}

fn verdict(valid: bool) -> &'static str {
    if valid { "accepted" } else { "forced" }
}

fn status_label(status: TechnicalStatus) -> &'static str {
    match status {
        TechnicalStatus::Healthy => "healthy",
        TechnicalStatus::Caution => "caution",
        TechnicalStatus::Overheated => "overheated",
        TechnicalStatus::DataUnavailable => "no data",
        TechnicalStatus::ComputeError => "error",
        TechnicalStatus::Unknown => "unscreened",
    }
}

fn equity_row(equity: &CandidateEquity) -> Vec<Cell> {
    vec![
        Cell::new(equity.identifier.as_str()),
        Cell::new(&equity.display_name),
        Cell::new(format!("{:.0}", equity.confidence)),
        Cell::new(equity.expected_trend),
        Cell::new(status_label(equity.technical_status())),
        Cell::new(equity.technical_note().unwrap_or("")),
    ]
}

pub fn primary_table(state: &PipelineState) -> Table {
    let mut t = table(&["Code", "Name", "Confidence", "Trend", "Technical", "Note"]);
    for equity in state.primary() {
        t.add_row(equity_row(equity));
    }
    for equity in state.technically_rejected() {
        t.add_row(equity_row(equity));
    }
    t
}

pub fn ripple_table(state: &PipelineState) -> Table {
    let mut t = table(&["Sector", "Impact", "Direction", "Chain", "Related"]);
    for effect in state.ripple_effects() {
        let related: Vec<String> = effect
            .related_equities
            .iter()
            .map(|e| format!("{} ({})", e.display_name, e.identifier))
            .collect();
        t.add_row(vec![
            Cell::new(&effect.sector),
            Cell::new(effect.impact_level),
            Cell::new(effect.trend_direction),
            Cell::new(&effect.causal_chain),
            Cell::new(related.join(", ")),
        ]);
    }
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_render_for_empty_state() {
        let state = PipelineState::new(vec![]);
        let summary = summary_table(&state).to_string();
        assert!(summary.contains("Attempts"));
        assert!(summary.contains("primary 0 (forced)"));
        assert!(primary_table(&state).to_string().contains("Technical"));
        assert!(ripple_table(&state).to_string().contains("Sector"));
    }

    #[test]
    fn test_status_labels_are_short() {
        assert_eq!(status_label(TechnicalStatus::DataUnavailable), "no data");
        assert_eq!(status_label(TechnicalStatus::Overheated), "overheated");
    }
}
