use serde::Serialize;
use std::collections::BTreeSet;

/// A critic's verdict on one proposal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CritiqueResult {
    /// Whether the proposal passed every check
    pub accepted: bool,
    /// Correction instructions for the next attempt
    pub feedback: String,
    /// Critic's confidence in its own verdict, in [0, 1]
    pub confidence: f64,
    /// Individual problems found
    pub issues: BTreeSet<String>,
}
