// Tue Jan 16 2026 - Alex

use crate::config::StatusConfig;
use crate::matching::aligner::AlignedPair;
use crate::matching::candidate::StructCandidate;
use crate::matching::gate::Rejection;
use crate::matching::scoring::AlignmentReport;
use crate::structure::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Matched {
        host_name: String,
        host_location: SourceLocation,
        score: f64,
        pairs: Vec<AlignedPair>,
        report: AlignmentReport,
    },
    Unmatched {
        reason: Rejection,
        /// Report of the best rejected candidate, if there was one.
        report: Option<AlignmentReport>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Matched,
    Mismatched(String),
    Unmatched,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Matched => write!(f, "Matched"),
            MatchStatus::Mismatched(host) => write!(f, "Mismatched ({})", host),
            MatchStatus::Unmatched => write!(f, "Unmatched"),
        }
    }
}

/// Outcome for one shader struct in one matching pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructMatch {
    pub shader_name: String,
    pub shader_location: SourceLocation,
    pub outcome: MatchOutcome,
    /// Every evaluated candidate, best first.
    pub candidates: Vec<StructCandidate>,
}

impl StructMatch {
    pub fn accepted(shader_name: &str, shader_location: &SourceLocation, ranked: Vec<StructCandidate>) -> Option<Self> {
        let best = ranked.first()?.clone();
        Some(Self {
            shader_name: shader_name.to_string(),
            shader_location: shader_location.clone(),
            outcome: MatchOutcome::Matched {
                host_name: best.host_name,
                host_location: best.host_location,
                score: best.score,
                pairs: best.pairs,
                report: best.report,
            },
            candidates: ranked,
        })
    }

    pub fn rejected(
        shader_name: &str,
        shader_location: &SourceLocation,
        reason: Rejection,
        ranked: Vec<StructCandidate>,
    ) -> Self {
        Self {
            shader_name: shader_name.to_string(),
            shader_location: shader_location.clone(),
            outcome: MatchOutcome::Unmatched {
                reason,
                report: ranked.first().map(|c| c.report.clone()),
            },
            candidates: ranked,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self.outcome, MatchOutcome::Matched { .. })
    }

    pub fn host_name(&self) -> Option<&str> {
        match &self.outcome {
            MatchOutcome::Matched { host_name, .. } => Some(host_name),
            MatchOutcome::Unmatched { .. } => None,
        }
    }

    pub fn score(&self) -> f64 {
        match &self.outcome {
            MatchOutcome::Matched { score, .. } => *score,
            MatchOutcome::Unmatched { .. } => 0.0,
        }
    }

    pub fn report(&self) -> Option<&AlignmentReport> {
        match &self.outcome {
            MatchOutcome::Matched { report, .. } => Some(report),
            MatchOutcome::Unmatched { report, .. } => report.as_ref(),
        }
    }

    /// Matched when no field differs, Mismatched when a few do, Unmatched when
    /// more than half differ or the score is weak.
    pub fn status(&self, config: &StatusConfig) -> MatchStatus {
        let MatchOutcome::Matched {
            host_name,
            score,
            report,
            ..
        } = &self.outcome
        else {
            return MatchStatus::Unmatched;
        };

        let diff_ratio = report.field_diff_count as f64 / report.min_fields().max(1) as f64;
        if diff_ratio > config.max_diff_ratio || *score < config.matched_score {
            MatchStatus::Unmatched
        } else if report.field_diff_count == 0 {
            MatchStatus::Matched
        } else {
            MatchStatus::Mismatched(host_name.clone())
        }
    }

    pub fn analysis_key(&self) -> String {
        analysis_key(&self.shader_location.file, &self.shader_name)
    }
}

/// Case-insensitive `file:name` key linking usages to struct analyses.
pub fn analysis_key(file: &str, name: &str) -> String {
    format!("{}:{}", file.to_lowercase(), name.to_lowercase())
}
