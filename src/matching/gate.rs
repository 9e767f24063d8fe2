// Tue Jan 16 2026 - Alex

use crate::config::GateConfig;
use crate::matching::candidate::StructCandidate;
use crate::matching::similarity::SimilarityEngine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the best candidate was not accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Rejection {
    NoCandidates,
    LowScore { score: f64, required: f64 },
    FieldCountRatio { ratio: f64, required: f64 },
    MatchRatio { ratio: f64, required: f64 },
    LenientCheckFailed { score: f64, ratio: f64 },
    SizeDifference { difference: usize, allowed: usize },
    AmbiguousRunnerUp { gap: f64 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NoCandidates => write!(f, "no host candidates"),
            Rejection::LowScore { score, required } => {
                write!(f, "score {:.3} below threshold {}", score, required)
            }
            Rejection::FieldCountRatio { ratio, required } => {
                write!(f, "field count ratio {:.2} < {}", ratio, required)
            }
            Rejection::MatchRatio { ratio, required } => {
                write!(f, "good match ratio {:.2} < {}", ratio, required)
            }
            Rejection::LenientCheckFailed { score, ratio } => {
                write!(f, "similar names but score {:.3} / match ratio {:.2} too low", score, ratio)
            }
            Rejection::SizeDifference { difference, allowed } => {
                write!(f, "size difference {} > {} bytes", difference, allowed)
            }
            Rejection::AmbiguousRunnerUp { gap } => {
                write!(f, "insufficient score gap {:.3} to runner-up", gap)
            }
        }
    }
}

/// Accept/reject decision for the top-ranked candidate.
pub struct QualityGate<'a> {
    config: &'a GateConfig,
    similarity: &'a SimilarityEngine,
}

impl<'a> QualityGate<'a> {
    pub fn new(config: &'a GateConfig, similarity: &'a SimilarityEngine) -> Self {
        Self { config, similarity }
    }

    /// `ranked` must be sorted best first.
    pub fn check(&self, shader_name: &str, ranked: &[StructCandidate]) -> Result<(), Rejection> {
        let best = ranked.first().ok_or(Rejection::NoCandidates)?;
        let report = &best.report;
        let score = best.score;
        let cfg = self.config;

        if score < cfg.min_score {
            return Err(Rejection::LowScore {
                score,
                required: cfg.min_score,
            });
        }

        let max_fields = report.max_fields();
        let min_fields = report.min_fields();

        let field_ratio = if max_fields > 0 {
            min_fields as f64 / max_fields as f64
        } else {
            0.0
        };
        let required = if max_fields <= cfg.small_fields {
            cfg.small_field_ratio
        } else {
            cfg.field_ratio
        };
        if field_ratio < required {
            return Err(Rejection::FieldCountRatio {
                ratio: field_ratio,
                required,
            });
        }

        let match_ratio = if min_fields > 0 {
            report.good_matches() as f64 / min_fields as f64
        } else {
            0.0
        };

        let name_sim = self.similarity.name_similarity(shader_name, &best.host_name);
        if name_sim > cfg.lenient_name_similarity {
            if score > cfg.lenient_score && match_ratio > cfg.lenient_match_ratio {
                return Ok(());
            }
            return Err(Rejection::LenientCheckFailed {
                score,
                ratio: match_ratio,
            });
        }

        let required = if min_fields <= cfg.small_fields {
            cfg.small_match_ratio
        } else {
            cfg.match_ratio
        };
        if match_ratio < required {
            return Err(Rejection::MatchRatio {
                ratio: match_ratio,
                required,
            });
        }

        let allowed = if max_fields > cfg.large_fields {
            cfg.large_size_cap
        } else {
            cfg.size_cap
        };
        if report.size_difference > allowed {
            return Err(Rejection::SizeDifference {
                difference: report.size_difference,
                allowed,
            });
        }

        if let Some(runner_up) = ranked.get(1) {
            let gap = score - runner_up.score;
            if gap < cfg.runner_up_gap && score < cfg.runner_up_score {
                return Err(Rejection::AmbiguousRunnerUp { gap });
            }
        }

        Ok(())
    }
}
