// Tue Jan 16 2026 - Alex

pub mod aligner;
pub mod candidate;
pub mod gate;
pub mod result;
pub mod scoring;
pub mod similarity;

pub use aligner::{AlignedPair, FieldAligner};
pub use candidate::{CandidateSelector, MatchPass, StructCandidate};
pub use gate::{QualityGate, Rejection};
pub use result::{analysis_key, MatchOutcome, MatchStatus, StructMatch};
pub use scoring::{AlignmentReport, ScoredAlignment, ScoringEngine};
pub use similarity::{FieldSimilarity, SimilarityEngine};

use crate::config::MatchConfig;
use crate::structure::StructRegistry;

/// Runs one matching pass over two fully populated registries.
pub fn match_structs(shader: &StructRegistry, host: &StructRegistry, config: &MatchConfig) -> MatchPass {
    CandidateSelector::new(shader, host, config).match_all()
}
