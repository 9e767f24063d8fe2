// Tue Jan 16 2026 - Alex

use crate::config::{MatchConfig, ScoringConfig};
use crate::matching::aligner::{AlignedPair, FieldAligner};
use crate::matching::similarity::SimilarityEngine;
use crate::structure::{StructLayout, StructureError};
use serde::{Deserialize, Serialize};

/// Field-level diff statistics for one shader/host comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentReport {
    pub exact_matches: usize,
    pub high_sim_matches: usize,
    pub field_matches: usize,
    /// Non-padding shader fields.
    pub total_fields: usize,
    /// Non-padding host fields.
    pub host_total_fields: usize,
    pub unmatched_shader_fields: Vec<String>,
    pub unmatched_host_fields: Vec<String>,
    pub field_diff_count: usize,
    pub name_diff_count: usize,
    pub type_diff_count: usize,
    pub shader_size: usize,
    pub host_size: usize,
    pub size_difference: usize,
    /// Struct-name similarity, unweighted.
    pub name_similarity: f64,
    /// Struct-name similarity times the struct-name weight.
    pub name_score: f64,
    pub structural: f64,
    pub type_similarity: f64,
    pub size_similarity: f64,
    pub score: f64,
}

impl AlignmentReport {
    /// Report for a shader struct that had nothing to compare against.
    pub fn empty(shader: &StructLayout) -> Self {
        let total = shader.non_padding_field_count();
        Self {
            total_fields: total,
            unmatched_shader_fields: shader.fields().iter().map(|f| f.name().to_string()).collect(),
            field_diff_count: total,
            name_diff_count: total,
            type_diff_count: total,
            shader_size: shader.plain_size(),
            size_difference: shader.plain_size(),
            ..Default::default()
        }
    }

    pub fn good_matches(&self) -> usize {
        self.exact_matches + self.high_sim_matches
    }

    pub fn min_fields(&self) -> usize {
        self.total_fields.min(self.host_total_fields)
    }

    pub fn max_fields(&self) -> usize {
        self.total_fields.max(self.host_total_fields)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAlignment {
    pub score: f64,
    pub pairs: Vec<AlignedPair>,
    pub report: AlignmentReport,
}

/// Combines name, type and size signals into a struct-level score:
/// `structural * 0.6 + type * 0.2 + size * 0.2` with the default weights.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    similarity: SimilarityEngine,
    scoring: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            similarity: SimilarityEngine::new(&config.similarity),
            scoring: config.scoring.clone(),
        }
    }

    pub fn similarity(&self) -> &SimilarityEngine {
        &self.similarity
    }

    pub fn score(
        &self,
        shader: &StructLayout,
        host: &StructLayout,
        struct_name_weight: f64,
    ) -> Result<ScoredAlignment, StructureError> {
        shader.validate()?;
        host.validate()?;

        let shader_fields = shader.fields();
        let host_fields = host.fields();
        let (pairs, rows) = FieldAligner::new(&self.similarity).align(shader_fields, host_fields);

        let mut report = AlignmentReport {
            total_fields: shader.non_padding_field_count(),
            host_total_fields: host.non_padding_field_count(),
            field_matches: pairs.len(),
            ..Default::default()
        };

        for &(i, j) in &pairs {
            let sim = self.similarity.field_similarity(&shader_fields[i], &host_fields[j]);
            if sim.name >= self.scoring.exact_threshold && sim.type_sim >= self.scoring.exact_threshold {
                report.exact_matches += 1;
            } else if sim.name >= self.scoring.high_sim_threshold && sim.type_sim >= self.scoring.high_sim_threshold {
                report.high_sim_matches += 1;
            }
        }

        self.count_differences(&rows, &mut report);

        report.shader_size = shader.plain_size();
        report.host_size = host.plain_size();
        report.size_difference = report.shader_size.abs_diff(report.host_size);
        report.size_similarity = size_ratio(report.shader_size, report.host_size);

        report.name_similarity = self.similarity.name_similarity(shader.name(), host.name());
        report.name_score = report.name_similarity * struct_name_weight;

        let max_fields = shader_fields.len().max(host_fields.len());
        let field_match_frac = if max_fields > 0 {
            pairs.len() as f64 / max_fields as f64
        } else {
            0.0
        };
        report.structural = report.name_score
            + field_match_frac * (1.0 - struct_name_weight) * self.order_penalty(&pairs);

        report.type_similarity = (report.exact_matches as f64
            + report.high_sim_matches as f64 * self.scoring.high_sim_weight)
            / report.total_fields.max(1) as f64;

        report.score = report.structural * self.scoring.structural_weight
            + report.type_similarity * self.scoring.type_weight
            + report.size_similarity * self.scoring.size_weight;

        Ok(ScoredAlignment {
            score: report.score,
            pairs: rows,
            report,
        })
    }

    /// Multiplies in the penalty once for every pair that steps backwards on
    /// either side relative to the previous pair.
    fn order_penalty(&self, pairs: &[(usize, usize)]) -> f64 {
        pairs
            .windows(2)
            .filter(|w| w[1].0 < w[0].0 || w[1].1 < w[0].1)
            .fold(1.0, |acc, _| acc * self.scoring.order_penalty)
    }

    fn count_differences(&self, rows: &[AlignedPair], report: &mut AlignmentReport) {
        for row in rows {
            match (&row.shader, &row.host) {
                (Some(shader), Some(host)) => {
                    if self.similarity.name_similarity(shader.name(), host.name()) < 1.0 {
                        report.name_diff_count += 1;
                        report.field_diff_count += 1;
                    } else if self.similarity.raw_type_similarity(shader.type_name(), host.type_name()) == 0.0 {
                        report.type_diff_count += 1;
                        report.field_diff_count += 1;
                    }
                }
                (Some(only), None) => {
                    report.unmatched_shader_fields.push(only.name().to_string());
                    count_unmatched(report);
                }
                (None, Some(only)) => {
                    report.unmatched_host_fields.push(only.name().to_string());
                    count_unmatched(report);
                }
                (None, None) => {}
            }
        }
    }
}

fn count_unmatched(report: &mut AlignmentReport) {
    report.name_diff_count += 1;
    report.type_diff_count += 1;
    report.field_diff_count += 1;
}

fn size_ratio(a: usize, b: usize) -> f64 {
    if a == 0 || b == 0 {
        return 0.0;
    }
    a.min(b) as f64 / a.max(b) as f64
}
