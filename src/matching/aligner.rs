// Tue Jan 16 2026 - Alex

use crate::matching::similarity::SimilarityEngine;
use crate::structure::Field;
use serde::{Deserialize, Serialize};

/// One row of an alignment: a paired field, or a field present on one side only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedPair {
    pub shader: Option<Field>,
    pub host: Option<Field>,
}

impl AlignedPair {
    pub fn is_matched(&self) -> bool {
        self.shader.is_some() && self.host.is_some()
    }
}

/// Greedy left-to-right field pairing. Each shader field takes the unused host
/// field with the highest name similarity at or above the threshold; the
/// earliest host field wins ties. There is no backtracking.
pub struct FieldAligner<'a> {
    engine: &'a SimilarityEngine,
}

impl<'a> FieldAligner<'a> {
    pub fn new(engine: &'a SimilarityEngine) -> Self {
        Self { engine }
    }

    /// `(shader_index, host_index)` pairs in discovery order.
    pub fn pair(&self, shader: &[Field], host: &[Field]) -> Vec<(usize, usize)> {
        let threshold = self.engine.config().name_threshold;
        let mut used = vec![false; host.len()];
        let mut pairs = Vec::new();

        for (i, left) in shader.iter().enumerate() {
            let mut best: Option<(usize, f64)> = None;
            for (j, right) in host.iter().enumerate() {
                if used[j] {
                    continue;
                }
                let sim = self.engine.name_similarity(left.name(), right.name());
                if sim >= threshold && best.map_or(true, |(_, b)| sim > b) {
                    best = Some((j, sim));
                }
            }

            if let Some((j, _)) = best {
                used[j] = true;
                pairs.push((i, j));
            }
        }

        pairs
    }

    /// Pairs plus the interleaved row list covering every field on both sides.
    pub fn align(&self, shader: &[Field], host: &[Field]) -> (Vec<(usize, usize)>, Vec<AlignedPair>) {
        let pairs = self.pair(shader, host);
        let rows = interleave(shader, host, &pairs);
        (pairs, rows)
    }
}

/// Emits matched pairs in discovery order. Before each pair, unmatched fields
/// that precede it on either side are flushed; leftovers go at the end.
pub fn interleave(shader: &[Field], host: &[Field], pairs: &[(usize, usize)]) -> Vec<AlignedPair> {
    let mut shader_matched = vec![false; shader.len()];
    let mut host_matched = vec![false; host.len()];
    for &(i, j) in pairs {
        shader_matched[i] = true;
        host_matched[j] = true;
    }

    let mut rows = Vec::with_capacity(shader.len() + host.len());
    let (mut i, mut j) = (0usize, 0usize);

    for &(pi, pj) in pairs {
        while i < pi {
            if !shader_matched[i] {
                rows.push(AlignedPair {
                    shader: Some(shader[i].clone()),
                    host: None,
                });
            }
            i += 1;
        }
        while j < pj {
            if !host_matched[j] {
                rows.push(AlignedPair {
                    shader: None,
                    host: Some(host[j].clone()),
                });
            }
            j += 1;
        }

        rows.push(AlignedPair {
            shader: Some(shader[pi].clone()),
            host: Some(host[pj].clone()),
        });
        i = i.max(pi + 1);
        j = j.max(pj + 1);
    }

    for (k, field) in shader.iter().enumerate().skip(i) {
        if !shader_matched[k] {
            rows.push(AlignedPair {
                shader: Some(field.clone()),
                host: None,
            });
        }
    }
    for (k, field) in host.iter().enumerate().skip(j) {
        if !host_matched[k] {
            rows.push(AlignedPair {
                shader: None,
                host: Some(field.clone()),
            });
        }
    }

    rows
}
