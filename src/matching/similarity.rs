// Tue Jan 16 2026 - Alex

use crate::config::SimilarityConfig;
use crate::structure::field::strip_array_suffix;
use crate::structure::Field;
use crate::utils::string::StringUtils;
use serde::{Deserialize, Serialize};

const VECTOR_AS_ARRAY: &[(&str, &str)] = &[
    ("float2", "float[2]"),
    ("float3", "float[3]"),
    ("float4", "float[4]"),
    ("int2", "int[2]"),
    ("int3", "int[3]"),
    ("int4", "int[4]"),
    ("uint2", "uint[2]"),
    ("uint3", "uint[3]"),
    ("uint4", "uint[4]"),
];

/// Name, type and size agreement of one shader/host field pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldSimilarity {
    pub name: f64,
    pub type_sim: f64,
    pub size_match: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SimilarityEngine {
    config: SimilarityConfig,
}

impl SimilarityEngine {
    pub fn new(config: &SimilarityConfig) -> Self {
        Self { config: config.clone() }
    }

    pub fn config(&self) -> &SimilarityConfig {
        &self.config
    }

    /// Case-insensitive name similarity in `[0, 1]`, symmetric in its arguments.
    pub fn name_similarity(&self, a: &str, b: &str) -> f64 {
        let a = a.to_lowercase();
        let b = b.to_lowercase();
        let (a, b) = if a <= b { (a, b) } else { (b, a) };

        let direct = StringUtils::sequence_ratio(&a, &b);
        let common = StringUtils::common_ratio(&a, &b);

        let a_base = strip_array_suffix(&a);
        let b_base = strip_array_suffix(&b);
        let base_direct = StringUtils::sequence_ratio(a_base, b_base);
        let base_common = StringUtils::common_ratio(a_base, b_base);

        let unpenalized = direct.max(common).max(base_direct).max(base_common);

        let (shorter, longer) = if a_base.chars().count() <= b_base.chars().count() {
            (a_base, b_base)
        } else {
            (b_base, a_base)
        };
        let shorter_len = shorter.chars().count();
        let longer_len = longer.chars().count();

        if longer_len > 0
            && longer.contains(shorter)
            && shorter_len as f64 / longer_len as f64 >= self.config.substring_coverage
        {
            return unpenalized.max(self.config.substring_score);
        }

        if shorter_len > 0 && (longer.starts_with(shorter) || longer.ends_with(shorter)) {
            return unpenalized.max(self.config.affix_score);
        }

        let penalty = self.config.stripped_penalty;
        direct
            .max(common)
            .max(base_direct - penalty)
            .max(base_common - penalty)
            .clamp(0.0, 1.0)
    }

    /// 1.0 when both types agree after vector/array normalization, otherwise
    /// Jaro-Winkler on the raw tokens with anything under the floor dropped to 0.
    pub fn type_similarity(&self, shader: &Field, host: &Field) -> f64 {
        if canonical_type(shader) == canonical_type(host) {
            return 1.0;
        }
        self.raw_type_similarity(shader.type_name(), host.type_name())
    }

    pub fn raw_type_similarity(&self, a: &str, b: &str) -> f64 {
        let sim = StringUtils::jaro_winkler(a, b);
        if sim < self.config.type_floor {
            0.0
        } else {
            sim
        }
    }

    pub fn field_similarity(&self, shader: &Field, host: &Field) -> FieldSimilarity {
        FieldSimilarity {
            name: self.name_similarity(shader.name(), host.name()),
            type_sim: self.type_similarity(shader, host),
            size_match: shader.size() == host.size(),
        }
    }
}

/// `REX::W32::XMFLOAT3` and `float3` both become `float[3]`; array extents
/// are appended after the element type.
pub fn canonical_type(field: &Field) -> String {
    let token = field.type_name();
    let base = token.rsplit("::").next().unwrap_or(token).trim().to_lowercase();
    let base = match base.strip_prefix("xm") {
        Some(rest) if rest.starts_with("float") || rest.starts_with("int") || rest.starts_with("uint") => {
            rest.to_string()
        }
        _ => base,
    };

    let element = VECTOR_AS_ARRAY
        .iter()
        .find(|(vector, _)| *vector == base)
        .map(|(_, array)| array.to_string())
        .unwrap_or(base);

    if field.array_size() > 1 {
        format!("{}[{}]", element, field.array_size())
    } else {
        element
    }
}

pub fn name_similarity(a: &str, b: &str) -> f64 {
    SimilarityEngine::default().name_similarity(a, b)
}
