// Tue Jan 16 2026 - Alex

use crate::config::MatchConfig;
use crate::diagnostics::Diagnostics;
use crate::matching::aligner::AlignedPair;
use crate::matching::gate::{QualityGate, Rejection};
use crate::matching::result::StructMatch;
use crate::matching::scoring::{AlignmentReport, ScoringEngine};
use crate::structure::{SizeModel, SourceLocation, StructLayout, StructRegistry};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One host struct (as declared or flattened) scored against a shader struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructCandidate {
    pub host_name: String,
    pub host_location: SourceLocation,
    pub flattened: bool,
    /// Score before boosts.
    pub raw_score: f64,
    pub score: f64,
    pub pairs: Vec<AlignedPair>,
    pub report: AlignmentReport,
}

impl StructCandidate {
    pub fn host_id(&self) -> String {
        format!("{}:{}", self.host_location.file, self.host_name)
    }
}

/// Everything one matching pass produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchPass {
    pub matches: Vec<StructMatch>,
    /// Composite buffer name -> member type names, in declaration order.
    pub composites: IndexMap<String, Vec<String>>,
    pub diagnostics: Diagnostics,
}

impl MatchPass {
    /// Composite that lists `shader_name` as itself or as one of its members.
    pub fn composite_of(&self, shader_name: &str) -> Option<&str> {
        self.composites
            .iter()
            .find(|(name, members)| *name == shader_name || members.iter().any(|m| m == shader_name))
            .map(|(name, _)| name.as_str())
    }
}

/// Matches every shader struct of a registry against every host struct.
pub struct CandidateSelector<'a> {
    shader: &'a StructRegistry,
    host: &'a StructRegistry,
    config: &'a MatchConfig,
    scoring: ScoringEngine,
}

impl<'a> CandidateSelector<'a> {
    pub fn new(shader: &'a StructRegistry, host: &'a StructRegistry, config: &'a MatchConfig) -> Self {
        log::info!(
            "Initialized with {} shader structs and {} host structs",
            shader.len(),
            host.len()
        );
        Self {
            shader,
            host,
            config,
            scoring: ScoringEngine::new(config),
        }
    }

    /// A container buffer with at least one member of a user-defined type.
    pub fn is_composite(&self, layout: &StructLayout) -> bool {
        layout.is_container_buffer() && layout.fields().iter().any(|f| self.shader.is_user_type(f.type_name()))
    }

    pub fn match_all(&self) -> MatchPass {
        let mut pass = MatchPass::default();
        let mut claimed = HashSet::new();
        let mut seen = HashSet::new();
        let members = self.composite_members();

        for layout in self.shader.iter() {
            let key = identity_key(layout);
            // members are scored inside their composite, after its earlier members
            if seen.contains(&key) || members.contains(&key) {
                continue;
            }

            if self.is_composite(layout) {
                self.resolve_composite(layout, &mut pass, &mut claimed, &mut seen);
                continue;
            }

            seen.insert(key);
            let Some(effective) = self.effective_layout(layout, &mut pass.diagnostics) else {
                continue;
            };
            let result = self.evaluate(&effective, true, None, &mut pass.diagnostics);
            pass.matches.push(result);
        }

        pass
    }

    /// Identity keys of every struct some composite buffer references.
    fn composite_members(&self) -> HashSet<String> {
        let mut members = HashSet::new();
        for layout in self.shader.iter().filter(|l| self.is_composite(l)) {
            let own = identity_key(layout);
            for field in layout.fields() {
                if SizeModel::is_base_type(field.type_name()) {
                    continue;
                }
                if let Some(member) = self.shader.resolve(field.type_name(), layout.file()) {
                    let key = identity_key(member);
                    if key != own {
                        members.insert(key);
                    }
                }
            }
        }
        members
    }

    /// Scores a shader struct against every host struct, then ranks and gates.
    /// Host structs in `claimed` are not offered.
    pub fn evaluate(
        &self,
        shader: &StructLayout,
        apply_boosts: bool,
        claimed: Option<&HashSet<String>>,
        diagnostics: &mut Diagnostics,
    ) -> StructMatch {
        let candidates = self.candidates(shader, claimed, diagnostics);
        let ranked = self.rank(shader.name(), candidates, apply_boosts);
        let gate = QualityGate::new(&self.config.gate, self.scoring.similarity());

        let rejection = match gate.check(shader.name(), &ranked) {
            Ok(()) => {
                if let Some(best) = ranked.first() {
                    diagnostics.info(format!(
                        "Best match for {}: {} (score={:.3}) from {}",
                        shader.name(),
                        best.host_name,
                        best.score,
                        best.host_location
                    ));
                }
                match StructMatch::accepted(shader.name(), shader.location(), ranked.clone()) {
                    Some(accepted) => return accepted,
                    None => Rejection::NoCandidates,
                }
            }
            Err(reason) => reason,
        };

        diagnostics.info(format!(
            "No suitable host struct for {} in {}: {}",
            shader.name(),
            shader.location(),
            rejection
        ));
        StructMatch::rejected(shader.name(), shader.location(), rejection, ranked)
    }

    /// Every host struct scored as declared and, when it differs, flattened.
    pub fn candidates(
        &self,
        shader: &StructLayout,
        claimed: Option<&HashSet<String>>,
        diagnostics: &mut Diagnostics,
    ) -> Vec<StructCandidate> {
        let weight = self.config.scoring.name_weight_for(shader.fields().len());
        let mut candidates = Vec::new();

        for host in self.host.iter() {
            if !host.has_fields() {
                continue;
            }
            if claimed.is_some_and(|c| c.contains(&host.unique_id())) {
                log::debug!("Skipping {} for {}: already claimed", host.unique_id(), shader.name());
                continue;
            }

            self.push_candidate(shader, host, false, weight, &mut candidates, diagnostics);

            let flattened = self.host.flatten_fields(host);
            if flattened != host.fields() {
                let mut variant = host.clone();
                variant.set_fields(flattened);
                self.push_candidate(shader, &variant, true, weight, &mut candidates, diagnostics);
            }
        }

        candidates
    }

    /// Orders by raw score, applies the exact-name and outlier boosts by that
    /// rank, then re-sorts by boosted score. Both sorts are stable.
    pub fn rank(&self, shader_name: &str, mut candidates: Vec<StructCandidate>, apply_boosts: bool) -> Vec<StructCandidate> {
        candidates.sort_by(|a, b| b.raw_score.total_cmp(&a.raw_score));
        if !apply_boosts {
            return candidates;
        }

        let boosts = &self.config.boosts;
        let runner_up = candidates.get(1).map(|c| c.raw_score);
        for (idx, candidate) in candidates.iter_mut().enumerate() {
            if candidate.host_name == shader_name {
                candidate.score *= boosts.exact_name;
            }
            let clear_lead = runner_up.map_or(true, |r| candidate.raw_score - r > boosts.outlier_margin);
            if idx == 0 && candidate.raw_score > boosts.outlier_similarity && clear_lead {
                candidate.score *= boosts.outlier;
            }
        }

        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates
    }

    fn push_candidate(
        &self,
        shader: &StructLayout,
        host: &StructLayout,
        flattened: bool,
        weight: f64,
        out: &mut Vec<StructCandidate>,
        diagnostics: &mut Diagnostics,
    ) {
        match self.scoring.score(shader, host, weight) {
            Ok(scored) => {
                log::debug!(
                    "Candidate {} ({}) from {}: score={:.3}, size={}",
                    host.name(),
                    if flattened { "flattened" } else { "declared" },
                    host.file(),
                    scored.score,
                    host.plain_size()
                );
                out.push(StructCandidate {
                    host_name: host.name().to_string(),
                    host_location: host.location().clone(),
                    flattened,
                    raw_score: scored.score,
                    score: scored.score,
                    pairs: scored.pairs,
                    report: scored.report,
                });
            }
            Err(e) => diagnostics.error(format!(
                "Skipping candidate {} for {}: {}",
                host.unique_id(),
                shader.name(),
                e
            )),
        }
    }

    /// Resolves template instances and expands nested shader structs.
    /// Returns `None` when nothing is left to match.
    fn effective_layout(&self, layout: &StructLayout, diagnostics: &mut Diagnostics) -> Option<StructLayout> {
        let mut effective = layout.clone();

        if let Some(template) = layout.template_type() {
            if let Some(definition) = self.shader.get(template).first() {
                effective.set_fields(definition.fields().to_vec());
            }
        }

        let flattened = self.shader.flatten_fields(&effective);
        effective.set_fields(flattened);

        if !effective.has_fields() {
            diagnostics.debug(format!("Skipping {}: no fields to match", layout));
            return None;
        }
        Some(effective)
    }

    /// Members are matched first without boosts, each claiming its host struct.
    /// The buffer is then flattened and matched itself, also without boosts.
    fn resolve_composite(
        &self,
        layout: &StructLayout,
        pass: &mut MatchPass,
        claimed: &mut HashSet<String>,
        seen: &mut HashSet<String>,
    ) {
        seen.insert(identity_key(layout));

        let members: Vec<String> = layout.fields().iter().map(|f| f.type_name().to_string()).collect();
        log::debug!("Processing composite buffer {} with members {:?}", layout.name(), members);
        pass.composites.insert(layout.name().to_string(), members);

        for field in layout.fields() {
            if SizeModel::is_base_type(field.type_name()) {
                log::debug!("Composite {}: built-in member {} needs no resolution", layout.name(), field.name());
                continue;
            }

            let Some(member) = self.shader.resolve(field.type_name(), layout.file()) else {
                pass.diagnostics.warn(format!(
                    "Field type {} in composite buffer {} at {} not found",
                    field.type_name(),
                    layout.name(),
                    layout.location()
                ));
                continue;
            };

            let key = identity_key(member);
            if seen.contains(&key) {
                let earlier = pass
                    .matches
                    .iter()
                    .find(|m| m.shader_name == member.name() && m.shader_location == *member.location());
                if let Some(id) = earlier.and_then(claimed_host) {
                    claimed.insert(id);
                }
                continue;
            }

            if self.is_composite(member) {
                self.resolve_composite(member, pass, claimed, seen);
                continue;
            }

            seen.insert(key);
            let Some(effective) = self.effective_layout(member, &mut pass.diagnostics) else {
                continue;
            };
            let result = self.evaluate(&effective, false, Some(&*claimed), &mut pass.diagnostics);
            if let Some(id) = claimed_host(&result) {
                claimed.insert(id);
            }
            pass.matches.push(result);
        }

        let Some(effective) = self.effective_layout(layout, &mut pass.diagnostics) else {
            return;
        };
        log::debug!(
            "Updated composite buffer {} size to {} bytes ({} fields)",
            layout.name(),
            effective.size(),
            effective.fields().len()
        );

        let result = self.evaluate(&effective, false, None, &mut pass.diagnostics);
        if let Some(id) = claimed_host(&result) {
            claimed.insert(id);
        }
        pass.matches.push(result);
    }
}

fn identity_key(layout: &StructLayout) -> String {
    let (name, file, line) = layout.identity();
    format!("{}:{}:{}", file, line, name)
}

fn claimed_host(result: &StructMatch) -> Option<String> {
    if !result.is_matched() {
        return None;
    }
    result.candidates.first().map(StructCandidate::host_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticLevel;
    use crate::matching::result::MatchOutcome;
    use crate::structure::{Dialect, StructBuilder};

    fn registry(dialect: Dialect, layouts: Vec<StructLayout>) -> StructRegistry {
        let mut registry = StructRegistry::new(dialect);
        registry.extend(layouts);
        registry
    }

    fn light_fields(builder: StructBuilder) -> StructBuilder {
        builder.field("color", "float3").field("radius", "float")
    }

    #[test]
    fn test_exact_name_boost() {
        let shader = registry(Dialect::Shader, vec![light_fields(StructBuilder::shader("Light")).build()]);
        let host = registry(
            Dialect::Host,
            vec![
                light_fields(StructBuilder::host("LightData")).build(),
                light_fields(StructBuilder::host("Light")).build(),
            ],
        );
        let config = MatchConfig::default();
        let selector = CandidateSelector::new(&shader, &host, &config);
        let pass = selector.match_all();

        assert_eq!(pass.matches.len(), 1);
        let result = &pass.matches[0];
        assert_eq!(result.host_name(), Some("Light"));

        let best = &result.candidates[0];
        assert!((best.score - best.raw_score * 1.05).abs() < 1e-9);
        let runner_up = &result.candidates[1];
        assert_eq!(runner_up.host_name, "LightData");
        assert_eq!(runner_up.score, runner_up.raw_score);
    }

    #[test]
    fn test_outlier_boost_for_single_candidate() {
        let shader = registry(Dialect::Shader, vec![light_fields(StructBuilder::shader("Vertex")).build()]);
        let host = registry(Dialect::Host, vec![light_fields(StructBuilder::host("VertexData")).build()]);
        let config = MatchConfig::default();
        let selector = CandidateSelector::new(&shader, &host, &config);

        let mut diagnostics = Diagnostics::new();
        let layout = &shader.get("Vertex")[0];
        let candidates = selector.candidates(layout, None, &mut diagnostics);
        assert!(candidates[0].raw_score > 0.85);

        let boosted = selector.rank("Vertex", candidates.clone(), true);
        assert!((boosted[0].score - candidates[0].raw_score * 1.05).abs() < 1e-9);

        let plain = selector.rank("Vertex", candidates, false);
        assert_eq!(plain[0].score, plain[0].raw_score);
    }

    #[test]
    fn test_flattened_variant_added() {
        let shader = registry(
            Dialect::Shader,
            vec![StructBuilder::shader("Sky")
                .field("sunColor", "float3")
                .field("sunIntensity", "float")
                .field("horizon", "float4")
                .build()],
        );
        let host = registry(
            Dialect::Host,
            vec![
                StructBuilder::host("Sun")
                    .at("sky.h", 1)
                    .field("sunColor", "float3")
                    .field("sunIntensity", "float")
                    .build(),
                StructBuilder::host("SkyData")
                    .at("sky.h", 10)
                    .field("sun", "Sun")
                    .field("horizon", "float4")
                    .build(),
            ],
        );
        let config = MatchConfig::default();
        let selector = CandidateSelector::new(&shader, &host, &config);
        let mut diagnostics = Diagnostics::new();
        let candidates = selector.candidates(&shader.get("Sky")[0], None, &mut diagnostics);

        assert_eq!(candidates.len(), 3);
        let flat = candidates.iter().find(|c| c.flattened).unwrap();
        assert_eq!(flat.host_name, "SkyData");
        assert_eq!(flat.report.field_matches, 3);

        let pass = selector.match_all();
        assert_eq!(pass.matches[0].host_name(), Some("SkyData"));
        assert!(pass.matches[0].candidates[0].flattened);
    }

    #[test]
    fn test_composite_yields_member_and_buffer_matches() {
        let shader = registry(
            Dialect::Shader,
            vec![
                light_fields(StructBuilder::shader("Light").at("lighting.hlsl", 1)).build(),
                StructBuilder::shader("PerLight")
                    .at("lighting.hlsl", 8)
                    .field("light", "Light")
                    .container()
                    .build(),
            ],
        );
        let host = registry(Dialect::Host, vec![light_fields(StructBuilder::host("Light")).build()]);
        let config = MatchConfig::default();
        let selector = CandidateSelector::new(&shader, &host, &config);

        assert!(selector.is_composite(&shader.get("PerLight")[0]));
        assert!(!selector.is_composite(&shader.get("Light")[0]));

        let pass = selector.match_all();
        assert_eq!(pass.matches.len(), 2);
        assert_eq!(pass.matches[0].shader_name, "Light");
        assert!(pass.matches[0].is_matched());
        // declared before its buffer, still scored as a member without boosts
        let member = &pass.matches[0].candidates[0];
        assert_eq!(member.host_name, "Light");
        assert_eq!(member.score, member.raw_score);

        let composite = &pass.matches[1];
        assert_eq!(composite.shader_name, "PerLight");
        let flattened = shader.flatten_fields(&shader.get("Light")[0]).len();
        assert_eq!(composite.report().unwrap().total_fields, flattened);
        assert_eq!(pass.composites["PerLight"], vec!["Light".to_string()]);
        assert_eq!(pass.composite_of("Light"), Some("PerLight"));
    }

    #[test]
    fn test_claimed_host_not_offered_to_later_members() {
        let sun = |name: &str, line: usize| {
            StructBuilder::shader(name)
                .at("frame.hlsl", line)
                .field("dir", "float3")
                .field("intensity", "float")
                .build()
        };
        let shader = registry(
            Dialect::Shader,
            vec![
                sun("SunA", 1),
                sun("SunB", 10),
                StructBuilder::shader("Frame")
                    .at("frame.hlsl", 20)
                    .field("a", "SunA")
                    .field("b", "SunB")
                    .container()
                    .build(),
            ],
        );
        let host = registry(
            Dialect::Host,
            vec![StructBuilder::host("Sun")
                .field("dir", "float3")
                .field("intensity", "float")
                .build()],
        );
        let config = MatchConfig::default();
        let pass = CandidateSelector::new(&shader, &host, &config).match_all();

        let names: Vec<&str> = pass.matches.iter().map(|m| m.shader_name.as_str()).collect();
        assert_eq!(names, vec!["SunA", "SunB", "Frame"]);
        assert_eq!(pass.matches[0].host_name(), Some("Sun"));
        let first = &pass.matches[0].candidates[0];
        assert_eq!(first.score, first.raw_score);
        assert!(pass.matches[1].candidates.iter().all(|c| c.host_name != "Sun"));
        assert!(matches!(
            pass.matches[1].outcome,
            MatchOutcome::Unmatched {
                reason: Rejection::NoCandidates,
                ..
            }
        ));
    }

    #[test]
    fn test_template_instance_takes_definition_fields() {
        let shader = registry(
            Dialect::Shader,
            vec![
                light_fields(StructBuilder::shader("Light").at("lights.hlsl", 1)).build(),
                StructLayout::placeholder("Lights", SourceLocation::new("lights.hlsl", 6), Some("Light")),
                StructLayout::placeholder("Volume", SourceLocation::new("lights.hlsl", 7), None),
            ],
        );
        let host = registry(Dialect::Host, vec![light_fields(StructBuilder::host("LightData")).build()]);
        let config = MatchConfig::default();
        let pass = CandidateSelector::new(&shader, &host, &config).match_all();

        assert_eq!(pass.matches.len(), 2);
        assert_eq!(pass.matches[1].shader_name, "Lights");
        assert_eq!(pass.matches[1].report().unwrap().total_fields, 2);
        assert!(pass.diagnostics.entries().iter().any(|d| d.message.contains("Volume")));
    }

    #[test]
    fn test_disjoint_struct_rejected() {
        let shader = registry(
            Dialect::Shader,
            vec![StructBuilder::shader("Particle")
                .field("velocity", "float3")
                .field("lifetime", "float")
                .build()],
        );
        let host = registry(
            Dialect::Host,
            vec![StructBuilder::host("Camera").field("zNear", "uint").field("flags", "uint").build()],
        );
        let config = MatchConfig::default();
        let pass = CandidateSelector::new(&shader, &host, &config).match_all();

        let result = &pass.matches[0];
        assert!(!result.is_matched());
        assert_eq!(result.score(), 0.0);
        assert!(matches!(
            result.outcome,
            MatchOutcome::Unmatched {
                reason: Rejection::LowScore { .. },
                ..
            }
        ));
        assert_eq!(result.candidates.len(), 1);
    }

    #[test]
    fn test_invalid_candidate_recorded_and_skipped() {
        let shader = registry(Dialect::Shader, vec![StructBuilder::shader("Data").field("a", "float").build()]);
        let host = registry(Dialect::Host, vec![StructBuilder::host("  ").field("a", "float").build()]);
        let config = MatchConfig::default();
        let pass = CandidateSelector::new(&shader, &host, &config).match_all();

        assert_eq!(pass.diagnostics.count(DiagnosticLevel::Error), 1);
        assert!(pass.matches[0].candidates.is_empty());
        assert!(!pass.matches[0].is_matched());
    }
}
