// Tue Jan 17 2026 - Alex

use crate::config::StatusConfig;
use crate::extract::grammar::{strip_comments, LineIndex};
use crate::matching::result::{analysis_key, MatchStatus, StructMatch};
use crate::structure::SizeModel;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static BUFFER_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:cbuffer\s+(?P<cbuffer>\w+)|(?:RW)?StructuredBuffer\s*<\s*(?P<sb_type>\w+)\s*>\s+(?P<sb>\w+)|ConstantBuffer\s*<\s*(?P<cb_type>\w+)\s*>\s+(?P<cb>\w+))\s*:\s*register\s*\(\s*(?P<register>\w+)\s*\)",
    )
    .unwrap()
});

/// Struct analysis attached to a buffer usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageLink {
    pub key: String,
    pub status: MatchStatus,
    pub host_name: Option<String>,
    pub score: f64,
}

/// A buffer bound to a register slot somewhere in the shader sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferUsage {
    pub register: String,
    pub name: String,
    pub template_type: Option<String>,
    pub file: String,
    pub line: usize,
    /// Define combination active when the usage was seen.
    pub defines: BTreeMap<String, String>,
    pub link: Option<UsageLink>,
}

impl BufferUsage {
    pub fn new(register: &str, name: &str, file: &str, line: usize) -> Self {
        Self {
            register: register.to_string(),
            name: name.to_string(),
            template_type: None,
            file: file.to_string(),
            line,
            defines: BTreeMap::new(),
            link: None,
        }
    }

    pub fn with_template(mut self, template_type: &str) -> Self {
        self.template_type = Some(template_type.to_string());
        self
    }

    pub fn with_defines(mut self, defines: BTreeMap<String, String>) -> Self {
        self.defines = defines;
        self
    }

    /// The struct this usage is laid out as: the template argument if any,
    /// otherwise the buffer name. Lowercase.
    pub fn struct_name(&self) -> String {
        self.template_type.as_deref().unwrap_or(&self.name).to_lowercase()
    }

    pub fn status(&self) -> MatchStatus {
        self.link
            .as_ref()
            .map(|l| l.status.clone())
            .unwrap_or(MatchStatus::Unmatched)
    }
}

/// Finds `register(...)`-bound cbuffers and templated buffers in one file.
pub fn scan_usages(content: &str, file: &str) -> Vec<BufferUsage> {
    let content = strip_comments(content);
    let lines = LineIndex::new(&content);

    BUFFER_DECL
        .captures_iter(&content)
        .filter_map(|caps| {
            let line = lines.line_of(caps.get(0)?.start());
            let register = &caps["register"];
            if let Some(name) = caps.name("cbuffer") {
                return Some(BufferUsage::new(register, name.as_str(), file, line));
            }
            let (template, name) = match (caps.name("sb_type"), caps.name("sb")) {
                (Some(t), Some(n)) => (t, n),
                _ => (caps.name("cb_type")?, caps.name("cb")?),
            };
            Some(BufferUsage::new(register, name.as_str(), file, line).with_template(template.as_str()))
        })
        .collect()
}

/// Attaches each struct outcome to the usage declared with it, first by
/// `(file, struct)` and then by struct name alone for user-defined types.
/// Returns how many matches found a usage.
pub fn link_usages(usages: &mut [BufferUsage], matches: &[StructMatch], config: &StatusConfig) -> usize {
    let mut linked = 0;

    for result in matches {
        let shader_name = result.shader_name.to_lowercase();
        let shader_file = result.shader_location.file.to_lowercase();

        let target = usages
            .iter()
            .position(|u| u.file.to_lowercase() == shader_file && u.struct_name() == shader_name)
            .or_else(|| {
                if SizeModel::base_size(&shader_name).is_some() {
                    return None;
                }
                usages.iter().position(|u| u.struct_name() == shader_name)
            });

        match target {
            Some(idx) => {
                usages[idx].link = Some(UsageLink {
                    key: analysis_key(&result.shader_location.file, &result.shader_name),
                    status: result.status(config),
                    host_name: result.host_name().map(str::to_string),
                    score: result.score(),
                });
                linked += 1;
            }
            None => log::debug!("No buffer usage found for struct {}", result.analysis_key()),
        }
    }

    for usage in usages.iter().filter(|u| u.link.is_none()) {
        log::debug!("Buffer {} in {} not matched to any struct", usage.name, usage.file);
    }

    linked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::candidate::StructCandidate;
    use crate::matching::gate::Rejection;
    use crate::matching::scoring::AlignmentReport;
    use crate::structure::SourceLocation;

    fn matched(name: &str, file: &str) -> StructMatch {
        let candidate = StructCandidate {
            host_name: format!("{}Data", name),
            host_location: SourceLocation::new("host.h", 1),
            flattened: false,
            raw_score: 0.9,
            score: 0.9,
            pairs: Vec::new(),
            report: AlignmentReport {
                total_fields: 2,
                host_total_fields: 2,
                ..Default::default()
            },
        };
        StructMatch::accepted(name, &SourceLocation::new(file, 1), vec![candidate]).unwrap()
    }

    #[test]
    fn test_scan_usages() {
        let source = r#"
cbuffer PerFrame : register(b0) { float time; };
StructuredBuffer<Light> Lights : register(t3);
// StructuredBuffer<Light> Old : register(t4);
ConstantBuffer<Material> Mat : register(b2);
"#;
        let usages = scan_usages(source, "Shaders/Lighting.hlsl");
        assert_eq!(usages.len(), 3);
        assert_eq!(usages[0].name, "PerFrame");
        assert_eq!(usages[0].register, "b0");
        assert_eq!(usages[0].line, 2);
        assert_eq!(usages[1].template_type.as_deref(), Some("Light"));
        assert_eq!(usages[1].struct_name(), "light");
        assert_eq!(usages[2].register, "b2");
        assert_eq!(usages[2].struct_name(), "material");
    }

    #[test]
    fn test_link_prefers_same_file_then_name() {
        let mut usages = vec![
            BufferUsage::new("t0", "Lights", "Other.hlsl", 3).with_template("Light"),
            BufferUsage::new("t1", "Lights", "Shaders/Lighting.hlsl", 9).with_template("Light"),
            BufferUsage::new("b0", "PerFrame", "Shaders/Frame.hlsl", 1),
            BufferUsage::new("b1", "Unused", "Shaders/Frame.hlsl", 4),
        ];
        let matches = vec![
            matched("Light", "shaders/lighting.hlsl"),
            matched("PerFrame", "Elsewhere.hlsl"),
        ];

        let linked = link_usages(&mut usages, &matches, &StatusConfig::default());
        assert_eq!(linked, 2);
        assert!(usages[0].link.is_none());
        assert_eq!(usages[1].status(), MatchStatus::Matched);
        assert_eq!(usages[1].link.as_ref().unwrap().key, "shaders/lighting.hlsl:light");
        assert_eq!(usages[2].link.as_ref().unwrap().host_name.as_deref(), Some("PerFrameData"));
        assert_eq!(usages[3].status(), MatchStatus::Unmatched);
    }

    #[test]
    fn test_rejected_struct_links_as_unmatched() {
        let mut usages = vec![BufferUsage::new("b0", "Params", "a.hlsl", 1)];
        let rejected = StructMatch::rejected("Params", &SourceLocation::new("a.hlsl", 1), Rejection::NoCandidates, vec![]);
        assert_eq!(link_usages(&mut usages, &[rejected], &StatusConfig::default()), 1);
        assert_eq!(usages[0].status(), MatchStatus::Unmatched);
        assert!(usages[0].link.as_ref().unwrap().host_name.is_none());
    }
}
