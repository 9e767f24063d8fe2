// Tue Jan 17 2026 - Alex

use crate::config::StatusConfig;
use crate::diagnostics::DiagnosticLevel;
use crate::matching::{AlignedPair, MatchOutcome, MatchPass, MatchStatus, SimilarityEngine, StructMatch};
use crate::output::usage::BufferUsage;
use crate::output::StatusSummary;
use crate::structure::Field;
use crate::utils::string::StringUtils;
use itertools::Itertools;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const CELL_WIDTH: usize = 34;
const BANNER: &str = "================================================================================";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Markdown,
}

pub struct ReportGenerator {
    format: ReportFormat,
    include_header: bool,
    include_summary: bool,
    only_matched: bool,
    show_top_candidate: bool,
    status: StatusConfig,
    similarity: SimilarityEngine,
}

/// One struct section, resolved once so both formats render the same facts.
struct Section<'a> {
    result: &'a StructMatch,
    status: MatchStatus,
    /// Host name, location and score of whatever gets tabulated.
    shown: Option<(&'a str, String, f64)>,
    pairs: &'a [AlignedPair],
    note: Option<String>,
}

impl ReportGenerator {
    pub fn new(format: ReportFormat) -> Self {
        Self {
            format,
            include_header: true,
            include_summary: true,
            only_matched: false,
            show_top_candidate: false,
            status: StatusConfig::default(),
            similarity: SimilarityEngine::default(),
        }
    }

    pub fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    pub fn with_summary(mut self, include: bool) -> Self {
        self.include_summary = include;
        self
    }

    /// Leave out structs whose status is Unmatched.
    pub fn with_only_matched(mut self, only: bool) -> Self {
        self.only_matched = only;
        self
    }

    /// Tabulate the best rejected candidate of unmatched structs.
    pub fn with_top_candidate(mut self, show: bool) -> Self {
        self.show_top_candidate = show;
        self
    }

    pub fn with_status_config(mut self, status: StatusConfig) -> Self {
        self.status = status;
        self
    }

    pub fn with_similarity(mut self, similarity: SimilarityEngine) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn generate(&self, pass: &MatchPass, usages: &[BufferUsage]) -> String {
        match self.format {
            ReportFormat::Text => self.generate_text(pass, usages),
            ReportFormat::Markdown => self.generate_markdown(pass, usages),
        }
    }

    pub fn generate_to_file<P: AsRef<Path>>(&self, pass: &MatchPass, usages: &[BufferUsage], path: P) -> std::io::Result<()> {
        let report = self.generate(pass, usages);
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(report.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    fn section<'a>(&self, result: &'a StructMatch) -> Option<Section<'a>> {
        let status = result.status(&self.status);
        if self.only_matched && status == MatchStatus::Unmatched {
            return None;
        }

        let section = match &result.outcome {
            MatchOutcome::Matched {
                host_name,
                host_location,
                score,
                pairs,
                ..
            } => Section {
                result,
                status,
                shown: Some((host_name.as_str(), host_location.to_string(), *score)),
                pairs,
                note: None,
            },
            MatchOutcome::Unmatched { reason, .. } => {
                let top = result.candidates.first().filter(|_| self.show_top_candidate);
                Section {
                    result,
                    status,
                    shown: top.map(|c| (c.host_name.as_str(), c.host_location.to_string(), c.score)),
                    pairs: top.map(|c| c.pairs.as_slice()).unwrap_or(&[]),
                    note: Some(reason.to_string()),
                }
            }
        };
        Some(section)
    }

    /// Standalone structs first, then each composite followed by its members.
    fn grouped<'a>(&self, pass: &'a MatchPass) -> Vec<(Option<&'a str>, Vec<Section<'a>>)> {
        let mut groups = vec![(
            None,
            pass.matches
                .iter()
                .filter(|m| pass.composite_of(&m.shader_name).is_none())
                .filter_map(|m| self.section(m))
                .collect::<Vec<_>>(),
        )];

        for composite in pass.composites.keys() {
            let mut sections: Vec<Section<'a>> = pass
                .matches
                .iter()
                .filter(|m| pass.composite_of(&m.shader_name) == Some(composite.as_str()))
                .filter_map(|m| self.section(m))
                .collect();
            // container first
            sections.sort_by_key(|s| s.result.shader_name != *composite);
            if !sections.is_empty() {
                groups.push((Some(composite.as_str()), sections));
            }
        }

        groups
    }

    fn is_diff(&self, pair: &AlignedPair) -> bool {
        match (&pair.shader, &pair.host) {
            (Some(shader), Some(host)) => {
                self.similarity.name_similarity(shader.name(), host.name()) < 1.0
                    || self.similarity.raw_type_similarity(shader.type_name(), host.type_name()) == 0.0
            }
            _ => true,
        }
    }

    fn generate_text(&self, pass: &MatchPass, usages: &[BufferUsage]) -> String {
        let mut report = String::new();

        if self.include_header {
            report.push_str(&self.text_header(pass));
            report.push_str("\n\n");
        }

        if self.include_summary {
            report.push_str(&self.text_summary(pass));
            report.push_str("\n\n");
        }

        for (composite, sections) in self.grouped(pass) {
            match composite {
                None => report.push_str("STRUCTS\n-------\n"),
                Some(name) => {
                    let title = format!("COMPOSITE BUFFER {}", name);
                    report.push_str(&format!("{}\n{}\n", title, "-".repeat(title.len())));
                }
            }
            for section in &sections {
                report.push_str(&self.text_section(section));
                report.push('\n');
            }
            report.push('\n');
        }

        if !usages.is_empty() {
            report.push_str(&self.text_usages(usages));
        }

        report.trim_end().to_string()
    }

    fn text_header(&self, pass: &MatchPass) -> String {
        let mut header = String::new();
        header.push_str(BANNER);
        header.push('\n');
        header.push_str("                    SHADER / HOST STRUCT LAYOUT CROSS-CHECK\n");
        header.push_str(BANNER);
        header.push('\n');
        header.push_str(&format!("Shader structs: {}\n", pass.matches.len()));
        header.push_str(&format!("Composite buffers: {}\n", pass.composites.len()));
        header.push_str(BANNER);
        header
    }

    fn text_summary(&self, pass: &MatchPass) -> String {
        let summary = StatusSummary::from_matches(&pass.matches, &self.status);
        let mut text = String::new();
        text.push_str("SUMMARY\n");
        text.push_str("-------\n");
        text.push_str(&format!("Matched:             {:>8}\n", summary.matched));
        text.push_str(&format!("Mismatched:          {:>8}\n", summary.mismatched));
        text.push_str(&format!("Unmatched:           {:>8}\n", summary.unmatched));
        text.push_str(&format!("Warnings:            {:>8}", pass.diagnostics.count(DiagnosticLevel::Warn)));
        text
    }

    fn text_section(&self, section: &Section<'_>) -> String {
        let result = section.result;
        let mut text = format!(
            "\n[{}] {} ({})\n",
            section.status, result.shader_name, result.shader_location
        );

        match (&section.shown, result.is_matched()) {
            (Some((host, location, score)), true) => {
                text.push_str(&format!("  Host: {} ({}) score {:.3}\n", host, location, score));
            }
            (Some((host, location, score)), false) => {
                text.push_str(&format!("  Top candidate: {} ({}) score {:.3}\n", host, location, score));
            }
            (None, _) => {}
        }
        if let Some(note) = &section.note {
            text.push_str(&format!("  Reason: {}\n", note));
        }
        if let Some(report) = result.report() {
            text.push_str(&format!(
                "  Size: {} vs {} bytes, {} field differences\n",
                report.shader_size, report.host_size, report.field_diff_count
            ));
            if !report.unmatched_shader_fields.is_empty() {
                text.push_str(&format!("  Shader only: {}\n", report.unmatched_shader_fields.iter().join(", ")));
            }
            if !report.unmatched_host_fields.is_empty() {
                text.push_str(&format!("  Host only: {}\n", report.unmatched_host_fields.iter().join(", ")));
            }
        }

        if !section.pairs.is_empty() {
            text.push_str(&format!(
                "    {}{}\n",
                StringUtils::pad_right("shader", CELL_WIDTH, ' '),
                "host"
            ));
            for pair in section.pairs {
                let marker = if self.is_diff(pair) { "! " } else { "  " };
                text.push_str(&format!(
                    "  {}{}{}\n",
                    marker,
                    StringUtils::pad_right(&cell(pair.shader.as_ref()), CELL_WIDTH, ' '),
                    cell(pair.host.as_ref())
                ));
            }
        }

        text
    }

    fn text_usages(&self, usages: &[BufferUsage]) -> String {
        let mut text = String::new();
        text.push_str("BUFFER USAGES\n");
        text.push_str("-------------\n");
        for usage in usages {
            text.push_str(&format!(
                "  {:<6} {} ({}:{}) -> {}\n",
                usage.register,
                usage.template_type.as_deref().map(|t| format!("{}<{}>", usage.name, t)).unwrap_or_else(|| usage.name.clone()),
                usage.file,
                usage.line,
                usage.status()
            ));
        }
        text
    }

    fn generate_markdown(&self, pass: &MatchPass, usages: &[BufferUsage]) -> String {
        let mut md = String::new();

        if self.include_header {
            md.push_str("# Shader / Host Struct Layout Cross-Check\n\n");
        }

        if self.include_summary {
            let summary = StatusSummary::from_matches(&pass.matches, &self.status);
            md.push_str("## Summary\n\n");
            md.push_str("| Status | Count |\n");
            md.push_str("|--------|-------|\n");
            md.push_str(&format!("| Matched | {} |\n", summary.matched));
            md.push_str(&format!("| Mismatched | {} |\n", summary.mismatched));
            md.push_str(&format!("| Unmatched | {} |\n\n", summary.unmatched));
        }

        for (composite, sections) in self.grouped(pass) {
            match composite {
                None => md.push_str("## Structs\n\n"),
                Some(name) => md.push_str(&format!("## Composite buffer `{}`\n\n", name)),
            }
            for section in &sections {
                let result = section.result;
                md.push_str(&format!(
                    "### {} `{}`\n\n",
                    section.status, result.shader_name
                ));
                md.push_str(&format!("- Shader: `{}`\n", result.shader_location));
                if let Some((host, location, score)) = &section.shown {
                    let label = if result.is_matched() { "Host" } else { "Top candidate" };
                    md.push_str(&format!("- {}: `{}` (`{}`), score {:.3}\n", label, host, location, score));
                }
                if let Some(note) = &section.note {
                    md.push_str(&format!("- Reason: {}\n", note));
                }
                md.push('\n');

                if !section.pairs.is_empty() {
                    md.push_str("| | Shader | Host |\n");
                    md.push_str("|---|--------|------|\n");
                    for pair in section.pairs {
                        md.push_str(&format!(
                            "| {} | {} | {} |\n",
                            if self.is_diff(pair) { "!" } else { "" },
                            cell(pair.shader.as_ref()),
                            cell(pair.host.as_ref())
                        ));
                    }
                    md.push('\n');
                }
            }
        }

        if !usages.is_empty() {
            md.push_str("## Buffer usages\n\n");
            md.push_str("| Register | Buffer | Location | Status |\n");
            md.push_str("|----------|--------|----------|--------|\n");
            for usage in usages {
                md.push_str(&format!(
                    "| {} | {} | {}:{} | {} |\n",
                    usage.register,
                    usage.name,
                    usage.file,
                    usage.line,
                    usage.status()
                ));
            }
        }

        md
    }
}

fn cell(field: Option<&Field>) -> String {
    match field {
        Some(f) => StringUtils::truncate(&format!("{} {}", f.qualified_type(), f.name()), CELL_WIDTH - 2).into_owned(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;
    use crate::matching::match_structs;
    use crate::structure::{Dialect, StructBuilder, StructRegistry};

    fn sample_pass() -> MatchPass {
        let mut shader = StructRegistry::new(Dialect::Shader);
        shader.insert(
            StructBuilder::shader("Light")
                .at("lighting.hlsl", 1)
                .field("position", "float")
                .field("range", "float")
                .field("intensity", "float")
                .build(),
        );
        shader.insert(
            StructBuilder::shader("PerLight")
                .at("lighting.hlsl", 8)
                .field("light", "Light")
                .container()
                .build(),
        );
        shader.insert(
            StructBuilder::shader("Zebra")
                .at("misc.hlsl", 1)
                .field("stripes", "uint")
                .build(),
        );

        let mut host = StructRegistry::new(Dialect::Host);
        host.insert(
            StructBuilder::host("Light")
                .field("position", "float")
                .field("range", "float")
                .field("intensity", "float")
                .build(),
        );
        host.insert(
            StructBuilder::host("Camera")
                .field("fov", "int")
                .field("nearPlane", "int")
                .field("farPlane", "int")
                .field("aspect", "int")
                .build(),
        );

        match_structs(&shader, &host, &MatchConfig::default())
    }

    #[test]
    fn test_text_report_groups_composites() {
        let pass = sample_pass();
        let text = ReportGenerator::new(ReportFormat::Text).generate(&pass, &[]);

        assert!(text.starts_with(BANNER));
        assert!(text.contains("SUMMARY"));
        assert!(text.contains("COMPOSITE BUFFER PerLight"));

        let composite_at = text.find("COMPOSITE BUFFER PerLight").unwrap();
        let zebra_at = text.find("Zebra (misc.hlsl:1)").unwrap();
        let light_at = text.find("] Light (lighting.hlsl:1)").unwrap();
        assert!(zebra_at < composite_at);
        assert!(light_at > composite_at);
        assert!(text.contains("[Matched] Light"));
        assert!(text.contains("float position"));
    }

    #[test]
    fn test_only_matched_filters_unmatched() {
        let pass = sample_pass();
        let text = ReportGenerator::new(ReportFormat::Text)
            .with_only_matched(true)
            .generate(&pass, &[]);
        assert!(!text.contains("Zebra (misc.hlsl"));
        assert!(text.contains("[Matched] Light"));
    }

    #[test]
    fn test_top_candidate_shown_for_rejections() {
        let pass = sample_pass();
        let hidden = ReportGenerator::new(ReportFormat::Text).generate(&pass, &[]);
        assert!(!hidden.contains("Top candidate"));

        let shown = ReportGenerator::new(ReportFormat::Text)
            .with_top_candidate(true)
            .generate(&pass, &[]);
        assert!(shown.contains("Top candidate"));
        assert!(shown.contains("uint stripes"));
        assert!(shown.contains("Shader only: stripes"));
    }

    #[test]
    fn test_markdown_report() {
        let pass = sample_pass();
        let usages = vec![BufferUsage::new("b0", "PerLight", "lighting.hlsl", 8)];
        let md = ReportGenerator::new(ReportFormat::Markdown)
            .with_header(false)
            .generate(&pass, &usages);

        assert!(md.starts_with("## Summary"));
        assert!(md.contains("## Composite buffer `PerLight`"));
        assert!(md.contains("| Register | Buffer | Location | Status |"));
        assert!(md.contains("| b0 | PerLight | lighting.hlsl:8 | Unmatched |"));
    }

    #[test]
    fn test_cell_truncates() {
        let field = Field::new("aVeryLongFieldNameThatKeepsGoingAndGoing", "float", 4);
        let rendered = cell(Some(&field));
        assert_eq!(rendered.chars().count(), CELL_WIDTH - 2);
        assert!(rendered.ends_with("..."));
        assert_eq!(cell(None), "-");
    }
}
