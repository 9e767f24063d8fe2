// Tue Jan 15 2026 - Alex

pub mod config;
pub mod diagnostics;
pub mod extract;
pub mod matching;
pub mod output;
pub mod structure;
pub mod utils;

pub use config::{ConfigError, MatchConfig};
pub use diagnostics::{Diagnostic, DiagnosticLevel, Diagnostics};
pub use extract::{extract_structs, DialectParser, Extraction};
pub use matching::{match_structs, CandidateSelector, MatchOutcome, MatchPass, MatchStatus, StructMatch};
pub use output::{BufferUsage, JsonSerializer, ReportFormat, ReportGenerator, StatusSummary};
pub use structure::{Dialect, Field, StructLayout, StructRegistry, StructureError};

use std::path::Path;
use utils::logging::scoped_timer;

/// One already-preprocessed source text and the path it is reported under.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: &str, content: &str) -> Self {
        Self {
            path: path.to_string(),
            content: content.to_string(),
        }
    }

    pub fn read<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Ok(Self {
            path: path.display().to_string(),
            content,
        })
    }
}

/// Result of a whole cross-check: the matching pass with extraction
/// diagnostics folded in, plus buffer usages linked to their structs.
#[derive(Debug, Clone)]
pub struct CrossCheck {
    pub shader: StructRegistry,
    pub host: StructRegistry,
    pub pass: MatchPass,
    pub usages: Vec<BufferUsage>,
}

pub fn build_registry(sources: &[SourceFile], dialect: Dialect, diagnostics: &mut Diagnostics) -> StructRegistry {
    let mut registry = StructRegistry::new(dialect);
    for source in sources {
        let extraction = extract_structs(&source.content, dialect, &source.path);
        diagnostics.merge(extraction.into_registry(&mut registry));
    }
    log::info!("Registered {} {} struct names", registry.len(), dialect);
    registry
}

/// Extracts both dialects, matches every shader struct and links the
/// `register(...)` usages found in the shader sources.
pub fn crosscheck(shader_sources: &[SourceFile], host_sources: &[SourceFile], config: &MatchConfig) -> CrossCheck {
    let _timer = scoped_timer("crosscheck");

    let mut diagnostics = Diagnostics::new();
    let shader = build_registry(shader_sources, Dialect::Shader, &mut diagnostics);
    let host = build_registry(host_sources, Dialect::Host, &mut diagnostics);

    let mut pass = match_structs(&shader, &host, config);
    diagnostics.merge(std::mem::take(&mut pass.diagnostics));
    pass.diagnostics = diagnostics;

    let mut usages: Vec<BufferUsage> = shader_sources
        .iter()
        .flat_map(|s| output::scan_usages(&s.content, &s.path))
        .collect();
    output::link_usages(&mut usages, &pass.matches, &config.status);

    CrossCheck {
        shader,
        host,
        pass,
        usages,
    }
}
