// Tue Jan 15 2026 - Alex

pub mod grammar;
pub mod host;
pub mod shader;

pub use host::HostParser;
pub use shader::ShaderParser;

use crate::diagnostics::Diagnostics;
use crate::structure::{Dialect, Field, StructLayout, StructRegistry};

/// Per-dialect parsing capability. Blocks are located with regexes and bodies
/// are split on `;`; fragments that do not fit the field grammar are skipped.
pub trait DialectParser {
    fn dialect(&self) -> Dialect;

    /// Parses every struct-bearing block in `content`.
    fn parse_struct_blocks(&self, content: &str, file: &str, diagnostics: &mut Diagnostics) -> Vec<StructLayout>;

    /// Parses one `;`-separated member fragment.
    fn parse_field(&self, fragment: &str) -> Option<Field>;

    /// Parses a cleaned body, reporting fragments that were skipped.
    fn parse_body(&self, struct_name: &str, body: &str, diagnostics: &mut Diagnostics) -> Vec<Field> {
        let mut fields = Vec::new();
        for fragment in body.split(';') {
            let fragment = fragment.trim();
            if fragment.is_empty() {
                continue;
            }
            match self.parse_field(fragment) {
                Some(field) => fields.push(field),
                None => diagnostics.debug(format!(
                    "Failed to parse {} field in {}: {}",
                    self.dialect(),
                    struct_name,
                    fragment.replace('\n', " ")
                )),
            }
        }
        fields
    }
}

/// Structs found in one text block plus what happened while parsing it.
#[derive(Debug, Default)]
pub struct Extraction {
    pub structs: Vec<StructLayout>,
    pub diagnostics: Diagnostics,
}

impl Extraction {
    pub fn into_registry(self, registry: &mut StructRegistry) -> Diagnostics {
        registry.extend(self.structs);
        self.diagnostics
    }
}

pub fn parser_for(dialect: Dialect) -> Box<dyn DialectParser> {
    match dialect {
        Dialect::Shader => Box::new(ShaderParser::new()),
        Dialect::Host => Box::new(HostParser::new()),
    }
}

/// Extracts all structs of `dialect` from already-preprocessed text.
pub fn extract_structs(content: &str, dialect: Dialect, file: &str) -> Extraction {
    let mut diagnostics = Diagnostics::new();
    diagnostics.debug(format!("Extracting {} structs from {}", dialect, file));
    let structs = parser_for(dialect).parse_struct_blocks(content, file, &mut diagnostics);
    Extraction { structs, diagnostics }
}
