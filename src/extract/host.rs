// Tue Jan 15 2026 - Alex

use crate::diagnostics::Diagnostics;
use crate::extract::grammar::{clean_body, parse_field_parts, strip_comments, LineIndex};
use crate::extract::DialectParser;
use crate::structure::{Dialect, Field, SourceLocation, StructLayout};
use once_cell::sync::Lazy;
use regex::Regex;

static STRUCT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\bstruct\s+(?:alignas\s*\(\s*\d+\s*\)\s+)?(?P<name>\w+)\s*\{(?P<body>[^{}]*)\}").unwrap()
});

static ACCESS_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:public|private|protected)\s*:").unwrap());

/// Member alignment specifier, with one level of nested parentheses.
static MEMBER_ALIGNAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\balignas\s*\((?:[^()]|\([^()]*\))*\)\s*").unwrap());

const SKIPPED_MEMBER_PREFIXES: &[&str] = &["static", "const", "constexpr", "typedef", "using", "friend"];

/// Host dialect: plain `struct` blocks only.
#[derive(Debug, Default)]
pub struct HostParser;

impl HostParser {
    pub fn new() -> Self {
        Self
    }

    fn is_data_member(fragment: &str) -> bool {
        let first = fragment.split_whitespace().next().unwrap_or("");
        !SKIPPED_MEMBER_PREFIXES.contains(&first) && !fragment.contains('(')
    }
}

impl DialectParser for HostParser {
    fn dialect(&self) -> Dialect {
        Dialect::Host
    }

    fn parse_struct_blocks(&self, content: &str, file: &str, diagnostics: &mut Diagnostics) -> Vec<StructLayout> {
        let content = strip_comments(content);
        let lines = LineIndex::new(&content);
        let mut structs = Vec::new();

        for caps in STRUCT.captures_iter(&content) {
            let Some(whole) = caps.get(0) else { continue };
            let line = lines.line_of(whole.start());
            let name = &caps["name"];

            let body = clean_body(&caps["body"]);
            let body = ACCESS_LABEL.replace_all(&body, "");
            // alignment specifiers do not change the field size
            let body = MEMBER_ALIGNAS.replace_all(&body, "");
            let members: Vec<&str> = body
                .split(';')
                .map(str::trim)
                .filter(|f| !f.is_empty() && Self::is_data_member(f))
                .collect();
            let fields = self.parse_body(name, &members.join(";"), diagnostics);

            if fields.is_empty() {
                diagnostics.debug(format!("Skipping host struct {} in {}:{}: no fields", name, file, line));
                continue;
            }

            if let Some(pointer) = fields.iter().find(|f| f.is_pointer()) {
                diagnostics.debug(format!(
                    "Skipping host struct {} in {}:{}: pointer field {}",
                    name,
                    file,
                    line,
                    pointer.name()
                ));
                continue;
            }

            let layout = StructLayout::new(name, Dialect::Host, SourceLocation::new(file, line)).with_fields(fields);
            diagnostics.debug(format!("Found {}", layout));
            structs.push(layout);
        }

        structs
    }

    fn parse_field(&self, fragment: &str) -> Option<Field> {
        let parts = parse_field_parts(fragment)?;
        Field::checked(&parts.name, &parts.type_name, parts.array_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Vec<StructLayout> {
        let mut diagnostics = Diagnostics::new();
        HostParser::new().parse_struct_blocks(source, "types.h", &mut diagnostics)
    }

    #[test]
    fn test_plain_struct() {
        let structs = parse(
            r#"
namespace gfx
{
    struct alignas(16) PerFrame
    {
    public:
        REX::W32::XMFLOAT4X4 viewProj;
        float time;      // seconds
        float pad[3];
        static constexpr uint32_t Slot = 0;
        void Reset();
    };
}
"#,
        );
        assert_eq!(structs.len(), 1);
        let per_frame = &structs[0];
        assert_eq!(per_frame.name(), "PerFrame");
        assert_eq!(per_frame.line(), 4);
        let names: Vec<&str> = per_frame.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["viewProj", "time", "pad[3]"]);
        assert_eq!(per_frame.size(), 64 + 4 + 12);
    }

    #[test]
    fn test_pointer_struct_rejected() {
        let mut diagnostics = Diagnostics::new();
        let structs = HostParser::new().parse_struct_blocks(
            "struct Node { float value; Node* next; };\nstruct Leaf { float value; };",
            "tree.h",
            &mut diagnostics,
        );
        assert_eq!(structs.len(), 1);
        assert_eq!(structs[0].name(), "Leaf");
        assert!(diagnostics.entries().iter().any(|d| d.message.contains("pointer field next")));
    }

    #[test]
    fn test_empty_struct_skipped() {
        assert!(parse("struct Tag {};\nstruct OnlyStatic { static const int x = 1; };").is_empty());
    }

    #[test]
    fn test_aligned_members_kept() {
        let structs = parse(
            r#"
struct alignas(16) Skinning
{
    alignas(16) float4 weights;
    alignas(sizeof(float) * 4) uint4 indices;
    float scale;
    float Scale() const;
};
"#,
        );
        assert_eq!(structs.len(), 1);
        let names: Vec<&str> = structs[0].fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["weights", "indices", "scale"]);
        assert_eq!(structs[0].fields()[0].type_name(), "float4");
        assert_eq!(structs[0].size(), 36);
    }

    #[test]
    fn test_multidimensional_array() {
        let structs = parse("struct Grid { float cells[2][3]; };");
        let field = &structs[0].fields()[0];
        assert_eq!(field.array_size(), 6);
        assert_eq!(field.name(), "cells[6]");
        assert_eq!(field.size(), 24);
    }
}
