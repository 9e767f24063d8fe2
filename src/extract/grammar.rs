// Tue Jan 15 2026 - Alex

use once_cell::sync::Lazy;
use regex::Regex;

static FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        ^(?:(?:row_major|column_major|precise|nointerpolation|linear|centroid|noperspective|uniform|volatile|mutable)\s+)*
        (?P<type>[A-Za-z_][\w:]*(?:\s*<[^<>;]*>)?)
        (?P<sep>\s*\*+\s*|\s+)
        (?P<name>[A-Za-z_]\w*)
        \s*(?P<array>(?:\[\s*\d+\s*\]\s*)*)
        (?::\s*packoffset\s*\(\s*(?P<pack>[^)]*?)\s*\))?
        ",
    )
    .unwrap()
});

static ARRAY_DIM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());
static BLOCK_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"//[^\n]*").unwrap());
static LINE_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^#line\s+(?P<line>\d+)(?:\s+"[^"]*")?"#).unwrap());

/// Pieces of one `type name[a][b] : packoffset(c0.x)` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldParts {
    pub type_name: String,
    pub name: String,
    pub array_size: usize,
    pub pack_offset: Option<String>,
}

/// Matches a single member declaration. Trailing initializers and semantics
/// after the recognised prefix are ignored.
pub fn parse_field_parts(fragment: &str) -> Option<FieldParts> {
    let fragment = fragment.trim();
    if fragment.is_empty() {
        return None;
    }

    let caps = FIELD.captures(fragment)?;
    let mut type_name: String = caps["type"].split_whitespace().collect();
    if caps["sep"].contains('*') {
        type_name.push('*');
    }

    // a dimension or product that overflows makes the fragment unparseable
    let array_size = match caps.name("array") {
        Some(m) => ARRAY_DIM
            .find_iter(m.as_str())
            .try_fold(1usize, |count, d| count.checked_mul(d.as_str().parse().ok()?))?,
        None => 1,
    }
    .max(1);

    Some(FieldParts {
        type_name,
        name: caps["name"].to_string(),
        array_size,
        pack_offset: caps.name("pack").map(|m| m.as_str().to_string()).filter(|s| !s.is_empty()),
    })
}

/// Removes comments and blank lines from a struct body.
pub fn clean_body(body: &str) -> String {
    let body = BLOCK_COMMENT.replace_all(body, "");
    body.lines()
        .map(|line| LINE_COMMENT.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Blanks out comments but keeps every newline so byte offsets still map to
/// the original line numbers.
pub fn strip_comments(content: &str) -> String {
    let without_blocks = BLOCK_COMMENT.replace_all(content, |caps: &regex::Captures| {
        caps[0].chars().filter(|&c| c == '\n').collect::<String>()
    });
    LINE_COMMENT.replace_all(&without_blocks, "").into_owned()
}

/// Maps byte offsets to 1-based source lines, honouring `#line N` directives
/// left behind by a preprocessor.
pub struct LineIndex {
    newlines: Vec<usize>,
    directives: Vec<(usize, usize)>,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let newlines = content
            .char_indices()
            .filter(|&(_, c)| c == '\n')
            .map(|(i, _)| i)
            .collect();

        let mut index = Self {
            newlines,
            directives: Vec::new(),
        };

        let directives = LINE_DIRECTIVE
            .captures_iter(content)
            .filter_map(|caps| {
                let at = caps.get(0)?.start();
                let declared = caps["line"].parse::<usize>().ok()?;
                Some((index.physical_line(at), declared))
            })
            .collect();
        index.directives = directives;
        index
    }

    pub fn physical_line(&self, offset: usize) -> usize {
        self.newlines.partition_point(|&nl| nl < offset) + 1
    }

    /// Line as the original source saw it.
    pub fn line_of(&self, offset: usize) -> usize {
        let physical = self.physical_line(offset);
        match self.directives.iter().rev().find(|(at, _)| *at < physical) {
            Some((at, declared)) => declared + (physical - at - 1),
            None => physical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_field() {
        let parts = parse_field_parts("float4 position").unwrap();
        assert_eq!(parts.type_name, "float4");
        assert_eq!(parts.name, "position");
        assert_eq!(parts.array_size, 1);
        assert_eq!(parts.pack_offset, None);
    }

    #[test]
    fn test_parse_arrays_and_packoffset() {
        let parts = parse_field_parts("row_major float4x4 bones[4][2] : packoffset(c4)").unwrap();
        assert_eq!(parts.type_name, "float4x4");
        assert_eq!(parts.name, "bones");
        assert_eq!(parts.array_size, 8);
        assert_eq!(parts.pack_offset.as_deref(), Some("c4"));

        let parts = parse_field_parts("float tint : packoffset(c1.y)").unwrap();
        assert_eq!(parts.pack_offset.as_deref(), Some("c1.y"));
    }

    #[test]
    fn test_parse_pointer_and_namespaced() {
        let parts = parse_field_parts("Light *lights").unwrap();
        assert_eq!(parts.type_name, "Light*");

        let parts = parse_field_parts("REX::W32::XMFLOAT4X4 viewProj").unwrap();
        assert_eq!(parts.type_name, "REX::W32::XMFLOAT4X4");
        assert_eq!(parts.name, "viewProj");
    }

    #[test]
    fn test_unparseable_fragment() {
        assert!(parse_field_parts("").is_none());
        assert!(parse_field_parts("#ifdef FOO").is_none());
        assert!(parse_field_parts("justone").is_none());
        assert!(parse_field_parts("float4 v[4294967296][4294967296]").is_none());
        assert!(parse_field_parts("float v[99999999999999999999999]").is_none());
    }

    #[test]
    fn test_clean_body() {
        let body = "float a; // trailing\n/* block\n comment */\n\n  uint b;";
        assert_eq!(clean_body(body), "float a;\nuint b;");
    }

    #[test]
    fn test_strip_comments_keeps_lines() {
        let content = "a\n/* x\ny */\nstruct S {}";
        let stripped = strip_comments(content);
        assert_eq!(stripped.lines().count(), content.lines().count());
    }

    #[test]
    fn test_line_index_with_directive() {
        let content = "one\ntwo\n#line 100 \"orig.hlsl\"\nthree\nfour";
        let index = LineIndex::new(content);
        let three = content.find("three").unwrap();
        let four = content.find("four").unwrap();
        assert_eq!(index.physical_line(three), 4);
        assert_eq!(index.line_of(three), 100);
        assert_eq!(index.line_of(four), 101);
        assert_eq!(index.line_of(0), 1);
    }
}
