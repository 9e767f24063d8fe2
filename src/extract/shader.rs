// Tue Jan 15 2026 - Alex

use crate::diagnostics::Diagnostics;
use crate::extract::grammar::{clean_body, parse_field_parts, strip_comments, LineIndex};
use crate::extract::DialectParser;
use crate::structure::{Dialect, Field, SizeModel, SourceLocation, StructLayout};
use once_cell::sync::Lazy;
use regex::Regex;

static BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)\b(?P<kind>struct|cbuffer|ConstantBuffer\s*<\s*\w+\s*>)\s+(?P<name>\w+)\s*(?::\s*register\s*\(\s*\w+\s*\))?\s*\{(?P<body>[^{}]*)\}",
    )
    .unwrap()
});

static TEMPLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:(?:RW)?StructuredBuffer|ConstantBuffer)\s*<\s*(?P<template>\w+)\s*>\s+(?P<name>\w+)\s*(?::\s*register\s*\(\s*\w+\s*\))?\s*;",
    )
    .unwrap()
});

/// Shading-language dialect: structs, cbuffers and templated containers.
#[derive(Debug, Default)]
pub struct ShaderParser;

impl ShaderParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_blocks(
        &self,
        content: &str,
        lines: &LineIndex,
        file: &str,
        diagnostics: &mut Diagnostics,
    ) -> Vec<StructLayout> {
        let mut structs = Vec::new();

        for caps in BLOCK.captures_iter(content) {
            let Some(whole) = caps.get(0) else { continue };
            let line = lines.line_of(whole.start());
            let name = &caps["name"];

            if SizeModel::base_size(&name.to_lowercase()).is_some() {
                diagnostics.debug(format!("Skipping block {} (built-in type) in {}:{}", name, file, line));
                continue;
            }

            let kind = &caps["kind"];
            let is_container = kind == "cbuffer" || kind.starts_with("ConstantBuffer");
            let body = clean_body(&caps["body"]);
            let fields = self.parse_body(name, &body, diagnostics);

            let mut layout =
                StructLayout::new(name, Dialect::Shader, SourceLocation::new(file, line)).with_fields(fields);
            if is_container {
                layout = layout.as_container_buffer();
            }

            diagnostics.debug(format!("Found {}", layout));
            structs.push(layout);
        }

        structs
    }

    fn parse_templates(
        &self,
        content: &str,
        lines: &LineIndex,
        file: &str,
        structs: &mut Vec<StructLayout>,
        diagnostics: &mut Diagnostics,
    ) {
        for caps in TEMPLATE.captures_iter(content) {
            let Some(whole) = caps.get(0) else { continue };
            let line = lines.line_of(whole.start());
            let template = &caps["template"];
            let name = &caps["name"];

            if SizeModel::is_base_type(template) {
                diagnostics.debug(format!("Skipping base type template {} in {}:{}", template, file, line));
                continue;
            }

            let known = structs.iter().any(|s| s.name() == template);
            if !known {
                structs.push(StructLayout::placeholder(template, SourceLocation::new(file, line), None));
                diagnostics.debug(format!("Found template struct {} in {}:{}", template, file, line));
            }

            if !structs.iter().any(|s| s.name() == name) {
                structs.push(StructLayout::placeholder(
                    name,
                    SourceLocation::new(file, line),
                    Some(template),
                ));
            }
        }
    }
}

impl DialectParser for ShaderParser {
    fn dialect(&self) -> Dialect {
        Dialect::Shader
    }

    fn parse_struct_blocks(&self, content: &str, file: &str, diagnostics: &mut Diagnostics) -> Vec<StructLayout> {
        let content = strip_comments(content);
        let lines = LineIndex::new(&content);
        let mut structs = self.parse_blocks(&content, &lines, file, diagnostics);
        self.parse_templates(&content, &lines, file, &mut structs, diagnostics);
        structs
    }

    fn parse_field(&self, fragment: &str) -> Option<Field> {
        let parts = parse_field_parts(fragment)?;
        let field = Field::checked(&parts.name, &parts.type_name, parts.array_size)?;
        Some(match parts.pack_offset {
            Some(tag) => field.with_pack_offset(&tag),
            None => field,
        })
    }
}
