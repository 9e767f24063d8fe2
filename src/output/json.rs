// Tue Jan 17 2026 - Alex

use crate::config::StatusConfig;
use crate::matching::MatchPass;
use crate::output::usage::BufferUsage;
use crate::output::StatusSummary;
use serde_json::{json, Map, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JsonError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct JsonSerializer {
    pretty_print: bool,
    include_candidates: bool,
    include_diagnostics: bool,
    status: StatusConfig,
}

impl Default for JsonSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonSerializer {
    pub fn new() -> Self {
        Self {
            pretty_print: true,
            include_candidates: true,
            include_diagnostics: true,
            status: StatusConfig::default(),
        }
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    pub fn with_candidates(mut self, include: bool) -> Self {
        self.include_candidates = include;
        self
    }

    pub fn with_diagnostics(mut self, include: bool) -> Self {
        self.include_diagnostics = include;
        self
    }

    pub fn with_status_config(mut self, status: StatusConfig) -> Self {
        self.status = status;
        self
    }

    pub fn serialize(&self, pass: &MatchPass, usages: &[BufferUsage]) -> Result<String, JsonError> {
        let value = self.build_json_value(pass, usages)?;

        let text = if self.pretty_print {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(text)
    }

    pub fn serialize_to_file<P: AsRef<Path>>(
        &self,
        pass: &MatchPass,
        usages: &[BufferUsage],
        path: P,
    ) -> Result<(), JsonError> {
        let text = self.serialize(pass, usages)?;

        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        writer.write_all(text.as_bytes())?;
        writer.flush()?;

        Ok(())
    }

    fn build_json_value(&self, pass: &MatchPass, usages: &[BufferUsage]) -> Result<Value, JsonError> {
        let mut root = Map::new();

        root.insert(
            "metadata".to_string(),
            json!({
                "tool": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            }),
        );

        let summary = StatusSummary::from_matches(&pass.matches, &self.status);
        root.insert("summary".to_string(), serde_json::to_value(summary)?);

        let mut matches = Vec::with_capacity(pass.matches.len());
        for result in &pass.matches {
            let mut entry = match serde_json::to_value(result)? {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            entry.insert("key".to_string(), Value::String(result.analysis_key()));
            entry.insert("status".to_string(), serde_json::to_value(result.status(&self.status))?);
            if let Some(composite) = pass.composite_of(&result.shader_name) {
                entry.insert("composite".to_string(), Value::String(composite.to_string()));
            }
            if !self.include_candidates {
                entry.remove("candidates");
            }
            matches.push(Value::Object(entry));
        }
        root.insert("matches".to_string(), Value::Array(matches));

        root.insert("composites".to_string(), serde_json::to_value(&pass.composites)?);

        if !usages.is_empty() {
            root.insert("usages".to_string(), serde_json::to_value(usages)?);
        }

        if self.include_diagnostics {
            root.insert("diagnostics".to_string(), serde_json::to_value(&pass.diagnostics)?);
        }

        Ok(Value::Object(root))
    }
}

pub fn to_json_string(pass: &MatchPass) -> Result<String, JsonError> {
    JsonSerializer::new().serialize(pass, &[])
}

pub fn to_json_file<P: AsRef<Path>>(pass: &MatchPass, path: P) -> Result<(), JsonError> {
    JsonSerializer::new().serialize_to_file(pass, &[], path)
}
