// Tue Jan 13 2026 - Alex

use crate::structure::{Field, SizeModel, StructureError};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    Shader,
    Host,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Shader => write!(f, "shader"),
            Dialect::Host => write!(f, "host"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
}

impl SourceLocation {
    pub fn new(file: &str, line: usize) -> Self {
        Self {
            file: file.to_string(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A parsed struct, cbuffer or template placeholder from either dialect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructLayout {
    name: String,
    fields: Vec<Field>,
    location: SourceLocation,
    dialect: Dialect,
    is_container_buffer: bool,
    is_template_placeholder: bool,
    template_type: Option<String>,
    size: usize,
}

impl StructLayout {
    pub fn new(name: &str, dialect: Dialect, location: SourceLocation) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
            location,
            dialect,
            is_container_buffer: false,
            is_template_placeholder: false,
            template_type: None,
            size: 0,
        }
    }

    /// A fieldless stand-in for a type only seen as a template argument.
    /// `template_type` is set for instance entries such as `Lights` in
    /// `StructuredBuffer<Light> Lights`.
    pub fn placeholder(name: &str, location: SourceLocation, template_type: Option<&str>) -> Self {
        let mut layout = Self::new(name, Dialect::Shader, location);
        layout.is_template_placeholder = true;
        layout.template_type = template_type.map(str::to_string);
        layout
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self.recalculate_size();
        self
    }

    pub fn as_container_buffer(mut self) -> Self {
        self.is_container_buffer = true;
        self.recalculate_size();
        self
    }

    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
        self.recalculate_size();
    }

    /// Replaces the field list, e.g. with a flattened one.
    pub fn set_fields(&mut self, fields: Vec<Field>) {
        self.fields = fields;
        self.recalculate_size();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn file(&self) -> &str {
        &self.location.file
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn is_container_buffer(&self) -> bool {
        self.is_container_buffer
    }

    pub fn is_template_placeholder(&self) -> bool {
        self.is_template_placeholder
    }

    pub fn template_type(&self) -> Option<&str> {
        self.template_type.as_deref()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Unaligned sum of field sizes.
    pub fn plain_size(&self) -> usize {
        SizeModel::struct_size(&self.fields, false)
    }

    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    pub fn non_padding_field_count(&self) -> usize {
        self.fields.iter().filter(|f| !f.is_padding()).count()
    }

    pub fn has_pack_offsets(&self) -> bool {
        self.fields.iter().any(|f| f.pack_offset().is_some())
    }

    /// Identity used for matching; one name may have several definitions.
    pub fn identity(&self) -> (&str, &str, usize) {
        (&self.name, &self.location.file, self.location.line)
    }

    /// `file:name` key that tracks claimed host structs within a pass.
    pub fn unique_id(&self) -> String {
        format!("{}:{}", self.location.file, self.name)
    }

    pub fn validate(&self) -> Result<(), StructureError> {
        if self.name.trim().is_empty() {
            return Err(StructureError::invalid(&self.name, "struct has an empty name"));
        }
        for field in &self.fields {
            field.validate().map_err(|e| match e {
                StructureError::InvalidStructRepresentation { name, reason } => {
                    StructureError::invalid(format!("{}.{}", self.name, name), reason)
                }
                other => other,
            })?;
        }
        Ok(())
    }

    fn recalculate_size(&mut self) {
        self.size = if !self.is_container_buffer {
            SizeModel::struct_size(&self.fields, false)
        } else if self.dialect == Dialect::Shader && self.has_pack_offsets() {
            match SizeModel::packed_size(&self.fields) {
                Ok(size) => size,
                Err(e) => {
                    log::debug!("{} in {}: {}, using register alignment", e, self.name, self.location);
                    SizeModel::struct_size(&self.fields, true)
                }
            }
        } else {
            SizeModel::struct_size(&self.fields, true)
        };
    }
}

impl fmt::Display for StructLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_container_buffer {
            "cbuffer"
        } else if self.is_template_placeholder {
            "template"
        } else {
            "struct"
        };
        write!(
            f,
            "{} {} {} ({} fields, {} bytes) @ {}",
            self.dialect,
            kind,
            self.name,
            self.fields.len(),
            self.size,
            self.location
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_container_sizes() {
        let fields = vec![Field::new("a", "float", 1), Field::new("b", "float", 1)];
        let plain = StructLayout::new("Plain", Dialect::Shader, SourceLocation::new("a.hlsl", 1))
            .with_fields(fields.clone());
        assert_eq!(plain.size(), 8);

        let cbuffer = StructLayout::new("PerFrame", Dialect::Shader, SourceLocation::new("a.hlsl", 5))
            .with_fields(fields)
            .as_container_buffer();
        assert_eq!(cbuffer.size(), 32);
        assert_eq!(cbuffer.plain_size(), 8);
    }

    #[test]
    fn test_packed_container_size() {
        let fields = vec![
            Field::new("a", "float", 1).with_pack_offset("c0.x"),
            Field::new("b", "float", 1).with_pack_offset("c0.y"),
        ];
        let cbuffer = StructLayout::new("Packed", Dialect::Shader, SourceLocation::new("a.hlsl", 1))
            .with_fields(fields)
            .as_container_buffer();
        assert_eq!(cbuffer.size(), 16);
    }

    #[test]
    fn test_validate_names_offending_field() {
        let bad = Field::try_new("ok", "int", 1, 4).unwrap();
        let mut layout = StructLayout::new("Holder", Dialect::Host, SourceLocation::new("a.h", 1));
        layout.add_field(bad);
        assert!(layout.validate().is_ok());

        let empty = StructLayout::new("  ", Dialect::Host, SourceLocation::default());
        let err = empty.validate().unwrap_err();
        assert!(matches!(err, StructureError::InvalidStructRepresentation { .. }));
    }
}
