// Tue Jan 13 2026 - Alex

use crate::structure::{SizeModel, StructureError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static ARRAY_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]$").unwrap());

/// One member of a parsed struct. The name is the display name and carries
/// an `[n]` suffix when the member is an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    name: String,
    type_name: String,
    array_size: usize,
    size: usize,
    is_unknown_type: bool,
    pack_offset: Option<String>,
}

impl Field {
    /// Builds a field and sizes it from its type token.
    pub fn new(name: &str, type_name: &str, array_size: usize) -> Self {
        let array_size = array_size.max(1);
        let (size, is_unknown_type) = SizeModel::field_size(type_name, array_size);
        Self {
            name: display_name(name, array_size),
            type_name: type_name.trim().to_string(),
            array_size,
            size,
            is_unknown_type,
            pack_offset: None,
        }
    }

    /// Like `new`, but `None` when the byte size overflows a `usize`.
    pub fn checked(name: &str, type_name: &str, array_size: usize) -> Option<Self> {
        let array_size = array_size.max(1);
        let (size, is_unknown_type) = SizeModel::checked_field_size(type_name, array_size)?;
        Some(Self {
            name: display_name(name, array_size),
            type_name: type_name.trim().to_string(),
            array_size,
            size,
            is_unknown_type,
            pack_offset: None,
        })
    }

    /// Builds a field with an explicit byte size, checking the invariants.
    pub fn try_new(name: &str, type_name: &str, array_size: usize, size: usize) -> Result<Self, StructureError> {
        let field = Self {
            name: display_name(name, array_size),
            type_name: type_name.trim().to_string(),
            array_size,
            size,
            is_unknown_type: !SizeModel::is_known_type(type_name),
            pack_offset: None,
        };
        field.validate()?;
        Ok(field)
    }

    pub fn with_pack_offset(mut self, pack_offset: &str) -> Self {
        self.pack_offset = Some(pack_offset.trim().to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name with any array suffix removed.
    pub fn base_name(&self) -> &str {
        strip_array_suffix(&self.name)
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Type token with the array extent appended, e.g. `float[3]`.
    pub fn qualified_type(&self) -> String {
        if self.array_size > 1 {
            format!("{}[{}]", self.type_name, self.array_size)
        } else {
            self.type_name.clone()
        }
    }

    pub fn array_size(&self) -> usize {
        self.array_size
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_unknown_type(&self) -> bool {
        self.is_unknown_type
    }

    pub fn pack_offset(&self) -> Option<&str> {
        self.pack_offset.as_deref()
    }

    pub fn is_pointer(&self) -> bool {
        self.type_name.contains('*')
    }

    /// Alignment filler such as `pad`, `_pad0`, `padding[3]` or `tailPad`.
    pub fn is_padding(&self) -> bool {
        let base = self.base_name().to_lowercase();
        base == "pad"
            || base.starts_with("_pad")
            || base.starts_with("pad")
            || base.ends_with("pad")
            || base.starts_with("_padding")
            || base.ends_with("padding")
    }

    pub fn validate(&self) -> Result<(), StructureError> {
        if self.base_name().trim().is_empty() {
            return Err(StructureError::invalid(&self.name, "field has an empty name"));
        }
        if self.type_name.is_empty() {
            return Err(StructureError::invalid(&self.name, "field has an empty type"));
        }
        if self.array_size == 0 {
            return Err(StructureError::invalid(&self.name, "array size must be at least 1"));
        }
        if self.size == 0 {
            return Err(StructureError::invalid(&self.name, "byte size must be greater than 0"));
        }
        Ok(())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({} bytes)", self.type_name, self.name, self.size)
    }
}

pub fn strip_array_suffix(name: &str) -> &str {
    match ARRAY_SUFFIX.find(name) {
        Some(m) => &name[..m.start()],
        None => name,
    }
}

fn display_name(name: &str, array_size: usize) -> String {
    let name = name.trim();
    if array_size > 1 && !name.ends_with(']') {
        format!("{}[{}]", name, array_size)
    } else {
        name.to_string()
    }
}
