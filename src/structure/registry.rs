// Tue Jan 13 2026 - Alex

use crate::structure::{Dialect, Field, SizeModel, StructLayout};
use indexmap::IndexMap;

/// Vertex/pixel stage IO blocks never have a host counterpart.
pub fn is_shader_io_struct(name: &str) -> bool {
    let upper = name.to_uppercase();
    upper.ends_with("_INPUT") || upper.ends_with("_OUTPUT")
}

/// All struct definitions of one dialect, keyed by name in discovery order.
#[derive(Debug, Clone)]
pub struct StructRegistry {
    dialect: Dialect,
    structs: IndexMap<String, Vec<StructLayout>>,
}

impl StructRegistry {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            structs: IndexMap::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Adds one definition. Returns false when it was dropped.
    pub fn insert(&mut self, layout: StructLayout) -> bool {
        let name = layout.name().to_string();

        if is_shader_io_struct(&name) {
            log::debug!("Skipping shader IO struct {} in {}", name, layout.location());
            return false;
        }

        let existing = self.structs.entry(name.clone()).or_default();

        if layout.is_template_placeholder() {
            let has_real = existing
                .iter()
                .any(|s| !s.is_template_placeholder() && s.has_fields());
            if has_real {
                log::debug!("Skipping template {}: real definition already registered", name);
                return false;
            }
        } else {
            let before = existing.len();
            existing.retain(|s| !s.is_template_placeholder() || s.has_fields());
            if existing.len() != before {
                log::debug!("Real definition of {} replaces template placeholder", name);
            }
        }

        log::debug!("Registered {}", layout);
        existing.push(layout);
        true
    }

    pub fn extend<I: IntoIterator<Item = StructLayout>>(&mut self, layouts: I) -> usize {
        let mut added = 0;
        for layout in layouts {
            if self.insert(layout) {
                added += 1;
            }
        }
        added
    }

    pub fn get(&self, name: &str) -> &[StructLayout] {
        self.structs.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.structs.get(name).is_some_and(|defs| !defs.is_empty())
    }

    /// Definitions in discovery order, grouped by name.
    pub fn iter(&self) -> impl Iterator<Item = &StructLayout> {
        self.structs.values().flatten()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.structs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.structs.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up a field's type, trying the full token then its last path segment.
    /// Prefers a definition from `prefer_file`.
    pub fn resolve(&self, type_name: &str, prefer_file: &str) -> Option<&StructLayout> {
        let defs = self.lookup(type_name)?;
        defs.iter()
            .find(|s| s.file() == prefer_file)
            .or_else(|| defs.first())
    }

    /// True when the type names a struct of this registry rather than a base type.
    pub fn is_user_type(&self, type_name: &str) -> bool {
        !SizeModel::is_base_type(type_name) && self.lookup(type_name).is_some()
    }

    /// Fields with every nested struct member expanded in place.
    pub fn flatten_fields(&self, layout: &StructLayout) -> Vec<Field> {
        let mut stack = vec![layout.name().to_string()];
        let mut out = Vec::with_capacity(layout.fields().len());
        self.flatten_into(layout, &mut stack, &mut out);
        out
    }

    fn flatten_into(&self, layout: &StructLayout, stack: &mut Vec<String>, out: &mut Vec<Field>) {
        for field in layout.fields() {
            let nested = if SizeModel::is_base_type(field.type_name()) {
                None
            } else {
                self.resolve(field.type_name(), layout.file())
                    .filter(|n| n.has_fields() && !stack.iter().any(|s| s == n.name()))
            };

            match nested {
                Some(nested) => {
                    stack.push(nested.name().to_string());
                    self.flatten_into(nested, stack, out);
                    stack.pop();
                }
                None => out.push(field.clone()),
            }
        }
    }

    fn lookup(&self, type_name: &str) -> Option<&Vec<StructLayout>> {
        let trimmed = type_name.trim();
        self.structs
            .get(trimmed)
            .filter(|defs| !defs.is_empty())
            .or_else(|| {
                let last = trimmed.rsplit("::").next()?;
                self.structs.get(last).filter(|defs| !defs.is_empty())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{SourceLocation, StructBuilder};

    #[test]
    fn test_real_definition_replaces_placeholder() {
        let mut registry = StructRegistry::new(Dialect::Shader);
        assert!(registry.insert(StructLayout::placeholder("Light", SourceLocation::new("a.hlsl", 3), None)));
        assert!(registry.insert(StructBuilder::shader("Light").field("color", "float3").build()));

        let defs = registry.get("Light");
        assert_eq!(defs.len(), 1);
        assert!(!defs[0].is_template_placeholder());

        assert!(!registry.insert(StructLayout::placeholder("Light", SourceLocation::new("b.hlsl", 9), None)));
        assert_eq!(registry.get("Light").len(), 1);
    }

    #[test]
    fn test_shader_io_structs_skipped() {
        let mut registry = StructRegistry::new(Dialect::Shader);
        assert!(!registry.insert(StructBuilder::shader("VS_OUTPUT").field("pos", "float4").build()));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_flatten_nested_fields() {
        let mut registry = StructRegistry::new(Dialect::Host);
        registry.insert(
            StructBuilder::host("Inner")
                .at("types.h", 1)
                .field("a", "float")
                .field("b", "float")
                .build(),
        );
        let outer = StructBuilder::host("Outer")
            .at("types.h", 10)
            .field("inner", "Inner")
            .field("c", "uint")
            .build();
        registry.insert(outer.clone());

        let flat = registry.flatten_fields(&outer);
        let names: Vec<&str> = flat.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(registry.is_user_type("Inner"));
        assert!(registry.is_user_type("ns::Inner"));
        assert!(!registry.is_user_type("float4"));
    }

    #[test]
    fn test_flatten_stops_on_self_reference() {
        let mut registry = StructRegistry::new(Dialect::Host);
        let node = StructBuilder::host("Node").field("value", "float").field("next", "Node").build();
        registry.insert(node.clone());
        let flat = registry.flatten_fields(&node);
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn test_resolve_prefers_same_file() {
        let mut registry = StructRegistry::new(Dialect::Shader);
        registry.insert(StructBuilder::shader("Common").at("a.hlsl", 1).field("x", "float").build());
        registry.insert(StructBuilder::shader("Common").at("b.hlsl", 1).field("y", "float").build());
        let resolved = registry.resolve("Common", "b.hlsl").unwrap();
        assert_eq!(resolved.file(), "b.hlsl");
        assert_eq!(registry.resolve("Common", "c.hlsl").unwrap().file(), "a.hlsl");
    }
}
