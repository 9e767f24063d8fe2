// Tue Jan 13 2026 - Alex

use crate::structure::{Dialect, Field, SourceLocation, StructLayout};

pub struct StructBuilder {
    name: String,
    dialect: Dialect,
    location: SourceLocation,
    fields: Vec<Field>,
    container: bool,
}

impl StructBuilder {
    pub fn new(name: &str, dialect: Dialect) -> Self {
        let ext = match dialect {
            Dialect::Shader => "hlsl",
            Dialect::Host => "h",
        };
        Self {
            name: name.to_string(),
            dialect,
            location: SourceLocation::new(&format!("{}.{}", name.to_lowercase(), ext), 1),
            fields: Vec::new(),
            container: false,
        }
    }

    pub fn shader(name: &str) -> Self {
        Self::new(name, Dialect::Shader)
    }

    pub fn host(name: &str) -> Self {
        Self::new(name, Dialect::Host)
    }

    pub fn at(mut self, file: &str, line: usize) -> Self {
        self.location = SourceLocation::new(file, line);
        self
    }

    pub fn field(mut self, name: &str, type_name: &str) -> Self {
        self.fields.push(Field::new(name, type_name, 1));
        self
    }

    pub fn array_field(mut self, name: &str, type_name: &str, array_size: usize) -> Self {
        self.fields.push(Field::new(name, type_name, array_size));
        self
    }

    pub fn push(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn container(mut self) -> Self {
        self.container = true;
        self
    }

    pub fn build(self) -> StructLayout {
        let layout = StructLayout::new(&self.name, self.dialect, self.location).with_fields(self.fields);
        if self.container {
            layout.as_container_buffer()
        } else {
            layout
        }
    }
}
