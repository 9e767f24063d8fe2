// Tue Jan 13 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StructureError {
    #[error("Invalid struct representation for '{name}': {reason}")]
    InvalidStructRepresentation { name: String, reason: String },
    #[error("Invalid packoffset: {0}")]
    InvalidPackOffset(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StructureError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        StructureError::InvalidStructRepresentation {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
