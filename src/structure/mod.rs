// Tue Jan 15 2026 - Alex

pub mod alignment;
pub mod builder;
pub mod error;
pub mod field;
pub mod layout;
pub mod registry;
pub mod size;

pub use alignment::Alignment;
pub use builder::StructBuilder;
pub use error::StructureError;
pub use field::Field;
pub use layout::{Dialect, SourceLocation, StructLayout};
pub use registry::StructRegistry;
pub use size::SizeModel;
