//! Syllabus library exports

pub mod catalog;
pub mod error;

pub use catalog::snapshot::Snapshot;
pub use catalog::CatalogIndex;
pub use error::{CatalogError, Result};
