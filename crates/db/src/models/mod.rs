//! Row models and DTOs for the local store.

pub mod annotation_row;

pub use annotation_row::{AnnotationRow, ExportRecord, ListFilter};
