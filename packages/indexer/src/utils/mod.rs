//! Per-item operations invoked by the workers.

pub mod analyzer;
pub mod indexing;

pub use analyzer::DocumentAnalyzer;
pub use indexing::{DocumentIndexingUtility, TagIndexingUtility};
