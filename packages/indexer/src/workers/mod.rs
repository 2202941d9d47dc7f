//! Single-flight periodic workers.

pub mod gate;
pub mod tasks;
pub mod worker;

pub use gate::{PassGate, PassGuard};
pub use tasks::{DocumentAnalysisTask, DocumentIndexingTask, TagIndexingTask};
pub use worker::{BacklogItem, BacklogTask, PassOutcome, PassReport, PeriodicWorker};
