//! Background analysis and indexing service for threat-intelligence
//! documents.
//!
//! Three single-flight periodic workers keep a document store and a search
//! index in step:
//!
//! - the **document analyzer** extracts observables from newly submitted
//!   documents and registers them
//! - the **document indexer** pushes registered documents whose index lags
//!   their content to the search index
//! - the **tag indexer** does the same for tags
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use indexer_core::{AppUser, MemorySearchIndex, MemoryStore, StoreContextProvider, Workers};
//!
//! let store = MemoryStore::new();
//! let contexts = StoreContextProvider::new(Arc::new(store), AppUser::system("system"));
//! let workers = Workers::new(Arc::new(contexts), Arc::new(MemorySearchIndex::new()), settings);
//!
//! // Run one pass by hand, or hand the workers to the scheduler
//! workers.analyzer.run_pass().await;
//! let scheduler = indexer_core::start_scheduler(&workers, &settings).await?;
//! ```
//!
//! # Modules
//!
//! - [`config`] - Environment configuration and schedule settings
//! - [`models`] - Documents, tags, and users
//! - [`store`] - Storage session traits and the in-memory store
//! - [`search`] - Search index trait and the in-memory index
//! - [`context`] - Per-pass identity and session
//! - [`utils`] - Per-item analysis and indexing operations
//! - [`workers`] - The single-flight worker and its three tasks
//! - [`scheduler`] - Repeating timers driving the workers
//! - [`testing`] - Mock implementations for testing

pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod search;
pub mod store;
pub mod testing;
pub mod utils;
pub mod workers;

// Re-export core types at crate root
pub use config::{Config, ScheduleSettings};
pub use context::{AmbientContext, ContextProvider, StoreContextProvider};
pub use error::{ConfigError, IndexError, ProcessError, StoreError};
pub use models::{AppUser, Document, DocumentStatus, Permission, Tag};
pub use scheduler::{start_scheduler, Scheduler, Workers};
pub use search::{MemorySearchIndex, SearchIndex};
pub use store::{MemoryStore, Session, Store};
pub use workers::{BacklogTask, PassOutcome, PassReport, PeriodicWorker};
