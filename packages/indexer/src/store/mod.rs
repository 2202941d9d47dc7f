//! Persistence collaborators.
//!
//! The workers only need two things from storage: "give me the items
//! matching this query, in this order" and "save what I changed". Both are
//! expressed per [`Session`], and a session lives for exactly one pass:
//!
//! ```text
//! Store::open_session()  ── once per pass
//!     │
//!     ├─► documents(&DocumentQuery) / tags(&TagQuery)
//!     ├─► update_document(doc) / update_tag(tag)   staged
//!     └─► persist()                                 applied, last write wins
//! ```

pub mod memory;
pub mod query;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Document, Tag};

pub use memory::{MemorySession, MemoryStore, Seed};
pub use query::{DocumentOrder, DocumentQuery, TagQuery};

/// A unit of work against the store.
#[async_trait]
pub trait Session: Send {
    /// Documents matching `query`, ordered and limited as it requests.
    async fn documents(&mut self, query: &DocumentQuery) -> Result<Vec<Document>, StoreError>;

    /// Current persisted state of one document.
    async fn document(&mut self, id: Uuid) -> Result<Option<Document>, StoreError>;

    /// Tags matching `query`, ordered and limited as it requests.
    async fn tags(&mut self, query: &TagQuery) -> Result<Vec<Tag>, StoreError>;

    /// Current persisted state of one tag.
    async fn tag(&mut self, id: Uuid) -> Result<Option<Tag>, StoreError>;

    /// Stage a document write until the next [`persist`](Session::persist).
    fn update_document(&mut self, document: Document);

    /// Stage a tag write until the next [`persist`](Session::persist).
    fn update_tag(&mut self, tag: Tag);

    /// Apply staged writes. Returns how many were applied.
    ///
    /// Staged writes are consumed even on failure so that one bad item does
    /// not poison later saves in the same session.
    async fn persist(&mut self) -> Result<usize, StoreError>;
}

/// Opens sessions.
#[async_trait]
pub trait Store: Send + Sync {
    async fn open_session(&self) -> Result<Box<dyn Session>, StoreError>;
}
