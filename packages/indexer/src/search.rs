//! Full-text search index abstraction.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::IndexError;
use crate::models::{Document, Tag};

/// Receives documents and tags whenever they are (re)indexed.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn update_document(&self, document: &Document) -> Result<(), IndexError>;

    async fn update_tag(&self, tag: &Tag) -> Result<(), IndexError>;
}

#[derive(Default)]
struct Entries {
    documents: HashMap<Uuid, Document>,
    tags: HashMap<Uuid, Tag>,
}

/// Search index kept in memory. Clones share state.
#[derive(Clone, Default)]
pub struct MemorySearchIndex {
    entries: Arc<RwLock<Entries>>,
    updates: Arc<AtomicUsize>,
}

impl MemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indexed_document(&self, id: Uuid) -> Option<Document> {
        self.entries.read().ok()?.documents.get(&id).cloned()
    }

    pub fn indexed_tag(&self, id: Uuid) -> Option<Tag> {
        self.entries.read().ok()?.tags.get(&id).cloned()
    }

    pub fn document_count(&self) -> usize {
        self.entries.read().map(|e| e.documents.len()).unwrap_or_default()
    }

    pub fn tag_count(&self) -> usize {
        self.entries.read().map(|e| e.tags.len()).unwrap_or_default()
    }

    /// Total update calls accepted, counting repeats.
    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchIndex for MemorySearchIndex {
    async fn update_document(&self, document: &Document) -> Result<(), IndexError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| IndexError::Unavailable("index lock poisoned".into()))?;
        entries.documents.insert(document.id, document.clone());
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_tag(&self, tag: &Tag) -> Result<(), IndexError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| IndexError::Unavailable("index lock poisoned".into()))?;
        entries.tags.insert(tag.id, tag.clone());
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
