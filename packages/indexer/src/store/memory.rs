//! In-memory store for tests and development.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DocumentQuery, Session, Store, TagQuery};
use crate::error::StoreError;
use crate::models::{Document, Tag};

/// Initial contents loaded from a JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Default)]
struct Tables {
    documents: HashMap<Uuid, Document>,
    tags: HashMap<Uuid, Tag>,
}

/// In-memory storage for documents and tags.
///
/// Cloning is cheap and clones share state. Data is lost on restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    sessions_opened: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: Seed) -> Self {
        let store = Self::new();
        if let Ok(mut tables) = store.tables.write() {
            tables.documents = seed.documents.into_iter().map(|d| (d.id, d)).collect();
            tables.tags = seed.tags.into_iter().map(|t| (t.id, t)).collect();
        }
        store
    }

    /// Load a [`Seed`] from a JSON file.
    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Seed(format!("{}: {e}", path.display())))?;
        let seed: Seed = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Seed(format!("{}: {e}", path.display())))?;
        Ok(Self::from_seed(seed))
    }

    pub fn insert_document(&self, document: Document) -> Result<(), StoreError> {
        self.write()?.documents.insert(document.id, document);
        Ok(())
    }

    pub fn insert_tag(&self, tag: Tag) -> Result<(), StoreError> {
        self.write()?.tags.insert(tag.id, tag);
        Ok(())
    }

    pub fn remove_document(&self, id: Uuid) -> Result<Option<Document>, StoreError> {
        Ok(self.write()?.documents.remove(&id))
    }

    pub fn get_document(&self, id: Uuid) -> Result<Option<Document>, StoreError> {
        Ok(self.read()?.documents.get(&id).cloned())
    }

    pub fn get_tag(&self, id: Uuid) -> Result<Option<Tag>, StoreError> {
        Ok(self.read()?.tags.get(&id).cloned())
    }

    pub fn document_count(&self) -> usize {
        self.read().map(|t| t.documents.len()).unwrap_or_default()
    }

    pub fn tag_count(&self) -> usize {
        self.read().map(|t| t.tags.len()).unwrap_or_default()
    }

    /// Number of sessions handed out so far.
    pub fn sessions_opened(&self) -> usize {
        self.sessions_opened.load(Ordering::SeqCst)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables.write().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn open_session(&self) -> Result<Box<dyn Session>, StoreError> {
        self.sessions_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySession {
            store: self.clone(),
            staged_documents: Vec::new(),
            staged_tags: Vec::new(),
        }))
    }
}

/// Session over a [`MemoryStore`].
pub struct MemorySession {
    store: MemoryStore,
    staged_documents: Vec<Document>,
    staged_tags: Vec<Tag>,
}

fn latest_document_date(tables: &Tables, tag_id: Uuid) -> Option<DateTime<Utc>> {
    tables
        .documents
        .values()
        .filter(|d| d.tag_ids.contains(&tag_id))
        .map(|d| d.document_date)
        .max()
}

#[async_trait]
impl Session for MemorySession {
    async fn documents(&mut self, query: &DocumentQuery) -> Result<Vec<Document>, StoreError> {
        let tables = self.store.read()?;
        let mut found: Vec<Document> = tables
            .documents
            .values()
            .filter(|d| query.matches(d))
            .cloned()
            .collect();

        // Newest first; ties broken by id so results are deterministic
        found.sort_by(|a, b| {
            query
                .sort_key(b)
                .cmp(&query.sort_key(a))
                .then_with(|| a.id.cmp(&b.id))
        });
        if let Some(limit) = query.limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn document(&mut self, id: Uuid) -> Result<Option<Document>, StoreError> {
        self.store.get_document(id)
    }

    async fn tags(&mut self, query: &TagQuery) -> Result<Vec<Tag>, StoreError> {
        let tables = self.store.read()?;
        let mut found: Vec<Tag> = tables
            .tags
            .values()
            .filter(|t| query.matches(t, latest_document_date(&tables, t.id)))
            .cloned()
            .collect();

        found.sort_by(|a, b| {
            b.modification_date
                .cmp(&a.modification_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        if let Some(limit) = query.limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn tag(&mut self, id: Uuid) -> Result<Option<Tag>, StoreError> {
        self.store.get_tag(id)
    }

    fn update_document(&mut self, document: Document) {
        self.staged_documents.push(document);
    }

    fn update_tag(&mut self, tag: Tag) {
        self.staged_tags.push(tag);
    }

    async fn persist(&mut self) -> Result<usize, StoreError> {
        let documents = std::mem::take(&mut self.staged_documents);
        let tags = std::mem::take(&mut self.staged_tags);
        let mut tables = self.store.write()?;

        // Entities deleted since they were read are not resurrected
        if let Some(gone) = documents.iter().find(|d| !tables.documents.contains_key(&d.id)) {
            return Err(StoreError::NotFound {
                entity: "document",
                id: gone.id,
            });
        }
        if let Some(gone) = tags.iter().find(|t| !tables.tags.contains_key(&t.id)) {
            return Err(StoreError::NotFound {
                entity: "tag",
                id: gone.id,
            });
        }

        let applied = documents.len() + tags.len();
        for document in documents {
            tables.documents.insert(document.id, document);
        }
        for tag in tags {
            tables.tags.insert(tag.id, tag);
        }
        Ok(applied)
    }
}
