//! Testing utilities including mock implementations.
//!
//! Useful for exercising the workers without a real search backend.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::{Notify, Semaphore};
use uuid::Uuid;

use crate::error::IndexError;
use crate::models::{Document, Tag};
use crate::search::{MemorySearchIndex, SearchIndex};

/// Record of a call made to the mock index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockIndexCall {
    Document { id: Uuid },
    Tag { id: Uuid },
}

/// Holds index calls until released, so tests can keep a pass in flight.
pub struct IndexGate {
    entered: Notify,
    release: Semaphore,
}

impl Default for IndexGate {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexGate {
    /// A closed gate.
    pub fn new() -> Self {
        Self {
            entered: Notify::new(),
            release: Semaphore::new(0),
        }
    }

    /// Wait until some call is blocked on the gate.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let every current and future call through.
    pub fn open(&self) {
        self.release.add_permits(1);
    }

    async fn pass(&self) {
        self.entered.notify_one();
        let _ = self.release.acquire().await;
    }
}

/// A search index with failure injection and call tracking.
///
/// Successful calls land in an inner [`MemorySearchIndex`].
#[derive(Clone, Default)]
pub struct MockSearchIndex {
    inner: MemorySearchIndex,
    failing: Arc<RwLock<HashSet<Uuid>>>,
    calls: Arc<RwLock<Vec<MockIndexCall>>>,
    gate: Option<Arc<IndexGate>>,
}

impl MockSearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject updates for the given document or tag id.
    pub fn fail_id(self, id: Uuid) -> Self {
        self.failing.write().unwrap().insert(id);
        self
    }

    /// Block every call on `gate` until it is opened.
    pub fn with_gate(mut self, gate: Arc<IndexGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn indexed(&self) -> &MemorySearchIndex {
        &self.inner
    }

    pub fn calls(&self) -> Vec<MockIndexCall> {
        self.calls.read().unwrap().clone()
    }

    fn rejected(&self, entity: &'static str, id: Uuid) -> Option<IndexError> {
        self.failing
            .read()
            .unwrap()
            .contains(&id)
            .then(|| IndexError::Rejected {
                entity,
                id,
                reason: "injected failure".into(),
            })
    }
}

#[async_trait]
impl SearchIndex for MockSearchIndex {
    async fn update_document(&self, document: &Document) -> Result<(), IndexError> {
        self.calls
            .write()
            .unwrap()
            .push(MockIndexCall::Document { id: document.id });
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        if let Some(err) = self.rejected("document", document.id) {
            return Err(err);
        }
        self.inner.update_document(document).await
    }

    async fn update_tag(&self, tag: &Tag) -> Result<(), IndexError> {
        self.calls.write().unwrap().push(MockIndexCall::Tag { id: tag.id });
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        if let Some(err) = self.rejected("tag", tag.id) {
            return Err(err);
        }
        self.inner.update_tag(tag).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_gate_holds_calls_until_opened() {
        let gate = Arc::new(IndexGate::default());
        let index = MockSearchIndex::new().with_gate(gate.clone());
        let doc = Document::new("r", "t");

        let mut update = tokio_test::task::spawn(index.update_document(&doc));
        tokio_test::assert_pending!(update.poll());
        gate.entered().await;
        assert_eq!(index.indexed().document_count(), 0);

        gate.open();
        tokio_test::assert_ready_ok!(update.poll());
        assert_eq!(index.indexed().document_count(), 1);
        assert_eq!(index.calls(), [MockIndexCall::Document { id: doc.id }]);
    }

    #[tokio::test]
    async fn test_failing_id_is_rejected() {
        let tag = Tag::new("apt");
        let index = MockSearchIndex::new().fail_id(tag.id);

        let err = index.update_tag(&tag).await.unwrap_err();

        assert!(matches!(err, IndexError::Rejected { entity: "tag", .. }));
        assert_eq!(index.indexed().tag_count(), 0);
    }
}
