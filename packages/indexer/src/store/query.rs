//! Backlog queries.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::{Document, DocumentStatus, Tag};

/// Sort order for document queries. All orders are newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentOrder {
    #[default]
    RegistrationDateDesc,
    DocumentDateDesc,
    ModificationDateDesc,
}

/// Filter over documents.
///
/// An empty `statuses` list matches every status.
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
    pub statuses: Vec<DocumentStatus>,
    /// Only documents whose index lags their content by more than this
    pub stale_after: Option<Duration>,
    /// Documents to leave out, typically those already handled this pass
    pub exclude: HashSet<Uuid>,
    pub order: DocumentOrder,
    pub limit: Option<usize>,
}

impl DocumentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: DocumentStatus) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn stale_after(mut self, max_delay: Duration) -> Self {
        self.stale_after = Some(max_delay);
        self
    }

    pub fn excluding(mut self, ids: &HashSet<Uuid>) -> Self {
        self.exclude.extend(ids.iter().copied());
        self
    }

    pub fn order_by(mut self, order: DocumentOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, document: &Document) -> bool {
        (self.statuses.is_empty() || self.statuses.contains(&document.status))
            && !self.exclude.contains(&document.id)
            && self.stale_after.map_or(true, |delay| document.is_stale(delay))
    }

    /// Sort key; larger sorts first.
    pub fn sort_key(&self, document: &Document) -> DateTime<Utc> {
        match self.order {
            DocumentOrder::RegistrationDateDesc => document.registration_date,
            DocumentOrder::DocumentDateDesc => document.document_date,
            DocumentOrder::ModificationDateDesc => document.modification_date,
        }
    }
}

/// Filter over tags. Results come newest modification first.
#[derive(Debug, Clone, Default)]
pub struct TagQuery {
    pub stale_after: Option<Duration>,
    pub exclude: HashSet<Uuid>,
    pub limit: Option<usize>,
}

impl TagQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stale_after(mut self, max_delay: Duration) -> Self {
        self.stale_after = Some(max_delay);
        self
    }

    pub fn excluding(mut self, ids: &HashSet<Uuid>) -> Self {
        self.exclude.extend(ids.iter().copied());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// `latest_document_date` is the newest `document_date` among documents
    /// carrying the tag.
    pub fn matches(&self, tag: &Tag, latest_document_date: Option<DateTime<Utc>>) -> bool {
        !self.exclude.contains(&tag.id)
            && self
                .stale_after
                .map_or(true, |delay| tag.is_stale(delay, latest_document_date))
    }
}
