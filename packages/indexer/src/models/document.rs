use chrono::{DateTime, Duration, Utc};
use observables::Observable;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a document as seen by the background workers.
///
/// ```text
/// Submitted ──analyze──► Registered ──index──► Registered (last_index_date set)
///     │
///     └──analysis failed──► Error (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Submitted,
    Registered,
    Error,
}

/// A threat-intelligence document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    /// Extracted plain text of the document
    pub content: String,
    pub status: DocumentStatus,
    pub registration_date: DateTime<Utc>,
    /// Publication date of the underlying report
    pub document_date: DateTime<Utc>,
    pub modification_date: DateTime<Utc>,
    #[serde(default)]
    pub last_index_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub observables: Vec<Observable>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

impl Document {
    /// A freshly submitted document, dated now.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            status: DocumentStatus::Submitted,
            registration_date: now,
            document_date: now,
            modification_date: now,
            last_index_date: None,
            observables: Vec::new(),
            tag_ids: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: DocumentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_tags(mut self, tag_ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.tag_ids = tag_ids.into_iter().collect();
        self
    }

    pub fn registered_at(mut self, date: DateTime<Utc>) -> Self {
        self.registration_date = date;
        self
    }

    pub fn dated(mut self, date: DateTime<Utc>) -> Self {
        self.document_date = date;
        self
    }

    pub fn modified_at(mut self, date: DateTime<Utc>) -> Self {
        self.modification_date = date;
        self
    }

    pub fn indexed_at(mut self, date: DateTime<Utc>) -> Self {
        self.last_index_date = Some(date);
        self
    }

    /// Never indexed, or modified more than `max_delay` after the last index.
    pub fn is_stale(&self, max_delay: Duration) -> bool {
        match self.last_index_date {
            None => true,
            Some(indexed) => self.modification_date - indexed > max_delay,
        }
    }
}
