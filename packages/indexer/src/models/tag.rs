use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A label attached to documents, indexed separately for faceted search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub label: String,
    #[serde(default)]
    pub facet: Option<String>,
    pub modification_date: DateTime<Utc>,
    #[serde(default)]
    pub last_index_date: Option<DateTime<Utc>>,
}

impl Tag {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            facet: None,
            modification_date: Utc::now(),
            last_index_date: None,
        }
    }

    pub fn modified_at(mut self, date: DateTime<Utc>) -> Self {
        self.modification_date = date;
        self
    }

    pub fn indexed_at(mut self, date: DateTime<Utc>) -> Self {
        self.last_index_date = Some(date);
        self
    }

    /// Whether the tag needs re-indexing.
    ///
    /// `latest_document_date` is the newest `document_date` among documents
    /// carrying this tag; a newer tagged document changes the tag's search
    /// facets even when the tag itself was not edited.
    pub fn is_stale(&self, max_delay: Duration, latest_document_date: Option<DateTime<Utc>>) -> bool {
        let Some(indexed) = self.last_index_date else {
            return true;
        };

        let document_lag = latest_document_date.is_some_and(|latest| latest - indexed > max_delay);
        document_lag || self.modification_date - indexed > max_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_indexed_is_stale() {
        assert!(Tag::new("ransomware").is_stale(Duration::minutes(5), None));
    }

    #[test]
    fn test_newer_tagged_document_makes_stale() {
        let now = Utc::now();
        let tag = Tag::new("apt29").modified_at(now).indexed_at(now);

        assert!(!tag.is_stale(Duration::minutes(5), None));
        assert!(!tag.is_stale(Duration::minutes(5), Some(now + Duration::minutes(1))));
        assert!(tag.is_stale(Duration::minutes(5), Some(now + Duration::minutes(10))));
    }
}
