use std::sync::Arc;

use crate::error::ProcessError;
use crate::models::{AppUser, Document, Permission, Tag};
use crate::search::SearchIndex;

/// Pushes a document's current state to the search index.
#[derive(Clone)]
pub struct DocumentIndexingUtility {
    index: Arc<dyn SearchIndex>,
}

impl DocumentIndexingUtility {
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        Self { index }
    }

    pub async fn update(&self, user: &AppUser, document: &Document) -> Result<(), ProcessError> {
        user.require(Permission::IndexDocuments)?;
        self.index.update_document(document).await?;
        Ok(())
    }
}

/// Pushes a tag's current state to the search index.
#[derive(Clone)]
pub struct TagIndexingUtility {
    index: Arc<dyn SearchIndex>,
}

impl TagIndexingUtility {
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        Self { index }
    }

    pub async fn update(&self, user: &AppUser, tag: &Tag) -> Result<(), ProcessError> {
        user.require(Permission::IndexTags)?;
        self.index.update_tag(tag).await?;
        Ok(())
    }
}
