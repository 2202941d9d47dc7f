use chrono::Utc;
use observables::ExtractorRegistry;
use tracing::debug;

use crate::context::AmbientContext;
use crate::error::ProcessError;
use crate::models::{Document, DocumentStatus, Permission};

/// Extracts observables from a submitted document and registers it.
pub struct DocumentAnalyzer {
    registry: ExtractorRegistry,
}

impl Default for DocumentAnalyzer {
    fn default() -> Self {
        Self::new(ExtractorRegistry::default())
    }
}

impl DocumentAnalyzer {
    pub fn new(registry: ExtractorRegistry) -> Self {
        Self { registry }
    }

    /// Analyze `document` in place.
    ///
    /// The stored copy is re-read first so a document deleted after the
    /// backlog query surfaces as [`ProcessError::NotFound`]. On success the
    /// document carries its observables and is `Registered`; the caller
    /// stages and persists it.
    pub async fn analyze(
        &self,
        ctx: &mut AmbientContext,
        document: &mut Document,
    ) -> Result<(), ProcessError> {
        ctx.require(Permission::AnalyzeDocuments)?;

        let current = ctx
            .session
            .document(document.id)
            .await?
            .ok_or(ProcessError::NotFound {
                entity: "document",
                id: document.id,
            })?;
        *document = current;

        if document.content.trim().is_empty() {
            return Err(ProcessError::Other("document has no text content".into()));
        }

        let observables = self.registry.extract_all(&document.content);
        debug!(
            document_id = %document.id,
            observables = observables.len(),
            "extracted observables"
        );

        document.observables = observables;
        document.status = DocumentStatus::Registered;
        document.modification_date = Utc::now();
        Ok(())
    }
}
