//! The three backlog tasks the service schedules.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::error;
use uuid::Uuid;

use super::worker::BacklogTask;
use crate::config::ScheduleSettings;
use crate::context::AmbientContext;
use crate::error::{ConfigError, ProcessError, StoreError};
use crate::models::{Document, DocumentStatus, Tag};
use crate::store::{DocumentOrder, DocumentQuery, Session, TagQuery};
use crate::utils::{DocumentAnalyzer, DocumentIndexingUtility, TagIndexingUtility};

/// Extracts observables from submitted documents, newest registration first.
pub struct DocumentAnalysisTask {
    analyzer: DocumentAnalyzer,
    settings: ScheduleSettings,
}

impl DocumentAnalysisTask {
    pub fn new(analyzer: DocumentAnalyzer, settings: ScheduleSettings) -> Self {
        Self { analyzer, settings }
    }
}

#[async_trait]
impl BacklogTask for DocumentAnalysisTask {
    type Item = Document;

    fn name(&self) -> &'static str {
        "document_analyzer"
    }

    fn check_settings(&self) -> Result<(), ConfigError> {
        self.settings.analyzer_interval()?;
        self.settings.batch_size()?;
        Ok(())
    }

    async fn backlog(
        &self,
        session: &mut dyn Session,
        processed: &HashSet<Uuid>,
    ) -> Result<Vec<Document>, StoreError> {
        let query = DocumentQuery::new()
            .with_status(DocumentStatus::Submitted)
            .excluding(processed)
            .order_by(DocumentOrder::RegistrationDateDesc)
            .limit(self.settings.batch_size);
        session.documents(&query).await
    }

    async fn process(&self, ctx: &mut AmbientContext, document: &mut Document) -> Result<(), ProcessError> {
        self.analyzer.analyze(ctx, document).await
    }

    fn complete(&self, session: &mut dyn Session, document: Document) {
        session.update_document(document);
    }

    /// A document that cannot be analyzed is parked in `Error` for good.
    fn fail(&self, session: &mut dyn Session, mut document: Document, _error: &ProcessError) -> bool {
        error!(document_id = %document.id, "could not analyze document, skipping forever");
        document.status = DocumentStatus::Error;
        document.modification_date = Utc::now();
        session.update_document(document);
        true
    }
}

/// Re-indexes registered documents whose index lags their content.
pub struct DocumentIndexingTask {
    indexer: DocumentIndexingUtility,
    settings: ScheduleSettings,
}

impl DocumentIndexingTask {
    pub fn new(indexer: DocumentIndexingUtility, settings: ScheduleSettings) -> Self {
        Self { indexer, settings }
    }
}

#[async_trait]
impl BacklogTask for DocumentIndexingTask {
    type Item = Document;

    fn name(&self) -> &'static str {
        "document_indexer"
    }

    fn check_settings(&self) -> Result<(), ConfigError> {
        self.settings.indexing_interval()?;
        self.settings.max_indexing_delay()?;
        self.settings.batch_size()?;
        Ok(())
    }

    async fn backlog(
        &self,
        session: &mut dyn Session,
        processed: &HashSet<Uuid>,
    ) -> Result<Vec<Document>, StoreError> {
        let query = DocumentQuery::new()
            .with_status(DocumentStatus::Registered)
            .stale_after(max_delay(&self.settings)?)
            .excluding(processed)
            .order_by(DocumentOrder::DocumentDateDesc)
            .limit(self.settings.batch_size);
        session.documents(&query).await
    }

    async fn process(&self, ctx: &mut AmbientContext, document: &mut Document) -> Result<(), ProcessError> {
        *document = ctx
            .session
            .document(document.id)
            .await?
            .ok_or(ProcessError::NotFound {
                entity: "document",
                id: document.id,
            })?;
        if document.status != DocumentStatus::Registered {
            return Err(ProcessError::Ineligible {
                entity: "document",
                id: document.id,
                reason: format!("status is now {:?}", document.status),
            });
        }
        self.indexer.update(&ctx.current_user, document).await
    }

    fn complete(&self, session: &mut dyn Session, mut document: Document) {
        document.last_index_date = Some(Utc::now());
        session.update_document(document);
    }
}

/// Re-indexes tags that changed, or whose documents changed, since their
/// last index.
pub struct TagIndexingTask {
    indexer: TagIndexingUtility,
    settings: ScheduleSettings,
}

impl TagIndexingTask {
    pub fn new(indexer: TagIndexingUtility, settings: ScheduleSettings) -> Self {
        Self { indexer, settings }
    }
}

#[async_trait]
impl BacklogTask for TagIndexingTask {
    type Item = Tag;

    fn name(&self) -> &'static str {
        "tag_indexer"
    }

    fn check_settings(&self) -> Result<(), ConfigError> {
        self.settings.tag_indexing_interval()?;
        self.settings.max_indexing_delay()?;
        self.settings.batch_size()?;
        Ok(())
    }

    async fn backlog(&self, session: &mut dyn Session, processed: &HashSet<Uuid>) -> Result<Vec<Tag>, StoreError> {
        let query = TagQuery::new()
            .stale_after(max_delay(&self.settings)?)
            .excluding(processed)
            .limit(self.settings.batch_size);
        session.tags(&query).await
    }

    async fn process(&self, ctx: &mut AmbientContext, tag: &mut Tag) -> Result<(), ProcessError> {
        *tag = ctx
            .session
            .tag(tag.id)
            .await?
            .ok_or(ProcessError::NotFound { entity: "tag", id: tag.id })?;
        self.indexer.update(&ctx.current_user, tag).await
    }

    fn complete(&self, session: &mut dyn Session, mut tag: Tag) {
        tag.last_index_date = Some(Utc::now());
        session.update_tag(tag);
    }
}

/// The staleness delay, already range-checked by `check_settings`.
fn max_delay(settings: &ScheduleSettings) -> Result<Duration, StoreError> {
    settings
        .max_indexing_delay()
        .map_err(|e| StoreError::InvalidQuery(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::context::{ContextProvider, StoreContextProvider};
    use crate::models::AppUser;
    use crate::search::MemorySearchIndex;
    use crate::store::MemoryStore;
    use crate::workers::{PassOutcome, PeriodicWorker};

    fn contexts(store: &MemoryStore) -> Arc<StoreContextProvider> {
        Arc::new(StoreContextProvider::new(
            Arc::new(store.clone()),
            AppUser::system("system"),
        ))
    }

    #[tokio::test]
    async fn test_analysis_registers_submitted_documents() {
        let store = MemoryStore::new();
        let doc = Document::new("report", "beacon to 198.51.100.7");
        store.insert_document(doc.clone()).unwrap();
        let worker = PeriodicWorker::new(
            DocumentAnalysisTask::new(DocumentAnalyzer::default(), ScheduleSettings::default()),
            contexts(&store),
        );

        let outcome = worker.run_pass().await;

        assert!(matches!(outcome, PassOutcome::Completed(r) if r.succeeded == 1));
        let stored = store.get_document(doc.id).unwrap().unwrap();
        assert_eq!(stored.status, DocumentStatus::Registered);
        assert_eq!(stored.observables.len(), 1);
        assert_eq!(stored.observables[0].valu, "198.51.100.7");
    }

    #[tokio::test]
    async fn test_analysis_failure_is_terminal() {
        let store = MemoryStore::new();
        let doc = Document::new("scan", "");
        store.insert_document(doc.clone()).unwrap();
        let worker = PeriodicWorker::new(
            DocumentAnalysisTask::new(DocumentAnalyzer::default(), ScheduleSettings::default()),
            contexts(&store),
        );

        let outcome = worker.run_pass().await;
        assert!(matches!(outcome, PassOutcome::Completed(r) if r.failed == 1));
        assert_eq!(
            store.get_document(doc.id).unwrap().unwrap().status,
            DocumentStatus::Error
        );

        // Nothing left for the next beat
        let outcome = worker.run_pass().await;
        assert!(matches!(outcome, PassOutcome::Completed(r) if r.handled() == 0));
    }

    #[tokio::test]
    async fn test_indexing_skips_submitted_and_fresh_documents() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let stale = Document::new("stale", "t").with_status(DocumentStatus::Registered);
        let fresh = Document::new("fresh", "t")
            .with_status(DocumentStatus::Registered)
            .modified_at(now)
            .indexed_at(now);
        let pending = Document::new("pending", "t");
        for doc in [&stale, &fresh, &pending] {
            store.insert_document(doc.clone()).unwrap();
        }
        let index = MemorySearchIndex::new();
        let worker = PeriodicWorker::new(
            DocumentIndexingTask::new(
                DocumentIndexingUtility::new(Arc::new(index.clone())),
                ScheduleSettings::default(),
            ),
            contexts(&store),
        );

        worker.run_pass().await;

        assert!(index.indexed_document(stale.id).is_some());
        assert!(index.indexed_document(fresh.id).is_none());
        assert!(index.indexed_document(pending.id).is_none());
        assert!(store.get_document(stale.id).unwrap().unwrap().last_index_date.is_some());
    }

    #[tokio::test]
    async fn test_tag_indexing_sets_last_index_date() {
        let store = MemoryStore::new();
        let tag = Tag::new("apt28");
        store.insert_tag(tag.clone()).unwrap();
        let index = MemorySearchIndex::new();
        let worker = PeriodicWorker::new(
            TagIndexingTask::new(
                TagIndexingUtility::new(Arc::new(index.clone())),
                ScheduleSettings::default(),
            ),
            contexts(&store),
        );

        worker.run_pass().await;

        assert_eq!(index.tag_count(), 1);
        assert!(store.get_tag(tag.id).unwrap().unwrap().last_index_date.is_some());
    }

    #[tokio::test]
    async fn test_non_positive_delay_aborts_pass() {
        let store = MemoryStore::new();
        store.insert_tag(Tag::new("apt28")).unwrap();
        let index = MemorySearchIndex::new();
        let settings = ScheduleSettings {
            max_indexing_delay: 0,
            ..Default::default()
        };
        let worker = PeriodicWorker::new(
            TagIndexingTask::new(TagIndexingUtility::new(Arc::new(index.clone())), settings),
            contexts(&store),
        );

        let outcome = worker.run_pass().await;

        assert_eq!(
            outcome,
            PassOutcome::Aborted("max_indexing_delay must be positive, got 0".into())
        );
        assert_eq!(index.tag_count(), 0);
        assert_eq!(store.sessions_opened(), 0);
        assert!(!worker.is_running());
    }

    #[tokio::test]
    async fn test_oversized_delay_aborts_instead_of_panicking() {
        let store = MemoryStore::new();
        store.insert_tag(Tag::new("apt28")).unwrap();
        let index = MemorySearchIndex::new();
        let settings = ScheduleSettings {
            max_indexing_delay: 200_000_000_000_000,
            ..Default::default()
        };
        let worker = Arc::new(PeriodicWorker::new(
            TagIndexingTask::new(TagIndexingUtility::new(Arc::new(index.clone())), settings),
            contexts(&store),
        ));

        let outcome = tokio::spawn({
            let worker = worker.clone();
            async move { worker.run_pass().await }
        })
        .await
        .unwrap();

        assert!(matches!(outcome, PassOutcome::Aborted(reason) if reason.contains("must be at most")));
        assert_eq!(index.tag_count(), 0);
        assert!(!worker.is_running());
    }

    #[tokio::test]
    async fn test_indexing_passes_run_on_spawned_tasks() {
        let store = MemoryStore::new();
        let doc = Document::new("r", "t").with_status(DocumentStatus::Registered);
        let tag = Tag::new("fin7");
        store.insert_document(doc.clone()).unwrap();
        store.insert_tag(tag.clone()).unwrap();
        let index = MemorySearchIndex::new();
        let documents = Arc::new(PeriodicWorker::new(
            DocumentIndexingTask::new(
                DocumentIndexingUtility::new(Arc::new(index.clone())),
                ScheduleSettings::default(),
            ),
            contexts(&store),
        ));
        let tags = Arc::new(PeriodicWorker::new(
            TagIndexingTask::new(
                TagIndexingUtility::new(Arc::new(index.clone())),
                ScheduleSettings::default(),
            ),
            contexts(&store),
        ));

        let (documents, tags) = tokio::join!(
            tokio::spawn(async move { documents.run_pass().await }),
            tokio::spawn(async move { tags.run_pass().await }),
        );

        assert!(matches!(documents.unwrap(), PassOutcome::Completed(r) if r.succeeded == 1));
        assert!(matches!(tags.unwrap(), PassOutcome::Completed(r) if r.succeeded == 1));
        assert!(index.indexed_document(doc.id).is_some());
        assert!(index.indexed_tag(tag.id).is_some());
    }

    #[tokio::test]
    async fn test_document_no_longer_registered_is_not_indexed() {
        let store = MemoryStore::new();
        let stored = Document::new("r", "t").with_status(DocumentStatus::Error);
        store.insert_document(stored.clone()).unwrap();
        let index = MemorySearchIndex::new();
        let task = DocumentIndexingTask::new(
            DocumentIndexingUtility::new(Arc::new(index.clone())),
            ScheduleSettings::default(),
        );
        let mut ctx = contexts(&store).acquire().await.unwrap();

        // As seen by an earlier backlog query
        let mut claimed = stored.clone().with_status(DocumentStatus::Registered);
        let err = task.process(&mut ctx, &mut claimed).await.unwrap_err();

        assert!(matches!(err, ProcessError::Ineligible { entity: "document", .. }));
        assert_eq!(index.document_count(), 0);
    }
}
