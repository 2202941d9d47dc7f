//! Generic single-flight periodic worker.
//!
//! # Architecture
//!
//! ```text
//! timer beat
//!     │
//!     ├─► gate busy? ──► log, skip this beat
//!     ├─► check settings ──► invalid: warn, abort
//!     ├─► acquire context (user + fresh session)
//!     └─► drain loop
//!             ├─► backlog(excluding processed) ──► empty: done
//!             └─► for each item: process → complete + persist
//!                                 └─► failure: log, skip, optional fail hook
//! ```
//!
//! Every item handled in a pass, successful or not, joins the processed set
//! and is excluded from later backlog queries in that pass.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::gate::PassGate;
use crate::context::{AmbientContext, ContextProvider};
use crate::error::{ConfigError, ProcessError, StoreError};
use crate::models::{Document, Tag};
use crate::store::Session;

/// Something a worker can pull from a backlog.
pub trait BacklogItem: Send + 'static {
    const KIND: &'static str;

    fn id(&self) -> Uuid;
}

impl BacklogItem for Document {
    const KIND: &'static str = "document";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl BacklogItem for Tag {
    const KIND: &'static str = "tag";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// What one worker type does with its backlog.
#[async_trait]
pub trait BacklogTask: Send + Sync + 'static {
    type Item: BacklogItem;

    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Validate the settings this task depends on. Runs at the start of
    /// every pass.
    fn check_settings(&self) -> Result<(), ConfigError>;

    /// Next batch of eligible items, leaving out `processed`.
    async fn backlog(
        &self,
        session: &mut dyn Session,
        processed: &HashSet<Uuid>,
    ) -> Result<Vec<Self::Item>, StoreError>;

    async fn process(&self, ctx: &mut AmbientContext, item: &mut Self::Item) -> Result<(), ProcessError>;

    /// Stage the bookkeeping for a successfully processed item.
    fn complete(&self, session: &mut dyn Session, item: Self::Item);

    /// Stage changes for an item that failed unexpectedly. Returns `true`
    /// when something was staged and should be persisted.
    fn fail(&self, _session: &mut dyn Session, _item: Self::Item, _error: &ProcessError) -> bool {
        false
    }
}

/// Per-item tallies for one completed pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub succeeded: usize,
    pub unauthorized: usize,
    pub missing: usize,
    /// Items that changed state between the backlog query and processing
    pub skipped: usize,
    pub failed: usize,
}

impl PassReport {
    pub fn handled(&self) -> usize {
        self.succeeded + self.unauthorized + self.missing + self.skipped + self.failed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// Another pass was still in flight
    Skipped,
    /// The pass stopped before touching any item
    Aborted(String),
    Completed(PassReport),
}

/// Runs passes of a [`BacklogTask`], at most one at a time.
pub struct PeriodicWorker<T: BacklogTask> {
    task: T,
    contexts: Arc<dyn ContextProvider>,
    gate: PassGate,
    executions: AtomicU64,
}

impl<T: BacklogTask> PeriodicWorker<T> {
    pub fn new(task: T, contexts: Arc<dyn ContextProvider>) -> Self {
        Self {
            task,
            contexts,
            gate: PassGate::new(),
            executions: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.task.name()
    }

    pub fn task(&self) -> &T {
        &self.task
    }

    /// Passes started so far, not counting skipped beats.
    pub fn executions(&self) -> u64 {
        self.executions.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.gate.is_running()
    }

    /// Run one pass. Never fails; problems are logged and reported through
    /// the returned [`PassOutcome`].
    pub async fn run_pass(&self) -> PassOutcome {
        let worker = self.task.name();

        let Some(_guard) = self.gate.try_acquire() else {
            info!(worker, "previous pass still running, skipping this beat");
            return PassOutcome::Skipped;
        };

        let count = self.executions.fetch_add(1, Ordering::SeqCst) + 1;
        info!(worker, count, "pass started");

        if let Err(e) = self.task.check_settings() {
            warn!(worker, error = %e, "invalid configuration, pass aborted");
            return PassOutcome::Aborted(e.to_string());
        }

        let mut ctx = match self.contexts.acquire().await {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!(worker, error = %e, "could not acquire context, pass aborted");
                return PassOutcome::Aborted(e.to_string());
            }
        };

        let report = self.drain(&mut ctx).await;
        info!(
            worker,
            succeeded = report.succeeded,
            unauthorized = report.unauthorized,
            missing = report.missing,
            skipped = report.skipped,
            failed = report.failed,
            "pass completed"
        );
        PassOutcome::Completed(report)
    }

    async fn drain(&self, ctx: &mut AmbientContext) -> PassReport {
        let worker = self.task.name();
        let kind = T::Item::KIND;
        let mut processed = HashSet::new();
        let mut report = PassReport::default();

        loop {
            let batch = match self.task.backlog(ctx.session.as_mut(), &processed).await {
                Ok(batch) => batch,
                Err(e) => {
                    error!(worker, error = %e, "backlog query failed, ending pass");
                    break;
                }
            };
            if batch.is_empty() {
                break;
            }
            debug!(worker, batch = batch.len(), "fetched backlog batch");

            let mut progressed = false;
            for mut item in batch {
                let id = item.id();
                if !processed.insert(id) {
                    continue;
                }
                progressed = true;

                match self.task.process(ctx, &mut item).await {
                    Ok(()) => {
                        self.task.complete(ctx.session.as_mut(), item);
                        match ctx.session.persist().await {
                            Ok(_) => {
                                debug!(worker, kind, id = %id, "processed");
                                report.succeeded += 1;
                            }
                            Err(StoreError::NotFound { .. }) => {
                                warn!(worker, kind, id = %id, "deleted before it could be saved");
                                report.missing += 1;
                            }
                            Err(e) => {
                                error!(worker, kind, id = %id, error = ?e, "could not save");
                                report.failed += 1;
                            }
                        }
                    }
                    Err(ProcessError::Unauthorized { user, action }) => {
                        warn!(worker, kind, id = %id, user = %user, action, "not authorized, skipping");
                        report.unauthorized += 1;
                    }
                    Err(ProcessError::NotFound { .. }) => {
                        warn!(worker, kind, id = %id, "no longer exists, skipping");
                        report.missing += 1;
                    }
                    Err(e @ ProcessError::Ineligible { .. }) => {
                        debug!(worker, kind, id = %id, reason = %e, "no longer eligible, skipping");
                        report.skipped += 1;
                    }
                    Err(e) => {
                        error!(worker, kind, id = %id, error = ?e, "processing failed");
                        report.failed += 1;
                        if self.task.fail(ctx.session.as_mut(), item, &e) {
                            if let Err(e) = ctx.session.persist().await {
                                error!(worker, kind, id = %id, error = %e, "could not save failure state");
                            }
                        }
                    }
                }
            }

            // A backlog that only returns items already handled would never drain
            if !progressed {
                warn!(worker, "backlog returned only processed items, ending pass");
                break;
            }
        }

        report
    }
}
