//! Scheduled background workers using tokio-cron-scheduler.
//!
//! One repeating job per worker type, each on its own interval:
//!
//! ```text
//! Scheduler
//!     ├─► every ANALYZER_FREQUENCY_CHECK min     ─► document_analyzer.run_pass()
//!     ├─► every INDEXING_FREQUENCY_CHECK min     ─► document_indexer.run_pass()
//!     └─► every TAG_INDEXING_FREQUENCY_CHECK min ─► tag_indexer.run_pass()
//! ```
//!
//! Beats may overlap a pass still in flight; the worker's gate turns those
//! into skips.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

use crate::config::ScheduleSettings;
use crate::context::ContextProvider;
use crate::search::SearchIndex;
use crate::utils::{DocumentAnalyzer, DocumentIndexingUtility, TagIndexingUtility};
use crate::workers::{
    BacklogTask, DocumentAnalysisTask, DocumentIndexingTask, PeriodicWorker, TagIndexingTask,
};

/// The three workers the service runs.
#[derive(Clone)]
pub struct Workers {
    pub analyzer: Arc<PeriodicWorker<DocumentAnalysisTask>>,
    pub document_indexer: Arc<PeriodicWorker<DocumentIndexingTask>>,
    pub tag_indexer: Arc<PeriodicWorker<TagIndexingTask>>,
}

impl Workers {
    pub fn new(
        contexts: Arc<dyn ContextProvider>,
        index: Arc<dyn SearchIndex>,
        settings: ScheduleSettings,
    ) -> Self {
        Self {
            analyzer: Arc::new(PeriodicWorker::new(
                DocumentAnalysisTask::new(DocumentAnalyzer::default(), settings),
                contexts.clone(),
            )),
            document_indexer: Arc::new(PeriodicWorker::new(
                DocumentIndexingTask::new(DocumentIndexingUtility::new(index.clone()), settings),
                contexts.clone(),
            )),
            tag_indexer: Arc::new(PeriodicWorker::new(
                TagIndexingTask::new(TagIndexingUtility::new(index), settings),
                contexts,
            )),
        }
    }
}

/// Running scheduler. Dropping it leaves the jobs armed; call
/// [`Scheduler::shutdown`] to stop them.
pub struct Scheduler {
    inner: JobScheduler,
}

impl Scheduler {
    /// Disarm every timer. A pass already in flight runs to completion.
    pub async fn shutdown(mut self) -> Result<()> {
        self.inner
            .shutdown()
            .await
            .context("Failed to shut down scheduler")?;
        info!("Scheduled workers stopped");
        Ok(())
    }
}

/// How often each worker type is woken.
#[derive(Debug, Clone, Copy)]
struct Intervals {
    analyzer: Duration,
    indexing: Duration,
    tag_indexing: Duration,
}

/// Start all scheduled workers
pub async fn start_scheduler(workers: &Workers, settings: &ScheduleSettings) -> Result<Scheduler> {
    settings.validate().context("Invalid schedule settings")?;

    let intervals = Intervals {
        analyzer: settings.analyzer_interval()?,
        indexing: settings.indexing_interval()?,
        tag_indexing: settings.tag_indexing_interval()?,
    };
    arm(workers, intervals).await
}

async fn arm(workers: &Workers, every: Intervals) -> Result<Scheduler> {
    let scheduler = JobScheduler::new().await?;

    scheduler
        .add(repeating(workers.analyzer.clone(), every.analyzer)?)
        .await?;
    scheduler
        .add(repeating(workers.document_indexer.clone(), every.indexing)?)
        .await?;
    scheduler
        .add(repeating(workers.tag_indexer.clone(), every.tag_indexing)?)
        .await?;
    scheduler.start().await?;

    info!(
        analyzer_every_secs = every.analyzer.as_secs(),
        indexing_every_secs = every.indexing.as_secs(),
        tag_indexing_every_secs = every.tag_indexing.as_secs(),
        "Scheduled workers started"
    );
    Ok(Scheduler { inner: scheduler })
}

fn repeating<T: BacklogTask>(worker: Arc<PeriodicWorker<T>>, every: Duration) -> Result<Job> {
    let name = worker.name();
    let job = Job::new_repeated_async(every, move |_uuid, _lock| {
        let worker = worker.clone();
        Box::pin(async move {
            worker.run_pass().await;
        })
    })
    .with_context(|| format!("Failed to create job for {name}"))?;
    Ok(job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StoreContextProvider;
    use crate::models::AppUser;
    use crate::search::MemorySearchIndex;
    use crate::store::MemoryStore;

    fn workers(settings: ScheduleSettings) -> Workers {
        let contexts = StoreContextProvider::new(Arc::new(MemoryStore::new()), AppUser::system("system"));
        Workers::new(Arc::new(contexts), Arc::new(MemorySearchIndex::new()), settings)
    }

    #[tokio::test]
    async fn test_invalid_settings_refuse_to_start() {
        let settings = ScheduleSettings {
            analyzer_frequency_check: 0,
            ..Default::default()
        };

        let err = start_scheduler(&workers(settings), &settings).await.err().unwrap();
        assert!(format!("{err:#}").contains("analyzer_frequency_check must be positive"));
    }

    #[test]
    fn test_workers_named_per_type() {
        let workers = workers(ScheduleSettings::default());

        assert_eq!(workers.analyzer.name(), "document_analyzer");
        assert_eq!(workers.document_indexer.name(), "document_indexer");
        assert_eq!(workers.tag_indexer.name(), "tag_indexer");
    }

    fn executions(workers: &Workers) -> [u64; 3] {
        [
            workers.analyzer.executions(),
            workers.document_indexer.executions(),
            workers.tag_indexer.executions(),
        ]
    }

    // The cron ticker runs on wall-clock time, so this waits for real.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_armed_jobs_fire_until_shutdown() {
        let workers = workers(ScheduleSettings::default());
        let every = Intervals {
            analyzer: Duration::from_secs(1),
            indexing: Duration::from_secs(1),
            tag_indexing: Duration::from_secs(1),
        };

        let scheduler = arm(&workers, every).await.unwrap();
        tokio::time::sleep(Duration::from_millis(3500)).await;

        let fired = executions(&workers);
        assert!(fired.iter().all(|&n| n > 0), "executions: {fired:?}");

        scheduler.shutdown().await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        let stopped = executions(&workers);
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(executions(&workers), stopped);
    }
}
