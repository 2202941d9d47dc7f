//! Typed errors for the indexing service.
//!
//! Library code returns these `thiserror` enums; the binary and the
//! configuration loader wrap them with `anyhow` context.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by a [`Store`](crate::store::Store) or one of its sessions.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The entity was deleted or never existed
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// A lock guarding in-memory state was poisoned by a panicking writer
    #[error("store state poisoned")]
    Poisoned,

    /// The query could not be built from the current settings
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Seed data could not be read or parsed
    #[error("seed error: {0}")]
    Seed(String),

    /// Backend-specific failure
    #[error("storage error: {0}")]
    Backend(String),
}

/// Errors raised by a [`SearchIndex`](crate::search::SearchIndex).
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("search backend rejected {entity} {id}: {reason}")]
    Rejected {
        entity: &'static str,
        id: Uuid,
        reason: String,
    },

    #[error("search backend unavailable: {0}")]
    Unavailable(String),
}

/// Why processing one backlog item failed.
///
/// The worker handles `Unauthorized` and `NotFound` as expected conditions
/// and everything else as an unexpected failure.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The current user lacks rights on the item
    #[error("user '{user}' is not allowed to {action}")]
    Unauthorized { user: String, action: &'static str },

    /// The item vanished, typically deleted while the pass was running
    #[error("{entity} {id} no longer exists")]
    NotFound { entity: &'static str, id: Uuid },

    /// The item changed since the backlog query and no longer qualifies
    #[error("{entity} {id} is no longer eligible: {reason}")]
    Ineligible {
        entity: &'static str,
        id: Uuid,
        reason: String,
    },

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("{0}")]
    Other(String),
}

impl From<StoreError> for ProcessError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => ProcessError::NotFound { entity, id },
            other => ProcessError::Store(other),
        }
    }
}

/// A schedule setting outside its valid range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: i64 },

    #[error("{name} must be at most {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: i64,
        max: i64,
    },
}
