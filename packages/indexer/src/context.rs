//! The ambient context a pass runs in: who is acting, and through which
//! storage session.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ProcessError, StoreError};
use crate::models::{AppUser, Permission};
use crate::store::{Session, Store};

/// Identity plus open storage session for one pass.
pub struct AmbientContext {
    pub current_user: AppUser,
    pub session: Box<dyn Session>,
}

impl AmbientContext {
    pub fn new(current_user: AppUser, session: Box<dyn Session>) -> Self {
        Self {
            current_user,
            session,
        }
    }

    /// Fail with [`ProcessError::Unauthorized`] unless the current user holds
    /// `permission`.
    pub fn require(&self, permission: Permission) -> Result<(), ProcessError> {
        self.current_user.require(permission)
    }
}

/// Hands out a fresh [`AmbientContext`] for each pass.
#[async_trait]
pub trait ContextProvider: Send + Sync {
    async fn acquire(&self) -> Result<AmbientContext, StoreError>;
}

/// Opens a new store session per pass, acting as a fixed user.
pub struct StoreContextProvider {
    store: Arc<dyn Store>,
    user: AppUser,
}

impl StoreContextProvider {
    pub fn new(store: Arc<dyn Store>, user: AppUser) -> Self {
        Self { store, user }
    }
}

#[async_trait]
impl ContextProvider for StoreContextProvider {
    async fn acquire(&self) -> Result<AmbientContext, StoreError> {
        let session = self.store.open_session().await?;
        Ok(AmbientContext::new(self.user.clone(), session))
    }
}
