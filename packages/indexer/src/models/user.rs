use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProcessError;

/// Actions the background workers need rights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    AnalyzeDocuments,
    IndexDocuments,
    IndexTags,
}

impl Permission {
    pub const ALL: [Permission; 3] = [
        Permission::AnalyzeDocuments,
        Permission::IndexDocuments,
        Permission::IndexTags,
    ];

    /// Human phrasing used in authorization errors.
    pub fn action(&self) -> &'static str {
        match self {
            Permission::AnalyzeDocuments => "analyze documents",
            Permission::IndexDocuments => "index documents",
            Permission::IndexTags => "index tags",
        }
    }
}

/// The user a pass runs as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUser {
    pub id: Uuid,
    pub username: String,
    pub permissions: HashSet<Permission>,
}

impl AppUser {
    /// A user with no rights.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            permissions: HashSet::new(),
        }
    }

    /// The service account the workers run as, holding every permission.
    pub fn system(username: impl Into<String>) -> Self {
        Self::new(username).with_permissions(Permission::ALL)
    }

    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.permissions.extend(permissions);
        self
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Fail with [`ProcessError::Unauthorized`] unless the user holds
    /// `permission`.
    pub fn require(&self, permission: Permission) -> Result<(), ProcessError> {
        if self.can(permission) {
            Ok(())
        } else {
            Err(ProcessError::Unauthorized {
                user: self.username.clone(),
                action: permission.action(),
            })
        }
    }
}
