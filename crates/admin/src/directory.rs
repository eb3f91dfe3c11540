//! Role and permission assignment directory.
//!
//! The hosted identity service owns two collections keyed by user: role
//! assignments and permission assignments. Both store free-form text tags.
//! [`AccessDirectory`] is the read side consumed by the
//! [`AuthorizationView`](crate::access::AuthorizationView); tag validation
//! happens in the view, not here, so implementations hand back raw tags.
//!
//! [`InMemoryDirectory`] backs the CLI fixtures and the tests. It also carries
//! the back-office edits (replace roles, replace permissions, grant a role on
//! vendor approval).

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use marketplace_core::{Permission, Role, UserId};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::error::DirectoryError;

/// Read access to role and permission assignments.
pub trait AccessDirectory: Send + Sync + 'static {
    /// Role tags assigned to the user.
    fn role_tags(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<String>, DirectoryError>> + Send;

    /// Permission tags assigned to the user.
    fn permission_tags(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<String>, DirectoryError>> + Send;
}

impl<D: AccessDirectory> AccessDirectory for Arc<D> {
    fn role_tags(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<String>, DirectoryError>> + Send {
        (**self).role_tags(user_id)
    }

    fn permission_tags(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<String>, DirectoryError>> + Send {
        (**self).permission_tags(user_id)
    }
}

/// Assignments for one user, as stored by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRow {
    pub user_id: UserId,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Default)]
struct Assignments {
    roles: Vec<String>,
    permissions: Vec<String>,
}

/// Directory held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    rows: RwLock<HashMap<UserId, Assignments>>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from assignment rows. Later rows for the same user
    /// replace earlier ones.
    #[must_use]
    pub fn from_rows(rows: impl IntoIterator<Item = AssignmentRow>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| {
                (
                    row.user_id,
                    Assignments {
                        roles: row.roles,
                        permissions: row.permissions,
                    },
                )
            })
            .collect();
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Parse a JSON array of [`AssignmentRow`]s.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::InvalidData`] if the JSON does not match.
    pub fn from_json(json: &str) -> Result<Self, DirectoryError> {
        let rows: Vec<AssignmentRow> = serde_json::from_str(json)?;
        Ok(Self::from_rows(rows))
    }

    /// Replace a user's roles.
    #[instrument(skip(self, roles), fields(%user_id))]
    pub async fn set_roles(&self, user_id: UserId, roles: &[Role]) {
        let mut rows = self.rows.write().await;
        rows.entry(user_id).or_default().roles = roles.iter().map(ToString::to_string).collect();
        debug!(count = roles.len(), "Replaced role assignments");
    }

    /// Replace a user's permissions.
    #[instrument(skip(self, permissions), fields(%user_id))]
    pub async fn set_permissions(&self, user_id: UserId, permissions: &[Permission]) {
        let mut rows = self.rows.write().await;
        rows.entry(user_id).or_default().permissions =
            permissions.iter().map(ToString::to_string).collect();
        debug!(count = permissions.len(), "Replaced permission assignments");
    }

    /// Grant a single role. Returns `false` if the user already held it.
    pub async fn grant_role(&self, user_id: UserId, role: Role) -> bool {
        let mut rows = self.rows.write().await;
        let roles = &mut rows.entry(user_id).or_default().roles;
        if roles.iter().any(|tag| tag == role.as_str()) {
            return false;
        }
        roles.push(role.to_string());
        true
    }

    /// Revoke a single role. Returns `false` if the user did not hold it.
    pub async fn revoke_role(&self, user_id: UserId, role: Role) -> bool {
        let mut rows = self.rows.write().await;
        let Some(assignments) = rows.get_mut(&user_id) else {
            return false;
        };
        let before = assignments.roles.len();
        assignments.roles.retain(|tag| tag != role.as_str());
        assignments.roles.len() != before
    }

    /// Store a raw row, tags unchecked.
    pub async fn upsert_row(&self, row: AssignmentRow) {
        self.rows.write().await.insert(
            row.user_id,
            Assignments {
                roles: row.roles,
                permissions: row.permissions,
            },
        );
    }

    /// Users with at least one row, sorted.
    pub async fn users(&self) -> Vec<UserId> {
        let mut users: Vec<_> = self.rows.read().await.keys().copied().collect();
        users.sort_unstable();
        users
    }
}

impl AccessDirectory for InMemoryDirectory {
    async fn role_tags(&self, user_id: UserId) -> Result<Vec<String>, DirectoryError> {
        Ok(self
            .rows
            .read()
            .await
            .get(&user_id)
            .map(|a| a.roles.clone())
            .unwrap_or_default())
    }

    async fn permission_tags(&self, user_id: UserId) -> Result<Vec<String>, DirectoryError> {
        Ok(self
            .rows
            .read()
            .await
            .get(&user_id)
            .map(|a| a.permissions.clone())
            .unwrap_or_default())
    }
}
