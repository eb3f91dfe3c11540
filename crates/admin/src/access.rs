//! Authorization view for the signed-in back-office user.
//!
//! [`AuthorizationView`] answers "may the current user do X" from an immutable
//! [`AccessSnapshot`]. Snapshots are published on a `watch` channel and
//! replaced whole, so a predicate never sees half of an update.
//!
//! # Refresh ordering
//!
//! Every identity change or refresh takes a sequence number from a monotonic
//! counter at the moment it is *requested*. A fetch result is published only
//! if its sequence is at least the generation of the current snapshot. A slow
//! response to an older request is therefore discarded once a newer request
//! has published anything, whatever order the fetches complete in.
//!
//! # Failure
//!
//! A failed fetch publishes an empty [`AccessStatus::Failed`] snapshot and
//! reports the error to Sentry. The previous snapshot is never left in place.

use std::collections::BTreeSet;
use std::future::Future;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use marketplace_core::{Permission, Role, UserId};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::directory::AccessDirectory;
use crate::error::AccessError;
use crate::telemetry::{report_access_error, set_sentry_user};

/// Resolution state of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessStatus {
    /// A fetch for the current identity has not completed yet.
    Loading,
    /// Assignments were fetched, or nobody is signed in.
    Ready,
    /// The fetch failed; the snapshot grants nothing.
    Failed,
}

/// Roles and permissions of one identity at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessSnapshot {
    generation: u64,
    identity: Option<UserId>,
    status: AccessStatus,
    roles: BTreeSet<Role>,
    permissions: BTreeSet<Permission>,
}

impl AccessSnapshot {
    /// Snapshot before any identity has been set.
    #[must_use]
    pub const fn loading() -> Self {
        Self::empty(0, None, AccessStatus::Loading)
    }

    /// Nobody signed in.
    #[must_use]
    pub const fn signed_out() -> Self {
        Self::empty(0, None, AccessStatus::Ready)
    }

    /// Resolved assignments for `identity`.
    #[must_use]
    pub fn from_assignments(
        identity: UserId,
        roles: impl IntoIterator<Item = Role>,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        Self {
            generation: 0,
            identity: Some(identity),
            status: AccessStatus::Ready,
            roles: roles.into_iter().collect(),
            permissions: permissions.into_iter().collect(),
        }
    }

    const fn empty(generation: u64, identity: Option<UserId>, status: AccessStatus) -> Self {
        Self {
            generation,
            identity,
            status,
            roles: BTreeSet::new(),
            permissions: BTreeSet::new(),
        }
    }

    const fn at(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    /// Sequence number of the request that produced this snapshot.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn identity(&self) -> Option<UserId> {
        self.identity
    }

    #[must_use]
    pub const fn status(&self) -> AccessStatus {
        self.status
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.status, AccessStatus::Loading)
    }

    #[must_use]
    pub const fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    /// Explicitly assigned permissions. See [`Self::effective_permissions`].
    #[must_use]
    pub const fn permissions(&self) -> &BTreeSet<Permission> {
        &self.permissions
    }

    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.has_role(Role::SuperAdmin)
    }

    /// Admins and super admins.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin) || self.is_super_admin()
    }

    #[must_use]
    pub fn is_vendor(&self) -> bool {
        self.has_role(Role::Vendor)
    }

    /// Super admins hold every permission whether or not it is assigned.
    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.is_super_admin() || self.permissions.contains(&permission)
    }

    /// Permissions that [`Self::has_permission`] grants, in display order.
    #[must_use]
    pub fn effective_permissions(&self) -> Vec<Permission> {
        Permission::ALL
            .into_iter()
            .filter(|p| self.has_permission(*p))
            .collect()
    }
}

impl Default for AccessSnapshot {
    fn default() -> Self {
        Self::loading()
    }
}

#[derive(Debug, Clone, Copy)]
enum Request {
    Identity(Option<UserId>),
    Refresh,
}

#[derive(Debug, Clone, Copy)]
struct Ticket {
    sequence: u64,
    identity: Option<UserId>,
}

#[derive(Debug, Default)]
struct Ledger {
    last_issued: u64,
    identity: Option<UserId>,
}

struct Inner<D> {
    directory: D,
    state: watch::Sender<Arc<AccessSnapshot>>,
    ledger: Mutex<Ledger>,
}

/// Shared handle to the current user's authorization.
///
/// Cloning is cheap; clones observe and update the same snapshot.
pub struct AuthorizationView<D> {
    inner: Arc<Inner<D>>,
}

impl<D> Clone for AuthorizationView<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D> std::fmt::Debug for AuthorizationView<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationView")
            .field("snapshot", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

impl<D: AccessDirectory> AuthorizationView<D> {
    /// Create a view with no identity. The snapshot stays
    /// [`AccessStatus::Loading`] until [`Self::set_identity`] is called.
    #[must_use]
    pub fn new(directory: D) -> Self {
        Self {
            inner: Arc::new(Inner {
                directory,
                state: watch::Sender::new(Arc::new(AccessSnapshot::loading())),
                ledger: Mutex::new(Ledger::default()),
            }),
        }
    }

    #[must_use]
    pub fn directory(&self) -> &D {
        &self.inner.directory
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<AccessSnapshot> {
        Arc::clone(&self.inner.state.borrow())
    }

    /// Receiver notified whenever a new snapshot is published.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<AccessSnapshot>> {
        self.inner.state.subscribe()
    }

    /// Switch to a new identity (sign-in, sign-out, session restore).
    ///
    /// The request is sequenced and a pending snapshot published before this
    /// returns; the returned future performs the fetch. Signing out publishes
    /// the empty snapshot immediately.
    pub fn set_identity(
        &self,
        identity: Option<UserId>,
    ) -> impl Future<Output = ()> + Send + use<D> {
        let ticket = self.issue(Request::Identity(identity));
        set_sentry_user(identity);
        info!(
            sequence = ticket.sequence,
            user_id = ?identity.map(|id| id.to_string()),
            "Authorization identity changed"
        );

        let pending = match identity {
            Some(user_id) => AccessSnapshot::empty(0, Some(user_id), AccessStatus::Loading),
            None => AccessSnapshot::signed_out(),
        };
        self.publish(pending.at(ticket.sequence));

        let view = self.clone();
        async move { view.resolve(ticket).await }
    }

    /// Re-fetch assignments for the current identity.
    ///
    /// The current snapshot stays visible until the fetch completes.
    pub fn refresh(&self) -> impl Future<Output = ()> + Send + use<D> {
        let ticket = self.issue(Request::Refresh);
        debug!(sequence = ticket.sequence, "Authorization refresh requested");

        let view = self.clone();
        async move { view.resolve(ticket).await }
    }

    /// [`Self::set_identity`] on a background task.
    pub fn spawn_set_identity(&self, identity: Option<UserId>) -> JoinHandle<()> {
        tokio::spawn(self.set_identity(identity))
    }

    /// [`Self::refresh`] on a background task.
    pub fn spawn_refresh(&self) -> JoinHandle<()> {
        tokio::spawn(self.refresh())
    }

    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.inner.state.borrow().is_super_admin()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.inner.state.borrow().is_admin()
    }

    #[must_use]
    pub fn is_vendor(&self) -> bool {
        self.inner.state.borrow().is_vendor()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading()
    }

    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.inner.state.borrow().has_role(role)
    }

    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.inner.state.borrow().has_permission(permission)
    }

    /// Take the next sequence number.
    fn issue(&self, request: Request) -> Ticket {
        let mut ledger = self
            .inner
            .ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        ledger.last_issued += 1;
        if let Request::Identity(identity) = request {
            ledger.identity = identity;
        }
        Ticket {
            sequence: ledger.last_issued,
            identity: ledger.identity,
        }
    }

    async fn resolve(&self, ticket: Ticket) {
        let Some(user_id) = ticket.identity else {
            self.publish(AccessSnapshot::signed_out().at(ticket.sequence));
            return;
        };

        let snapshot = match self.fetch(user_id).await {
            Ok((roles, permissions)) => {
                debug!(
                    sequence = ticket.sequence,
                    %user_id,
                    roles = roles.len(),
                    permissions = permissions.len(),
                    "Authorization resolved"
                );
                AccessSnapshot {
                    generation: ticket.sequence,
                    identity: Some(user_id),
                    status: AccessStatus::Ready,
                    roles,
                    permissions,
                }
            }
            Err(err) => {
                report_access_error(&err);
                AccessSnapshot::empty(ticket.sequence, Some(user_id), AccessStatus::Failed)
            }
        };
        self.publish(snapshot);
    }

    #[instrument(skip(self), fields(%user_id))]
    async fn fetch(
        &self,
        user_id: UserId,
    ) -> Result<(BTreeSet<Role>, BTreeSet<Permission>), AccessError> {
        let directory = &self.inner.directory;
        let (role_tags, permission_tags) = tokio::try_join!(
            directory.role_tags(user_id),
            directory.permission_tags(user_id)
        )
        .map_err(|source| AccessError::FetchFailed { user_id, source })?;

        Ok((
            parse_tags(&role_tags, "role"),
            parse_tags(&permission_tags, "permission"),
        ))
    }

    /// Replace the snapshot unless a newer request has already published.
    fn publish(&self, snapshot: AccessSnapshot) {
        let sequence = snapshot.generation;
        let mut stale = false;
        self.inner.state.send_if_modified(|current| {
            if sequence < current.generation {
                stale = true;
                return false;
            }
            if **current == snapshot {
                return false;
            }
            *current = Arc::new(snapshot);
            true
        });
        if stale {
            debug!(sequence, "Discarded stale authorization result");
        }
    }
}

/// Parse directory tags, dropping any that are not in the closed set.
fn parse_tags<T>(tags: &[String], kind: &'static str) -> BTreeSet<T>
where
    T: FromStr + Ord,
    T::Err: std::fmt::Display,
{
    tags.iter()
        .filter_map(|tag| match tag.parse::<T>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(kind, error = %e, "Dropping unrecognized authorization tag");
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    use tokio::sync::Semaphore;

    use super::*;
    use crate::directory::{AssignmentRow, InMemoryDirectory};
    use crate::error::DirectoryError;

    /// Directory whose fetches wait until the test opens the user's gate.
    #[derive(Default)]
    struct GatedDirectory {
        rows: InMemoryDirectory,
        gates: std::sync::Mutex<HashMap<UserId, Arc<Semaphore>>>,
    }

    impl GatedDirectory {
        fn gate(&self, user_id: UserId) -> Arc<Semaphore> {
            let mut gates = self.gates.lock().unwrap();
            Arc::clone(
                gates
                    .entry(user_id)
                    .or_insert_with(|| Arc::new(Semaphore::new(0))),
            )
        }

        /// Let one fetch (both collections) through.
        fn open(&self, user_id: UserId) {
            self.gate(user_id).add_permits(2);
        }
    }

    impl AccessDirectory for GatedDirectory {
        async fn role_tags(&self, user_id: UserId) -> Result<Vec<String>, DirectoryError> {
            let gate = self.gate(user_id);
            gate.acquire().await.unwrap().forget();
            self.rows.role_tags(user_id).await
        }

        async fn permission_tags(&self, user_id: UserId) -> Result<Vec<String>, DirectoryError> {
            let gate = self.gate(user_id);
            gate.acquire().await.unwrap().forget();
            self.rows.permission_tags(user_id).await
        }
    }

    /// Directory that can be switched into failure.
    #[derive(Default)]
    struct FlakyDirectory {
        rows: InMemoryDirectory,
        failing: AtomicBool,
        rejecting_permissions: AtomicBool,
    }

    impl AccessDirectory for FlakyDirectory {
        async fn role_tags(&self, user_id: UserId) -> Result<Vec<String>, DirectoryError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(DirectoryError::Unavailable("connection reset".to_string()));
            }
            self.rows.role_tags(user_id).await
        }

        async fn permission_tags(&self, user_id: UserId) -> Result<Vec<String>, DirectoryError> {
            if self.rejecting_permissions.load(Ordering::SeqCst) {
                return Err(DirectoryError::Rejected("permission denied for table".to_string()));
            }
            self.rows.permission_tags(user_id).await
        }
    }

    async fn view_with(
        roles: &[Role],
        permissions: &[Permission],
    ) -> (AuthorizationView<InMemoryDirectory>, UserId) {
        let user = UserId::random();
        let directory = InMemoryDirectory::new();
        directory.set_roles(user, roles).await;
        directory.set_permissions(user, permissions).await;
        let view = AuthorizationView::new(directory);
        view.set_identity(Some(user)).await;
        (view, user)
    }

    #[test]
    fn test_initial_snapshot_is_loading() {
        let view = AuthorizationView::new(InMemoryDirectory::new());
        let snapshot = view.snapshot();
        assert!(snapshot.is_loading());
        assert_eq!(snapshot.identity(), None);
        assert!(!view.is_admin());
    }

    #[tokio::test]
    async fn test_super_admin_holds_every_permission() {
        let (view, _) = view_with(&[Role::SuperAdmin], &[]).await;

        assert!(view.has_permission(Permission::ManageUsers));
        assert!(view.is_super_admin());
        assert!(view.is_admin());
        assert_eq!(
            view.snapshot().effective_permissions(),
            Permission::ALL.to_vec()
        );
    }

    #[tokio::test]
    async fn test_explicit_permission_without_role() {
        let (view, user) = view_with(&[], &[Permission::ManageUsers]).await;

        assert!(view.has_permission(Permission::ManageUsers));
        assert!(!view.has_permission(Permission::ManageVendors));
        assert!(!view.is_admin());

        let snapshot = view.snapshot();
        assert_eq!(snapshot.status(), AccessStatus::Ready);
        assert_eq!(snapshot.identity(), Some(user));
        assert_eq!(snapshot.effective_permissions(), [Permission::ManageUsers]);
    }

    #[tokio::test]
    async fn test_role_predicates() {
        let (view, _) = view_with(&[Role::Admin, Role::Vendor], &[]).await;

        assert!(view.is_admin());
        assert!(!view.is_super_admin());
        assert!(view.is_vendor());
        assert!(view.has_role(Role::Vendor));
        assert!(!view.has_role(Role::Shareholder));
        assert!(!view.has_permission(Permission::ManageOrders));
    }

    #[tokio::test]
    async fn test_signed_out_denies_everything() {
        let (view, _) = view_with(&[Role::SuperAdmin], &[Permission::ManageUsers]).await;

        view.set_identity(None).await;

        let snapshot = view.snapshot();
        assert_eq!(snapshot.status(), AccessStatus::Ready);
        assert_eq!(snapshot.identity(), None);
        for role in Role::ALL {
            assert!(!view.has_role(role));
        }
        for permission in Permission::ALL {
            assert!(!view.has_permission(permission));
        }
    }

    #[tokio::test]
    async fn test_sign_in_publishes_pending_snapshot() {
        let directory = Arc::new(GatedDirectory::default());
        let user = UserId::random();
        directory.rows.set_roles(user, &[Role::Admin]).await;
        let view = AuthorizationView::new(Arc::clone(&directory));

        let task = view.spawn_set_identity(Some(user));
        let pending = view.snapshot();
        assert!(pending.is_loading());
        assert_eq!(pending.identity(), Some(user));
        assert!(!view.is_admin());

        directory.open(user);
        task.await.unwrap();
        assert!(view.is_admin());
        assert!(!view.is_loading());
    }

    #[tokio::test]
    async fn test_unknown_tags_are_dropped() {
        let user = UserId::random();
        let directory = InMemoryDirectory::new();
        directory
            .upsert_row(AssignmentRow {
                user_id: user,
                roles: vec!["owner".to_string(), "admin".to_string()],
                permissions: vec!["manage_everything".to_string(), "view_reports".to_string()],
            })
            .await;
        let view = AuthorizationView::new(directory);

        view.set_identity(Some(user)).await;

        let snapshot = view.snapshot();
        assert_eq!(snapshot.roles().iter().copied().collect::<Vec<_>>(), [Role::Admin]);
        assert_eq!(
            snapshot.permissions().iter().copied().collect::<Vec<_>>(),
            [Permission::ViewReports]
        );
    }

    #[tokio::test]
    async fn test_refresh_picks_up_changes() {
        let (view, user) = view_with(&[Role::User], &[]).await;
        assert!(!view.is_vendor());

        view.directory().grant_role(user, Role::Vendor).await;
        assert!(!view.is_vendor());

        view.refresh().await;
        assert!(view.is_vendor());
    }

    #[tokio::test]
    async fn test_refresh_without_identity_stays_signed_out() {
        let view = AuthorizationView::new(InMemoryDirectory::new());

        view.refresh().await;

        let snapshot = view.snapshot();
        assert_eq!(snapshot.status(), AccessStatus::Ready);
        assert_eq!(snapshot.identity(), None);
    }

    #[tokio::test]
    async fn test_subscribers_see_resolution() {
        let view = AuthorizationView::new(InMemoryDirectory::new());
        let user = UserId::random();
        view.directory().grant_role(user, Role::Admin).await;
        let mut rx = view.subscribe();

        view.set_identity(Some(user)).await;

        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_admin());
    }

    #[tokio::test]
    async fn test_older_request_resolving_last_is_discarded() {
        let directory = Arc::new(GatedDirectory::default());
        let (first, second) = (UserId::random(), UserId::random());
        directory.rows.set_roles(first, &[Role::SuperAdmin]).await;
        directory.rows.set_roles(second, &[Role::Vendor]).await;
        let view = AuthorizationView::new(Arc::clone(&directory));

        let older = view.spawn_set_identity(Some(first));
        let newer = view.spawn_set_identity(Some(second));

        directory.open(second);
        newer.await.unwrap();
        assert!(view.is_vendor());

        directory.open(first);
        older.await.unwrap();

        let snapshot = view.snapshot();
        assert_eq!(snapshot.identity(), Some(second));
        assert!(!snapshot.is_super_admin());
        assert!(snapshot.is_vendor());
    }

    #[tokio::test]
    async fn test_newer_request_resolving_last_wins() {
        let directory = Arc::new(GatedDirectory::default());
        let (first, second) = (UserId::random(), UserId::random());
        directory.rows.set_roles(first, &[Role::SuperAdmin]).await;
        directory.rows.set_roles(second, &[Role::Vendor]).await;
        let view = AuthorizationView::new(Arc::clone(&directory));

        let older = view.spawn_set_identity(Some(first));
        let newer = view.spawn_set_identity(Some(second));

        directory.open(first);
        older.await.unwrap();
        // The newer request's pending snapshot is already published.
        assert!(!view.is_super_admin());
        assert_eq!(view.snapshot().identity(), Some(second));

        directory.open(second);
        newer.await.unwrap();
        assert!(view.is_vendor());
    }

    #[tokio::test]
    async fn test_sign_out_is_not_overwritten_by_slow_sign_in() {
        let directory = Arc::new(GatedDirectory::default());
        let user = UserId::random();
        directory.rows.set_roles(user, &[Role::SuperAdmin]).await;
        let view = AuthorizationView::new(Arc::clone(&directory));

        let sign_in = view.spawn_set_identity(Some(user));
        view.set_identity(None).await;

        directory.open(user);
        sign_in.await.unwrap();

        assert_eq!(view.snapshot().identity(), None);
        assert!(!view.is_super_admin());
    }

    #[tokio::test]
    async fn test_failed_fetch_fails_closed() {
        let directory = Arc::new(FlakyDirectory::default());
        let user = UserId::random();
        directory.rows.set_roles(user, &[Role::SuperAdmin]).await;
        let view = AuthorizationView::new(Arc::clone(&directory));

        view.set_identity(Some(user)).await;
        assert!(view.has_permission(Permission::ManageSettings));

        directory.failing.store(true, Ordering::SeqCst);
        view.refresh().await;

        let snapshot = view.snapshot();
        assert_eq!(snapshot.status(), AccessStatus::Failed);
        assert_eq!(snapshot.identity(), Some(user));
        assert!(!view.is_super_admin());
        assert!(!view.has_permission(Permission::ManageSettings));
    }

    #[tokio::test]
    async fn test_rejected_permission_query_fails_closed() {
        let directory = Arc::new(FlakyDirectory::default());
        let user = UserId::random();
        directory.rows.set_roles(user, &[Role::Admin]).await;
        directory
            .rows
            .set_permissions(user, &[Permission::ManageOrders])
            .await;
        directory.rejecting_permissions.store(true, Ordering::SeqCst);
        let view = AuthorizationView::new(Arc::clone(&directory));

        view.set_identity(Some(user)).await;

        // Roles resolved fine, but a partial answer is not published.
        assert_eq!(view.snapshot().status(), AccessStatus::Failed);
        assert!(!view.is_admin());
        assert!(!view.has_permission(Permission::ManageOrders));

        directory.rejecting_permissions.store(false, Ordering::SeqCst);
        view.refresh().await;
        assert!(view.is_admin());
        assert!(view.has_permission(Permission::ManageOrders));
    }

    #[test]
    fn test_sentry_user_follows_identity() {
        let user = UserId::random();
        let directory = FlakyDirectory::default();
        directory.failing.store(true, Ordering::SeqCst);
        let view = AuthorizationView::new(directory);

        let events = sentry::test::with_captured_events(|| {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(view.set_identity(Some(user)));
            rt.block_on(view.set_identity(None));
            sentry::capture_message("after sign-out", sentry::Level::Info);
        });

        assert_eq!(events.len(), 2);
        let reported = events[0].user.as_ref().and_then(|u| u.id.clone());
        assert_eq!(reported, Some(user.to_string()));
        assert!(events[1].user.is_none());
    }

    #[test]
    fn test_failed_fetch_is_reported() {
        let directory = FlakyDirectory::default();
        directory.failing.store(true, Ordering::SeqCst);
        let view = AuthorizationView::new(directory);

        let events = sentry::test::with_captured_events(|| {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap()
                .block_on(view.set_identity(Some(UserId::random())));
        });

        assert_eq!(events.len(), 1);
        assert_eq!(view.snapshot().status(), AccessStatus::Failed);
    }
}
