//! Back-office route guard and navigation.
//!
//! The admin area is closed to everyone who is not an admin. Within it, each
//! section requires one permission (the dashboard requires none). Decisions
//! are made against a single [`AccessSnapshot`].

use marketplace_core::Permission;

use crate::access::AccessSnapshot;

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/auth";
/// Where signed-in non-admins are sent.
pub const HOME_PATH: &str = "/";

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Authorization is still loading; render a placeholder.
    Pending,
    /// Render the requested page.
    Allow,
    /// Nobody is signed in.
    RedirectToLogin,
    /// Signed in, but not an admin.
    RedirectHome,
    /// Admin, but missing the section's permission.
    Forbidden,
}

impl GuardDecision {
    /// Path to navigate to, if this decision is a redirect.
    #[must_use]
    pub const fn redirect_target(self) -> Option<&'static str> {
        match self {
            Self::RedirectToLogin => Some(LOGIN_PATH),
            Self::RedirectHome => Some(HOME_PATH),
            Self::Pending | Self::Allow | Self::Forbidden => None,
        }
    }

    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

impl std::fmt::Display for GuardDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Allow => write!(f, "allow"),
            Self::RedirectToLogin => write!(f, "redirect to {LOGIN_PATH}"),
            Self::RedirectHome => write!(f, "redirect to {HOME_PATH}"),
            Self::Forbidden => write!(f, "forbidden"),
        }
    }
}

/// Decide whether the snapshot may enter the admin area at all.
#[must_use]
pub fn guard_admin(snapshot: &AccessSnapshot) -> GuardDecision {
    if snapshot.is_loading() {
        return GuardDecision::Pending;
    }
    if snapshot.identity().is_none() {
        return GuardDecision::RedirectToLogin;
    }
    if !snapshot.is_admin() {
        return GuardDecision::RedirectHome;
    }
    GuardDecision::Allow
}

/// Sidebar sections of the admin area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminSection {
    Dashboard,
    Users,
    Vendors,
    Products,
    Orders,
    Analytics,
    Roles,
    Settings,
}

impl AdminSection {
    /// Every section, in sidebar order.
    pub const ALL: [Self; 8] = [
        Self::Dashboard,
        Self::Users,
        Self::Vendors,
        Self::Products,
        Self::Orders,
        Self::Analytics,
        Self::Roles,
        Self::Settings,
    ];

    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Dashboard => "/admin",
            Self::Users => "/admin/users",
            Self::Vendors => "/admin/vendors",
            Self::Products => "/admin/products",
            Self::Orders => "/admin/orders",
            Self::Analytics => "/admin/analytics",
            Self::Roles => "/admin/roles",
            Self::Settings => "/admin/settings",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Users => "Users",
            Self::Vendors => "Vendors",
            Self::Products => "Products",
            Self::Orders => "Orders",
            Self::Analytics => "Analytics",
            Self::Roles => "Roles & Permissions",
            Self::Settings => "Settings",
        }
    }

    /// Permission needed to open the section.
    #[must_use]
    pub const fn required_permission(self) -> Option<Permission> {
        match self {
            Self::Dashboard => None,
            Self::Users => Some(Permission::ManageUsers),
            Self::Vendors => Some(Permission::ManageVendors),
            Self::Products => Some(Permission::ManageProducts),
            Self::Orders => Some(Permission::ManageOrders),
            Self::Analytics => Some(Permission::ViewAnalytics),
            Self::Roles => Some(Permission::ManageRoles),
            Self::Settings => Some(Permission::ManageSettings),
        }
    }

    /// Section served at `path`. A trailing slash is ignored.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };
        Self::ALL.into_iter().find(|section| section.path() == path)
    }
}

/// Decide whether the snapshot may open `section`.
#[must_use]
pub fn guard_section(snapshot: &AccessSnapshot, section: AdminSection) -> GuardDecision {
    match guard_admin(snapshot) {
        GuardDecision::Allow => match section.required_permission() {
            Some(permission) if !snapshot.has_permission(permission) => GuardDecision::Forbidden,
            _ => GuardDecision::Allow,
        },
        other => other,
    }
}

/// Sections to show in the sidebar. Empty unless the snapshot is admitted.
#[must_use]
pub fn visible_sections(snapshot: &AccessSnapshot) -> Vec<AdminSection> {
    AdminSection::ALL
        .into_iter()
        .filter(|section| guard_section(snapshot, *section).is_allowed())
        .collect()
}
