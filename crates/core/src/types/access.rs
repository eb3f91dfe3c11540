//! Roles and permissions.
//!
//! Both sets are closed. The hosted directory stores them as free-form text
//! tags, so every tag crossing that boundary goes through [`Role::from_str`]
//! or [`Permission::from_str`] and unknown tags are rejected there.
//!
//! [`Role::from_str`]: std::str::FromStr::from_str
//! [`Permission::from_str`]: std::str::FromStr::from_str

use serde::{Deserialize, Serialize};

/// Error returned when a role tag is not one of [`Role::ALL`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// Error returned when a permission tag is not one of [`Permission::ALL`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown permission: {0}")]
pub struct UnknownPermission(pub String);

/// Coarse role assigned to a user. A user may hold any number of roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access to everything; satisfies every permission check.
    SuperAdmin,
    /// Back-office access, scoped by assigned permissions.
    Admin,
    /// Manages their own store, products, and orders.
    Vendor,
    /// Views analytics and financial reports.
    Shareholder,
    /// Technical access for development and debugging.
    Developer,
    /// Standard customer.
    User,
}

impl Role {
    /// Every role, in display order.
    pub const ALL: [Self; 6] = [
        Self::SuperAdmin,
        Self::Admin,
        Self::Vendor,
        Self::Shareholder,
        Self::Developer,
        Self::User,
    ];

    /// Tag used by the directory.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Vendor => "vendor",
            Self::Shareholder => "shareholder",
            Self::Developer => "developer",
            Self::User => "user",
        }
    }

    /// Human-readable title.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super Admin",
            Self::Admin => "Admin",
            Self::Vendor => "Vendor",
            Self::Shareholder => "Shareholder",
            Self::Developer => "Developer",
            Self::User => "User",
        }
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Full access to everything. Can manage all roles and permissions.",
            Self::Admin => "Administrative access based on assigned permissions.",
            Self::Vendor => "Can manage their own store, products, and orders.",
            Self::Shareholder => "Can view analytics and financial reports.",
            Self::Developer => "Technical access for development and debugging.",
            Self::User => "Standard customer access.",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_owned()))
    }
}

/// Fine-grained capability, assigned independently of roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ManageUsers,
    ManageVendors,
    ManageProducts,
    ManageOrders,
    ManageCategories,
    ViewAnalytics,
    ManageSettings,
    ManageRoles,
    ManagePermissions,
    ManagePayments,
    ViewReports,
    ManageInventory,
}

impl Permission {
    /// Every permission, in display order.
    pub const ALL: [Self; 12] = [
        Self::ManageUsers,
        Self::ManageVendors,
        Self::ManageProducts,
        Self::ManageOrders,
        Self::ManageCategories,
        Self::ViewAnalytics,
        Self::ManageSettings,
        Self::ManageRoles,
        Self::ManagePermissions,
        Self::ManagePayments,
        Self::ViewReports,
        Self::ManageInventory,
    ];

    /// Tag used by the directory.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ManageUsers => "manage_users",
            Self::ManageVendors => "manage_vendors",
            Self::ManageProducts => "manage_products",
            Self::ManageOrders => "manage_orders",
            Self::ManageCategories => "manage_categories",
            Self::ViewAnalytics => "view_analytics",
            Self::ManageSettings => "manage_settings",
            Self::ManageRoles => "manage_roles",
            Self::ManagePermissions => "manage_permissions",
            Self::ManagePayments => "manage_payments",
            Self::ViewReports => "view_reports",
            Self::ManageInventory => "manage_inventory",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::ManageUsers => "Manage Users",
            Self::ManageVendors => "Manage Vendors",
            Self::ManageProducts => "Manage Products",
            Self::ManageOrders => "Manage Orders",
            Self::ManageCategories => "Manage Categories",
            Self::ViewAnalytics => "View Analytics",
            Self::ManageSettings => "Manage Settings",
            Self::ManageRoles => "Manage Roles",
            Self::ManagePermissions => "Manage Permissions",
            Self::ManagePayments => "Manage Payments",
            Self::ViewReports => "View Reports",
            Self::ManageInventory => "Manage Inventory",
        }
    }

    /// What holding the permission allows.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::ManageUsers => "Create, edit, and delete user accounts",
            Self::ManageVendors => "Approve, reject, and manage vendor applications",
            Self::ManageProducts => "Create, edit, and delete products",
            Self::ManageOrders => "View and manage customer orders",
            Self::ManageCategories => "Create and organize product categories",
            Self::ViewAnalytics => "Access dashboards and analytics data",
            Self::ManageSettings => "Configure system settings",
            Self::ManageRoles => "Assign and remove user roles",
            Self::ManagePermissions => "Grant and revoke individual permissions",
            Self::ManagePayments => "Access payment settings and transactions",
            Self::ViewReports => "Generate and view business reports",
            Self::ManageInventory => "Track and update product inventory",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|permission| permission.as_str() == s)
            .ok_or_else(|| UnknownPermission(s.to_owned()))
    }
}
