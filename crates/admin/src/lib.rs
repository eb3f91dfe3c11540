//! Marketplace back-office authorization.
//!
//! Answers "may the signed-in user do X" for the admin area:
//!
//! - [`directory`] - role and permission assignments, keyed by user
//! - [`access`] - the [`AuthorizationView`] and its immutable snapshots
//! - [`guard`] - admin route guard and sidebar navigation
//! - [`telemetry`] - Sentry and tracing setup, failure reporting
//!
//! # Security
//!
//! Authorization fails closed. A user with no identity, a pending fetch, or a
//! failed fetch holds no roles and no permissions.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod config;
pub mod directory;
pub mod error;
pub mod guard;
pub mod telemetry;

pub use access::{AccessSnapshot, AccessStatus, AuthorizationView};
pub use config::{AdminConfig, LogFormat};
pub use directory::{AccessDirectory, AssignmentRow, InMemoryDirectory};
pub use error::{AccessError, DirectoryError};
pub use guard::{AdminSection, GuardDecision, guard_admin, guard_section, visible_sections};
