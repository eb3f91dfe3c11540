//! Access inspection against a directory fixture.
//!
//! # Fixture format
//!
//! ```json
//! [
//!   { "user_id": "0b8e4f7a-3c2d-4e1f-9a6b-5c4d3e2f1a0b", "roles": ["admin"], "permissions": ["manage_users"] }
//! ]
//! ```

use std::path::Path;

use marketplace_admin::{
    AccessSnapshot, AccessStatus, AuthorizationView, InMemoryDirectory, guard_admin,
    visible_sections,
};
use marketplace_core::{Permission, Role, UserId};
use serde::Serialize;

use super::CliError;

/// What the back-office would show the user.
#[derive(Debug, Serialize)]
struct AccessReport {
    user_id: String,
    status: &'static str,
    roles: Vec<Role>,
    effective_permissions: Vec<Permission>,
    admin_access: String,
    redirect: Option<&'static str>,
    sections: Vec<SectionEntry>,
}

#[derive(Debug, Serialize)]
struct SectionEntry {
    label: &'static str,
    path: &'static str,
}

impl AccessReport {
    fn new(user_id: UserId, snapshot: &AccessSnapshot) -> Self {
        let decision = guard_admin(snapshot);
        Self {
            user_id: user_id.to_string(),
            status: match snapshot.status() {
                AccessStatus::Loading => "loading",
                AccessStatus::Ready => "ready",
                AccessStatus::Failed => "failed",
            },
            roles: snapshot.roles().iter().copied().collect(),
            effective_permissions: snapshot.effective_permissions(),
            admin_access: decision.to_string(),
            redirect: decision.redirect_target(),
            sections: visible_sections(snapshot)
                .into_iter()
                .map(|section| SectionEntry {
                    label: section.label(),
                    path: section.path(),
                })
                .collect(),
        }
    }

    #[allow(clippy::print_stdout)]
    fn print(&self) {
        println!("User:        {}", self.user_id);
        println!("Status:      {}", self.status);
        println!("Roles:       {}", join(&self.roles));
        println!("Permissions: {}", join(&self.effective_permissions));
        println!("Admin area:  {}", self.admin_access);
        if !self.sections.is_empty() {
            println!("Sections:");
            for section in &self.sections {
                println!("  {:<20} {}", section.label, section.path);
            }
        }
    }
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    if items.is_empty() {
        return "(none)".to_string();
    }
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve `user_id` through an [`AuthorizationView`] backed by the fixture.
///
/// # Errors
///
/// Returns `CliError` if the fixture cannot be read or parsed.
pub async fn inspect(fixture: &Path, user_id: UserId, json: bool) -> Result<(), CliError> {
    let contents = tokio::fs::read_to_string(fixture)
        .await
        .map_err(|source| CliError::ReadFixture {
            path: fixture.to_path_buf(),
            source,
        })?;
    let directory = InMemoryDirectory::from_json(&contents)?;
    tracing::debug!(users = directory.users().await.len(), "Loaded fixture");

    let view = AuthorizationView::new(directory);
    view.set_identity(Some(user_id)).await;

    let report = AccessReport::new(user_id, &view.snapshot());
    if json {
        #[allow(clippy::print_stdout)]
        {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    } else {
        report.print();
    }
    Ok(())
}
