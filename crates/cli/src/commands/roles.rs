//! Role and permission catalog.

use marketplace_core::{Permission, Role};

/// Print every role and permission with its description.
#[allow(clippy::print_stdout)]
pub fn print_catalog() {
    println!("Roles");
    for role in Role::ALL {
        println!("  {:<14} {:<12} {}", role.as_str(), role.title(), role.description());
    }

    println!();
    println!("Permissions");
    for permission in Permission::ALL {
        println!(
            "  {:<20} {:<20} {}",
            permission.as_str(),
            permission.title(),
            permission.description()
        );
    }
}
