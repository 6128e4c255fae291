use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{catalog::DASHBOARD_ROOT, models::Actor, resolver};

/// MenuEntry
///
/// One line of the dashboard sidebar: a section header or a navigable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export)]
pub enum MenuEntry {
    Header {
        name: String,
    },
    Item {
        name: String,
        path: String,
        /// Display hint only; visibility is always decided by the resolver.
        permission: Option<String>,
    },
}

// (name, path, permission hint). `None` path marks a section header.
const SIDEBAR: &[(&str, Option<&str>, Option<&str>)] = &[
    ("Dashboard", None, None),
    ("Overview", Some("/dashboard"), None),
    ("Orders", Some("/dashboard/orders"), Some("manage_orders")),
    ("Transactions", Some("/dashboard/transactions"), Some("manage_transactions")),
    ("User Management", Some("/dashboard/user-management"), Some("manage_users")),
    ("Pages", None, None),
    ("Settings", Some("/dashboard/settings"), None),
    // Also reachable with manage_roles.
    ("Members Management", Some("/dashboard/members-management"), Some("manage_staffs")),
    ("Manage Categories", Some("/dashboard/categories"), Some("manage_categories")),
    ("Disputes & Supports", Some("/dashboard/disputes"), Some("all")),
];

/// full_menu
///
/// Every sidebar entry, unfiltered.
pub fn full_menu() -> Vec<MenuEntry> {
    SIDEBAR
        .iter()
        .map(|(name, path, permission)| match path {
            None => MenuEntry::Header {
                name: name.to_string(),
            },
            Some(path) => MenuEntry::Item {
                name: name.to_string(),
                path: path.to_string(),
                permission: permission.map(str::to_string),
            },
        })
        .collect()
}

/// visible_menu
///
/// The sidebar as `actor` sees it. No actor sees nothing; headers are always kept; items
/// without a permission hint are kept; everything else goes through the resolver.
pub fn visible_menu(actor: Option<&Actor>) -> Vec<MenuEntry> {
    let Some(actor) = actor else {
        return vec![];
    };

    full_menu()
        .into_iter()
        .filter(|entry| match entry {
            MenuEntry::Header { .. } => true,
            MenuEntry::Item {
                permission: None, ..
            } => true,
            MenuEntry::Item { path, .. } => resolver::has_access(Some(actor), path),
        })
        .collect()
}

/// is_active
///
/// Highlighting rule: the overview matches only itself, other items match their subtree.
pub fn is_active(item_path: &str, current_path: &str) -> bool {
    if item_path == DASHBOARD_ROOT {
        current_path == item_path
    } else {
        current_path.starts_with(item_path)
    }
}
