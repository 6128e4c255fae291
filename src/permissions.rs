use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use crate::models::Actor;

/// Permission
///
/// A capability tag attached to a role by the marketplace API (e.g. `manage_orders`).
/// `All` is the wildcard that grants every capability.
///
/// The API owns the vocabulary, so tags this gate does not know are kept verbatim in
/// `Custom` instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Permission {
    All,
    ManageUsers,
    ManageStaffs,
    ManageCategories,
    ManageRoles,
    ManageOrders,
    ManageTransactions,
    Custom(String),
}

impl Permission {
    pub fn as_str(&self) -> &str {
        match self {
            Permission::All => "all",
            Permission::ManageUsers => "manage_users",
            Permission::ManageStaffs => "manage_staffs",
            Permission::ManageCategories => "manage_categories",
            Permission::ManageRoles => "manage_roles",
            Permission::ManageOrders => "manage_orders",
            Permission::ManageTransactions => "manage_transactions",
            Permission::Custom(tag) => tag,
        }
    }
}

impl From<&str> for Permission {
    fn from(tag: &str) -> Self {
        match tag {
            "all" => Permission::All,
            "manage_users" => Permission::ManageUsers,
            "manage_staffs" => Permission::ManageStaffs,
            "manage_categories" => Permission::ManageCategories,
            "manage_roles" => Permission::ManageRoles,
            "manage_orders" => Permission::ManageOrders,
            "manage_transactions" => Permission::ManageTransactions,
            other => Permission::Custom(other.to_string()),
        }
    }
}

impl From<String> for Permission {
    fn from(tag: String) -> Self {
        Permission::from(tag.as_str())
    }
}

impl From<Permission> for String {
    fn from(permission: Permission) -> Self {
        permission.as_str().to_string()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PermissionSet
///
/// The effective permissions of an actor. Ordered so that logs and JSON output are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, permission: &Permission) -> bool {
        self.0.contains(permission)
    }

    /// True when the wildcard `all` tag is held.
    pub fn is_unrestricted(&self) -> bool {
        self.0.contains(&Permission::All)
    }

    /// `all` held, or the given tag held.
    pub fn grants(&self, permission: &Permission) -> bool {
        self.is_unrestricted() || self.contains(permission)
    }

    /// `all` held, or at least one of the alternatives held.
    pub fn grants_any(&self, alternatives: &[Permission]) -> bool {
        self.is_unrestricted() || alternatives.iter().any(|p| self.contains(p))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.0.iter()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        PermissionSet(iter.into_iter().collect())
    }
}

/// user_permissions
///
/// Reads the permission set of an actor. Only the FIRST role is consulted; permissions on
/// any later role are ignored. Yields an empty set when there is no actor, no roles, or
/// the first role carries no permissions.
pub fn user_permissions(actor: Option<&Actor>) -> PermissionSet {
    actor
        .and_then(|actor| actor.roles.as_deref())
        .and_then(|roles| roles.first())
        .and_then(|role| role.permissions.as_deref())
        .map(|permissions| permissions.iter().cloned().collect())
        .unwrap_or_default()
}

/// has_permission
///
/// Checks a single capability. `None` means nothing is required and always passes.
pub fn has_permission(actor: Option<&Actor>, permission: Option<&Permission>) -> bool {
    match permission {
        None => true,
        Some(permission) => user_permissions(actor).grants(permission),
    }
}
