use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{models::CatalogEntry, permissions::Permission};

/// RouteId
///
/// Every screen of the admin dashboard. Each one carries an explicit catalog entry, so no
/// dashboard screen is ever resolved through the unlisted fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RouteId {
    Overview,
    Settings,
    UserManagement,
    Orders,
    Transactions,
    Categories,
    CategoryDetail,
    MembersManagement,
    Disputes,
    Notifications,
    CreateNotification,
}

/// Requirement
///
/// What an actor must hold to view a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Open to every actor.
    Public,
    /// `all` or this tag.
    Single(Permission),
    /// `all` or any one of the alternatives.
    AnyOf(Vec<Permission>),
    /// Only the `all` wildcard passes.
    RequiresAll,
}

impl Requirement {
    pub fn view(&self) -> RequirementView {
        let (kind, permissions) = match self {
            Requirement::Public => (RequirementKind::Public, vec![]),
            Requirement::Single(p) => (RequirementKind::Single, vec![p.to_string()]),
            Requirement::AnyOf(ps) => (
                RequirementKind::AnyOf,
                ps.iter().map(Permission::to_string).collect(),
            ),
            Requirement::RequiresAll => {
                (RequirementKind::RequiresAll, vec![Permission::All.to_string()])
            }
        };
        RequirementView { kind, permissions }
    }
}

/// RequirementView
///
/// Wire form of a `Requirement`: the variant plus the tags it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RequirementView {
    pub kind: RequirementKind,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RequirementKind {
    Public,
    Single,
    AnyOf,
    RequiresAll,
}

/// The dashboard root. Also the safe redirect target for permission failures.
pub const DASHBOARD_ROOT: &str = "/dashboard";

// Route prefix table. Prefixes are always exactly two path segments.
const CATALOG: &[(&str, RouteId)] = &[
    ("/dashboard", RouteId::Overview),
    ("/dashboard/settings", RouteId::Settings),
    ("/dashboard/user-management", RouteId::UserManagement),
    ("/dashboard/orders", RouteId::Orders),
    ("/dashboard/transactions", RouteId::Transactions),
    ("/dashboard/categories", RouteId::Categories),
    ("/dashboard/category", RouteId::CategoryDetail),
    ("/dashboard/members-management", RouteId::MembersManagement),
    ("/dashboard/disputes", RouteId::Disputes),
    ("/dashboard/notifications", RouteId::Notifications),
    ("/dashboard/create-notification", RouteId::CreateNotification),
];

impl RouteId {
    pub fn prefix(self) -> &'static str {
        CATALOG
            .iter()
            .find(|(_, id)| *id == self)
            .map(|(prefix, _)| *prefix)
            .unwrap_or(DASHBOARD_ROOT)
    }

    pub fn requirement(self) -> Requirement {
        match self {
            RouteId::Overview | RouteId::Settings => Requirement::Public,
            RouteId::UserManagement => Requirement::Single(Permission::ManageUsers),
            RouteId::Orders => Requirement::Single(Permission::ManageOrders),
            RouteId::Transactions => Requirement::Single(Permission::ManageTransactions),
            RouteId::Categories | RouteId::CategoryDetail => {
                Requirement::Single(Permission::ManageCategories)
            }
            RouteId::MembersManagement => {
                Requirement::AnyOf(vec![Permission::ManageStaffs, Permission::ManageRoles])
            }
            RouteId::Disputes | RouteId::Notifications | RouteId::CreateNotification => {
                Requirement::RequiresAll
            }
        }
    }
}

/// route_key
///
/// Truncates a path to its lookup key: the first two non-empty segments, after dropping any
/// query string or fragment. `/dashboard/orders/42?tab=items` becomes `/dashboard/orders`;
/// an empty path becomes `/`. Every caller uses this one rule, nested detail pages included.
pub fn route_key(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).take(2).collect();
    format!("/{}", segments.join("/"))
}

/// lookup
///
/// Exact match of a key (as produced by `route_key`) against the catalog.
pub fn lookup(key: &str) -> Option<RouteId> {
    CATALOG
        .iter()
        .find(|(prefix, _)| *prefix == key)
        .map(|(_, id)| *id)
}

/// unlisted_requirement
///
/// Fallback for keys with no catalog entry: the dashboard root and anything mentioning
/// `settings` stay public, everything else fails closed.
pub fn unlisted_requirement(key: &str) -> Requirement {
    if key == DASHBOARD_ROOT || key.contains("settings") {
        Requirement::Public
    } else {
        Requirement::RequiresAll
    }
}

/// RouteMatch
///
/// How a full path resolves against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub key: String,
    /// `None` when the key has no entry and the unlisted fallback applied.
    pub route: Option<RouteId>,
    pub requirement: Requirement,
}

/// resolve
///
/// Truncates `path` to its key, then takes the entry's requirement or the fallback.
pub fn resolve(path: &str) -> RouteMatch {
    let key = route_key(path);
    let route = lookup(&key);
    let requirement = match route {
        Some(route) => route.requirement(),
        None => unlisted_requirement(&key),
    };
    RouteMatch {
        key,
        route,
        requirement,
    }
}

/// The requirement governing a full path.
pub fn requirement_for(path: &str) -> Requirement {
    resolve(path).requirement
}

/// entries
///
/// The full catalog in table order.
pub fn entries() -> Vec<CatalogEntry> {
    CATALOG
        .iter()
        .map(|(prefix, route)| CatalogEntry {
            route: *route,
            prefix: prefix.to_string(),
            requirement: route.requirement().view(),
        })
        .collect()
}
