use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    catalog::{self, Requirement, RequirementView, RouteId, RouteMatch},
    models::Actor,
    permissions::user_permissions,
};

/// AccessDecision
///
/// The answer to "may this actor view this path", together with how it was derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AccessDecision {
    pub path: String,
    /// The two-segment lookup key the path was truncated to.
    pub key: String,
    /// `None` when the key has no catalog entry and the fallback applied.
    pub route: Option<RouteId>,
    pub requirement: RequirementView,
    pub allowed: bool,
}

/// has_access
///
/// Whether `actor` may view `path`. A pure function of the actor's first-role permissions,
/// the path and the static catalog: nothing is cached and nothing is read from outside.
pub fn has_access(actor: Option<&Actor>, path: &str) -> bool {
    check_access(actor, path).allowed
}

/// check_access
///
/// Same decision as `has_access`, with the lookup key, matched route and requirement.
pub fn check_access(actor: Option<&Actor>, path: &str) -> AccessDecision {
    let RouteMatch {
        key,
        route,
        requirement,
    } = catalog::resolve(path);

    let allowed = satisfies(&requirement, actor);

    AccessDecision {
        path: path.to_string(),
        key,
        route,
        requirement: requirement.view(),
        allowed,
    }
}

fn satisfies(requirement: &Requirement, actor: Option<&Actor>) -> bool {
    match requirement {
        // Never consults the actor, not even a missing one.
        Requirement::Public => true,
        Requirement::Single(permission) => user_permissions(actor).grants(permission),
        Requirement::AnyOf(alternatives) => user_permissions(actor).grants_any(alternatives),
        Requirement::RequiresAll => user_permissions(actor).is_unrestricted(),
    }
}
