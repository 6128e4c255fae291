use kormat_admin_gate::{
    catalog::{self, Requirement, RequirementKind, RouteId},
    has_access,
    models::{Actor, Role},
    permissions::{Permission, has_permission, user_permissions},
    resolver::check_access,
};

// --- Test Utilities ---

fn actor_with(permissions: &[&str]) -> Actor {
    Actor {
        id: Some("1".to_string()),
        email: Some("staff@kormat.test".to_string()),
        user_details: None,
        roles: Some(vec![Role {
            id: None,
            name: Some("staff".to_string()),
            permissions: Some(permissions.iter().map(|p| Permission::from(*p)).collect()),
        }]),
    }
}

const CATALOG_PATHS: &[&str] = &[
    "/dashboard",
    "/dashboard/settings",
    "/dashboard/user-management",
    "/dashboard/orders",
    "/dashboard/transactions",
    "/dashboard/categories",
    "/dashboard/category/7",
    "/dashboard/members-management",
    "/dashboard/disputes",
    "/dashboard/notifications",
    "/dashboard/create-notification",
];

const UNLISTED_PATHS: &[&str] = &["/dashboard/reports", "/dashboard/audit/2024", "/reports", "/"];

// --- Catalog ---

#[test]
fn test_route_key_truncates_to_two_segments() {
    assert_eq!(catalog::route_key("/dashboard/orders/42"), "/dashboard/orders");
    assert_eq!(catalog::route_key("/dashboard/orders/42/items"), "/dashboard/orders");
    assert_eq!(catalog::route_key("/dashboard/"), "/dashboard");
    assert_eq!(catalog::route_key("//dashboard//orders"), "/dashboard/orders");
    assert_eq!(catalog::route_key("/dashboard/orders?page=2"), "/dashboard/orders");
    assert_eq!(catalog::route_key("/dashboard#top"), "/dashboard");
    assert_eq!(catalog::route_key(""), "/");
    assert_eq!(catalog::route_key("/"), "/");
}

#[test]
fn test_every_catalog_prefix_resolves_to_its_route() {
    for entry in catalog::entries() {
        assert_eq!(catalog::lookup(&entry.prefix), Some(entry.route));
        assert_eq!(entry.route.prefix(), entry.prefix);
    }
    assert_eq!(catalog::entries().len(), CATALOG_PATHS.len());
}

#[test]
fn test_requirement_table() {
    assert_eq!(catalog::requirement_for("/dashboard"), Requirement::Public);
    assert_eq!(catalog::requirement_for("/dashboard/settings"), Requirement::Public);
    assert_eq!(
        catalog::requirement_for("/dashboard/orders/42"),
        Requirement::Single(Permission::ManageOrders)
    );
    assert_eq!(
        catalog::requirement_for("/dashboard/category/9"),
        Requirement::Single(Permission::ManageCategories)
    );
    assert_eq!(
        catalog::requirement_for("/dashboard/members-management"),
        Requirement::AnyOf(vec![Permission::ManageStaffs, Permission::ManageRoles])
    );
    assert_eq!(catalog::requirement_for("/dashboard/disputes/3"), Requirement::RequiresAll);
}

#[test]
fn test_unlisted_routes_fail_closed_except_root_and_settings() {
    assert_eq!(catalog::requirement_for("/dashboard/reports"), Requirement::RequiresAll);
    assert_eq!(catalog::requirement_for("/login"), Requirement::RequiresAll);
    assert_eq!(catalog::unlisted_requirement("/dashboard"), Requirement::Public);
    assert_eq!(catalog::unlisted_requirement("/account/settings"), Requirement::Public);
}

#[test]
fn test_resolve_is_the_derivation_behind_every_decision() {
    let matched = catalog::resolve("/dashboard/orders/42?tab=items");
    assert_eq!(matched.key, "/dashboard/orders");
    assert_eq!(matched.route, Some(RouteId::Orders));
    assert_eq!(matched.requirement, Requirement::Single(Permission::ManageOrders));

    let unlisted = catalog::resolve("/dashboard/reports/7");
    assert_eq!(unlisted.route, None);
    assert_eq!(unlisted.requirement, Requirement::RequiresAll);

    for path in ["/dashboard", "/dashboard/category/9#top", "/dashboard/reports", "/login"] {
        let matched = catalog::resolve(path);
        let decision = check_access(None, path);
        assert_eq!(decision.key, matched.key);
        assert_eq!(decision.route, matched.route);
        assert_eq!(decision.requirement, matched.requirement.view());
        assert_eq!(catalog::requirement_for(path), matched.requirement);
    }
}

// --- Permission Extractor ---

#[test]
fn test_extractor_reads_only_the_first_role() {
    let mut actor = actor_with(&["manage_orders"]);
    actor.roles.as_mut().unwrap().push(Role {
        id: None,
        name: Some("second".to_string()),
        permissions: Some(vec![Permission::All]),
    });

    let permissions = user_permissions(Some(&actor));
    assert!(permissions.contains(&Permission::ManageOrders));
    assert!(!permissions.contains(&Permission::All));
    assert!(!has_access(Some(&actor), "/dashboard/disputes"));
}

#[test]
fn test_extractor_empty_cases() {
    assert!(user_permissions(None).is_empty());

    let no_roles = Actor::default();
    assert!(user_permissions(Some(&no_roles)).is_empty());

    let empty_roles = Actor {
        roles: Some(vec![]),
        ..Actor::default()
    };
    assert!(user_permissions(Some(&empty_roles)).is_empty());

    let role_without_permissions = Actor {
        roles: Some(vec![Role::default()]),
        ..Actor::default()
    };
    assert!(user_permissions(Some(&role_without_permissions)).is_empty());
}

#[test]
fn test_has_permission() {
    let actor = actor_with(&["manage_users"]);
    assert!(has_permission(Some(&actor), None));
    assert!(has_permission(None, None));
    assert!(has_permission(Some(&actor), Some(&Permission::ManageUsers)));
    assert!(!has_permission(Some(&actor), Some(&Permission::ManageRoles)));
    assert!(has_permission(
        Some(&actor_with(&["all"])),
        Some(&Permission::ManageRoles)
    ));
}

// --- Resolver: testable properties ---

#[test]
fn test_all_permission_grants_every_path() {
    let admin = actor_with(&["all"]);
    for path in CATALOG_PATHS.iter().chain(UNLISTED_PATHS) {
        assert!(has_access(Some(&admin), path), "`all` should open {path}");
    }
}

#[test]
fn test_single_tag_actor() {
    let actor = actor_with(&["manage_orders"]);
    assert!(has_access(Some(&actor), "/dashboard/orders"));
    assert!(has_access(Some(&actor), "/dashboard/orders/42"));
    assert!(!has_access(Some(&actor), "/dashboard/categories"));
    assert!(!has_access(Some(&actor), "/dashboard/category/1"));
}

#[test]
fn test_alternative_tags_for_members_management() {
    let staffs = actor_with(&["manage_staffs"]);
    let roles = actor_with(&["manage_roles"]);
    let neither = actor_with(&["manage_users"]);

    assert!(has_access(Some(&staffs), "/dashboard/members-management"));
    assert!(has_access(Some(&roles), "/dashboard/members-management"));
    assert!(!has_access(Some(&neither), "/dashboard/members-management"));
}

#[test]
fn test_empty_permission_set() {
    let actor = actor_with(&[]);
    assert!(has_access(Some(&actor), "/dashboard"));
    assert!(has_access(Some(&actor), "/dashboard/settings"));
    assert!(!has_access(Some(&actor), "/dashboard/disputes"));
    assert!(!has_access(Some(&actor), "/dashboard/reports"));
}

#[test]
fn test_missing_actor_against_each_requirement_kind() {
    // Public entries never consult the actor.
    assert!(has_access(None, "/dashboard"));
    assert!(has_access(None, "/dashboard/settings"));
    // Single, AnyOf, RequiresAll and the unlisted fallback all deny.
    assert!(!has_access(None, "/dashboard/orders"));
    assert!(!has_access(None, "/dashboard/members-management"));
    assert!(!has_access(None, "/dashboard/disputes"));
    for path in UNLISTED_PATHS {
        assert!(!has_access(None, path), "{path} should be denied");
    }
}

#[test]
fn test_custom_tags_are_not_wildcards() {
    let actor = actor_with(&["manage_everything"]);
    assert!(!has_access(Some(&actor), "/dashboard/orders"));
    assert!(has_access(Some(&actor), "/dashboard"));
}

#[test]
fn test_resolver_is_idempotent() {
    let actor = actor_with(&["manage_transactions"]);
    for path in CATALOG_PATHS.iter().chain(UNLISTED_PATHS) {
        let first = check_access(Some(&actor), path);
        let second = check_access(Some(&actor), path);
        assert_eq!(first, second);
    }
}

#[test]
fn test_check_access_reports_derivation() {
    let actor = actor_with(&["manage_categories"]);

    let detail = check_access(Some(&actor), "/dashboard/category/12");
    assert_eq!(detail.key, "/dashboard/category");
    assert_eq!(detail.route, Some(RouteId::CategoryDetail));
    assert_eq!(detail.requirement.kind, RequirementKind::Single);
    assert_eq!(detail.requirement.permissions, vec!["manage_categories"]);
    assert!(detail.allowed);

    let unlisted = check_access(Some(&actor), "/dashboard/reports/1");
    assert_eq!(unlisted.route, None);
    assert_eq!(unlisted.requirement.kind, RequirementKind::RequiresAll);
    assert!(!unlisted.allowed);
}
