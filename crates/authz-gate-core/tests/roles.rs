// crates/authz-gate-core/tests/roles.rs
// ============================================================================
// Module: Role Resolver Tests
// Description: Inheritance flattening, merge precedence, and failures.
// Purpose: Ensure effective permissions combine ancestors deterministically.
// Dependencies: authz-gate-core
// ============================================================================

//! Role inheritance resolution tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use authz_gate_core::AuthMode;
use authz_gate_core::Authorizer;
use authz_gate_core::BuildError;
use authz_gate_core::FieldRule;
use authz_gate_core::ModeRule;
use authz_gate_core::PermissionMapping;
use authz_gate_core::RoleEntry;
use authz_gate_core::RoleError;
use authz_gate_core::TypePermission;
use authz_gate_core::effective_permissions;
use authz_gate_core::resolve_all;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn read_fields(
    permissions: &authz_gate_core::EffectivePermissions,
    type_name: &str,
) -> Vec<String> {
    match permissions.rule(type_name, AuthMode::Read) {
        Some(ModeRule::Fields(fields)) => fields.keys().cloned().collect(),
        other => panic!("expected field map for {type_name}, got {other:?}"),
    }
}

fn static_read(
    permissions: &authz_gate_core::EffectivePermissions,
    type_name: &str,
    field: &str,
) -> Option<bool> {
    match permissions.rule(type_name, AuthMode::Read) {
        Some(ModeRule::Fields(fields)) => match fields.get(field) {
            Some(FieldRule::Static(value)) => Some(*value),
            _ => None,
        },
        _ => None,
    }
}

// ============================================================================
// SECTION: Merge
// ============================================================================

#[test]
fn child_inherits_parent_fields_and_adds_its_own() {
    let mapping = common::fixture_mapping();
    let user = effective_permissions(&mapping, common::USER).expect("resolve USER");
    assert_eq!(read_fields(&user, "User"), vec!["email", "id", "name"]);
    assert!(user.rule("Thing", AuthMode::Read).is_some());
    assert!(matches!(user.rule("UserCreateInput", AuthMode::Write), Some(ModeRule::Delegate(_))));
}

#[test]
fn parent_is_unaffected_by_child() {
    let mapping = common::fixture_mapping();
    let anonymous = effective_permissions(&mapping, common::ANONYMOUS).expect("resolve");
    assert_eq!(read_fields(&anonymous, "User"), vec!["id", "name"]);
    assert!(anonymous.rule("User", AuthMode::Write).is_none());
    assert!(anonymous.type_permission("Thing").is_none());
}

#[test]
fn child_wins_on_field_collision() {
    let mapping = PermissionMapping::new()
        .with_role(
            "BASE",
            RoleEntry::new().with_type(
                "Post",
                TypePermission::new().with_read(ModeRule::fields([
                    ("title", FieldRule::allow()),
                    ("draft", FieldRule::deny()),
                ])),
            ),
        )
        .with_role(
            "EDITOR",
            RoleEntry::new().inherits("BASE").with_type(
                "Post",
                TypePermission::new().with_read(ModeRule::fields([("draft", FieldRule::allow())])),
            ),
        );
    let editor = effective_permissions(&mapping, "EDITOR").expect("resolve");
    assert_eq!(static_read(&editor, "Post", "draft"), Some(true));
    assert_eq!(static_read(&editor, "Post", "title"), Some(true));
}

#[test]
fn child_literal_replaces_inherited_field_map() {
    let mapping = PermissionMapping::new()
        .with_role(
            "BASE",
            RoleEntry::new().with_type(
                "Post",
                TypePermission::new().with_read(ModeRule::fields([("title", FieldRule::allow())])),
            ),
        )
        .with_role(
            "ADMIN",
            RoleEntry::new()
                .inherits("BASE")
                .with_type("Post", TypePermission::new().with_read(ModeRule::All(true))),
        );
    let admin = effective_permissions(&mapping, "ADMIN").expect("resolve");
    assert!(matches!(admin.rule("Post", AuthMode::Read), Some(ModeRule::All(true))));
}

#[test]
fn modes_merge_independently() {
    let mapping = PermissionMapping::new()
        .with_role(
            "BASE",
            RoleEntry::new().with_type(
                "Post",
                TypePermission::new().with_read(ModeRule::fields([("title", FieldRule::allow())])),
            ),
        )
        .with_role(
            "AUTHOR",
            RoleEntry::new().inherits("BASE").with_type(
                "Post",
                TypePermission::new().with_write(ModeRule::fields([("title", FieldRule::allow())])),
            ),
        );
    let author = effective_permissions(&mapping, "AUTHOR").expect("resolve");
    assert_eq!(read_fields(&author, "Post"), vec!["title"]);
    assert!(author.rule("Post", AuthMode::Write).is_some());
}

#[test]
fn grandchild_merges_whole_chain() {
    let level = |field: &str| {
        TypePermission::new().with_read(ModeRule::fields([(field.to_string(), FieldRule::allow())]))
    };
    let mapping = PermissionMapping::new()
        .with_role("A", RoleEntry::new().with_type("T", level("a")))
        .with_role("B", RoleEntry::new().inherits("A").with_type("T", level("b")))
        .with_role("C", RoleEntry::new().inherits("B").with_type("T", level("c")));
    let resolved = effective_permissions(&mapping, "C").expect("resolve");
    assert_eq!(read_fields(&resolved, "T"), vec!["a", "b", "c"]);
    assert_eq!(resolved.role().as_str(), "C");
}

// ============================================================================
// SECTION: Failures
// ============================================================================

#[test]
fn unknown_role_is_rejected() {
    let mapping = common::fixture_mapping();
    let error = effective_permissions(&mapping, "ADMIN").expect_err("unknown role");
    assert_eq!(error, RoleError::UnknownRole("ADMIN".to_string()));
}

#[test]
fn unknown_parent_is_rejected() {
    let mapping = PermissionMapping::new().with_role("USER", RoleEntry::new().inherits("GHOST"));
    let error = effective_permissions(&mapping, "USER").expect_err("unknown parent");
    assert_eq!(
        error,
        RoleError::UnknownParent {
            role: "USER".to_string(),
            parent: "GHOST".to_string(),
        }
    );
}

#[test]
fn cyclic_inheritance_is_rejected() {
    let mapping = PermissionMapping::new()
        .with_role("A", RoleEntry::new().inherits("B"))
        .with_role("B", RoleEntry::new().inherits("C"))
        .with_role("C", RoleEntry::new().inherits("A"));
    let error = effective_permissions(&mapping, "A").expect_err("cycle");
    assert_eq!(error.to_string(), "cyclic role inheritance: A -> B -> C -> A");
}

#[test]
fn self_inheritance_is_rejected() {
    let mapping = PermissionMapping::new().with_role("A", RoleEntry::new().inherits("A"));
    assert!(matches!(
        effective_permissions(&mapping, "A"),
        Err(RoleError::CyclicInheritance { .. })
    ));
}

#[test]
fn resolve_all_covers_every_role() {
    let mapping = common::fixture_mapping();
    let resolved = resolve_all(&mapping).expect("resolve all");
    let names: Vec<&str> = resolved.keys().map(|role| role.as_str()).collect();
    assert_eq!(names, vec![common::ANONYMOUS, common::USER]);
}

#[test]
fn authorizer_fails_fast_on_bad_inheritance() {
    let mapping = PermissionMapping::new()
        .with_role("OK", RoleEntry::new())
        .with_role("BAD", RoleEntry::new().inherits("MISSING"));
    assert!(matches!(Authorizer::new(&mapping), Err(BuildError::Role(_))));
}

#[test]
fn authorizer_reports_unknown_role_lookup() {
    let authorizer = Authorizer::new(&common::fixture_mapping()).expect("authorizer");
    assert!(authorizer.permissions(common::USER).is_ok());
    assert!(matches!(authorizer.permissions("NOBODY"), Err(RoleError::UnknownRole(_))));
    assert_eq!(authorizer.roles().count(), 2);
}
