// Capability Replace Contract Tests
//
// These tests pin the semantics of capability updates.
//
// **Problem**: an update that diffs old vs new can leave stale grants behind
// **Solution**: Contract tests that enforce revoke-all-then-grant

use role_manager::{CapabilitySet, MemoryStore, RoleRegistry};

fn caps(items: &[&str]) -> CapabilitySet {
    items.iter().map(|s| s.to_string()).collect()
}

fn registry_with_editor() -> RoleRegistry<MemoryStore> {
    let registry = RoleRegistry::new(MemoryStore::new());
    registry.create("Editor", "").unwrap();
    registry
}

/// WHY: set_capabilities is a FULL replace, not a merge
/// REASON: an unchecked box in the form means "revoke", not "leave as is"
/// BREAKS: previously granted capabilities would survive an edit
#[test]
fn set_capabilities_removes_everything_not_requested() {
    let registry = registry_with_editor();

    registry.set_capabilities("editor", ["read", "edit_posts"]).unwrap();
    registry.set_capabilities("editor", ["read"]).unwrap();

    let role = registry.get("editor").unwrap();
    assert_eq!(role.capabilities(), &caps(&["read"]));
    assert!(
        !role.has_capability("edit_posts"),
        "edit_posts must be absent after a replace that omits it"
    );
}

/// WHY: resulting set == requested ∩ catalog, exactly
/// REASON: unknown identifiers must never reach storage
/// BREAKS: arbitrary strings become grantable capabilities
#[test]
fn set_capabilities_filters_against_catalog() {
    let registry = registry_with_editor();

    let update = registry
        .set_capabilities("editor", ["read", "haxx0r", "publish_posts"])
        .unwrap();

    assert_eq!(update.role.capabilities(), &caps(&["publish_posts", "read"]));
    assert_eq!(update.dropped, vec!["haxx0r".to_string()]);
    assert!(!registry.get("editor").unwrap().has_capability("haxx0r"));
}

/// WHY: only unknown identifiers are dropped, never an error
/// REASON: lenient legacy behavior is preserved; callers get the dropped list
#[test]
fn set_capabilities_with_only_unknown_ids_empties_role() {
    let registry = registry_with_editor();
    registry.set_capabilities("editor", ["read"]).unwrap();

    let update = registry.set_capabilities("editor", ["haxx0r"]).unwrap();

    assert!(update.role.capabilities().is_empty());
    assert_eq!(update.dropped, vec!["haxx0r".to_string()]);
}

/// WHY: the same request applied twice gives the same state
#[test]
fn set_capabilities_is_idempotent() {
    let registry = registry_with_editor();

    let first = registry.set_capabilities("editor", ["read", "list_users"]).unwrap();
    let second = registry.set_capabilities("editor", ["read", "list_users"]).unwrap();

    assert_eq!(first.role, second.role);
}

/// WHY: import overwrite uses the same full-replace semantics
/// BREAKS: import and edit would disagree on what a role ends up with
#[test]
fn import_overwrite_is_full_replace() {
    let registry = registry_with_editor();
    registry.set_capabilities("editor", ["read", "edit_posts", "delete_posts"]).unwrap();

    registry
        .import_json(
            r#"{"editor": {"name": "Editor", "capabilities": {"read": true}}}"#,
            Default::default(),
        )
        .unwrap();

    assert_eq!(registry.get("editor").unwrap().capabilities(), &caps(&["read"]));
}
