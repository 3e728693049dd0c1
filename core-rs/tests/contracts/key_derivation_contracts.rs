// Key Derivation Contract Tests
//
// These tests verify that role keys are derived once and never change.
//
// **Problem**: re-deriving the key on rename silently orphans every
//              reference to the old key
// **Solution**: Contract tests that pin derivation and key stability

use role_manager::{derive_key, MemoryStore, RoleError, RoleRegistry};

/// WHY: "Sales Manager" -> "sales_manager" is the documented derivation
/// FORMAT: lowercase, runs of non [a-z0-9] collapsed to '_', trimmed
/// BREAKS: keys of existing installations would no longer match
#[test]
fn key_derivation_is_protocol_constant() {
    assert_eq!(derive_key("Sales Manager"), "sales_manager");
    assert_eq!(derive_key("Shop  Manager (EU)"), "shop_manager_eu");
    assert_eq!(derive_key("editor"), "editor");
}

/// WHY: duplicate derived keys must fail, never overwrite
/// REASON: two admins creating "Sales Manager" and "sales-manager" must not
///         clobber each other's role
#[test]
fn duplicate_derived_key_fails() {
    let registry = RoleRegistry::new(MemoryStore::new());
    registry.create("Sales Manager", "").unwrap();

    match registry.create("Sales Manager", "") {
        Err(RoleError::DuplicateKey(key)) => assert_eq!(key, "sales_manager"),
        other => panic!("Second create must be DuplicateKey, got {:?}", other),
    }
    assert_eq!(registry.list().unwrap().len(), 1);
}

/// WHY: an empty key can never be created
#[test]
fn empty_derived_key_is_invalid_name() {
    let registry = RoleRegistry::new(MemoryStore::new());

    for name in ["", "   ", "!!!", "---"] {
        assert!(
            matches!(registry.create(name, "x"), Err(RoleError::InvalidName { .. })),
            "{:?} must be rejected",
            name
        );
    }
    assert!(registry.list().unwrap().is_empty());
}

/// WHY: rename updates ONLY the display name
/// REASON: users and content reference roles by key
/// BREAKS: every user holding the role loses it on rename
#[test]
fn rename_never_changes_key() {
    let registry = RoleRegistry::new(MemoryStore::new());
    registry.create("Sales Manager", "").unwrap();

    registry.rename("sales_manager", "Head of Revenue").unwrap();

    let role = registry.get("sales_manager").unwrap();
    assert_eq!(role.key(), "sales_manager");
    assert_eq!(role.display_name(), "Head of Revenue");
    assert!(matches!(
        registry.get("head_of_revenue"),
        Err(RoleError::NotFound(_))
    ));
}

/// WHY: delete of an absent key is NotFound, every time
#[test]
fn delete_twice_is_not_found() {
    let registry = RoleRegistry::new(MemoryStore::new());
    registry.create("Editor", "").unwrap();

    registry.delete("editor").unwrap();
    assert!(matches!(registry.delete("editor"), Err(RoleError::NotFound(_))));
    assert!(matches!(registry.delete("never_existed"), Err(RoleError::NotFound(_))));
}
