//! Unit tests for Trap

use core_types::Trap;

#[test]
fn test_handler_trap_count() {
    assert_eq!(Trap::HANDLER_TRAPS.len(), 12);
}

#[test]
fn test_handler_keys_match_handler_object_names() {
    let keys: Vec<&str> = Trap::HANDLER_TRAPS.iter().map(|t| t.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "getOwnPropertyDescriptor",
            "getPropertyDescriptor",
            "getOwnPropertyNames",
            "defineProperty",
            "delete",
            "fix",
            "has",
            "hasOwn",
            "get",
            "set",
            "enumerate",
            "keys",
        ]
    );
}

#[test]
fn test_lookup_is_case_sensitive() {
    assert_eq!(Trap::from_handler_key("Get"), None);
    assert_eq!(Trap::from_handler_key("get"), Some(Trap::Get));
}

#[test]
fn test_display_uses_handler_key() {
    assert_eq!(Trap::GetPropertyDescriptor.to_string(), "getPropertyDescriptor");
    assert_eq!(Trap::Call.to_string(), "callTrap");
}
