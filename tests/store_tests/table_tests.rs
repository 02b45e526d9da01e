//! Variable Store Tests
//!
//! Tests verify:
//! - Basic set/get operations
//! - Overwrite semantics
//! - Bound enforcement leaves the store untouched
//! - Concurrent access patterns

use std::sync::Arc;
use std::thread;

use smallkv::store::VariableStore;
use smallkv::SmallError;

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_store_is_empty() {
    let store = VariableStore::new();
    assert_eq!(store.len(), 0);
    assert!(store.is_empty());
}

#[test]
fn test_set_and_get() {
    let store = VariableStore::new();

    store.set("x", b"hello").unwrap();

    assert_eq!(store.get("x"), Some(b"hello".to_vec()));
    assert!(store.contains("x"));
}

#[test]
fn test_get_nonexistent() {
    let store = VariableStore::new();
    assert_eq!(store.get("nonexistent"), None);
    assert!(!store.contains("nonexistent"));
}

#[test]
fn test_set_overwrites_existing() {
    let store = VariableStore::new();

    store.set("x", b"first").unwrap();
    store.set("x", b"second").unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.get("x"), Some(b"second".to_vec()));
}

#[test]
fn test_empty_value() {
    let store = VariableStore::new();
    store.set("blank", b"").unwrap();
    assert_eq!(store.get("blank"), Some(Vec::new()));
}

#[test]
fn test_names_are_case_sensitive() {
    let store = VariableStore::new();
    store.set("Key", b"upper").unwrap();
    store.set("key", b"lower").unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(store.get("Key"), Some(b"upper".to_vec()));
    assert_eq!(store.get("key"), Some(b"lower".to_vec()));
}

// =============================================================================
// Bound Tests
// =============================================================================

#[test]
fn test_maximum_sizes_accepted() {
    let store = VariableStore::new();
    let name = "a".repeat(15);
    let value = vec![0x7F; 100];

    store.set(&name, &value).unwrap();
    assert_eq!(store.get(&name), Some(value));
}

#[test]
fn test_name_too_long_leaves_store_unchanged() {
    let store = VariableStore::new();
    store.set("keep", b"me").unwrap();

    let result = store.set(&"a".repeat(16), b"value");

    assert!(matches!(result, Err(SmallError::FieldTooLong { field: "name", .. })));
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("keep"), Some(b"me".to_vec()));
}

#[test]
fn test_value_too_long_rejected() {
    let store = VariableStore::new();
    let result = store.set("x", &[0u8; 101]);

    assert!(matches!(result, Err(SmallError::FieldTooLong { field: "value", .. })));
    assert!(store.is_empty());
}

#[test]
fn test_value_too_long_keeps_previous_value() {
    let store = VariableStore::new();
    store.set("x", b"old").unwrap();

    assert!(store.set("x", &[0u8; 101]).is_err());
    assert_eq!(store.get("x"), Some(b"old".to_vec()));
}

#[test]
fn test_control_characters_rejected() {
    let store = VariableStore::new();
    assert!(matches!(store.set("bad\tname", b"v"), Err(SmallError::InvalidName(_))));
    assert!(store.is_empty());
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_writers_and_readers() {
    let store = Arc::new(VariableStore::new());
    let mut handles = Vec::new();

    for t in 0..8 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..50 {
                let name = format!("t{}_{}", t, i);
                store.set(&name, name.as_bytes()).unwrap();
                assert_eq!(store.get(&name), Some(name.into_bytes()));
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 8 * 50);
}

#[test]
fn test_concurrent_overwrites_leave_one_whole_value() {
    let store = Arc::new(VariableStore::new());
    let mut handles = Vec::new();

    for t in 0..4u8 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for _ in 0..100 {
                store.set("shared", &[t; 100]).unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let value = store.get("shared").unwrap();
    assert_eq!(value.len(), 100);
    assert!(value.iter().all(|&b| b == value[0]));
}
