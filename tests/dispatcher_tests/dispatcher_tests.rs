//! Tests for Dispatcher
//!
//! These tests verify:
//! - Secret key admission
//! - SET / GET semantics and failure statuses
//! - DIGEST and RUN routed through the external command adapter

use smallkv::exec::Digester;
use smallkv::protocol::{MessageType, Preamble, Request, Selector, Status};
use smallkv::{Config, Dispatcher, SmallError};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_dispatcher() -> Dispatcher {
    Dispatcher::new(42, Digester::default())
}

fn set(name: &str, value: &[u8]) -> Request {
    Request::Set {
        name: name.to_string(),
        value: value.to_vec(),
    }
}

fn get(name: &str) -> Request {
    Request::Get {
        name: name.to_string(),
    }
}

// =============================================================================
// Authentication Tests
// =============================================================================

#[test]
fn test_authenticate_matching_key() {
    let dispatcher = setup_dispatcher();
    let preamble = Preamble {
        secret_key: 42,
        msg_type: MessageType::Get,
    };
    assert!(dispatcher.authenticate(&preamble).is_ok());
}

#[test]
fn test_authenticate_wrong_key() {
    let dispatcher = setup_dispatcher();
    for key in [0, 41, 43, u32::MAX] {
        let preamble = Preamble {
            secret_key: key,
            msg_type: MessageType::Set,
        };
        assert!(matches!(
            dispatcher.authenticate(&preamble),
            Err(SmallError::AuthenticationFailed)
        ));
    }
}

#[test]
fn test_from_config_uses_secret_key() {
    let config = Config::builder().secret_key(7).build();
    let dispatcher = Dispatcher::from_config(&config);

    let preamble = Preamble {
        secret_key: 7,
        msg_type: MessageType::Run,
    };
    assert!(dispatcher.authenticate(&preamble).is_ok());
    assert_eq!(dispatcher.digester().argv(), &["sha256sum".to_string()]);
}

// =============================================================================
// Set / Get Tests
// =============================================================================

#[test]
fn test_set_then_get() {
    let dispatcher = setup_dispatcher();

    let response = dispatcher.execute(set("x", b"hello"));
    assert_eq!(response.status(), Status::OK);
    assert!(response.is_empty());

    let response = dispatcher.execute(get("x"));
    assert_eq!(response.status(), Status::OK);
    assert_eq!(response.data(), b"hello");
    assert_eq!(response.len(), 5);
}

#[test]
fn test_get_missing_fails() {
    let dispatcher = setup_dispatcher();

    let response = dispatcher.execute(get("nonexistent"));
    assert_eq!(response.status(), Status::FAILURE);
    assert!(response.is_empty());
}

#[test]
fn test_set_overwrite_then_get() {
    let dispatcher = setup_dispatcher();
    dispatcher.execute(set("x", b"one"));
    dispatcher.execute(set("x", b"two"));

    assert_eq!(dispatcher.execute(get("x")).data(), b"two");
    assert_eq!(dispatcher.store().len(), 1);
}

#[test]
fn test_set_name_too_long_fails_and_store_unchanged() {
    let dispatcher = setup_dispatcher();

    let response = dispatcher.execute(set(&"n".repeat(16), b"value"));

    assert_eq!(response.status(), Status::FAILURE);
    assert!(dispatcher.store().is_empty());
}

#[test]
fn test_set_value_too_long_fails() {
    let dispatcher = setup_dispatcher();
    let response = dispatcher.execute(set("x", &[1u8; 101]));

    assert_eq!(response.status(), Status::FAILURE);
    assert!(dispatcher.store().is_empty());
}

#[test]
fn test_get_name_too_long_fails() {
    let dispatcher = setup_dispatcher();
    let response = dispatcher.execute(get(&"n".repeat(16)));
    assert_eq!(response.status(), Status::FAILURE);
}

#[test]
fn test_binary_value_round_trip() {
    let dispatcher = setup_dispatcher();
    let value: Vec<u8> = (0..100).map(|i| (i * 7) as u8).collect();

    dispatcher.execute(set("bin", &value));
    assert_eq!(dispatcher.execute(get("bin")).data(), &value[..]);
}

// =============================================================================
// Digest / Run Tests
// =============================================================================

#[test]
fn test_digest_success() {
    let dispatcher = setup_dispatcher();
    let response = dispatcher.execute(Request::Digest {
        data: b"hello".to_vec(),
    });

    assert_eq!(response.status(), Status::OK);
    // 64 hex digits, two spaces, "-"
    assert_eq!(response.len(), 67);
    assert!(response.data().ends_with(b"  -"));
}

#[test]
fn test_digest_too_long_fails() {
    let dispatcher = setup_dispatcher();
    let response = dispatcher.execute(Request::Digest {
        data: vec![0u8; 101],
    });
    assert_eq!(response.status(), Status::FAILURE);
}

#[test]
fn test_digest_missing_utility_fails() {
    let dispatcher = Dispatcher::new(42, Digester::new(vec!["smallkv-no-such-program".to_string()]));
    let response = dispatcher.execute(Request::Digest {
        data: b"x".to_vec(),
    });
    assert_eq!(response.status(), Status::FAILURE);
}

#[test]
fn test_run_hosts() {
    let dispatcher = setup_dispatcher();
    let response = dispatcher.execute(Request::Run {
        selector: Selector::Hosts,
    });

    assert_eq!(response.status(), Status::OK);
    assert!(!response.is_empty());
}

#[test]
fn test_run_every_selector_succeeds() {
    let dispatcher = setup_dispatcher();
    for selector in Selector::ALL {
        let response = dispatcher.execute(Request::Run { selector });
        assert_eq!(response.status(), Status::OK, "selector {}", selector);
        assert!(!response.is_empty(), "selector {}", selector);
    }
}

#[test]
fn test_run_does_not_touch_store() {
    let dispatcher = setup_dispatcher();
    dispatcher.execute(Request::Run {
        selector: Selector::Services,
    });
    assert!(dispatcher.store().is_empty());
}
