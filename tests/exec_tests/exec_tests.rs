//! External Command Tests
//!
//! Tests verify:
//! - Bounded capture of subprocess output
//! - Digest output matches an independent SHA-256
//! - Graceful degradation on non-zero exit
//! - The fixed RUN table

use sha2::{Digest, Sha256};
use smallkv::exec::{capture, commands_for, run_candidates, run_selector, Digester};
use smallkv::protocol::{Selector, MAX_DATA_LEN};
use smallkv::SmallError;

// =============================================================================
// Helper Functions
// =============================================================================

/// What `sha256sum` prints for stdin input, minus the newline
fn expected_sha256sum(data: &[u8]) -> Vec<u8> {
    let hex: String = Sha256::digest(data)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();
    format!("{}  -", hex).into_bytes()
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Capture Tests
// =============================================================================

#[test]
fn test_capture_stdout() {
    let captured = capture(&["echo", "hi"][..], None, 100).unwrap();
    assert!(captured.status.success());
    assert_eq!(captured.stdout, b"hi\n");
}

#[test]
fn test_capture_feeds_stdin() {
    let captured = capture(&["cat"][..], Some(&b"piped data"[..]), 100).unwrap();
    assert_eq!(captured.stdout, b"piped data");
}

#[test]
fn test_capture_is_bounded() {
    let captured = capture(&["head", "-c", "5000", "/dev/zero"][..], None, 10).unwrap();
    assert_eq!(captured.stdout.len(), 10);
    // The rest was drained, so the child finished normally
    assert!(captured.status.success());
}

#[test]
fn test_capture_missing_program() {
    let result = capture(&["smallkv-no-such-program"][..], None, 10);
    assert_eq!(result.unwrap_err().kind(), std::io::ErrorKind::NotFound);
}

// =============================================================================
// Digest Tests
// =============================================================================

#[test]
fn test_digest_matches_sha256() {
    let digester = Digester::default();
    let out = digester.digest(b"hello").unwrap();
    assert_eq!(out, expected_sha256sum(b"hello"));
}

#[test]
fn test_digest_is_deterministic() {
    let digester = Digester::default();
    let data: Vec<u8> = (0..100).collect();

    let first = digester.digest(&data).unwrap();
    let second = digester.digest(&data).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, expected_sha256sum(&data));
}

#[test]
fn test_digest_empty_data() {
    let out = Digester::default().digest(b"").unwrap();
    assert_eq!(out, expected_sha256sum(b""));
}

#[test]
fn test_digest_strips_exactly_one_newline() {
    let digester = Digester::new(argv(&["cat"]));
    assert_eq!(digester.digest(b"abc\n").unwrap(), b"abc");
    assert_eq!(digester.digest(b"abc\n\n").unwrap(), b"abc\n");
}

#[test]
fn test_digest_output_truncated() {
    let digester = Digester::new(argv(&["head", "-c", "300", "/dev/zero"]));
    let out = digester.digest(b"ignored").unwrap();
    assert_eq!(out.len(), MAX_DATA_LEN);
}

#[test]
fn test_digest_nonzero_exit_still_succeeds() {
    let digester = Digester::new(argv(&["false"]));
    let out = digester.digest(b"data").unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_digest_data_too_long() {
    let result = Digester::default().digest(&[0u8; 101]);
    assert!(matches!(result, Err(SmallError::FieldTooLong { .. })));
}

#[test]
fn test_digest_missing_utility() {
    let digester = Digester::new(argv(&["smallkv-no-such-program"]));
    let result = digester.digest(b"data");
    assert!(matches!(result, Err(SmallError::Subprocess(_))));
}

// =============================================================================
// Run Tests
// =============================================================================

#[test]
fn test_run_hosts() {
    let out = run_selector(Selector::Hosts).unwrap();
    assert!(!out.is_empty());
    assert!(out.len() <= MAX_DATA_LEN);
}

#[test]
fn test_run_inet_returns_output() {
    // At least /proc/net/dev is always there on Linux
    let out = run_selector(Selector::Inet).unwrap();
    assert!(!out.is_empty());
    assert!(out.len() <= MAX_DATA_LEN);
}

#[test]
fn test_run_services_returns_output() {
    let out = run_selector(Selector::Services).unwrap();
    assert!(!out.is_empty());
    assert!(out.len() <= MAX_DATA_LEN);
}

#[test]
fn test_run_falls_back_after_silent_failure() {
    let candidates: &[&[&str]] = &[&["false"], &["echo", "fallback"]];
    assert_eq!(run_candidates(candidates).unwrap(), b"fallback\n");
}

#[test]
fn test_run_falls_back_past_missing_program() {
    let candidates: &[&[&str]] = &[&["smallkv-no-such-program"], &["echo", "second"]];
    assert_eq!(run_candidates(candidates).unwrap(), b"second\n");
}

#[test]
fn test_run_failure_with_output_is_kept() {
    let candidates: &[&[&str]] = &[&["cat", "/etc/hosts", "/smallkv-missing"], &["echo", "unused"]];
    let out = run_candidates(candidates).unwrap();
    assert!(!out.is_empty());
    assert_ne!(out, b"unused\n");
}

#[test]
fn test_run_every_candidate_failing_silently() {
    let candidates: &[&[&str]] = &[&["false"], &["smallkv-no-such-program"]];
    assert!(run_candidates(candidates).unwrap().is_empty());
}

#[test]
fn test_run_no_candidate_installed() {
    let candidates: &[&[&str]] = &[&["smallkv-no-such-program"], &["smallkv-also-missing"]];
    assert!(matches!(run_candidates(candidates), Err(SmallError::Subprocess(_))));
}

#[test]
fn test_run_table_is_fixed() {
    assert_eq!(commands_for(Selector::Hosts), &[&["cat", "/etc/hosts"][..]][..]);
    assert_eq!(commands_for(Selector::Services), &[&["cat", "/etc/services"][..]][..]);
    assert_eq!(commands_for(Selector::Inet)[0], &["ip", "address", "show"][..]);
}
