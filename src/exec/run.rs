//! Fixed diagnostic commands for RUN requests
//!
//! The selector only ever indexes this table; request bytes never reach
//! an argument vector.

use std::io;

use crate::error::{Result, SmallError};
use crate::protocol::{Selector, MAX_DATA_LEN};

use super::capture;

/// Interface configuration dump. Later entries are used when earlier
/// programs are not installed.
const INET_COMMANDS: &[&[&str]] = &[
    &["ip", "address", "show"],
    &["ifconfig", "-a"],
    &["cat", "/proc/net/dev"],
];

const HOSTS_COMMANDS: &[&[&str]] = &[&["cat", "/etc/hosts"]];

const SERVICES_COMMANDS: &[&[&str]] = &[&["cat", "/etc/services"]];

/// The hardcoded command candidates for a selector, in order of preference
pub fn commands_for(selector: Selector) -> &'static [&'static [&'static str]] {
    match selector {
        Selector::Inet => INET_COMMANDS,
        Selector::Hosts => HOSTS_COMMANDS,
        Selector::Services => SERVICES_COMMANDS,
    }
}

/// Run the command behind `selector` and return up to 100 bytes of its stdout
pub fn run_selector(selector: Selector) -> Result<Vec<u8>> {
    tracing::trace!(selector = %selector, "Running diagnostic command");
    run_candidates(commands_for(selector))
}

/// Run the first candidate that produces output
///
/// A candidate that is not installed, or that fails without printing
/// anything, hands over to the next one. When every installed candidate
/// failed silently, the last one's (empty) output is returned.
pub fn run_candidates(candidates: &[&[&str]]) -> Result<Vec<u8>> {
    let mut degraded = None;

    for &argv in candidates {
        match capture(argv, None, MAX_DATA_LEN) {
            Ok(captured) if captured.status.success() => return Ok(captured.stdout),
            Ok(captured) if !captured.stdout.is_empty() => {
                tracing::warn!(
                    command = %argv.join(" "),
                    status = %captured.status,
                    "Diagnostic command exited unsuccessfully; returning captured output"
                );
                return Ok(captured.stdout);
            }
            Ok(captured) => {
                tracing::warn!(
                    command = %argv.join(" "),
                    status = %captured.status,
                    "Diagnostic command failed without output, trying next"
                );
                degraded = Some(captured.stdout);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(command = %argv.join(" "), "Program not installed, trying next");
            }
            Err(e) => {
                return Err(SmallError::Subprocess(format!(
                    "failed to run {}: {}",
                    argv.join(" "),
                    e
                )))
            }
        }
    }

    degraded.ok_or_else(|| {
        let programs: Vec<&str> = candidates.iter().filter_map(|argv| argv.first().copied()).collect();
        SmallError::Subprocess(format!("none of [{}] is installed", programs.join(", ")))
    })
}
