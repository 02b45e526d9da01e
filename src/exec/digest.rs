//! Checksum adapter for DIGEST requests

use crate::error::{Result, SmallError};
use crate::protocol::{MAX_DATA_LEN, MAX_DIGEST_LEN};

use super::capture;

/// How much checksum output is read before stripping and truncation
pub const DIGEST_CAPTURE_LIMIT: usize = 4096;

/// Pipes request data through the configured checksumming utility
#[derive(Debug, Clone)]
pub struct Digester {
    argv: Vec<String>,
}

impl Digester {
    /// Create a digester running `argv` (e.g. `["sha256sum"]`)
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    /// The utility's argument vector
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Checksum `data`
    ///
    /// Returns the utility's output with one trailing line terminator
    /// removed, truncated to the response limit.
    pub fn digest(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.len() > MAX_DIGEST_LEN {
            return Err(SmallError::FieldTooLong {
                field: "digest data",
                len: data.len(),
                max: MAX_DIGEST_LEN,
            });
        }

        let captured = capture(self.argv.as_slice(), Some(data), DIGEST_CAPTURE_LIMIT).map_err(|e| {
            SmallError::Subprocess(format!("failed to run {}: {}", self.argv.join(" "), e))
        })?;

        if !captured.status.success() {
            tracing::warn!(
                command = %self.argv.join(" "),
                status = %captured.status,
                "Checksum utility exited unsuccessfully; returning captured output"
            );
        }

        let mut out = captured.stdout;
        strip_line_terminator(&mut out);
        out.truncate(MAX_DATA_LEN);
        Ok(out)
    }
}

impl Default for Digester {
    fn default() -> Self {
        Self::new(vec!["sha256sum".to_string()])
    }
}

/// Remove exactly one trailing `\n` or `\r\n`
fn strip_line_terminator(out: &mut Vec<u8>) {
    if out.last() == Some(&b'\n') {
        out.pop();
        if out.last() == Some(&b'\r') {
            out.pop();
        }
    }
}
