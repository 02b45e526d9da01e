//! External Command Module
//!
//! Runs host-side programs on behalf of DIGEST and RUN requests.
//!
//! ## Contract
//! - Programs are started from argument vectors, never through a shell
//! - Input is bounded by the protocol before it gets here
//! - Captured stdout is bounded; the rest is drained and discarded so the
//!   child never dies on a broken pipe
//! - A non-zero exit is logged, not fatal: the captured output is still used
//!
//! There is no timeout. A hung program blocks the worker that started it.

mod digest;
mod run;

use std::io::{self, Read, Write};
use std::process::{Command, ExitStatus, Stdio};

pub use digest::{Digester, DIGEST_CAPTURE_LIMIT};
pub use run::{commands_for, run_candidates, run_selector};

/// Output of a finished subprocess
#[derive(Debug)]
pub struct Captured {
    /// At most `limit` bytes of standard output
    pub stdout: Vec<u8>,

    /// How the process exited
    pub status: ExitStatus,
}

/// Spawn `argv`, feed it `input` on stdin, and capture up to `limit` bytes of stdout
pub fn capture<S: AsRef<str>>(argv: &[S], input: Option<&[u8]>, limit: usize) -> io::Result<Captured> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;

    let mut child = Command::new(program.as_ref())
        .args(args.iter().map(|arg| -> &str { arg.as_ref() }))
        .stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;

    let io_result = (|| -> io::Result<Vec<u8>> {
        if let (Some(data), Some(mut stdin)) = (input, child.stdin.take()) {
            // A program that exits without reading its input is not an error here.
            match stdin.write_all(data) {
                Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e),
                _ => {}
            }
        }

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "stdout not captured"))?;
        let mut out = Vec::new();
        (&mut stdout).take(limit as u64).read_to_end(&mut out)?;
        io::copy(&mut stdout, &mut io::sink())?;
        Ok(out)
    })();

    let status = child.wait()?;
    Ok(Captured {
        stdout: io_result?,
        status,
    })
}
