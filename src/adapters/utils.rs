//! Helpers shared by the adapters that shell out to system tools.

use std::process::Command;

use log::debug;

/// Returns `true` if every byte of `s` is in the printable ASCII range
/// `0x20..=0x7E` (space through tilde, inclusive).
///
/// `nmcli` takes the SSID as a plain argument, so control bytes are
/// refused up front.
pub(super) fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// Run `program` to completion and return its stdout.
///
/// A spawn failure or a non-zero exit comes back as a one-line message
/// for the caller to wrap in its own error type.
pub(super) fn run_command(program: &str, args: &[&str]) -> Result<String, String> {
    debug!("EXEC: {} {}", program, args.join(" "));
    let out = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| format!("{program}: {e}"))?;
    if !out.status.success() {
        return Err(format!(
            "{program} exited with {}: {}",
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        ));
    }
    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}
