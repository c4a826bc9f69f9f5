//! BSSID locator adapter.
//!
//! Runs an external command with the BSSID appended and reads one JSON
//! object from its stdout:
//!
//! ```json
//! { "aa:bb:cc:dd:ee:ff": { "latitude": 47.37, "longitude": "8.54" } }
//! ```
//!
//! A missing key, or `"unknown"` for both fields, means the locator has
//! no fix for that BSSID.  The child is killed if it outlives the bounded
//! wait.

use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;
use serde_json::Value;

use crate::app::ports::LocatorPort;
use crate::error::LookupError;
use crate::location::Coordinates;

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const UNKNOWN: &str = "unknown";

pub struct CommandLocator {
    /// Program followed by its leading arguments.
    command: Vec<String>,
    timeout: Duration,
}

impl CommandLocator {
    pub fn new(command: Vec<String>, timeout: Duration) -> Self {
        Self { command, timeout }
    }

    fn run(&self, bssid: &str) -> Result<String, LookupError> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| LookupError::SpawnFailed("empty locator command".into()))?;

        let mut child = Command::new(program)
            .args(args)
            .arg(bssid)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| LookupError::SpawnFailed(format!("{program}: {e}")))?;

        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(_)) => break,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(LookupError::TimedOut);
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => return Err(LookupError::SpawnFailed(e.to_string())),
            }
        }

        let out = child
            .wait_with_output()
            .map_err(|e| LookupError::BadResponse(e.to_string()))?;
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }
}

impl LocatorPort for CommandLocator {
    fn locate(&mut self, bssid: &str) -> Result<Option<Coordinates>, LookupError> {
        let output = self.run(bssid)?;
        debug!("LOCATOR: {} -> {}", bssid, output.trim());
        parse_locator_output(bssid, &output)
    }
}

fn coordinate(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|v| v.is_finite())
}

/// Interpret the locator's JSON answer for `bssid`.
pub fn parse_locator_output(bssid: &str, output: &str) -> Result<Option<Coordinates>, LookupError> {
    let value: Value =
        serde_json::from_str(output.trim()).map_err(|e| LookupError::BadResponse(e.to_string()))?;
    let map = value
        .as_object()
        .ok_or_else(|| LookupError::BadResponse("expected a JSON object".into()))?;

    let Some(entry) = map
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(bssid))
        .map(|(_, v)| v)
    else {
        return Ok(None);
    };

    let lat = entry.get("latitude");
    let lon = entry.get("longitude");
    let is_unknown = |v: Option<&Value>| v.and_then(Value::as_str) == Some(UNKNOWN);
    if is_unknown(lat) && is_unknown(lon) {
        return Ok(None);
    }

    match (coordinate(lat), coordinate(lon)) {
        (Some(latitude), Some(longitude)) => Ok(Some(Coordinates::new(latitude, longitude))),
        _ => Err(LookupError::BadResponse(format!("unusable coordinates for {bssid}"))),
    }
}
