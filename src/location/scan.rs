//! `iwlist scan` output parser.
//!
//! The scanner prints one block per cell:
//!
//! ```text
//!           Cell 01 - Address: AA:BB:CC:DD:EE:FF
//!                     Channel:6
//!                     Quality=70/70  Signal level=-40 dBm
//!                     ESSID:"HomeNet"
//! ```
//!
//! Parsing is line-oriented.  An address line opens a candidate; the
//! ESSID and signal lines fill it in whichever order they arrive; the
//! candidate is emitted the moment all three fields are known.  Anything
//! that does not fit is dropped without failing the scan.

use log::debug;

/// One access point seen during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkObservation {
    /// Lower-cased MAC address; unique within a scan.
    pub bssid: String,
    pub ssid: String,
    /// Received signal strength in dBm.
    pub signal_dbm: i32,
}

impl NetworkObservation {
    pub fn new(bssid: &str, ssid: &str, signal_dbm: i32) -> Self {
        Self {
            bssid: bssid.to_ascii_lowercase(),
            ssid: ssid.to_owned(),
            signal_dbm,
        }
    }
}

#[derive(Default)]
struct Candidate {
    bssid: Option<String>,
    ssid: Option<String>,
    signal: Option<i32>,
}

impl Candidate {
    fn take_complete(&mut self) -> Option<NetworkObservation> {
        if self.bssid.is_some() && self.ssid.is_some() && self.signal.is_some() {
            let c = core::mem::take(self);
            return Some(NetworkObservation {
                bssid: c.bssid?,
                ssid: c.ssid?,
                signal_dbm: c.signal?,
            });
        }
        None
    }
}

/// Turn raw scanner output into observations.  Never fails.
pub fn parse_scan(output: &str) -> Vec<NetworkObservation> {
    let mut found: Vec<NetworkObservation> = Vec::new();
    let mut cand = Candidate::default();

    for raw in output.lines() {
        let line = raw.trim();

        if let Some(addr) = cell_address(line) {
            cand = Candidate {
                bssid: Some(addr.to_ascii_lowercase()),
                ..Candidate::default()
            };
            continue;
        }
        if cand.bssid.is_none() {
            continue;
        }

        if let Some(ssid) = essid(line) {
            cand.ssid = Some(ssid.to_owned());
        } else if is_quality_line(line) {
            match signal_level(line) {
                Some(dbm) => cand.signal = Some(dbm),
                None => debug!("SCAN: unparseable signal level in '{}'", line),
            }
        }

        if let Some(obs) = cand.take_complete() {
            if found.iter().any(|o| o.bssid == obs.bssid) {
                debug!("SCAN: duplicate cell {} ignored", obs.bssid);
            } else {
                found.push(obs);
            }
        }
    }

    found
}

/// `Cell <digits> - Address: <mac>` → `<mac>`.
fn cell_address(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("Cell ")?;
    let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let addr = rest[digits_end..].strip_prefix(" - Address: ")?.trim();
    (!addr.is_empty()).then_some(addr)
}

/// `ESSID:"name"` → `name`.  The first and last characters after the
/// colon are the quotes.
fn essid(line: &str) -> Option<&str> {
    let (_, value) = line.split_once("ESSID:")?;
    let mut chars = value.chars();
    chars.next()?;
    chars.next_back()?;
    Some(chars.as_str())
}

/// `Quality=<d>/<d>  Signal level=...`
fn is_quality_line(line: &str) -> bool {
    let Some(idx) = line.find("Quality=") else {
        return false;
    };
    let rest = &line[idx + "Quality=".len()..];
    let Some((num, rest)) = rest.split_once('/') else {
        return false;
    };
    let den_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    num.bytes().all(|b| b.is_ascii_digit())
        && rest[den_end..].starts_with("  Signal level=")
}

fn signal_level(line: &str) -> Option<i32> {
    let (_, rest) = line.rsplit_once("Signal level=")?;
    rest.split(' ').next()?.trim().parse().ok()
}
