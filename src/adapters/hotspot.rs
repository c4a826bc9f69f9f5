//! Mobile-hotspot adapter driven through NetworkManager's `nmcli`.
//!
//! Implements [`ConnectivityPort`]:
//!
//! - `prepare` validates the configured credentials and brings down every
//!   connection currently bound to the WiFi interface.
//! - `try_connect` rescans, asks `nmcli` to join the hotspot, waits for
//!   the link to settle, then probes the configured endpoints over HTTP.
//!   The attempt succeeds only when some endpoint answers with its
//!   expected status.

use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::app::ports::ConnectivityPort;
use crate::config::{ProbeEndpoint, SystemConfig};
use crate::error::ConnectivityError;

use super::utils::{is_printable_ascii, run_command};

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

/// Connection names bound to `interface` in `nmcli connection show`
/// output (the device is the last column).
fn connections_on(listing: &str, interface: &str) -> Vec<String> {
    listing
        .lines()
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            match (cols.first(), cols.last()) {
                (Some(name), Some(device)) if cols.len() > 1 && *device == interface => {
                    Some((*name).to_owned())
                }
                _ => None,
            }
        })
        .collect()
}

fn run(program: &str, args: &[&str]) -> Result<String, ConnectivityError> {
    run_command(program, args).map_err(ConnectivityError::ConnectionFailed)
}

// ───────────────────────────────────────────────────────────────
// Hotspot adapter
// ───────────────────────────────────────────────────────────────

pub struct NmcliHotspot {
    interface: String,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    endpoints: Vec<ProbeEndpoint>,
    settle: Duration,
    /// Validation failure recorded at construction, reported by `prepare`.
    invalid: Option<ConnectivityError>,
}

impl NmcliHotspot {
    pub fn new(config: &SystemConfig) -> Self {
        let mut adapter = Self {
            interface: config.wifi_interface.clone(),
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            endpoints: config.test_internet_with.clone(),
            settle: config.connect_settle(),
            invalid: None,
        };
        if let Err(e) =
            adapter.set_credentials(&config.mobile_hotspot_ssid, &config.mobile_hotspot_password)
        {
            adapter.invalid = Some(e);
        }
        adapter
    }

    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        if ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password.push_str(password).map_err(|_| ConnectivityError::InvalidPassword)?;
        self.invalid = None;
        info!("HOTSPOT: credentials set (SSID='{}')", self.ssid);
        Ok(())
    }

    fn internet_reachable(&self) -> bool {
        let client = match reqwest::blocking::Client::builder().timeout(PROBE_TIMEOUT).build() {
            Ok(c) => c,
            Err(e) => {
                warn!("HOTSPOT: cannot build HTTP client: {}", e);
                return false;
            }
        };
        self.endpoints.iter().any(|ep| {
            match client
                .get(&ep.host)
                .header(reqwest::header::USER_AGENT, &ep.user_agent)
                .send()
            {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    debug!("HOTSPOT: probe {} -> {}", ep.host, status);
                    status == ep.expected_status
                }
                Err(e) => {
                    debug!("HOTSPOT: probe {} failed: {}", ep.host, e);
                    false
                }
            }
        })
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for NmcliHotspot {
    fn prepare(&mut self) -> Result<(), ConnectivityError> {
        if let Some(e) = &self.invalid {
            return Err(e.clone());
        }
        let listing = run("nmcli", &["connection", "show"])?;
        for name in connections_on(&listing, &self.interface) {
            info!("HOTSPOT: bringing down '{}' on {}", name, self.interface);
            if let Err(e) = run("sudo", &["nmcli", "con", "down", &name]) {
                warn!("HOTSPOT: {}", e);
            }
        }
        Ok(())
    }

    fn try_connect(&mut self) -> Result<(), ConnectivityError> {
        if let Some(e) = &self.invalid {
            return Err(e.clone());
        }
        if let Err(e) = run("nmcli", &["device", "wifi", "rescan"]) {
            debug!("HOTSPOT: rescan: {}", e);
        }

        let mut args = vec!["device", "wifi", "connect", self.ssid.as_str()];
        if !self.password.is_empty() {
            args.extend(["password", self.password.as_str()]);
        }
        // The probe decides; a failed association shows up there too.
        if let Err(e) = run("nmcli", &args) {
            warn!("HOTSPOT: {}", e);
        }

        thread::sleep(self.settle);

        if self.internet_reachable() {
            info!("HOTSPOT: connected to '{}'", self.ssid);
            Ok(())
        } else {
            Err(ConnectivityError::NoInternet)
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(ssid: &str, password: &str) -> NmcliHotspot {
        let config = SystemConfig {
            mobile_hotspot_ssid: ssid.into(),
            mobile_hotspot_password: password.into(),
            ..SystemConfig::default()
        };
        NmcliHotspot::new(&config)
    }

    #[test]
    fn rejects_empty_ssid() {
        let mut a = adapter("", "password123");
        assert_eq!(a.prepare(), Err(ConnectivityError::NoCredentials));
        assert_eq!(a.try_connect(), Err(ConnectivityError::NoCredentials));
    }

    #[test]
    fn rejects_short_password() {
        let mut a = adapter("MyNet", "short");
        assert_eq!(a.prepare(), Err(ConnectivityError::InvalidPassword));
    }

    #[test]
    fn rejects_non_printable_ssid() {
        let mut a = adapter("bad\tname", "password123");
        assert_eq!(a.prepare(), Err(ConnectivityError::InvalidSsid));
    }

    #[test]
    fn accepts_open_network() {
        let a = adapter("OpenCafe", "");
        assert!(a.invalid.is_none());
    }

    #[test]
    fn accepts_valid_wpa2() {
        let a = adapter("HomeWiFi", "mysecret8");
        assert!(a.invalid.is_none());
        assert_eq!(a.ssid.as_str(), "HomeWiFi");
    }

    #[test]
    fn set_credentials_clears_earlier_failure() {
        let mut a = adapter("", "");
        assert!(a.invalid.is_some());
        a.set_credentials("Phone", "hunter2hunter2").unwrap();
        assert!(a.invalid.is_none());
    }

    #[test]
    fn finds_connections_bound_to_interface() {
        let listing = "\
NAME                UUID                                  TYPE      DEVICE
Home WiFi           0b7c5c1e-1111-2222-3333-444455556666  wifi      --
preconfigured       5f1e2d3c-aaaa-bbbb-cccc-ddddeeeeffff  wifi      wlan0
Wired connection 1  9a8b7c6d-1234-5678-9abc-def012345678  ethernet  eth0
";
        assert_eq!(connections_on(listing, "wlan0"), vec!["preconfigured".to_owned()]);
        assert!(connections_on(listing, "wlan1").is_empty());
        assert!(connections_on("", "wlan0").is_empty());
    }
}
