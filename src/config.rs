//! System configuration parameters
//!
//! All tunable parameters for the Placecard device.  Loaded once at
//! startup from a JSON file and then shared read-only.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One endpoint used to decide whether the hotspot gives internet access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeEndpoint {
    /// Full URL to GET.
    pub host: String,
    /// HTTP status that counts as "online".
    pub expected_status: u16,
    pub user_agent: String,
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Layout ---
    /// Root that relative catalogue directories resolve against.
    pub base_dir: PathBuf,
    /// Directory holding one sub-directory per geofenced location rule.
    pub locations_dir: PathBuf,
    /// Directory holding fallback presentations (bare `actions.json`).
    pub unknown_location_dir: PathBuf,

    // --- Panel ---
    /// Frame width in pixels (landscape).
    pub panel_width: u32,
    /// Frame height in pixels (landscape).
    pub panel_height: u32,
    /// Integer magnification of the built-in 5x7 typeface.
    pub text_scale: u32,
    /// Stroke dilation (pixels) for regular text.
    pub text_stroke_width: u32,
    /// Stroke dilation (pixels) for bold text.
    pub text_stroke_width_bold: u32,

    // --- Hotspot ---
    pub wifi_interface: String,
    pub mobile_hotspot_ssid: String,
    pub mobile_hotspot_password: String,
    /// Endpoints probed after association.
    pub test_internet_with: Vec<ProbeEndpoint>,
    /// Association attempts before giving up.
    pub connect_attempts: u32,
    /// Seconds to wait after `nmcli` returns before probing.
    pub connect_settle_secs: f32,

    // --- Location lookup ---
    /// Argument vector prefix of the BSSID locator; the BSSID is appended.
    pub locator_command: Vec<String>,
    /// Bounded wait per lookup (seconds).
    pub lookup_timeout_secs: f32,

    // --- Presentation ---
    pub looking_characters: Vec<String>,
    pub happy_characters: Vec<String>,
    pub sad_angry_characters: Vec<String>,
    pub finding_location_message: Vec<String>,
    /// Show the BSSID being looked up while resolving.
    pub display_bssids: bool,

    // --- Loop ---
    /// Run the resolve/present loop forever instead of once.
    pub repeat: bool,
    /// Seconds between passes when `repeat` is set.
    pub repeat_cooldown: f32,
    /// Fixed RNG seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Layout
            base_dir: PathBuf::from("."),
            locations_dir: PathBuf::from("images/locations"),
            unknown_location_dir: PathBuf::from("images/unkown_location"),

            // Panel (2.13" three-colour-less e-paper, landscape)
            panel_width: 250,
            panel_height: 122,
            text_scale: 2,
            text_stroke_width: 0,
            text_stroke_width_bold: 1,

            // Hotspot
            wifi_interface: "wlan0".into(),
            mobile_hotspot_ssid: String::new(),
            mobile_hotspot_password: String::new(),
            test_internet_with: vec![ProbeEndpoint {
                host: "https://www.google.com".into(),
                expected_status: 200,
                user_agent: "Mozilla/5.0".into(),
            }],
            connect_attempts: 11,
            connect_settle_secs: 2.0,

            // Lookup
            locator_command: vec!["python3".into(), "bssid_locator/main.py".into()],
            lookup_timeout_secs: 15.0,

            // Presentation
            looking_characters: vec!["(o_o)".into(), "(O_O)".into(), "(0_0)".into()],
            happy_characters: vec!["(^_^)".into(), "(^o^)".into()],
            sad_angry_characters: vec!["(;_;)".into(), "(>_<)".into()],
            finding_location_message: vec!["Finding my location".into()],
            display_bssids: false,

            // Loop
            repeat: false,
            repeat_cooldown: 60.0,
            seed: None,
        }
    }
}

impl SystemConfig {
    /// Read, parse and validate a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    /// Parse and validate JSON text.  Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Corrupted(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the routine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.panel_width == 0 || self.panel_height == 0 {
            return Err(ConfigError::ValidationFailed("panel dimensions must be non-zero"));
        }
        if self.text_scale == 0 {
            return Err(ConfigError::ValidationFailed("text_scale must be at least 1"));
        }
        if self.connect_attempts == 0 {
            return Err(ConfigError::ValidationFailed("connect_attempts must be at least 1"));
        }
        if self.locator_command.is_empty() {
            return Err(ConfigError::ValidationFailed("locator_command must name a program"));
        }
        for (secs, msg) in [
            (self.lookup_timeout_secs, "lookup_timeout_secs must be a non-negative duration"),
            (self.connect_settle_secs, "connect_settle_secs must be a non-negative duration"),
            (self.repeat_cooldown, "repeat_cooldown must be a non-negative duration"),
        ] {
            // Also rejects NaN, infinities and values past Duration::MAX.
            if Duration::try_from_secs_f32(secs).is_err() {
                return Err(ConfigError::ValidationFailed(msg));
            }
        }
        Ok(())
    }

    pub fn lookup_timeout(&self) -> Duration {
        seconds(self.lookup_timeout_secs)
    }

    pub fn connect_settle(&self) -> Duration {
        seconds(self.connect_settle_secs)
    }

    pub fn cooldown(&self) -> Duration {
        seconds(self.repeat_cooldown)
    }

    /// Geofenced catalogue root, resolved against `base_dir`.
    pub fn locations_path(&self) -> PathBuf {
        self.base_dir.join(&self.locations_dir)
    }

    /// Unknown-location catalogue root, resolved against `base_dir`.
    pub fn unknown_location_path(&self) -> PathBuf {
        self.base_dir.join(&self.unknown_location_dir)
    }
}

/// Values `validate` would refuse collapse to zero.
fn seconds(secs: f32) -> Duration {
    Duration::try_from_secs_f32(secs).unwrap_or(Duration::ZERO)
}
