//! Location catalogue loading.
//!
//! Each subdirectory of the locations directory is one rule, described by
//! a `config.json`:
//!
//! ```json
//! {
//!   "latitude": 47.37, "longitude": 8.54, "radius_km": 0.5,
//!   "matching_ssids": ["Office"], "matching_bssids": ["AA:BB:CC:DD:EE:FF"],
//!   "actions": ["clear", "display image logo.bmp", "sleep 3"]
//! }
//! ```
//!
//! Numbers may also be given as numeric strings.  A subdirectory whose
//! descriptor is missing or malformed is rejected and reported, never
//! fatal.  Unknown-location presentations use a bare `actions.json` list.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rand::Rng;
use rand::seq::SliceRandom;
use serde_json::{Map, Value};

use crate::actions::ActionToken;
use crate::error::CatalogueError;
use crate::location::Coordinates;

pub const DESCRIPTOR_FILE: &str = "config.json";
pub const UNKNOWN_ACTIONS_FILE: &str = "actions.json";

/// One geofenced presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRule {
    /// Directory the rule was loaded from; image paths resolve against it.
    pub directory: PathBuf,
    pub target: Coordinates,
    /// Inclusive radius around `target`.
    pub radius_km: f64,
    pub matching_ssids: BTreeSet<String>,
    /// Lower-cased.
    pub matching_bssids: BTreeSet<String>,
    pub actions: Vec<ActionToken>,
}

/// An instruction list with the directory its assets live in.
#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    pub directory: PathBuf,
    pub actions: Vec<ActionToken>,
}

impl From<&LocationRule> for Presentation {
    fn from(rule: &LocationRule) -> Self {
        Self { directory: rule.directory.clone(), actions: rule.actions.clone() }
    }
}

/// Result of scanning the locations directory.
#[derive(Debug, Default)]
pub struct Catalogue {
    pub rules: Vec<LocationRule>,
    pub rejected: Vec<(PathBuf, CatalogueError)>,
}

impl Catalogue {
    /// Load every subdirectory of `dir`, in name order.  An unreadable
    /// `dir` yields an empty catalogue.
    pub fn load(dir: &Path) -> Self {
        let mut catalogue = Self::default();
        for sub in subdirectories(dir) {
            match load_rule(&sub) {
                Ok(rule) => {
                    debug!("CATALOGUE: loaded {}", sub.display());
                    catalogue.rules.push(rule);
                }
                Err(e) => {
                    warn!("CATALOGUE: rejected {}: {}", sub.display(), e);
                    catalogue.rejected.push((sub, e));
                }
            }
        }
        catalogue
    }
}

/// Parse `dir/config.json` into a rule.
pub fn load_rule(dir: &Path) -> Result<LocationRule, CatalogueError> {
    let value = read_json(&dir.join(DESCRIPTOR_FILE))?;
    let obj = value
        .as_object()
        .ok_or_else(|| CatalogueError::Malformed("descriptor is not an object".into()))?;

    let latitude = number_field(obj, "latitude")?;
    let longitude = number_field(obj, "longitude")?;
    // Values are taken as written: a negative radius never matches by
    // distance, and the identifier lists still apply.
    let radius_km = number_field(obj, "radius_km")?;

    let matching_ssids = string_set(obj, "matching_ssids")?;
    let matching_bssids = string_set(obj, "matching_bssids")?
        .into_iter()
        .map(|b| b.to_ascii_lowercase())
        .collect();
    let actions = action_list(obj.get("actions").ok_or(CatalogueError::MissingField("actions"))?)?;

    Ok(LocationRule {
        directory: dir.to_path_buf(),
        target: Coordinates::new(latitude, longitude),
        radius_km,
        matching_ssids,
        matching_bssids,
        actions,
    })
}

/// Only the `actions` of a rule descriptor, ignoring its geofence fields.
pub fn load_descriptor_actions(dir: &Path) -> Result<Vec<ActionToken>, CatalogueError> {
    let value = read_json(&dir.join(DESCRIPTOR_FILE))?;
    let actions = value.get("actions").ok_or(CatalogueError::MissingField("actions"))?;
    action_list(actions)
}

/// A bare `dir/actions.json` list.
pub fn load_action_file(dir: &Path) -> Result<Vec<ActionToken>, CatalogueError> {
    action_list(&read_json(&dir.join(UNKNOWN_ACTIONS_FILE))?)
}

/// Random unknown-location presentation with a non-empty action list.
/// Subdirectories are tried in shuffled order; unusable ones are skipped.
pub fn pick_unknown<R: Rng + ?Sized>(dir: &Path, rng: &mut R) -> Option<Presentation> {
    let mut candidates = subdirectories(dir);
    candidates.shuffle(rng);

    candidates.into_iter().find_map(|sub| match load_action_file(&sub) {
        Ok(actions) if !actions.is_empty() => Some(Presentation { directory: sub, actions }),
        Ok(_) => {
            debug!("CATALOGUE: {} has no actions", sub.display());
            None
        }
        Err(e) => {
            debug!("CATALOGUE: skipping {}: {}", sub.display(), e);
            None
        }
    })
}

fn subdirectories(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("CATALOGUE: cannot read {}: {}", dir.display(), e);
            return Vec::new();
        }
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs
}

fn read_json(path: &Path) -> Result<Value, CatalogueError> {
    let text =
        fs::read_to_string(path).map_err(|e| CatalogueError::Io(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&text).map_err(|e| CatalogueError::Malformed(e.to_string()))
}

fn number_field(obj: &Map<String, Value>, name: &'static str) -> Result<f64, CatalogueError> {
    let value = obj.get(name).ok_or(CatalogueError::MissingField(name))?;
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite()).ok_or(CatalogueError::BadField(name))
}

fn string_set(obj: &Map<String, Value>, name: &'static str) -> Result<BTreeSet<String>, CatalogueError> {
    let Value::Array(items) = obj.get(name).ok_or(CatalogueError::MissingField(name))? else {
        return Err(CatalogueError::BadField(name));
    };
    items
        .iter()
        .map(|item| item.as_str().map(str::to_owned).ok_or(CatalogueError::BadField(name)))
        .collect()
}

/// Non-string entries are kept as their JSON text, which never parses as
/// an instruction.
fn action_list(value: &Value) -> Result<Vec<ActionToken>, CatalogueError> {
    let Value::Array(items) = value else {
        return Err(CatalogueError::BadField("actions"));
    };
    Ok(items
        .iter()
        .map(|item| match item {
            Value::String(s) => ActionToken::from_line(s),
            other => ActionToken::from_line(&other.to_string()),
        })
        .collect())
}
