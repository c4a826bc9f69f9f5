//! Unified error types for the Placecard device.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! orchestrator's error handling uniform.  Subsystem errors are small,
//! cheap to clone, and carry just enough context to be logged and skipped.
//! None of them terminate the routine on their own: each call site decides
//! whether to skip, fall back, or surface the failure on the display.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The WiFi scan could not be taken.
    Scan(ScanError),
    /// A single BSSID lookup failed.
    Lookup(LookupError),
    /// A catalogue entry could not be loaded.
    Catalogue(CatalogueError),
    /// The display rejected a command.
    Display(DisplayError),
    /// A bitmap asset could not be decoded.
    Asset(AssetError),
    /// Hotspot bring-up failed.
    Connectivity(ConnectivityError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// The process was asked to stop.
    Interrupted(Interrupted),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scan(e) => write!(f, "scan: {e}"),
            Self::Lookup(e) => write!(f, "lookup: {e}"),
            Self::Catalogue(e) => write!(f, "catalogue: {e}"),
            Self::Display(e) => write!(f, "display: {e}"),
            Self::Asset(e) => write!(f, "asset: {e}"),
            Self::Connectivity(e) => write!(f, "connectivity: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Interrupted(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Scan errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The scanner process could not be started.
    SpawnFailed(String),
    /// The scanner exited unsuccessfully.
    ScannerFailed(String),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpawnFailed(msg) => write!(f, "could not start scanner: {msg}"),
            Self::ScannerFailed(msg) => write!(f, "scanner failed: {msg}"),
        }
    }
}

impl std::error::Error for ScanError {}

impl From<ScanError> for Error {
    fn from(e: ScanError) -> Self {
        Self::Scan(e)
    }
}

// ---------------------------------------------------------------------------
// Lookup errors
// ---------------------------------------------------------------------------

/// Transient failure of the external BSSID locator.  Always treated as
/// "unknown" by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The locator process could not be started.
    SpawnFailed(String),
    /// The locator did not answer within the bounded wait.
    TimedOut,
    /// The locator answered with something that is not the expected JSON.
    BadResponse(String),
    /// The lookup was abandoned because an interrupt is pending.
    Cancelled,
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpawnFailed(msg) => write!(f, "could not start locator: {msg}"),
            Self::TimedOut => write!(f, "locator timed out"),
            Self::BadResponse(msg) => write!(f, "bad locator response: {msg}"),
            Self::Cancelled => write!(f, "lookup cancelled"),
        }
    }
}

impl std::error::Error for LookupError {}

impl From<LookupError> for Error {
    fn from(e: LookupError) -> Self {
        Self::Lookup(e)
    }
}

// ---------------------------------------------------------------------------
// Catalogue errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogueError {
    /// Descriptor file missing or unreadable.
    Io(String),
    /// Descriptor is not valid JSON or has the wrong shape.
    Malformed(String),
    /// A required field is absent.
    MissingField(&'static str),
    /// A field is present but has an unusable value.
    BadField(&'static str),
}

impl fmt::Display for CatalogueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Malformed(msg) => write!(f, "malformed descriptor: {msg}"),
            Self::MissingField(name) => write!(f, "missing field '{name}'"),
            Self::BadField(name) => write!(f, "bad value for field '{name}'"),
        }
    }
}

impl std::error::Error for CatalogueError {}

impl From<CatalogueError> for Error {
    fn from(e: CatalogueError) -> Self {
        Self::Catalogue(e)
    }
}

// ---------------------------------------------------------------------------
// Action parse errors
// ---------------------------------------------------------------------------

/// Why an instruction line is inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionParseError {
    /// Blank line.
    Empty,
    /// Command keyword not recognised (keywords are case-sensitive).
    UnknownCommand,
    /// Known command with its argument missing.
    MissingArgument,
    /// `sleep` with a duration that is not a finite, non-negative number.
    BadDuration,
}

impl fmt::Display for ActionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty instruction"),
            Self::UnknownCommand => write!(f, "unknown command"),
            Self::MissingArgument => write!(f, "missing argument"),
            Self::BadDuration => write!(f, "bad sleep duration"),
        }
    }
}

impl std::error::Error for ActionParseError {}

// ---------------------------------------------------------------------------
// Display errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayError {
    /// The panel controller did not respond.
    Busy,
    /// Frame size does not match the panel.
    FrameSize { expected: (u32, u32), actual: (u32, u32) },
    /// Generic I/O failure talking to the panel (or writing a snapshot).
    Io(String),
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "panel busy"),
            Self::FrameSize { expected, actual } => write!(
                f,
                "frame is {}x{}, panel is {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for DisplayError {}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Self::Display(e)
    }
}

// ---------------------------------------------------------------------------
// Asset errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    Io(String),
    /// Not a BMP file.
    BadSignature,
    /// Truncated or inconsistent headers / pixel data.
    Corrupt(&'static str),
    /// Valid BMP in a variant we do not decode (e.g. RLE compression).
    Unsupported(&'static str),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::BadSignature => write!(f, "not a BMP file"),
            Self::Corrupt(what) => write!(f, "corrupt bitmap: {what}"),
            Self::Unsupported(what) => write!(f, "unsupported bitmap: {what}"),
        }
    }
}

impl std::error::Error for AssetError {}

impl From<AssetError> for Error {
    fn from(e: AssetError) -> Self {
        Self::Asset(e)
    }
}

// ---------------------------------------------------------------------------
// Connectivity errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    /// The network manager refused or failed the association.
    ConnectionFailed(String),
    /// Associated, but none of the probe endpoints answered as expected.
    NoInternet,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no hotspot credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::ConnectionFailed(msg) => write!(f, "hotspot connection failed: {msg}"),
            Self::NoInternet => write!(f, "connected but internet unreachable"),
        }
    }
}

impl std::error::Error for ConnectivityError {}

impl From<ConnectivityError> for Error {
    fn from(e: ConnectivityError) -> Self {
        Self::Connectivity(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file could not be read.
    Io(String),
    /// Config file failed deserialization.
    Corrupted(String),
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "cannot read config: {msg}"),
            Self::Corrupted(msg) => write!(f, "config corrupted: {msg}"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Interrupt
// ---------------------------------------------------------------------------

/// An external interrupt asked the process to stop.  This is the only
/// condition that aborts an action sequence mid-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;

impl fmt::Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "interrupted")
    }
}

impl std::error::Error for Interrupted {}

impl From<Interrupted> for Error {
    fn from(e: Interrupted) -> Self {
        Self::Interrupted(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
