//! Instruction grammar.
//!
//! One instruction per line, keywords case-sensitive:
//!
//! ```text
//! clear
//! sleep <seconds>
//! display message <text>            displayPartial message <text>
//! display messageBold <text>        displayPartial messageBold <text>
//! display image <file>.bmp          displayPartial image <file>.bmp
//! ```
//!
//! Free text runs to the end of the line, embedded whitespace included.
//! Lines that do not parse become [`ActionToken::Invalid`], which the
//! interpreter skips.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ActionParseError;

/// Panel refresh mode for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    Full,
    Partial,
}

/// One parsed instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionToken {
    Clear,
    Sleep { duration: Duration },
    DisplayText { message: String, bold: bool, refresh: Refresh },
    DisplayImage { path: PathBuf, refresh: Refresh },
    /// Inert instruction kept for logging.
    Invalid { raw: String, reason: ActionParseError },
}

const TEXT_PREFIXES: [(&str, bool, Refresh); 4] = [
    ("display message ", false, Refresh::Full),
    ("display messageBold ", true, Refresh::Full),
    ("displayPartial message ", false, Refresh::Partial),
    ("displayPartial messageBold ", true, Refresh::Partial),
];

const IMAGE_PREFIXES: [(&str, Refresh); 2] = [
    ("display image ", Refresh::Full),
    ("displayPartial image ", Refresh::Partial),
];

impl ActionToken {
    /// Parse one instruction line.
    pub fn parse(raw: &str) -> Result<Self, ActionParseError> {
        let line = raw.trim();
        if line.is_empty() {
            return Err(ActionParseError::Empty);
        }
        if line == "clear" {
            return Ok(Self::Clear);
        }

        let mut words = line.split_whitespace();
        if words.next() == Some("sleep") {
            let seconds: f64 = words
                .next_back()
                .and_then(|w| w.parse().ok())
                .ok_or(ActionParseError::BadDuration)?;
            // Rejects negative, non-finite and unrepresentably long values.
            let duration =
                Duration::try_from_secs_f64(seconds).map_err(|_| ActionParseError::BadDuration)?;
            return Ok(Self::Sleep { duration });
        }

        for (prefix, bold, refresh) in TEXT_PREFIXES {
            if let Some(message) = line.strip_prefix(prefix) {
                return Ok(Self::DisplayText { message: message.to_owned(), bold, refresh });
            }
        }
        for (prefix, refresh) in IMAGE_PREFIXES {
            if let Some(file) = line.strip_prefix(prefix) {
                return Ok(Self::DisplayImage { path: PathBuf::from(file), refresh });
            }
        }

        // A bare keyword whose argument was trimmed away.
        let bare = TEXT_PREFIXES
            .iter()
            .map(|(p, ..)| *p)
            .chain(IMAGE_PREFIXES.iter().map(|(p, _)| *p))
            .any(|p| p.trim_end() == line);
        if bare {
            Err(ActionParseError::MissingArgument)
        } else {
            Err(ActionParseError::UnknownCommand)
        }
    }

    /// Parse, turning failures into an inert [`ActionToken::Invalid`].
    pub fn from_line(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(|reason| Self::Invalid { raw: raw.to_owned(), reason })
    }

    /// Parse a whole instruction list.
    pub fn parse_all<S: AsRef<str>>(lines: &[S]) -> Vec<Self> {
        lines.iter().map(|l| Self::from_line(l.as_ref())).collect()
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }
}
