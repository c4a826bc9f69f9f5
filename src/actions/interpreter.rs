//! Executes parsed instruction lists against the display.
//!
//! Each instruction is isolated: an inert line, a missing image, or a
//! display/asset error is logged and the sequence moves on.  Only an
//! interrupt stops a run early.

use std::path::Path;

use log::{debug, info, warn};

use crate::app::ports::{DisplayPort, TimePort};
use crate::error::{AssetError, DisplayError, Interrupted};
use crate::render::{Bitmap, Renderer};

use super::token::{ActionToken, Refresh};

const IMAGE_EXTENSION: &str = ".bmp";

/// Outcome counters of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Instructions that took effect.
    pub executed: usize,
    /// Inert lines and absent or unrecognised images.
    pub skipped: usize,
    /// Instructions whose display or asset call failed.
    pub failed: usize,
}

enum StepError {
    Display(DisplayError),
    Asset(AssetError),
    Interrupted(Interrupted),
}

impl From<DisplayError> for StepError {
    fn from(e: DisplayError) -> Self {
        Self::Display(e)
    }
}

impl From<AssetError> for StepError {
    fn from(e: AssetError) -> Self {
        Self::Asset(e)
    }
}

impl From<Interrupted> for StepError {
    fn from(e: Interrupted) -> Self {
        Self::Interrupted(e)
    }
}

enum Step {
    Done,
    Skipped,
}

/// Wake the panel and wipe it to white.
pub fn clear_screen(display: &mut (impl DisplayPort + ?Sized)) -> Result<(), DisplayError> {
    display.init()?;
    display.clear(0xFF)
}

/// Push `frame` with the requested refresh mode.
pub fn show(
    display: &mut (impl DisplayPort + ?Sized),
    frame: &Bitmap,
    refresh: Refresh,
) -> Result<(), DisplayError> {
    match refresh {
        Refresh::Full => display.render_full(frame),
        Refresh::Partial => display.render_partial(frame),
    }
}

/// Runs instruction lists.
#[derive(Debug, Clone)]
pub struct ActionInterpreter {
    renderer: Renderer,
}

impl ActionInterpreter {
    pub fn new(renderer: Renderer) -> Self {
        Self { renderer }
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Render `message` centered on the panel.
    pub fn show_text(
        &self,
        display: &mut (impl DisplayPort + ?Sized),
        message: &str,
        bold: bool,
        refresh: Refresh,
    ) -> Result<(), DisplayError> {
        show(display, &self.renderer.text_frame(message, bold), refresh)
    }

    /// Execute `actions` in order.  Image paths are relative to `base_dir`.
    pub fn run(
        &self,
        actions: &[ActionToken],
        base_dir: &Path,
        display: &mut (impl DisplayPort + ?Sized),
        clock: &mut (impl TimePort + ?Sized),
    ) -> Result<RunReport, Interrupted> {
        let mut report = RunReport::default();

        for (i, action) in actions.iter().enumerate() {
            if clock.interrupted() {
                return Err(Interrupted);
            }
            match self.execute(action, base_dir, display, clock) {
                Ok(Step::Done) => report.executed += 1,
                Ok(Step::Skipped) => report.skipped += 1,
                Err(StepError::Interrupted(e)) => return Err(e),
                Err(StepError::Display(e)) => {
                    warn!("ACTION: #{} display error: {}", i, e);
                    report.failed += 1;
                }
                Err(StepError::Asset(e)) => {
                    warn!("ACTION: #{} image error: {}", i, e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "ACTION: sequence done ({} executed, {} skipped, {} failed)",
            report.executed, report.skipped, report.failed
        );
        Ok(report)
    }

    fn execute(
        &self,
        action: &ActionToken,
        base_dir: &Path,
        display: &mut (impl DisplayPort + ?Sized),
        clock: &mut (impl TimePort + ?Sized),
    ) -> Result<Step, StepError> {
        match action {
            ActionToken::Clear => {
                debug!("ACTION: clear");
                clear_screen(display)?;
            }
            ActionToken::Sleep { duration } => {
                debug!("ACTION: sleep {:?}", duration);
                clock.sleep(*duration)?;
            }
            ActionToken::DisplayText { message, bold, refresh } => {
                debug!("ACTION: text {:?} (bold={}, {:?})", message, bold, refresh);
                self.show_text(display, message, *bold, *refresh)?;
            }
            ActionToken::DisplayImage { path, refresh } => {
                let full = base_dir.join(path);
                let recognised = path.to_str().is_some_and(|p| p.ends_with(IMAGE_EXTENSION));
                if !recognised || !full.is_file() {
                    debug!("ACTION: image {} skipped", full.display());
                    return Ok(Step::Skipped);
                }
                debug!("ACTION: image {} ({:?})", full.display(), refresh);
                let frame = self.renderer.image_frame(&full)?;
                show(display, &frame, *refresh)?;
            }
            ActionToken::Invalid { raw, reason } => {
                warn!("ACTION: skipping {:?}: {}", raw, reason);
                return Ok(Step::Skipped);
            }
        }
        Ok(Step::Done)
    }
}
