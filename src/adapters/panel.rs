//! Host display adapter and the panel power guard.
//!
//! [`SnapshotPanel`] stands in for the e-paper controller on a host: it
//! logs every call and can write each pushed frame as a binary PBM
//! (`frame_0001.pbm`, ...) for inspection.  [`PanelGuard`] owns whatever
//! display the process uses and powers it down when dropped, whichever
//! way the process leaves its main scope.

use std::fs;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::app::ports::DisplayPort;
use crate::error::DisplayError;
use crate::render::Bitmap;

// ───────────────────────────────────────────────────────────────
// SnapshotPanel
// ───────────────────────────────────────────────────────────────

pub struct SnapshotPanel {
    width: u32,
    height: u32,
    snapshot_dir: Option<PathBuf>,
    frames_written: usize,
    awake: bool,
}

impl SnapshotPanel {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            snapshot_dir: None,
            frames_written: 0,
            awake: false,
        }
    }

    /// Also write every frame into `dir` (created if needed).
    pub fn with_snapshots(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(dir.into());
        self
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    pub fn is_awake(&self) -> bool {
        self.awake
    }

    fn check(&self, frame: &Bitmap) -> Result<(), DisplayError> {
        let actual = frame.dimensions();
        let expected = (self.width, self.height);
        if actual != expected {
            return Err(DisplayError::FrameSize { expected, actual });
        }
        if !self.awake {
            return Err(DisplayError::Busy);
        }
        Ok(())
    }

    fn snapshot(&mut self, frame: &Bitmap) -> Result<(), DisplayError> {
        let Some(dir) = &self.snapshot_dir else {
            return Ok(());
        };
        let path = snapshot_path(dir, self.frames_written + 1);
        fs::create_dir_all(dir).map_err(|e| DisplayError::Io(format!("{}: {e}", dir.display())))?;
        fs::write(&path, frame.to_pbm())
            .map_err(|e| DisplayError::Io(format!("{}: {e}", path.display())))?;
        self.frames_written += 1;
        debug!("PANEL: wrote {}", path.display());
        Ok(())
    }
}

fn snapshot_path(dir: &Path, n: usize) -> PathBuf {
    dir.join(format!("frame_{n:04}.pbm"))
}

impl DisplayPort for SnapshotPanel {
    fn init(&mut self) -> Result<(), DisplayError> {
        debug!("PANEL: init");
        self.awake = true;
        Ok(())
    }

    fn clear(&mut self, fill: u8) -> Result<(), DisplayError> {
        if !self.awake {
            return Err(DisplayError::Busy);
        }
        debug!("PANEL: clear 0x{:02X}", fill);
        self.snapshot(&Bitmap::filled(self.width, self.height, fill))
    }

    fn render_full(&mut self, frame: &Bitmap) -> Result<(), DisplayError> {
        self.check(frame)?;
        info!("PANEL: full refresh ({} black px)", frame.count_black());
        self.snapshot(frame)
    }

    fn render_partial(&mut self, frame: &Bitmap) -> Result<(), DisplayError> {
        self.check(frame)?;
        info!("PANEL: partial refresh ({} black px)", frame.count_black());
        self.snapshot(frame)
    }

    fn power_down(&mut self) -> Result<(), DisplayError> {
        info!("PANEL: power down");
        self.awake = false;
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// PanelGuard
// ───────────────────────────────────────────────────────────────

/// Owns the display; powers it down exactly once on drop.
pub struct PanelGuard<D: DisplayPort> {
    display: D,
}

impl<D: DisplayPort> PanelGuard<D> {
    pub fn new(display: D) -> Self {
        Self { display }
    }
}

impl<D: DisplayPort> Deref for PanelGuard<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.display
    }
}

impl<D: DisplayPort> DerefMut for PanelGuard<D> {
    fn deref_mut(&mut self) -> &mut D {
        &mut self.display
    }
}

impl<D: DisplayPort> Drop for PanelGuard<D> {
    fn drop(&mut self) {
        if let Err(e) = self.display.power_down() {
            warn!("PANEL: power down failed: {}", e);
        }
    }
}
