//! Play one presentation directory on the panel without geolocation.
//!
//! Uses `<dir>/config.json` (its `actions` field) when present, otherwise
//! the bare list in `<dir>/actions.json`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};
use log::{info, warn};

use placecard::actions::{ActionInterpreter, ActionToken, clear_screen};
use placecard::adapters::clock::SystemClock;
use placecard::adapters::panel::{PanelGuard, SnapshotPanel};
use placecard::config::SystemConfig;
use placecard::geofence::catalogue::{
    DESCRIPTOR_FILE, UNKNOWN_ACTIONS_FILE, load_action_file, load_descriptor_actions,
};
use placecard::render::Renderer;

#[derive(Debug, Parser)]
#[command(version, about = "Run a presentation directory's actions on the panel")]
struct Args {
    /// Directory holding config.json or actions.json plus its images.
    dir: PathBuf,

    /// Optional configuration file for panel geometry and text style.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write every panel frame as a PBM into this directory.
    #[arg(long)]
    snapshots: Option<PathBuf>,
}

fn load_actions(dir: &Path) -> Result<Vec<ActionToken>> {
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }
    if dir.join(DESCRIPTOR_FILE).is_file() {
        return load_descriptor_actions(dir)
            .with_context(|| format!("reading {}", dir.join(DESCRIPTOR_FILE).display()));
    }
    if dir.join(UNKNOWN_ACTIONS_FILE).is_file() {
        return load_action_file(dir)
            .with_context(|| format!("reading {}", dir.join(UNKNOWN_ACTIONS_FILE).display()));
    }
    bail!(
        "{} has neither {} nor {}",
        dir.display(),
        DESCRIPTOR_FILE,
        UNKNOWN_ACTIONS_FILE
    )
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => SystemConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SystemConfig::default(),
    };
    let actions = load_actions(&args.dir)?;
    info!("Previewing {} ({} actions)", args.dir.display(), actions.len());

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))
            .context("installing the Ctrl-C handler")?;
    }

    let mut panel = SnapshotPanel::new(config.panel_width, config.panel_height);
    if let Some(dir) = &args.snapshots {
        panel = panel.with_snapshots(dir);
    }
    let mut panel = PanelGuard::new(panel);
    let mut clock = SystemClock::new(stop);
    let interpreter = ActionInterpreter::new(Renderer::from_config(&config));

    clear_screen(&mut *panel).context("clearing the panel")?;
    match interpreter.run(&actions, &args.dir, &mut *panel, &mut clock) {
        Ok(report) => info!(
            "Done: {} executed, {} skipped, {} failed",
            report.executed, report.skipped, report.failed
        ),
        Err(e) => warn!("{}; stopping", e),
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}\n", Args::command().render_usage());
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
