//! Placecard — Main Entry Point
//!
//! Hexagonal architecture: the orchestrator owns the routine, the
//! adapters own every process, file and network touch.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SnapshotPanel     IwlistScanner   CommandLocator              │
//! │  (DisplayPort)     (ScannerPort)   (LocatorPort)               │
//! │  NmcliHotspot      SystemClock     LogEventSink                │
//! │  (Connectivity)    (TimePort)      (EventSink)                 │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Orchestrator (pure logic)                 │    │
//! │  │  FSM · GeoResolver · GeofenceMatcher · Interpreter     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use placecard::adapters::clock::SystemClock;
use placecard::adapters::hotspot::NmcliHotspot;
use placecard::adapters::locator::CommandLocator;
use placecard::adapters::log_sink::LogEventSink;
use placecard::adapters::panel::{PanelGuard, SnapshotPanel};
use placecard::adapters::scanner::IwlistScanner;
use placecard::app::service::{Orchestrator, Peripherals};
use placecard::config::SystemConfig;

#[derive(Debug, Parser)]
#[command(version, about = "Show the presentation for wherever this device is")]
struct Args {
    /// Path to the JSON configuration file.
    #[arg(short, long, default_value = "global_config.json")]
    config: PathBuf,

    /// Fixed RNG seed (overrides `seed` in the config).
    #[arg(long)]
    seed: Option<u64>,

    /// Write every panel frame as a PBM into this directory.
    #[arg(long)]
    snapshots: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("╔══════════════════════════════════════╗");
    info!("║  Placecard v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = SystemConfig::from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    info!("Config loaded from {}", args.config.display());

    // ── Interrupt hook ────────────────────────────────────────
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))
            .context("installing the Ctrl-C handler")?;
    }

    // ── Adapters ──────────────────────────────────────────────
    let mut panel = SnapshotPanel::new(config.panel_width, config.panel_height);
    if let Some(dir) = &args.snapshots {
        panel = panel.with_snapshots(dir);
    }
    let mut panel = PanelGuard::new(panel);
    let mut scanner = IwlistScanner::new(config.wifi_interface.clone());
    let mut locator = CommandLocator::new(
        config.locator_command.clone(),
        config.lookup_timeout(),
    );
    let mut link = NmcliHotspot::new(&config);
    let mut clock = SystemClock::new(Arc::clone(&stop));
    let mut events = LogEventSink::new();

    let rng = match args.seed.or(config.seed) {
        Some(seed) => {
            info!("RNG seeded with {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    // ── Run ───────────────────────────────────────────────────
    let mut orchestrator = Orchestrator::new(config, rng);
    let mut hw = Peripherals {
        display: &mut *panel,
        scanner: &mut scanner,
        locator: &mut locator,
        link: &mut link,
        clock: &mut clock,
        events: &mut events,
    };

    match orchestrator.run(&mut hw) {
        Ok(()) => info!("Routine finished in {:?}", orchestrator.state()),
        Err(e) => warn!("{}; shutting down", e),
    }
    Ok(())
}
