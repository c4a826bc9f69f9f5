//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (routed to stderr by `env_logger` in the binaries).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] on one line with a fixed prefix.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::ConnectAttemptFailed { attempt, reason } => {
                warn!("LINK  | attempt {} failed: {}", attempt, reason);
            }
            AppEvent::Connected { attempts } => {
                info!("LINK  | online after {} attempt(s)", attempts);
            }
            AppEvent::NetworksScanned(count) => {
                info!("SCAN  | {} network(s)", count);
            }
            AppEvent::Resolved(c) => {
                info!("GEO   | resolved lat={:.5} lon={:.5}", c.latitude, c.longitude);
            }
            AppEvent::Unresolved { attempted } => {
                info!("GEO   | unresolved after {} lookup(s)", attempted);
            }
            AppEvent::CatalogueEntryRejected { dir, reason } => {
                warn!("CATLG | rejected {}: {}", dir.display(), reason);
            }
            AppEvent::Matched { dir } => {
                info!("MATCH | {}", dir.display());
            }
            AppEvent::NoMatch => {
                info!("MATCH | none");
            }
            AppEvent::PresentationFinished { dir, executed, skipped, failed } => {
                let name = dir
                    .as_ref()
                    .map_or_else(|| "<built-in>".to_owned(), |d| d.display().to_string());
                info!(
                    "SHOW  | {} | executed={} skipped={} failed={}",
                    name, executed, skipped, failed
                );
            }
            AppEvent::Finished => {
                info!("DONE  | routine finished");
            }
        }
    }
}
