//! WiFi scan adapter: `sudo iwlist <interface> scan`.

use log::debug;

use crate::app::ports::ScannerPort;
use crate::error::ScanError;

use super::utils::run_command;

pub struct IwlistScanner {
    interface: String,
}

impl IwlistScanner {
    pub fn new(interface: impl Into<String>) -> Self {
        Self { interface: interface.into() }
    }
}

impl ScannerPort for IwlistScanner {
    fn scan(&mut self) -> Result<String, ScanError> {
        debug!("SCAN: iwlist {} scan", self.interface);
        run_command("sudo", &["iwlist", &self.interface, "scan"]).map_err(ScanError::ScannerFailed)
    }
}
