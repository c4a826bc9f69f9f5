//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements        | Connects to                       |
//! |------------|-------------------|-----------------------------------|
//! | `clock`    | TimePort          | `std::thread::sleep` + Ctrl-C flag|
//! | `hotspot`  | ConnectivityPort  | NetworkManager (`nmcli`) + HTTP   |
//! | `locator`  | LocatorPort       | External BSSID locator command    |
//! | `log_sink` | EventSink         | `log` facade                      |
//! | `panel`    | DisplayPort       | Host stand-in, PBM frame snapshots|
//! | `scanner`  | ScannerPort       | `iwlist <iface> scan`             |

pub mod clock;
pub mod hotspot;
pub mod locator;
pub mod log_sink;
pub mod panel;
pub mod scanner;
pub(super) mod utils;
