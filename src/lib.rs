//! AirGuard core
//!
//! Turns the output of platform WiFi tools into `Network` records and runs
//! a rule-based threat detector over successive scans.

pub mod constants;
pub mod logic;

pub use logic::config::AppConfig;
pub use logic::error::{ConfigError, ScanError};
pub use logic::network::{Network, ScanResult, SecurityType};
pub use logic::scanner::{Backend, CommandScanner, Scanner};
pub use logic::threat::{Threat, ThreatCategory, ThreatDetector, ThreatSeverity};
