//! Logic Module - Scanning & Detection Engines
//!
//! ## Structure
//! - `network/` - Network record, ScanResult, channel math, vendor lookup
//! - `parsers/` - One parser per backend output dialect
//! - `scanner/` - Backend registry, process runner, auto-detection, scan loop
//! - `threat/` - Rules and the stateful ThreatDetector
//! - `config` - JSON config file + env overrides
//! - `error` - ScanError, ConfigError

pub mod config;
pub mod error;
pub mod network;
pub mod parsers;
pub mod scanner;
pub mod threat;
