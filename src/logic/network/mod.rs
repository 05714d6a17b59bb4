//! Network Module
//!
//! Canonical WiFi observation model shared by the parsers, scanners and
//! the threat detector.
//!
//! ## Structure
//! - `types`: Network, ScanResult, SecurityType, Band
//! - `channel`: channel <-> frequency conversion
//! - `vendor`: BSSID -> vendor lookup (OUI table)

pub mod channel;
pub mod types;
pub mod vendor;

pub use channel::{channel_to_frequency, frequency_to_channel};

pub use types::{
    normalize_bssid,
    percent_to_dbm,
    Band,
    Network,
    ScanResult,
    SecurityType,
};

pub use vendor::{OuiDatabase, UnknownVendor, VendorLookup, PRIVATE_VENDOR};
