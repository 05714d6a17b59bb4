//! Backend Parsers
//!
//! Turn raw scan-tool output into canonical `Network` records.
//!
//! ## Structure
//! - `common`: pending record, security evidence, block collector
//! - `nmcli`: NetworkManager terse table
//! - `iw`: `iw dev <if> scan` blocks
//! - `iwlist`: wireless-tools `Cell` blocks
//! - `wpa_cli`: wpa_supplicant tab-separated rows
//! - `netsh`: Windows `show networks mode=bssid`
//!
//! Parsers never fail. Malformed fields are skipped, and a record is only
//! emitted when it carries a valid BSSID.

pub mod common;
pub mod iw;
pub mod iwlist;
pub mod netsh;
pub mod nmcli;
pub mod wpa_cli;

use crate::logic::network::{Network, VendorLookup};

pub use common::SecurityFlags;
pub use iw::IwParser;
pub use iwlist::IwlistParser;
pub use netsh::NetshParser;
pub use nmcli::NmcliParser;
pub use wpa_cli::WpaCliParser;

/// One scan-tool output dialect
pub trait BackendParser: Send + Sync {
    /// Dialect name, e.g. "nmcli"
    fn name(&self) -> &'static str;

    fn parse(&self, output: &str, vendors: &dyn VendorLookup) -> Vec<Network>;

    /// Raw process output; invalid UTF-8 is replaced, not rejected
    fn parse_bytes(&self, output: &[u8], vendors: &dyn VendorLookup) -> Vec<Network> {
        self.parse(&String::from_utf8_lossy(output), vendors)
    }
}
