//! Windows netsh Dialect
//!
//! `netsh wlan show networks mode=bssid`. Authentication and Encryption are
//! listed once per SSID, before its BSSIDs, and apply to each of them.
//!
//! ```text
//! SSID 1 : HomeNet
//!     Network type            : Infrastructure
//!     Authentication          : WPA2-Personal
//!     Encryption              : CCMP
//!     BSSID 1                 : d8:32:14:b0:a0:3e
//!          Signal             : 84%
//!          Channel            : 48
//! ```

use super::common::{split_kv, BlockCollector, PendingRecord, SecurityFlags};
use super::BackendParser;
use crate::logic::network::{percent_to_dbm, Network, VendorLookup};

#[derive(Debug, Clone, Copy, Default)]
pub struct NetshParser;

impl BackendParser for NetshParser {
    fn name(&self) -> &'static str {
        "netsh"
    }

    fn parse(&self, output: &str, vendors: &dyn VendorLookup) -> Vec<Network> {
        let mut collector = BlockCollector::new(vendors);
        let mut ssid = String::new();
        let mut ssid_security = SecurityFlags::default();

        for line in output.lines() {
            let line = line.trim();
            let Some((key, value)) = split_kv(line) else {
                continue;
            };
            let key_upper = key.to_ascii_uppercase();

            if key_upper.starts_with("SSID") {
                collector.flush();
                ssid = value.to_string();
                ssid_security = SecurityFlags::default();
            } else if key_upper.starts_with("BSSID") {
                let mut record = PendingRecord::with_bssid(value);
                record.ssid = Some(ssid.clone());
                record.security = ssid_security;
                collector.start(record);
            } else if key_upper.starts_with("AUTHENTICATION") {
                ssid_security = parse_authentication(value, ssid_security);
                apply_to_current(&mut collector, ssid_security);
            } else if key_upper.starts_with("ENCRYPTION") {
                if value.eq_ignore_ascii_case("WEP") {
                    ssid_security.encrypted = true;
                    apply_to_current(&mut collector, ssid_security);
                }
            } else if let Some(record) = collector.current() {
                if key_upper.starts_with("SIGNAL") {
                    match value.trim_end_matches('%').trim().parse::<u32>() {
                        Ok(pct) => record.rssi_dbm = Some(percent_to_dbm(pct)),
                        Err(_) => log::debug!("netsh: bad signal '{}'", value),
                    }
                } else if key_upper.starts_with("CHANNEL") {
                    match value.parse::<u32>() {
                        Ok(ch) => record.channel = ch,
                        Err(_) => log::debug!("netsh: bad channel '{}'", value),
                    }
                }
            }
        }

        collector.finish()
    }
}

/// Authentication lines normally precede the BSSIDs, but keep any open
/// block consistent if a localized layout reorders them.
fn apply_to_current(collector: &mut BlockCollector<'_>, security: SecurityFlags) {
    if let Some(record) = collector.current() {
        record.security = security;
    }
}

fn parse_authentication(value: &str, mut flags: SecurityFlags) -> SecurityFlags {
    let upper = value.to_ascii_uppercase();
    let enterprise = upper.contains("ENTERPRISE");

    if upper.contains("WPA3") {
        flags.wpa3 = true;
    } else if upper.contains("WPA2") {
        flags.wpa2 = true;
    } else if upper.contains("WPA") {
        flags.wpa = true;
    } else if upper.contains("WEP") || upper.contains("SHARED") {
        flags.encrypted = true;
    } else if upper == "OPEN" || upper == "NONE" {
        flags.open = true;
    } else {
        log::debug!("netsh: unknown authentication '{}'", value);
    }

    flags.enterprise |= enterprise;
    flags
}
