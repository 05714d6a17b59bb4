//! Shared Parser Building Blocks
//!
//! Every dialect accumulates fields into a `PendingRecord` and finalizes it
//! into a `Network` once the next sentinel line (or end of input) is reached.

use chrono::{DateTime, Utc};

use crate::constants::MISSING_RSSI_DBM;
use crate::logic::network::channel;
use crate::logic::network::{normalize_bssid, Network, SecurityType, VendorLookup};

// ============================================================================
// SECURITY EVIDENCE
// ============================================================================

/// Evidence collected about a network's security while reading its block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SecurityFlags {
    pub wpa3: bool,
    pub wpa2: bool,
    pub wpa: bool,
    /// Privacy bit / "Encryption key:on" without any WPA element
    pub encrypted: bool,
    /// 802.1X / EAP key management
    pub enterprise: bool,
    /// Explicit evidence of no encryption
    pub open: bool,
}

impl SecurityFlags {
    /// Fixed precedence: WPA3 > WPA2 > WPA > encrypted (WEP) > open.
    ///
    /// No evidence at all is `Unknown`, never `Open`.
    pub fn resolve(&self) -> SecurityType {
        if self.wpa3 {
            if self.enterprise {
                SecurityType::Wpa3Enterprise
            } else {
                SecurityType::Wpa3
            }
        } else if self.wpa2 {
            if self.enterprise {
                SecurityType::Wpa2Enterprise
            } else {
                SecurityType::Wpa2
            }
        } else if self.wpa {
            SecurityType::Wpa
        } else if self.encrypted {
            SecurityType::Wep
        } else if self.open {
            SecurityType::Open
        } else {
            SecurityType::Unknown
        }
    }
}

// ============================================================================
// PENDING RECORD
// ============================================================================

/// Working record for one network block
#[derive(Debug, Clone, Default)]
pub struct PendingRecord {
    pub bssid: Option<String>,
    /// `None` means no SSID field was seen: emitted as hidden
    pub ssid: Option<String>,
    pub channel: u32,
    pub frequency_mhz: u32,
    pub rssi_dbm: Option<i32>,
    pub security: SecurityFlags,
}

impl PendingRecord {
    pub fn with_bssid(bssid: &str) -> Self {
        Self {
            bssid: Some(bssid.to_string()),
            ..Default::default()
        }
    }

    /// Finalize into a `Network`. Records without a valid BSSID are dropped.
    pub fn finish(self, vendors: &dyn VendorLookup, now: DateTime<Utc>) -> Option<Network> {
        let raw = self.bssid?;
        let Some(bssid) = normalize_bssid(&raw) else {
            log::debug!("Dropping record with malformed BSSID '{}'", raw);
            return None;
        };

        let (channel, frequency_mhz) = channel::reconcile(self.channel, self.frequency_mhz);
        let vendor = vendors.lookup(&bssid);

        Some(Network {
            ssid: self.ssid.unwrap_or_default(),
            bssid,
            channel,
            frequency_mhz,
            rssi_dbm: self.rssi_dbm.unwrap_or(MISSING_RSSI_DBM),
            security: self.security.resolve(),
            vendor,
            last_seen: now,
        })
    }
}

// ============================================================================
// BLOCK COLLECTOR
// ============================================================================

/// Sentinel-delimited accumulation with a guaranteed tail flush
pub struct BlockCollector<'a> {
    vendors: &'a dyn VendorLookup,
    now: DateTime<Utc>,
    current: Option<PendingRecord>,
    networks: Vec<Network>,
}

impl<'a> BlockCollector<'a> {
    pub fn new(vendors: &'a dyn VendorLookup) -> Self {
        Self {
            vendors,
            now: Utc::now(),
            current: None,
            networks: Vec::new(),
        }
    }

    /// Flush the working record and start a new one
    pub fn start(&mut self, record: PendingRecord) -> &mut PendingRecord {
        self.flush();
        self.current.insert(record)
    }

    /// Working record, if a sentinel has been seen
    pub fn current(&mut self) -> Option<&mut PendingRecord> {
        self.current.as_mut()
    }

    pub fn flush(&mut self) {
        if let Some(record) = self.current.take() {
            if let Some(network) = record.finish(self.vendors, self.now) {
                self.networks.push(network);
            }
        }
    }

    pub fn finish(mut self) -> Vec<Network> {
        self.flush();
        self.networks
    }
}

// ============================================================================
// FIELD HELPERS
// ============================================================================

/// Split `Key : Value` on the first `" : "`, or a trailing `" :"` for an
/// empty value. Colons inside MACs and SSIDs are left alone.
pub fn split_kv(line: &str) -> Option<(&str, &str)> {
    if let Some(idx) = line.find(" : ") {
        return Some((line[..idx].trim(), line[idx + 3..].trim()));
    }
    line.strip_suffix(" :").map(|key| (key.trim(), ""))
}

/// Leading integer of a field value, e.g. `"6 (2437 MHz)"` -> 6
pub fn leading_u32(value: &str) -> Option<u32> {
    let digits: String = value
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Scan tools print a hidden SSID as a run of `\x00` escapes
pub fn clean_ssid(raw: &str) -> String {
    let trimmed = raw.trim_end_matches(['\r', '\n']);
    if trimmed.replace("\\x00", "").is_empty() {
        return String::new();
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::network::UnknownVendor;

    #[test]
    fn test_security_precedence() {
        let flags = SecurityFlags { wpa3: true, wpa2: true, wpa: true, ..Default::default() };
        assert_eq!(flags.resolve(), SecurityType::Wpa3);

        let flags = SecurityFlags { wpa2: true, enterprise: true, ..Default::default() };
        assert_eq!(flags.resolve(), SecurityType::Wpa2Enterprise);

        let flags = SecurityFlags { encrypted: true, open: true, ..Default::default() };
        assert_eq!(flags.resolve(), SecurityType::Wep);

        let flags = SecurityFlags { open: true, ..Default::default() };
        assert_eq!(flags.resolve(), SecurityType::Open);

        assert_eq!(SecurityFlags::default().resolve(), SecurityType::Unknown);
    }

    #[test]
    fn test_finish_requires_bssid() {
        let record = PendingRecord { ssid: Some("Cafe".into()), ..Default::default() };
        assert!(record.finish(&UnknownVendor, Utc::now()).is_none());

        let record = PendingRecord::with_bssid("not-a-mac");
        assert!(record.finish(&UnknownVendor, Utc::now()).is_none());
    }

    #[test]
    fn test_finish_defaults() {
        let mut record = PendingRecord::with_bssid("aa:bb:cc:dd:ee:ff");
        record.frequency_mhz = 2437;
        let net = record.finish(&UnknownVendor, Utc::now()).unwrap();
        assert_eq!(net.bssid, "AA:BB:CC:DD:EE:FF");
        assert_eq!(net.channel, 6);
        assert_eq!(net.rssi_dbm, MISSING_RSSI_DBM);
        assert_eq!(net.ssid, "");
        assert!(net.is_hidden());
        assert_eq!(net.security, SecurityType::Unknown);
        assert_eq!(net.vendor, "Unknown");
    }

    #[test]
    fn test_collector_flushes_tail() {
        let mut collector = BlockCollector::new(&UnknownVendor);
        collector.start(PendingRecord::with_bssid("00:11:22:33:44:01"));
        collector.start(PendingRecord::with_bssid("00:11:22:33:44:02"));
        let networks = collector.finish();
        assert_eq!(networks.len(), 2);
        assert_eq!(networks[1].bssid, "00:11:22:33:44:02");
    }

    #[test]
    fn test_split_kv() {
        assert_eq!(split_kv("Signal : 84%"), Some(("Signal", "84%")));
        assert_eq!(
            split_kv("BSSID 1     : d8:32:14:b0:a0:3e"),
            Some(("BSSID 1", "d8:32:14:b0:a0:3e"))
        );
        assert_eq!(split_kv("SSID 3 :"), Some(("SSID 3", "")));
        assert_eq!(split_kv("no separator"), None);
    }

    #[test]
    fn test_clean_ssid() {
        assert_eq!(clean_ssid("\\x00\\x00\\x00"), "");
        assert_eq!(clean_ssid("Cafe"), "Cafe");
        assert_eq!(leading_u32(" 11 (2462 MHz)"), Some(11));
        assert_eq!(leading_u32("abc"), None);
    }
}
