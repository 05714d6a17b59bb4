//! wpa_supplicant Dialect
//!
//! `wpa_cli -i <if> scan_results`:
//!
//! ```text
//! bssid / frequency / signal level / flags / ssid
//! 00:11:22:33:44:55	2437	-45	[WPA2-PSK-CCMP][ESS]	HomeNet
//! ```

use chrono::Utc;

use super::common::{PendingRecord, SecurityFlags};
use super::BackendParser;
use crate::logic::network::{normalize_bssid, Network, VendorLookup};

#[derive(Debug, Clone, Copy, Default)]
pub struct WpaCliParser;

impl BackendParser for WpaCliParser {
    fn name(&self) -> &'static str {
        "wpa_cli"
    }

    fn parse(&self, output: &str, vendors: &dyn VendorLookup) -> Vec<Network> {
        let now = Utc::now();
        let mut networks = Vec::new();

        for line in output.lines() {
            let line = line.trim_end_matches('\r');
            let fields: Vec<&str> = line.split('\t').collect();

            // Header and "Selected interface" lines have no MAC in column one
            if normalize_bssid(fields[0]).is_none() {
                continue;
            }
            if fields.len() < 4 {
                log::debug!("wpa_cli: short line '{}'", line);
                continue;
            }

            let mut record = PendingRecord::with_bssid(fields[0]);
            record.frequency_mhz = fields[1].trim().parse().unwrap_or(0);
            record.rssi_dbm = fields[2].trim().parse().ok();
            record.security = parse_flags(fields[3]);
            // Missing column and empty column are both hidden
            record.ssid = Some(fields.get(4).map(|s| s.to_string()).unwrap_or_default());

            if let Some(network) = record.finish(vendors, now) {
                networks.push(network);
            }
        }

        networks
    }
}

/// Bracketed flags, e.g. `[WPA2-EAP-CCMP][WPA3-SAE-CCMP][ESS][WPS]`
fn parse_flags(flags: &str) -> SecurityFlags {
    let mut security = SecurityFlags::default();
    let mut recognized = true;

    for flag in flags
        .split(|c| c == '[' || c == ']')
        .map(str::trim)
        .filter(|f| !f.is_empty())
    {
        let upper = flag.to_ascii_uppercase();
        if upper.starts_with("WPA3") || upper.contains("SAE") {
            security.wpa3 = true;
        } else if upper.starts_with("WPA2") || upper.starts_with("RSN") {
            security.wpa2 = true;
        } else if upper.starts_with("WPA") {
            security.wpa = true;
        } else if upper == "WEP" {
            security.encrypted = true;
        } else if !matches!(upper.as_str(), "ESS" | "IBSS" | "WPS" | "P2P" | "HS20" | "MESH" | "DMG" | "PBSS")
        {
            recognized = false;
            log::debug!("wpa_cli: unrecognized flag '{}'", flag);
        }

        if upper.contains("EAP") {
            security.enterprise = true;
        }
    }

    // Only capability flags (or nothing) means no encryption
    let encrypted = security.wpa3 || security.wpa2 || security.wpa || security.encrypted;
    if !encrypted && recognized {
        security.open = true;
    }
    security
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::network::{SecurityType, UnknownVendor};

    const SAMPLE_OUTPUT: &str = "\
bssid / frequency / signal level / flags / ssid
aa:bb:cc:dd:ee:01\t2437\t-45\t[WPA2-PSK-CCMP][ESS]\tHomeNet
aa:bb:cc:dd:ee:02\t5180\t-67\t[WPA2-PSK-CCMP][WPA3-SAE-CCMP][ESS]\tModern
aa:bb:cc:dd:ee:03\t2412\t-80\t[ESS]\tFreeWifi
aa:bb:cc:dd:ee:04\t5745\t-58\t[WPA2-EAP-CCMP][ESS]\tCorp
aa:bb:cc:dd:ee:05\t2462\t-71\t[WEP][ESS]\t
aa:bb:cc:dd:ee:06\t2437\t-62\t[WPA-PSK-TKIP][ESS]\tLegacy
";

    fn parse(output: &str) -> Vec<Network> {
        WpaCliParser.parse(output, &UnknownVendor)
    }

    #[test]
    fn test_parse_sample_output() {
        let networks = parse(SAMPLE_OUTPUT);
        assert_eq!(networks.len(), 6);

        let home = &networks[0];
        assert_eq!(home.bssid, "AA:BB:CC:DD:EE:01");
        assert_eq!(home.ssid, "HomeNet");
        assert_eq!(home.channel, 6);
        assert_eq!(home.rssi_dbm, -45);
        assert_eq!(home.security, SecurityType::Wpa2);
    }

    #[test]
    fn test_flag_precedence() {
        let networks = parse(SAMPLE_OUTPUT);
        assert_eq!(networks[1].security, SecurityType::Wpa3);
        assert_eq!(networks[2].security, SecurityType::Open);
        assert_eq!(networks[3].security, SecurityType::Wpa2Enterprise);
        assert_eq!(networks[4].security, SecurityType::Wep);
        assert_eq!(networks[5].security, SecurityType::Wpa);
    }

    #[test]
    fn test_hidden_ssid_column() {
        let networks = parse(SAMPLE_OUTPUT);
        assert!(networks[4].is_hidden());

        let networks = parse("aa:bb:cc:dd:ee:07\t2437\t-50\t[ESS]\n");
        assert_eq!(networks.len(), 1);
        assert_eq!(networks[0].ssid, "");
    }

    #[test]
    fn test_empty_flags_are_open() {
        let networks = parse("aa:bb:cc:dd:ee:08\t2437\t-50\t\tOpenNet\n");
        assert_eq!(networks[0].security, SecurityType::Open);
    }

    #[test]
    fn test_unknown_flag_is_not_open() {
        let networks = parse("aa:bb:cc:dd:ee:09\t2437\t-50\t[FOO][ESS]\tOdd\n");
        assert_eq!(networks[0].security, SecurityType::Unknown);
    }

    #[test]
    fn test_skips_header_and_malformed() {
        let output = "Selected interface 'wlan0'\nbssid / frequency / signal level / flags / ssid\naa:bb:cc:dd:ee:0a\tnot-a-number\n";
        assert!(parse(output).is_empty());
    }

    #[test]
    fn test_bad_numbers_degrade() {
        let networks = parse("aa:bb:cc:dd:ee:0b\tabc\txyz\t[WPA2-PSK-CCMP]\tX\n");
        assert_eq!(networks[0].frequency_mhz, 0);
        assert_eq!(networks[0].channel, 0);
        assert_eq!(networks[0].rssi_dbm, crate::constants::MISSING_RSSI_DBM);
    }
}
