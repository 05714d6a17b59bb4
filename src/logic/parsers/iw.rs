//! iw Dialect
//!
//! `iw dev <if> scan`. Each block starts with an unindented
//! `BSS aa:bb:cc:dd:ee:ff(on wlan0)` line; field lines are tab-indented.

use once_cell::sync::Lazy;
use regex::Regex;

use super::common::{clean_ssid, leading_u32, BlockCollector, PendingRecord};
use super::BackendParser;
use crate::logic::network::{Network, VendorLookup};

static BSS_LINE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^BSS ((?:[0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2})").ok());

#[derive(Debug, Clone, Copy, Default)]
pub struct IwParser;

impl BackendParser for IwParser {
    fn name(&self) -> &'static str {
        "iw"
    }

    fn parse(&self, output: &str, vendors: &dyn VendorLookup) -> Vec<Network> {
        let mut collector = BlockCollector::new(vendors);

        for raw in output.lines() {
            let raw = raw.trim_end_matches('\r');

            // Sentinel is checked on the untrimmed line: "\tBSS Load:" is a field
            if let Some(bssid) = sentinel(raw) {
                collector.start(PendingRecord::with_bssid(&bssid));
                continue;
            }

            let Some(record) = collector.current() else {
                continue;
            };
            parse_field(record, raw.trim());
        }

        collector.finish()
    }
}

fn sentinel(line: &str) -> Option<String> {
    if !line.starts_with("BSS ") {
        return None;
    }
    let caps = BSS_LINE.as_ref()?.captures(line)?;
    Some(caps[1].to_string())
}

fn parse_field(record: &mut PendingRecord, line: &str) {
    if let Some(value) = line.strip_prefix("SSID:") {
        record.ssid = Some(clean_ssid(value.trim()));
    } else if let Some(value) = line.strip_prefix("freq:") {
        // Newer iw prints "2437.0"
        match value.trim().parse::<f64>() {
            Ok(freq) if freq > 0.0 => record.frequency_mhz = freq.round() as u32,
            _ => log::debug!("iw: bad freq line '{}'", line),
        }
    } else if let Some(value) = line.strip_prefix("signal:") {
        let number = value.trim().trim_end_matches("dBm").trim();
        match number.parse::<f64>() {
            // Integer part only: "-71.50" is -71
            Ok(dbm) => record.rssi_dbm = Some(dbm.trunc() as i32),
            Err(_) => log::debug!("iw: bad signal line '{}'", line),
        }
    } else if let Some(value) = line.strip_prefix("DS Parameter set: channel") {
        if let Some(ch) = leading_u32(value) {
            record.channel = ch;
        }
    } else if let Some(value) = line.strip_prefix("* primary channel:") {
        if record.channel == 0 {
            if let Some(ch) = leading_u32(value) {
                record.channel = ch;
            }
        }
    } else if let Some(value) = line.strip_prefix("capability:") {
        if value.contains("Privacy") {
            record.security.encrypted = true;
        } else {
            record.security.open = true;
        }
    } else if line.starts_with("RSN:") {
        record.security.wpa2 = true;
    } else if line.starts_with("WPA:") {
        record.security.wpa = true;
    } else if let Some(value) = line.strip_prefix("* Authentication suites:") {
        if value.contains("SAE") {
            record.security.wpa3 = true;
        }
        if value.contains("802.1X") {
            record.security.enterprise = true;
        }
    }
}
