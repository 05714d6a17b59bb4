//! iwlist Dialect
//!
//! `iwlist <if> scan` (wireless-tools). Blocks start at
//! `Cell NN - Address: aa:bb:cc:dd:ee:ff`. Signal may be dBm or `NN/100`.

use once_cell::sync::Lazy;
use regex::Regex;

use super::common::{clean_ssid, leading_u32, BlockCollector, PendingRecord};
use super::BackendParser;
use crate::logic::network::{percent_to_dbm, Network, VendorLookup};

static CELL_LINE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^Cell \d+ - Address:\s*(\S+)").ok());

static ESSID: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r#"ESSID:"(.*)""#).ok());

static FREQUENCY: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"Frequency[:=]\s*([\d.]+)\s*GHz").ok());

static SIGNAL: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"Signal level[=:]\s*(-?\d+)(?:/(\d+))?").ok());

#[derive(Debug, Clone, Copy, Default)]
pub struct IwlistParser;

impl BackendParser for IwlistParser {
    fn name(&self) -> &'static str {
        "iwlist"
    }

    fn parse(&self, output: &str, vendors: &dyn VendorLookup) -> Vec<Network> {
        let mut collector = BlockCollector::new(vendors);

        for line in output.lines() {
            let line = line.trim();

            if line.starts_with("Cell ") {
                match capture(&CELL_LINE, line) {
                    Some(bssid) => {
                        collector.start(PendingRecord::with_bssid(&bssid));
                    }
                    None => {
                        // Keep following fields out of the previous block
                        log::debug!("iwlist: bad cell line '{}'", line);
                        collector.start(PendingRecord::default());
                    }
                }
                continue;
            }

            let Some(record) = collector.current() else {
                continue;
            };
            parse_field(record, line);
        }

        collector.finish()
    }
}

fn capture(re: &Lazy<Option<Regex>>, line: &str) -> Option<String> {
    let caps = re.as_ref()?.captures(line)?;
    Some(caps[1].to_string())
}

fn parse_field(record: &mut PendingRecord, line: &str) {
    if line.contains("ESSID:") {
        record.ssid = Some(capture(&ESSID, line).map(|s| clean_ssid(&s)).unwrap_or_default());
    } else if let Some(value) = line.strip_prefix("Channel:") {
        if let Some(ch) = leading_u32(value) {
            record.channel = ch;
        }
    } else if line.starts_with("Frequency") {
        match capture(&FREQUENCY, line).and_then(|g| g.parse::<f64>().ok()) {
            Some(ghz) => record.frequency_mhz = (ghz * 1000.0).round() as u32,
            None => log::debug!("iwlist: bad frequency line '{}'", line),
        }
        // "Frequency:2.437 GHz (Channel 6)"
        if record.channel == 0 {
            if let Some(idx) = line.find("(Channel ") {
                record.channel = leading_u32(&line[idx + 9..]).unwrap_or(0);
            }
        }
    } else if line.contains("Signal level") {
        parse_signal(record, line);
    } else if let Some(value) = line.strip_prefix("Encryption key:") {
        match value.trim() {
            "on" => record.security.encrypted = true,
            "off" => record.security.open = true,
            other => log::debug!("iwlist: unknown encryption value '{}'", other),
        }
    } else if let Some(value) = line.strip_prefix("IE:") {
        if value.contains("WPA2") {
            record.security.wpa2 = true;
        } else if value.contains("WPA Version") {
            record.security.wpa = true;
        }
    } else if line.starts_with("Authentication Suites") {
        let upper = line.to_ascii_uppercase();
        if upper.contains("802.1X") {
            record.security.enterprise = true;
        }
        if upper.contains("SAE") {
            record.security.wpa3 = true;
        }
    }
}

fn parse_signal(record: &mut PendingRecord, line: &str) {
    let Some(caps) = SIGNAL.as_ref().and_then(|re| re.captures(line)) else {
        log::debug!("iwlist: bad signal line '{}'", line);
        return;
    };
    let Ok(level) = caps[1].parse::<i32>() else {
        return;
    };

    record.rssi_dbm = match caps.get(2).and_then(|m| m.as_str().parse::<i32>().ok()) {
        // Quality form "60/100"
        Some(scale) if scale > 0 => {
            let percent = (level.max(0) * 100 / scale) as u32;
            Some(percent_to_dbm(percent))
        }
        _ => Some(level),
    };
}
