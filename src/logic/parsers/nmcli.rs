//! NetworkManager Dialect
//!
//! `nmcli -t -f SSID,BSSID,CHAN,FREQ,SIGNAL,SECURITY device wifi list`
//!
//! One network per line. Terse mode escapes `:` inside values as `\:`.
//! SIGNAL is a 0-100 percentage. An empty SECURITY field means Open.

use chrono::Utc;

use super::common::{PendingRecord, SecurityFlags};
use super::BackendParser;
use crate::logic::network::{percent_to_dbm, Network, VendorLookup};

/// SSID,BSSID,CHAN,FREQ,SIGNAL,SECURITY
const FIELD_COUNT: usize = 6;

/// Fields of an unescaped line: SSID + 6 MAC octets + 4 trailing fields
const UNESCAPED_MIN_FIELDS: usize = 11;

#[derive(Debug, Clone, Copy, Default)]
pub struct NmcliParser;

impl BackendParser for NmcliParser {
    fn name(&self) -> &'static str {
        "nmcli"
    }

    fn parse(&self, output: &str, vendors: &dyn VendorLookup) -> Vec<Network> {
        let now = Utc::now();
        output
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                let record = parse_line(line.trim_end_matches('\r'));
                if record.is_none() {
                    log::debug!("nmcli: skipping malformed line '{}'", line);
                }
                record
            })
            .filter_map(|record| record.finish(vendors, now))
            .collect()
    }
}

fn parse_line(line: &str) -> Option<PendingRecord> {
    let fields = split_terse(line);

    let (ssid, bssid, chan, freq, signal, security) = if fields.len() == FIELD_COUNT {
        (
            fields[0].clone(),
            fields[1].clone(),
            &fields[2],
            &fields[3],
            &fields[4],
            fields[5].clone(),
        )
    } else if fields.len() >= UNESCAPED_MIN_FIELDS {
        // Escaping disabled: the BSSID spans six fields
        (
            fields[0].clone(),
            fields[1..7].join(":"),
            &fields[7],
            &fields[8],
            &fields[9],
            fields[10..].join(":"),
        )
    } else {
        return None;
    };

    let mut record = PendingRecord::with_bssid(&bssid);
    record.ssid = Some(if ssid == "--" { String::new() } else { ssid });
    record.channel = chan.trim().parse().unwrap_or(0);
    record.frequency_mhz = freq
        .trim()
        .trim_end_matches("MHz")
        .trim()
        .parse()
        .unwrap_or(0);
    record.rssi_dbm = signal.trim().parse::<u32>().ok().map(percent_to_dbm);
    record.security = parse_security(&security);
    Some(record)
}

/// Split on unescaped `:` and unescape `\:` and `\\`
fn split_terse(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next) => current.push(next),
                None => current.push('\\'),
            },
            ':' => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Tokens like `WPA2`, `WPA1 WPA2`, `WPA2 802.1X`, `WPA3`, `WEP`, or empty / `--`
fn parse_security(value: &str) -> SecurityFlags {
    let mut flags = SecurityFlags::default();
    let value = value.trim();

    if value.is_empty() || value == "--" {
        flags.open = true;
        return flags;
    }

    for token in value.split_whitespace() {
        match token.to_ascii_uppercase().as_str() {
            "WPA3" => flags.wpa3 = true,
            "WPA2" => flags.wpa2 = true,
            "WPA1" | "WPA" => flags.wpa = true,
            "WEP" => flags.encrypted = true,
            "802.1X" => flags.enterprise = true,
            other => log::debug!("nmcli: unrecognized security token '{}'", other),
        }
    }

    // 802.1X alone is dynamic WEP
    if flags.enterprise && !(flags.wpa3 || flags.wpa2 || flags.wpa) {
        flags.encrypted = true;
    }
    flags
}
