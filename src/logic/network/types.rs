//! Network Types
//!
//! Canonical records produced by every scan backend.
//! No parsing and no I/O here - only data structures and derived values.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::channel;
use crate::constants::{MISSING_RSSI_DBM, UNKNOWN_VENDOR};
use crate::logic::threat::Threat;

// ============================================================================
// SIGNAL MAPPING
// ============================================================================

/// Weakest RSSI that still maps above 0%
pub const RSSI_FLOOR_DBM: i32 = -90;

/// Strongest RSSI that maps to 100%
pub const RSSI_CEIL_DBM: i32 = -30;

/// Convert a 0-100 "quality" percentage into approximate dBm.
///
/// Inverse of [`Network::signal_percent`]: `-90 + pct * 0.6`, truncated.
/// Downstream thresholds are tuned against this exact constant.
pub fn percent_to_dbm(percent: u32) -> i32 {
    let pct = percent.min(100) as f64;
    (-90.0 + pct * 0.6) as i32
}

// ============================================================================
// SECURITY TYPE
// ============================================================================

/// WiFi security/encryption type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecurityType {
    Open,
    #[serde(rename = "WEP")]
    Wep,
    #[serde(rename = "WPA")]
    Wpa,
    #[serde(rename = "WPA2")]
    Wpa2,
    #[serde(rename = "WPA3")]
    Wpa3,
    #[serde(rename = "WPA2-Enterprise")]
    Wpa2Enterprise,
    #[serde(rename = "WPA3-Enterprise")]
    Wpa3Enterprise,
    Unknown,
}

impl SecurityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityType::Open => "Open",
            SecurityType::Wep => "WEP",
            SecurityType::Wpa => "WPA",
            SecurityType::Wpa2 => "WPA2",
            SecurityType::Wpa3 => "WPA3",
            SecurityType::Wpa2Enterprise => "WPA2-Enterprise",
            SecurityType::Wpa3Enterprise => "WPA3-Enterprise",
            SecurityType::Unknown => "Unknown",
        }
    }

    /// Open, WEP and first-generation WPA
    pub fn is_weak(&self) -> bool {
        matches!(self, SecurityType::Open | SecurityType::Wep | SecurityType::Wpa)
    }
}

impl Default for SecurityType {
    fn default() -> Self {
        SecurityType::Unknown
    }
}

impl std::fmt::Display for SecurityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// BAND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    #[serde(rename = "2.4GHz")]
    TwoPointFourGhz,
    #[serde(rename = "5GHz")]
    FiveGhz,
}

impl Band {
    /// Anything below 3000 MHz (including the unknown `0`) counts as 2.4 GHz.
    pub fn from_frequency(freq_mhz: u32) -> Self {
        if freq_mhz < 3000 {
            Band::TwoPointFourGhz
        } else {
            Band::FiveGhz
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Band::TwoPointFourGhz => "2.4GHz",
            Band::FiveGhz => "5GHz",
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// BSSID
// ============================================================================

/// Normalize a MAC address into `AA:BB:CC:DD:EE:FF`.
///
/// Accepts `:`, `-` or `.` separators, or 12 bare hex digits.
/// Returns `None` for anything that is not exactly six octets.
pub fn normalize_bssid(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let octets: Vec<&str> = if raw.contains(':') {
        raw.split(':').collect()
    } else if raw.contains('-') {
        raw.split('-').collect()
    } else {
        let digits: String = raw.chars().filter(|c| *c != '.').collect();
        if digits.len() != 12 || !digits.is_ascii() {
            return None;
        }
        return normalize_bssid(
            &(0..6).map(|i| &digits[i * 2..i * 2 + 2]).collect::<Vec<_>>().join(":"),
        );
    };

    if octets.len() != 6 {
        return None;
    }
    if !octets
        .iter()
        .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()))
    {
        return None;
    }

    Some(octets.join(":").to_uppercase())
}

// ============================================================================
// NETWORK
// ============================================================================

/// One observed access point at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    /// May be empty: hidden network
    pub ssid: String,
    /// Normalized, uppercase, colon separated
    pub bssid: String,
    /// 0 = unknown
    pub channel: u32,
    /// 0 = unknown
    pub frequency_mhz: u32,
    /// Raw value as reported; clamping only happens in derived values
    pub rssi_dbm: i32,
    pub security: SecurityType,
    pub vendor: String,
    pub last_seen: DateTime<Utc>,
}

impl Network {
    /// Create a network with unknown radio data and security.
    ///
    /// The BSSID is normalized when possible, otherwise upper-cased as is.
    pub fn new(ssid: &str, bssid: &str) -> Self {
        Self {
            ssid: ssid.to_string(),
            bssid: normalize_bssid(bssid).unwrap_or_else(|| bssid.trim().to_uppercase()),
            channel: 0,
            frequency_mhz: 0,
            rssi_dbm: MISSING_RSSI_DBM,
            security: SecurityType::Unknown,
            vendor: UNKNOWN_VENDOR.to_string(),
            last_seen: Utc::now(),
        }
    }

    /// Set the channel and derive the frequency from it
    pub fn with_channel(mut self, channel: u32) -> Self {
        self.channel = channel;
        self.frequency_mhz = channel::channel_to_frequency(channel);
        self
    }

    /// Set the frequency and derive the channel from it
    pub fn with_frequency(mut self, freq_mhz: u32) -> Self {
        self.frequency_mhz = freq_mhz;
        self.channel = channel::frequency_to_channel(freq_mhz);
        self
    }

    pub fn with_rssi(mut self, rssi_dbm: i32) -> Self {
        self.rssi_dbm = rssi_dbm;
        self
    }

    pub fn with_security(mut self, security: SecurityType) -> Self {
        self.security = security;
        self
    }

    pub fn with_vendor(mut self, vendor: &str) -> Self {
        self.vendor = vendor.to_string();
        self
    }

    /// RSSI clamped to [-90, -30] and mapped linearly onto 0..=100
    pub fn signal_percent(&self) -> u8 {
        let rssi = self.rssi_dbm.clamp(RSSI_FLOOR_DBM, RSSI_CEIL_DBM);
        ((rssi - RSSI_FLOOR_DBM) * 100 / (RSSI_CEIL_DBM - RSSI_FLOOR_DBM)) as u8
    }

    pub fn signal_quality(&self) -> &'static str {
        match self.signal_percent() {
            80..=100 => "Excellent",
            60..=79 => "Good",
            40..=59 => "Fair",
            _ => "Weak",
        }
    }

    pub fn band(&self) -> Band {
        Band::from_frequency(self.frequency_mhz)
    }

    /// Empty or whitespace-only SSID
    pub fn is_hidden(&self) -> bool {
        self.ssid.trim().is_empty()
    }
}

// ============================================================================
// SCAN RESULT
// ============================================================================

/// Snapshot of one scan invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Discovery order, not semantically significant
    pub networks: Vec<Network>,
    pub scan_time: DateTime<Utc>,
    pub duration_seconds: f64,
    pub scanner_type: String,
    pub platform: String,
    /// Filled in after detection runs
    #[serde(default)]
    pub threats: Vec<Threat>,
    /// Transient failures swallowed during the scan
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ScanResult {
    pub fn new(networks: Vec<Network>, scanner_type: &str, platform: &str) -> Self {
        Self {
            networks,
            scan_time: Utc::now(),
            duration_seconds: 0.0,
            scanner_type: scanner_type.to_string(),
            platform: platform.to_string(),
            threats: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_duration(mut self, duration_seconds: f64) -> Self {
        self.duration_seconds = duration_seconds;
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn network_count(&self) -> usize {
        self.networks.len()
    }

    pub fn threat_count(&self) -> usize {
        self.threats.len()
    }

    /// The only mutation allowed after creation
    pub fn attach_threats(&mut self, threats: Vec<Threat>) {
        self.threats = threats;
    }

    /// Networks sorted by RSSI; ties keep discovery order
    pub fn networks_by_signal(&self, descending: bool) -> Vec<&Network> {
        let mut sorted: Vec<&Network> = self.networks.iter().collect();
        if descending {
            sorted.sort_by(|a, b| b.rssi_dbm.cmp(&a.rssi_dbm));
        } else {
            sorted.sort_by(|a, b| a.rssi_dbm.cmp(&b.rssi_dbm));
        }
        sorted
    }

    pub fn networks_by_channel(&self) -> BTreeMap<u32, Vec<&Network>> {
        let mut channels: BTreeMap<u32, Vec<&Network>> = BTreeMap::new();
        for network in &self.networks {
            channels.entry(network.channel).or_default().push(network);
        }
        channels
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_percent_anchor_points() {
        let net = |rssi| Network::new("x", "00:11:22:33:44:55").with_rssi(rssi);
        assert_eq!(net(-30).signal_percent(), 100);
        assert_eq!(net(-90).signal_percent(), 0);
        assert_eq!(net(-60).signal_percent(), 50);
        assert_eq!(net(-10).signal_percent(), 100);
        assert_eq!(net(-100).signal_percent(), 0);
    }

    #[test]
    fn test_signal_percent_monotonic() {
        let mut last = 0;
        for rssi in -110..=0 {
            let pct = Network::new("x", "00:11:22:33:44:55").with_rssi(rssi).signal_percent();
            assert!(pct >= last, "percent dropped at {rssi} dBm");
            last = pct;
        }
    }

    #[test]
    fn test_raw_rssi_preserved() {
        let net = Network::new("x", "00:11:22:33:44:55").with_rssi(-97);
        assert_eq!(net.rssi_dbm, -97);
        assert_eq!(net.signal_percent(), 0);
    }

    #[test]
    fn test_percent_to_dbm() {
        assert_eq!(percent_to_dbm(100), -30);
        assert_eq!(percent_to_dbm(0), -90);
        assert_eq!(percent_to_dbm(50), -60);
        assert_eq!(percent_to_dbm(84), -39);
        assert_eq!(percent_to_dbm(250), -30);
    }

    #[test]
    fn test_band() {
        assert_eq!(Network::new("a", "00:11:22:33:44:55").with_channel(6).band(), Band::TwoPointFourGhz);
        assert_eq!(Network::new("a", "00:11:22:33:44:55").with_channel(36).band(), Band::FiveGhz);
        assert_eq!(Band::from_frequency(0), Band::TwoPointFourGhz);
        assert_eq!(Band::FiveGhz.to_string(), "5GHz");
    }

    #[test]
    fn test_hidden() {
        assert!(Network::new("", "00:11:22:33:44:55").is_hidden());
        assert!(Network::new("   ", "00:11:22:33:44:55").is_hidden());
        assert!(!Network::new("Cafe", "00:11:22:33:44:55").is_hidden());
    }

    #[test]
    fn test_normalize_bssid() {
        assert_eq!(normalize_bssid("aa:bb:cc:dd:ee:ff").as_deref(), Some("AA:BB:CC:DD:EE:FF"));
        assert_eq!(normalize_bssid("AA-BB-CC-DD-EE-0F").as_deref(), Some("AA:BB:CC:DD:EE:0F"));
        assert_eq!(normalize_bssid("aabb.ccdd.eeff").as_deref(), Some("AA:BB:CC:DD:EE:FF"));
        assert_eq!(normalize_bssid(" 001122334455 ").as_deref(), Some("00:11:22:33:44:55"));
        assert_eq!(normalize_bssid("aa:bb:cc:dd:ee"), None);
        assert_eq!(normalize_bssid("zz:bb:cc:dd:ee:ff"), None);
        assert_eq!(normalize_bssid(""), None);
    }

    #[test]
    fn test_security_serde_names() {
        let json = serde_json::to_string(&SecurityType::Wpa2Enterprise).unwrap();
        assert_eq!(json, "\"WPA2-Enterprise\"");
        let parsed: SecurityType = serde_json::from_str("\"WEP\"").unwrap();
        assert_eq!(parsed, SecurityType::Wep);
        assert!(SecurityType::Wpa.is_weak());
        assert!(!SecurityType::Unknown.is_weak());
    }

    #[test]
    fn test_scan_result_grouping() {
        let result = ScanResult::new(
            vec![
                Network::new("a", "00:00:00:00:00:01").with_channel(6).with_rssi(-70),
                Network::new("b", "00:00:00:00:00:02").with_channel(1).with_rssi(-40),
                Network::new("c", "00:00:00:00:00:03").with_channel(6).with_rssi(-55),
            ],
            "test",
            "linux",
        );

        let by_signal = result.networks_by_signal(true);
        assert_eq!(by_signal[0].ssid, "b");
        assert_eq!(by_signal[2].ssid, "a");

        let by_channel = result.networks_by_channel();
        assert_eq!(by_channel[&6].len(), 2);
        assert_eq!(by_channel[&1].len(), 1);
        assert_eq!(result.network_count(), 3);
        assert_eq!(result.threat_count(), 0);
    }

    #[test]
    fn test_scan_result_json_omits_empty_warnings() {
        let result = ScanResult::new(vec![], "test", "linux");
        let json = result.to_json().unwrap();
        assert!(json.contains("\"scanner_type\": \"test\""));
        assert!(!json.contains("warnings"));

        let json = result.with_warning("nmcli not found").to_json().unwrap();
        assert!(json.contains("nmcli not found"));
    }
}
