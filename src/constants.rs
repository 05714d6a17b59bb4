//! Central Configuration Constants
//!
//! Single source of truth for all scanning and detection defaults.
//! Every `get_*` helper reads an `AIRGUARD_*` environment variable and
//! falls back to the compiled-in default.

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "AirGuard";

/// Default interval between scans in continuous mode (seconds)
pub const DEFAULT_SCAN_INTERVAL: u64 = 30;

/// Default timeout for a single scan invocation (seconds)
pub const DEFAULT_SCAN_TIMEOUT: u64 = 10;

/// Upper bound for a backend availability probe (seconds)
pub const PROBE_TIMEOUT_SECS: u64 = 3;

/// Delay between `wpa_cli scan` and `wpa_cli scan_results` (seconds)
pub const WPA_CLI_SETTLE_SECS: u64 = 2;

/// Number of recent observations inspected for channel hopping
pub const DEFAULT_HOP_THRESHOLD: usize = 3;

/// Interface used when auto-detection finds nothing
pub const DEFAULT_INTERFACE: &str = "wlan0";

/// RSSI assigned when a backend block carries no signal line
pub const MISSING_RSSI_DBM: i32 = -70;

/// Weakest signal kept by the CLI display filter
pub const DEFAULT_MIN_SIGNAL_DBM: i32 = -100;

/// Vendor returned when no OUI matches
pub const UNKNOWN_VENDOR: &str = "Unknown";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get scan interval from environment or use default
pub fn get_scan_interval() -> u64 {
    std::env::var("AIRGUARD_SCAN_INTERVAL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SCAN_INTERVAL)
}

/// Get scan timeout from environment or use default
pub fn get_scan_timeout() -> u64 {
    std::env::var("AIRGUARD_SCAN_TIMEOUT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SCAN_TIMEOUT)
}

/// Get the WiFi interface override, if any
pub fn get_interface() -> Option<String> {
    std::env::var("AIRGUARD_INTERFACE")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Get the backend override, if any (e.g. "nmcli", "iw")
pub fn get_backend() -> Option<String> {
    std::env::var("AIRGUARD_BACKEND")
        .ok()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

/// Get channel hop threshold from environment or use default
pub fn get_hop_threshold() -> usize {
    std::env::var("AIRGUARD_HOP_THRESHOLD")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_HOP_THRESHOLD)
}
