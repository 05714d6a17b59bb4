//! Vendor Lookup
//!
//! Resolve the hardware vendor of an access point from the OUI (first three
//! octets) of its BSSID. Lookups are total: they always return a name,
//! falling back to "Unknown".

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::UNKNOWN_VENDOR;
use crate::logic::error::ConfigError;

/// Vendor reported for locally administered MACs with no known base OUI
pub const PRIVATE_VENDOR: &str = "Private/Random";

// ============================================================================
// LOOKUP CONTRACT
// ============================================================================

/// BSSID -> vendor name. Must never fail.
pub trait VendorLookup: Send + Sync {
    fn lookup(&self, bssid: &str) -> String;
}

impl<F> VendorLookup for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn lookup(&self, bssid: &str) -> String {
        self(bssid)
    }
}

/// Always answers "Unknown"
#[derive(Debug, Clone, Copy, Default)]
pub struct UnknownVendor;

impl VendorLookup for UnknownVendor {
    fn lookup(&self, _bssid: &str) -> String {
        UNKNOWN_VENDOR.to_string()
    }
}

// ============================================================================
// BUILT-IN TABLE
// ============================================================================

/// Common router/AP manufacturers, keyed by 6 uppercase hex digits
static COMMON_OUI: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("001CB3", "Apple"),
        ("0023DF", "Apple"),
        ("28E02C", "Apple"),
        ("F0B479", "Apple"),
        ("000142", "Cisco"),
        ("000C30", "Cisco"),
        ("001BD4", "Linksys"),
        ("002129", "Cisco Linksys"),
        ("001E2A", "Netgear"),
        ("0024B2", "Netgear"),
        ("204E7F", "Netgear"),
        ("A00460", "Netgear"),
        ("14CC20", "TP-Link"),
        ("50C7BF", "TP-Link"),
        ("C025E9", "TP-Link"),
        ("F4F26D", "TP-Link"),
        ("000C6E", "Asus"),
        ("2C56DC", "Asus"),
        ("AC9E17", "Asus"),
        ("0015E9", "D-Link"),
        ("1CAFF7", "D-Link"),
        ("C8BE19", "D-Link"),
        ("001632", "Samsung"),
        ("5C0A5B", "Samsung"),
        ("001E10", "Huawei"),
        ("04C06F", "Huawei"),
        ("001E64", "Intel"),
        ("3C970E", "Intel"),
        ("00156D", "Ubiquiti"),
        ("24A43C", "Ubiquiti"),
        ("F09FC2", "Ubiquiti"),
        ("000B86", "Aruba"),
        ("001A1E", "Aruba"),
        ("C0C1C0", "Cisco Meraki"),
        ("E0553D", "Cisco Meraki"),
        ("3C4A92", "HP"),
        ("00E04C", "Realtek"),
        ("00037F", "Qualcomm Atheros"),
        ("000C43", "MediaTek"),
        ("3810D5", "AVM"),
        ("C80E14", "AVM"),
        ("F8E71E", "Ruckus"),
    ]
    .into_iter()
    .collect()
});

/// Standard IEEE line: `XX-XX-XX   (hex)   Vendor Name`
static IEEE_LINE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^\s*([0-9A-Fa-f]{2})-([0-9A-Fa-f]{2})-([0-9A-Fa-f]{2})\s+\(hex\)\s+(.+)$").ok()
});

// ============================================================================
// OUI DATABASE
// ============================================================================

/// Built-in OUI table, optionally extended from an IEEE `oui.txt`
#[derive(Debug, Clone, Default)]
pub struct OuiDatabase {
    extended: HashMap<String, String>,
}

impl OuiDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge entries from an IEEE-format OUI file.
    ///
    /// Returns the number of entries loaded. Lines that do not match the
    /// `(hex)` format are ignored.
    pub fn load_ieee_file(&mut self, path: &Path) -> Result<usize, ConfigError> {
        let bytes = std::fs::read(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let count = self.load_ieee_text(&String::from_utf8_lossy(&bytes));
        log::info!("Loaded {} OUI entries from {}", count, path.display());
        Ok(count)
    }

    pub fn load_ieee_text(&mut self, text: &str) -> usize {
        let Some(re) = IEEE_LINE.as_ref() else {
            return 0;
        };
        let mut count = 0;
        for line in text.lines() {
            if let Some(caps) = re.captures(line) {
                let oui = format!("{}{}{}", &caps[1], &caps[2], &caps[3]).to_uppercase();
                self.extended.insert(oui, caps[4].trim().to_string());
                count += 1;
            }
        }
        count
    }

    /// Builder variant that logs and ignores a missing or unreadable file
    pub fn with_ieee_file(mut self, path: &Path) -> Self {
        if let Err(e) = self.load_ieee_file(path) {
            log::warn!("OUI file ignored: {}", e);
        }
        self
    }

    pub fn len(&self) -> usize {
        COMMON_OUI.len() + self.extended.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find(&self, oui: &str) -> Option<String> {
        COMMON_OUI
            .get(oui)
            .map(|v| v.to_string())
            .or_else(|| self.extended.get(oui).cloned())
    }
}

/// First 6 hex digits of a MAC in any separator style
fn oui_of(mac: &str) -> Option<String> {
    let digits: String = mac
        .chars()
        .filter(|c| c.is_ascii_hexdigit())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if digits.len() < 6 {
        return None;
    }
    Some(digits[..6].to_string())
}

/// Clear the locally-administered bit: 2->0, 6->4, A->8, E->C
fn base_oui(oui: &str) -> Option<String> {
    let mut chars = oui.chars();
    let first = chars.next()?;
    let cleared = match chars.next()? {
        '2' => '0',
        '6' => '4',
        'A' => '8',
        'E' => 'C',
        _ => return None,
    };
    Some(format!("{}{}{}", first, cleared, chars.as_str()))
}

impl VendorLookup for OuiDatabase {
    fn lookup(&self, bssid: &str) -> String {
        let Some(oui) = oui_of(bssid) else {
            return UNKNOWN_VENDOR.to_string();
        };

        if let Some(vendor) = self.find(&oui) {
            return vendor;
        }

        // Guest SSIDs and randomized phone hotspots use locally administered MACs
        match base_oui(&oui) {
            Some(base) => self.find(&base).unwrap_or_else(|| PRIVATE_VENDOR.to_string()),
            None => UNKNOWN_VENDOR.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_lookup() {
        let db = OuiDatabase::new();
        assert_eq!(db.lookup("00:24:B2:11:22:33"), "Netgear");
        assert_eq!(db.lookup("14-cc-20-aa-bb-cc"), "TP-Link");
        assert_eq!(db.lookup("00:00:00:00:00:01"), "Unknown");
        assert_eq!(db.lookup("garbage"), "Unknown");
    }

    #[test]
    fn test_locally_administered() {
        let db = OuiDatabase::new();
        // 02:24:B2 -> base 00:24:B2 (Netgear)
        assert_eq!(db.lookup("02:24:B2:11:22:33"), "Netgear");
        assert_eq!(db.lookup("DA:A1:19:00:00:01"), PRIVATE_VENDOR);
    }

    #[test]
    fn test_ieee_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "OUI/MA-L                                                      Organization").unwrap();
        writeln!(file, "AB-CD-EF   (hex)\t\tExample Networks Ltd").unwrap();
        writeln!(file, "ABCDEF     (base 16)\t\tExample Networks Ltd").unwrap();

        let mut db = OuiDatabase::new();
        let loaded = db.load_ieee_file(file.path()).unwrap();
        assert_eq!(loaded, 1);
        assert_eq!(db.lookup("ab:cd:ef:00:11:22"), "Example Networks Ltd");
    }

    #[test]
    fn test_missing_ieee_file() {
        let mut db = OuiDatabase::new();
        let err = db.load_ieee_file(Path::new("/nonexistent/oui.txt")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_closure_lookup() {
        let lookup = |_: &str| "Cisco".to_string();
        assert_eq!(VendorLookup::lookup(&lookup, "00:11:22:33:44:55"), "Cisco");
        assert_eq!(UnknownVendor.lookup("00:11:22:33:44:55"), "Unknown");
    }
}
