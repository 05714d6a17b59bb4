//! Channel / Frequency Conversion
//!
//! Pure helpers shared by every backend parser. `0` is the "unknown"
//! sentinel in both directions.

/// Japan-only 2.4 GHz channel that sits off the 5 MHz grid
const CHANNEL_14: u32 = 14;
const CHANNEL_14_MHZ: u32 = 2484;

/// Convert a WiFi channel number to its center frequency in MHz.
///
/// - 1..=13 -> `2407 + ch * 5`
/// - 14 -> 2484
/// - 36..=177 -> `5000 + ch * 5`
/// - anything else -> 0
pub fn channel_to_frequency(channel: u32) -> u32 {
    match channel {
        CHANNEL_14 => CHANNEL_14_MHZ,
        1..=13 => 2407 + channel * 5,
        36..=177 => 5000 + channel * 5,
        _ => 0,
    }
}

/// Convert a center frequency in MHz to a WiFi channel number.
pub fn frequency_to_channel(freq_mhz: u32) -> u32 {
    match freq_mhz {
        CHANNEL_14_MHZ => CHANNEL_14,
        2412..=2472 => (freq_mhz - 2407) / 5,
        5180..=5885 => (freq_mhz - 5000) / 5,
        _ => 0,
    }
}

/// Fill whichever of (channel, frequency) is missing from the other.
///
/// Values that are already known are returned untouched.
pub fn reconcile(channel: u32, freq_mhz: u32) -> (u32, u32) {
    match (channel, freq_mhz) {
        (0, 0) => (0, 0),
        (0, f) => (frequency_to_channel(f), f),
        (c, 0) => (c, channel_to_frequency(c)),
        (c, f) => (c, f),
    }
}
