/// Station identity, captured frame events, and roster records.
///
/// Every type here is `Copy`: events are copied into the frame queue and
/// records are copied out of the registry, so nothing aliases registry storage.
use core::fmt;

use serde::{Serialize, Serializer};

use crate::protocol::MacString;

/// A 6-byte IEEE 802 hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub const fn octets(&self) -> &[u8; 6] {
        &self.0
    }

    /// Organizationally unique identifier (first three octets).
    pub const fn oui(&self) -> [u8; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    /// Render as "AA:BB:CC:DD:EE:FF" into a fixed-size string.
    pub fn to_mac_string(&self) -> MacString {
        let mut s = MacString::new();
        format_mac(&self.0, &mut s);
        s
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_mac_string())
    }
}

/// Format a 6-byte MAC address into "AA:BB:CC:DD:EE:FF" string
pub fn format_mac(mac: &[u8; 6], buf: &mut MacString) {
    use core::fmt::Write;
    let _ = write!(
        buf,
        "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    );
}

/// One captured frame's header fields, as handed from capture to the pipeline.
///
/// `timestamp` is milliseconds on the tracker's 64-bit monotonic clock. Producers
/// reading a 32-bit tick counter must widen it first (see [`crate::clock::TickExtender`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameEvent {
    pub source: MacAddr,
    pub channel: u8,
    pub rssi: i8,
    /// Informational only
    pub payload_len: u16,
    pub timestamp: u64,
}

/// Tracked state for one present station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StationRecord {
    #[serde(rename = "mac")]
    pub identity: MacAddr,
    #[serde(rename = "ch")]
    pub channel: u8,
    pub rssi: i8,
    pub last_seen: u64,
}

impl StationRecord {
    /// Milliseconds since last sighting. Zero if `now` precedes `last_seen`.
    pub fn age(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_uppercase_colon_hex() {
        let mac = MacAddr::new([0xAA, 0xBB, 0xCC, 0x11, 0x22, 0x03]);
        assert_eq!(mac.to_string(), "AA:BB:CC:11:22:03");
        assert_eq!(mac.to_mac_string().as_str(), "AA:BB:CC:11:22:03");
    }

    #[test]
    fn oui_is_first_three_octets() {
        let mac = MacAddr::new([0xB4, 0x1E, 0x52, 0x00, 0x01, 0x02]);
        assert_eq!(mac.oui(), [0xB4, 0x1E, 0x52]);
    }

    #[test]
    fn age_saturates_for_future_timestamps() {
        let rec = StationRecord {
            identity: MacAddr::new([0; 6]),
            channel: 1,
            rssi: -50,
            last_seen: 100,
        };
        assert_eq!(rec.age(150), 50);
        assert_eq!(rec.age(40), 0);
    }

    #[test]
    fn record_serializes_mac_as_string() {
        let rec = StationRecord {
            identity: MacAddr::new([0xAA, 0xBB, 0xCC, 0x11, 0x22, 0x33]),
            channel: 6,
            rssi: -40,
            last_seen: 1234,
        };
        let mut buf = [0u8; 128];
        let len = serde_json_core::to_slice(&rec, &mut buf).unwrap();
        let json = core::str::from_utf8(&buf[..len]).unwrap();
        assert!(json.contains(r#""mac":"AA:BB:CC:11:22:33""#));
        assert!(json.contains(r#""ch":6"#));
        assert!(json.contains(r#""rssi":-40"#));
        assert!(json.contains(r#""last_seen":1234"#));
    }
}
