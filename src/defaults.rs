/// Default tuning values and the compiled-in exclusion table.
///
/// The excluded prefixes cover access-point and embedded/IoT vendors: radios
/// that beacon constantly and never belong to a person walking past.

/// Eviction age threshold (14 minutes).
pub const DEFAULT_MAX_AGE_MS: u64 = 14 * 60 * 1000;

/// Interval between purge passes (15 minutes). Must exceed the max age.
pub const DEFAULT_PURGE_PERIOD_MS: u64 = 15 * 60 * 1000;

/// Frame queue capacity in events. At 24 bytes per slot this is 12 KiB,
/// enough to absorb a management-frame burst between processor wake-ups.
pub const DEFAULT_QUEUE_CAPACITY: usize = 512;

/// How long the processor blocks in `dequeue` before re-checking shutdown.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Default deny-list prefix length (the OUI).
pub const DEFAULT_PREFIX_LEN: usize = 3;

/// WiFi channels to scan (2.4 GHz only; ESP32 promiscuous mode is 2.4 GHz)
pub const WIFI_CHANNELS: &[u8] = &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13];

/// Default dwell time per channel in milliseconds.
/// Full cycle: 13 channels × 120ms = 1.56s.
pub const DEFAULT_DWELL_MS: u64 = 120;

/// Excluded OUI prefixes (3-byte prefix, vendor name).
pub static EXCLUDED_PREFIXES: &[([u8; 3], &str)] = &[
    // === Cisco / Aironet / Meraki ===
    ([0x00, 0x00, 0x0C], "Cisco"),
    ([0x00, 0x40, 0x96], "Cisco Aironet"),
    ([0x00, 0x18, 0x0A], "Cisco Meraki"),
    ([0x88, 0x15, 0x44], "Cisco Meraki"),
    ([0xE0, 0x55, 0x3D], "Cisco Meraki"),
    // === Ubiquiti ===
    ([0x00, 0x27, 0x22], "Ubiquiti"),
    ([0x04, 0x18, 0xD6], "Ubiquiti"),
    ([0x24, 0xA4, 0x3C], "Ubiquiti"),
    ([0x44, 0xD9, 0xE7], "Ubiquiti"),
    ([0x68, 0x72, 0x51], "Ubiquiti"),
    ([0x78, 0x8A, 0x20], "Ubiquiti"),
    ([0x80, 0x2A, 0xA8], "Ubiquiti"),
    ([0xB4, 0xFB, 0xE4], "Ubiquiti"),
    ([0xF0, 0x9F, 0xC2], "Ubiquiti"),
    ([0xFC, 0xEC, 0xDA], "Ubiquiti"),
    // === Aruba Networks ===
    ([0x00, 0x0B, 0x86], "Aruba Networks"),
    ([0x00, 0x1A, 0x1E], "Aruba Networks"),
    ([0x24, 0xDE, 0xC6], "Aruba Networks"),
    ([0x6C, 0xF3, 0x7F], "Aruba Networks"),
    ([0x94, 0xB4, 0x0F], "Aruba Networks"),
    ([0xD8, 0xC7, 0xC8], "Aruba Networks"),
    // === Ruckus Wireless ===
    ([0x00, 0x1F, 0x41], "Ruckus Wireless"),
    ([0x2C, 0x5D, 0x93], "Ruckus Wireless"),
    ([0x58, 0xB6, 0x33], "Ruckus Wireless"),
    ([0x74, 0x91, 0x1A], "Ruckus Wireless"),
    // === AVM (FRITZ!Box) ===
    ([0x00, 0x04, 0x0E], "AVM"),
    ([0x38, 0x10, 0xD5], "AVM"),
    ([0x3C, 0xA6, 0x2F], "AVM"),
    ([0xC8, 0x0E, 0x14], "AVM"),
    // === Espressif ===
    ([0x24, 0x0A, 0xC4], "Espressif"),
    ([0x24, 0x6F, 0x28], "Espressif"),
    ([0x30, 0xAE, 0xA4], "Espressif"),
    ([0x3C, 0x71, 0xBF], "Espressif"),
    ([0x84, 0xF3, 0xEB], "Espressif"),
    ([0xA4, 0xCF, 0x12], "Espressif"),
    ([0xBC, 0xDD, 0xC2], "Espressif"),
    // === Raspberry Pi ===
    ([0xB8, 0x27, 0xEB], "Raspberry Pi"),
    ([0xDC, 0xA6, 0x32], "Raspberry Pi"),
    ([0xE4, 0x5F, 0x01], "Raspberry Pi"),
];
