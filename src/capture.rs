/// Raw 802.11 frame → [`FrameEvent`] for the capture collaborator.
///
/// Only management frames carry station sightings here. Probe requests,
/// probe responses and beacons are parsed with the ieee80211 crate; any other
/// management subtype falls back to reading the transmitter address straight
/// from the header. Control and data frames are ignored.
///
/// Safe to call from the radio receive callback (no allocation, no blocking).
use ieee80211::match_frames;
use ieee80211::mgmt_frame::{BeaconFrame, ProbeRequestFrame, ProbeResponseFrame};

use crate::station::{FrameEvent, MacAddr};

/// Management header: frame control, duration, three addresses, sequence control.
pub const MGMT_HEADER_LEN: usize = 24;

/// 802.11 frame type field value for management frames.
const TYPE_MANAGEMENT: u8 = 0;

/// Frame type bits (B2..B3 of the first frame-control byte).
pub fn frame_type(frame_control: u8) -> u8 {
    (frame_control >> 2) & 0x3
}

/// Extract the transmitter address from a management frame.
pub fn management_source(frame: &[u8]) -> Option<MacAddr> {
    if frame.len() < MGMT_HEADER_LEN || frame_type(frame[0]) != TYPE_MANAGEMENT {
        return None;
    }

    let parsed = match_frames! {
        frame,
        probe_req = ProbeRequestFrame<'_> => {
            probe_req.header.transmitter_address.0
        }
        beacon = BeaconFrame<'_> => {
            beacon.header.transmitter_address.0
        }
        probe_resp = ProbeResponseFrame<'_> => {
            probe_resp.header.transmitter_address.0
        }
    };

    match parsed {
        Ok(mac) => Some(MacAddr::new(mac)),
        // Address 2 sits at offset 10: 2 (frame ctrl) + 2 (duration) + 6 (addr1)
        Err(_) => {
            let mac: [u8; 6] = frame[10..16].try_into().ok()?;
            Some(MacAddr::new(mac))
        }
    }
}

/// Build a [`FrameEvent`] from a captured frame and its radio metadata.
pub fn parse_management_frame(
    frame: &[u8],
    rssi: i8,
    channel: u8,
    timestamp: u64,
) -> Option<FrameEvent> {
    let source = management_source(frame)?;
    Some(FrameEvent {
        source,
        channel,
        rssi,
        payload_len: u16::try_from(frame.len()).unwrap_or(u16::MAX),
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: [u8; 6] = [0xAA, 0xBB, 0xCC, 0x11, 0x22, 0x33];

    /// Management frame with the given subtype and a minimal body.
    fn mgmt_frame(fc0: u8, body: &[u8]) -> Vec<u8> {
        let mut f = vec![fc0, 0x00, 0x00, 0x00];
        f.extend_from_slice(&[0xFF; 6]); // addr1 (receiver)
        f.extend_from_slice(&SRC); // addr2 (transmitter)
        f.extend_from_slice(&[0xFF; 6]); // addr3 (BSSID)
        f.extend_from_slice(&[0x10, 0x00]); // sequence control
        f.extend_from_slice(body);
        f
    }

    // SSID (wildcard) + supported rates
    const PROBE_BODY: &[u8] = &[0x00, 0x00, 0x01, 0x04, 0x02, 0x04, 0x0B, 0x16];

    #[test]
    fn probe_request_yields_transmitter() {
        let frame = mgmt_frame(0x40, PROBE_BODY);
        let ev = parse_management_frame(&frame, -40, 6, 1_000).unwrap();
        assert_eq!(ev.source, MacAddr::new(SRC));
        assert_eq!(ev.channel, 6);
        assert_eq!(ev.rssi, -40);
        assert_eq!(ev.timestamp, 1_000);
        assert_eq!(ev.payload_len as usize, frame.len());
    }

    #[test]
    fn other_management_subtype_uses_header() {
        // Authentication frame (subtype 11) with a six-byte body
        let frame = mgmt_frame(0xB0, &[0, 0, 1, 0, 0, 0]);
        assert_eq!(management_source(&frame), Some(MacAddr::new(SRC)));
    }

    #[test]
    fn data_frame_is_ignored() {
        let frame = mgmt_frame(0x08, &[0u8; 8]);
        assert_eq!(frame_type(frame[0]), 2);
        assert!(parse_management_frame(&frame, -50, 1, 0).is_none());
    }

    #[test]
    fn control_frame_is_ignored() {
        // ACK: control type, far shorter than a management header
        let frame = [0xD4, 0x00, 0x00, 0x00, 0xAA, 0xBB, 0xCC, 0x11, 0x22, 0x33];
        assert!(management_source(&frame).is_none());
    }

    #[test]
    fn truncated_header_is_rejected() {
        let frame = mgmt_frame(0x40, &[]);
        assert!(management_source(&frame[..MGMT_HEADER_LEN - 1]).is_none());
    }
}
