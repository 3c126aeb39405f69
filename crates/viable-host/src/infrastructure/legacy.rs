//! Minimal stand-in for the legacy configuration protocol (VIA).
//!
//! The emulator has no dynamic keymap, so it answers only the protocol
//! version query, enough for a client to detect the device.  Every other
//! command is echoed back marked unhandled, which is what VIA does for
//! command ids it does not know.

use tracing::debug;
use viable_core::LegacyProtocol;

/// `id_get_protocol_version`.
pub const CMD_GET_PROTOCOL_VERSION: u8 = 0x01;

/// Reply byte 0 for a command the handler does not implement.
pub const CMD_UNHANDLED: u8 = 0xFF;

/// VIA protocol version reported to clients.
pub const VIA_PROTOCOL_VERSION: u16 = 0x000C;

#[derive(Debug, Default, Clone, Copy)]
pub struct ViaLegacy;

impl LegacyProtocol for ViaLegacy {
    fn process(&mut self, request: &[u8]) -> Option<Vec<u8>> {
        let mut reply = request.to_vec();
        match request.first() {
            None => return None,
            Some(&CMD_GET_PROTOCOL_VERSION) if reply.len() >= 3 => {
                reply[1..3].copy_from_slice(&VIA_PROTOCOL_VERSION.to_be_bytes());
            }
            Some(&id) => {
                debug!(id, "unhandled legacy command");
                reply[0] = CMD_UNHANDLED;
            }
        }
        Some(reply)
    }
}
