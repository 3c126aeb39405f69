//! Table of exposed settings.
//!
//! Each QSID maps to a `(size, offset, bit)` slice of the settings record.
//! Get, set and query all walk this one table; there is no per-setting code.

/// QSID values.
pub mod qsid {
    pub const GRAVE_ESC_OVERRIDE: u16 = 1;
    pub const COMBO_TERM: u16 = 2;
    pub const AUTO_SHIFT: u16 = 3;
    pub const AUTO_SHIFT_TIMEOUT: u16 = 4;
    pub const OSK_TAP_TOGGLE: u16 = 5;
    pub const OSK_TIMEOUT: u16 = 6;
    pub const TAPPING_TERM: u16 = 7;
    pub const MOUSEKEY_DELAY: u16 = 9;
    pub const MOUSEKEY_INTERVAL: u16 = 10;
    pub const MOUSEKEY_MOVE_DELTA: u16 = 11;
    pub const MOUSEKEY_MAX_SPEED: u16 = 12;
    pub const MOUSEKEY_TIME_TO_MAX: u16 = 13;
    pub const MOUSEKEY_WHEEL_DELAY: u16 = 14;
    pub const MOUSEKEY_WHEEL_INTERVAL: u16 = 15;
    pub const MOUSEKEY_WHEEL_MAX_SPEED: u16 = 16;
    pub const MOUSEKEY_WHEEL_TIME_TO_MAX: u16 = 17;
    pub const TAP_CODE_DELAY: u16 = 18;
    pub const TAP_HOLD_CAPS_DELAY: u16 = 19;
    pub const TAPPING_TOGGLE: u16 = 20;
    /// Packed keymap flags, handled outside the record.
    pub const MAGIC: u16 = 21;
    pub const PERMISSIVE_HOLD: u16 = 22;
    pub const HOLD_ON_OTHER_KEY: u16 = 23;
    pub const RETRO_TAPPING: u16 = 24;
    pub const QUICK_TAP_TERM: u16 = 25;
    pub const CHORDAL_HOLD: u16 = 26;
    pub const FLOW_TAP_TERM: u16 = 27;
    pub const LEADER_TIMEOUT: u16 = 28;
    pub const LEADER_PER_KEY_TIMING: u16 = 29;

    /// Fills the unused tail of a query reply.
    pub const QUERY_END: u16 = 0xFFFF;
}

use super::record::{leader_bits, offsets, tapping_bits};

/// Where one setting lives in the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingDescriptor {
    pub qsid: u16,
    /// Value width on the wire: 1 or 2 bytes, 4 for the magic flags.
    pub size: u8,
    pub offset: u8,
    /// For single-bit settings, the bit inside the byte at `offset`.
    pub bit: Option<u8>,
    /// Whether a change is pushed to the live subsystems.
    pub applies: bool,
}

impl SettingDescriptor {
    const fn scalar(qsid: u16, size: u8, offset: u8) -> Self {
        Self {
            qsid,
            size,
            offset,
            bit: None,
            applies: true,
        }
    }

    const fn flag(qsid: u16, offset: u8, bit: u8) -> Self {
        Self {
            qsid,
            size: 1,
            offset,
            bit: Some(bit),
            applies: false,
        }
    }

    const fn magic() -> Self {
        Self {
            qsid: qsid::MAGIC,
            size: 4,
            offset: 0,
            bit: None,
            applies: false,
        }
    }

    pub fn is_magic(&self) -> bool {
        self.qsid == qsid::MAGIC
    }
}

const COMMON: &[SettingDescriptor] = &[
    SettingDescriptor::scalar(qsid::GRAVE_ESC_OVERRIDE, 1, offsets::GRAVE_ESC_OVERRIDE),
    SettingDescriptor::scalar(qsid::COMBO_TERM, 2, offsets::COMBO_TERM),
    SettingDescriptor::scalar(qsid::AUTO_SHIFT, 1, offsets::AUTO_SHIFT),
    SettingDescriptor::scalar(qsid::AUTO_SHIFT_TIMEOUT, 2, offsets::AUTO_SHIFT_TIMEOUT),
    SettingDescriptor::scalar(qsid::OSK_TAP_TOGGLE, 1, offsets::OSK_TAP_TOGGLE),
    SettingDescriptor::scalar(qsid::OSK_TIMEOUT, 2, offsets::OSK_TIMEOUT),
    SettingDescriptor::scalar(qsid::TAPPING_TERM, 2, offsets::TAPPING_TERM),
    SettingDescriptor::scalar(qsid::TAP_CODE_DELAY, 2, offsets::TAP_CODE_DELAY),
    SettingDescriptor::scalar(qsid::TAP_HOLD_CAPS_DELAY, 2, offsets::TAP_HOLD_CAPS_DELAY),
    SettingDescriptor::scalar(qsid::TAPPING_TOGGLE, 1, offsets::TAPPING_TOGGLE),
    SettingDescriptor::magic(),
    SettingDescriptor::flag(qsid::PERMISSIVE_HOLD, offsets::TAPPING_V2, tapping_bits::PERMISSIVE_HOLD),
    SettingDescriptor::flag(qsid::HOLD_ON_OTHER_KEY, offsets::TAPPING_V2, tapping_bits::HOLD_ON_OTHER_KEY),
    SettingDescriptor::flag(qsid::RETRO_TAPPING, offsets::TAPPING_V2, tapping_bits::RETRO_TAPPING),
    SettingDescriptor::scalar(qsid::QUICK_TAP_TERM, 2, offsets::QUICK_TAP_TERM),
    SettingDescriptor::flag(qsid::CHORDAL_HOLD, offsets::TAPPING_V2, tapping_bits::CHORDAL_HOLD),
    SettingDescriptor::scalar(qsid::FLOW_TAP_TERM, 2, offsets::FLOW_TAP_TERM),
    SettingDescriptor::scalar(qsid::LEADER_TIMEOUT, 2, offsets::LEADER_TIMEOUT),
    SettingDescriptor::flag(qsid::LEADER_PER_KEY_TIMING, offsets::LEADER_FLAGS, leader_bits::PER_KEY_TIMING),
];

const MOUSE_KEYS: &[SettingDescriptor] = &[
    SettingDescriptor::scalar(qsid::MOUSEKEY_DELAY, 2, offsets::MOUSEKEY_DELAY),
    SettingDescriptor::scalar(qsid::MOUSEKEY_INTERVAL, 2, offsets::MOUSEKEY_INTERVAL),
    SettingDescriptor::scalar(qsid::MOUSEKEY_MOVE_DELTA, 2, offsets::MOUSEKEY_MOVE_DELTA),
    SettingDescriptor::scalar(qsid::MOUSEKEY_MAX_SPEED, 2, offsets::MOUSEKEY_MAX_SPEED),
    SettingDescriptor::scalar(qsid::MOUSEKEY_TIME_TO_MAX, 2, offsets::MOUSEKEY_TIME_TO_MAX),
    SettingDescriptor::scalar(qsid::MOUSEKEY_WHEEL_DELAY, 2, offsets::MOUSEKEY_WHEEL_DELAY),
    SettingDescriptor::scalar(qsid::MOUSEKEY_WHEEL_INTERVAL, 2, offsets::MOUSEKEY_WHEEL_INTERVAL),
    SettingDescriptor::scalar(qsid::MOUSEKEY_WHEEL_MAX_SPEED, 2, offsets::MOUSEKEY_WHEEL_MAX_SPEED),
    SettingDescriptor::scalar(qsid::MOUSEKEY_WHEEL_TIME_TO_MAX, 2, offsets::MOUSEKEY_WHEEL_TIME_TO_MAX),
];

/// The descriptors registered for one feature set, sorted by QSID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsRegistry {
    descriptors: Vec<SettingDescriptor>,
}

impl SettingsRegistry {
    pub fn new(mouse_keys: bool) -> Self {
        let mut descriptors = COMMON.to_vec();
        if mouse_keys {
            descriptors.extend_from_slice(MOUSE_KEYS);
        }
        descriptors.sort_by_key(|d| d.qsid);
        Self { descriptors }
    }

    pub fn find(&self, qsid: u16) -> Option<&SettingDescriptor> {
        self.descriptors
            .binary_search_by_key(&qsid, |d| d.qsid)
            .ok()
            .map(|i| &self.descriptors[i])
    }

    pub fn descriptors(&self) -> &[SettingDescriptor] {
        &self.descriptors
    }

    /// Writes every QSID greater than `qsid_gt` as u16 LE into `out`, in
    /// ascending order, stopping when fewer than two bytes remain.  The rest
    /// of `out` is filled with `0xFF`, so a reply with room to spare ends in
    /// [`qsid::QUERY_END`].
    pub fn query(&self, qsid_gt: u16, out: &mut [u8]) {
        out.fill(0xFF);
        let mut slots = out.chunks_exact_mut(2);
        for desc in self.descriptors.iter().filter(|d| d.qsid > qsid_gt) {
            match slots.next() {
                Some(slot) => slot.copy_from_slice(&desc.qsid.to_le_bytes()),
                None => break,
            }
        }
    }
}
