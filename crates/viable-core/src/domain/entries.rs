//! Packed entry layouts for every persistent table.
//!
//! Wire/storage format (all multi-byte integers little-endian):
//! ```text
//! TapDance     [on_tap:2][on_hold:2][on_double_tap:2][on_tap_hold:2][term:2]      = 10
//! Combo        [input0..3:8][output:2][term:2]                                    = 12
//! KeyOverride  [trigger:2][replacement:2][layers:4][mods:1][neg:1][supp:1][opt:1] = 12
//! AltRepeatKey [keycode:2][alt_keycode:2][allowed_mods:1][opt:1]                  =  6
//! OneShot      [timeout:2][tap_toggle:1]                                          =  3
//! Leader       [sequence0..4:10][output:2][opt:1]                                 = 13
//! ```

use serde::{Deserialize, Serialize};

use crate::keycode::{Keycode, ModMask};
use crate::storage::layout::Table;

/// Number of trigger slots in a combo entry.
pub const COMBO_INPUTS: usize = 4;

/// Maximum leader sequence length.
pub const LEADER_SEQUENCE_LEN: usize = 5;

/// A fixed-size record in one of the persistent tables.
///
/// `decode` and `encode` operate on slices of at least [`TableEntry::SIZE`]
/// bytes; callers bounds-check before handing a slice over.
pub trait TableEntry: Sized + Copy + Default + PartialEq + std::fmt::Debug {
    /// Packed size in bytes.
    const SIZE: usize;
    /// The table this entry type lives in.
    const TABLE: Table;

    /// Decodes an entry from the first `SIZE` bytes of `bytes`.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is shorter than `SIZE`.
    fn decode(bytes: &[u8]) -> Self;

    /// Encodes the entry into the first `SIZE` bytes of `out`.
    ///
    /// # Panics
    ///
    /// Panics if `out` is shorter than `SIZE`.
    fn encode(&self, out: &mut [u8]);

    /// Whether the runtime engines should act on this entry.
    fn is_enabled(&self) -> bool;
}

// ── Custom timing word ────────────────────────────────────────────────────────

/// A 16-bit word holding an enable flag (bit 15) and a duration in
/// milliseconds (bits 0-14).  A zero duration means "use the global term".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomTerm(pub u16);

impl CustomTerm {
    pub const ENABLED: u16 = 0x8000;
    pub const TERM_MASK: u16 = 0x7FFF;

    /// Builds a term word; `term_ms` is truncated to 15 bits.
    pub const fn new(enabled: bool, term_ms: u16) -> Self {
        let flag = if enabled { Self::ENABLED } else { 0 };
        CustomTerm(flag | (term_ms & Self::TERM_MASK))
    }

    pub const fn enabled(self) -> bool {
        self.0 & Self::ENABLED != 0
    }

    /// The per-entry duration, `0` when unset.
    pub const fn term_ms(self) -> u16 {
        self.0 & Self::TERM_MASK
    }
}

// ── Tap dance ─────────────────────────────────────────────────────────────────

/// One tap-dance slot: four actions plus a custom tapping term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TapDanceEntry {
    pub on_tap: Keycode,
    pub on_hold: Keycode,
    pub on_double_tap: Keycode,
    pub on_tap_hold: Keycode,
    pub custom_term: CustomTerm,
}

impl TableEntry for TapDanceEntry {
    const SIZE: usize = 10;
    const TABLE: Table = Table::TapDance;

    fn decode(b: &[u8]) -> Self {
        Self {
            on_tap: read_keycode(b, 0),
            on_hold: read_keycode(b, 2),
            on_double_tap: read_keycode(b, 4),
            on_tap_hold: read_keycode(b, 6),
            custom_term: CustomTerm(read_u16(b, 8)),
        }
    }

    fn encode(&self, out: &mut [u8]) {
        write_u16(out, 0, self.on_tap.0);
        write_u16(out, 2, self.on_hold.0);
        write_u16(out, 4, self.on_double_tap.0);
        write_u16(out, 6, self.on_tap_hold.0);
        write_u16(out, 8, self.custom_term.0);
    }

    fn is_enabled(&self) -> bool {
        self.custom_term.enabled()
    }
}

// ── Combo ─────────────────────────────────────────────────────────────────────

/// A combo: up to four trigger keys (unused slots are `Keycode::NO`) and one
/// output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComboEntry {
    pub input: [Keycode; COMBO_INPUTS],
    pub output: Keycode,
    pub custom_term: CustomTerm,
}

impl TableEntry for ComboEntry {
    const SIZE: usize = 12;
    const TABLE: Table = Table::Combo;

    fn decode(b: &[u8]) -> Self {
        let mut input = [Keycode::NO; COMBO_INPUTS];
        for (i, slot) in input.iter_mut().enumerate() {
            *slot = read_keycode(b, i * 2);
        }
        Self {
            input,
            output: read_keycode(b, 8),
            custom_term: CustomTerm(read_u16(b, 10)),
        }
    }

    fn encode(&self, out: &mut [u8]) {
        for (i, kc) in self.input.iter().enumerate() {
            write_u16(out, i * 2, kc.0);
        }
        write_u16(out, 8, self.output.0);
        write_u16(out, 10, self.custom_term.0);
    }

    fn is_enabled(&self) -> bool {
        self.custom_term.enabled()
    }
}

// ── Key override ──────────────────────────────────────────────────────────────

/// Option byte of a key override entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyOverrideOptions(pub u8);

impl KeyOverrideOptions {
    pub const ACTIVATION_TRIGGER_DOWN: u8 = 1 << 0;
    pub const ACTIVATION_REQUIRED_MOD_DOWN: u8 = 1 << 1;
    pub const ACTIVATION_NEGATIVE_MOD_UP: u8 = 1 << 2;
    pub const ONE_MOD: u8 = 1 << 3;
    pub const NO_REREGISTER_TRIGGER: u8 = 1 << 4;
    pub const NO_UNREGISTER_ON_OTHER_KEY_DOWN: u8 = 1 << 5;
    pub const ENABLED: u8 = 1 << 7;

    pub const fn has(self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    pub const fn enabled(self) -> bool {
        self.has(Self::ENABLED)
    }

    /// The activation/behavior bits with the enabled flag stripped.
    pub const fn behavior(self) -> u8 {
        self.0 & !Self::ENABLED
    }
}

/// Conditional keycode substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyOverrideEntry {
    pub trigger: Keycode,
    pub replacement: Keycode,
    /// Bit `n` set means the override is active on layer `n`.
    pub layers: u32,
    pub trigger_mods: ModMask,
    pub negative_mod_mask: ModMask,
    pub suppressed_mods: ModMask,
    pub options: KeyOverrideOptions,
}

impl TableEntry for KeyOverrideEntry {
    const SIZE: usize = 12;
    const TABLE: Table = Table::KeyOverride;

    fn decode(b: &[u8]) -> Self {
        Self {
            trigger: read_keycode(b, 0),
            replacement: read_keycode(b, 2),
            layers: u32::from_le_bytes([b[4], b[5], b[6], b[7]]),
            trigger_mods: ModMask(b[8]),
            negative_mod_mask: ModMask(b[9]),
            suppressed_mods: ModMask(b[10]),
            options: KeyOverrideOptions(b[11]),
        }
    }

    fn encode(&self, out: &mut [u8]) {
        write_u16(out, 0, self.trigger.0);
        write_u16(out, 2, self.replacement.0);
        out[4..8].copy_from_slice(&self.layers.to_le_bytes());
        out[8] = self.trigger_mods.0;
        out[9] = self.negative_mod_mask.0;
        out[10] = self.suppressed_mods.0;
        out[11] = self.options.0;
    }

    fn is_enabled(&self) -> bool {
        self.options.enabled()
    }
}

// ── Alt repeat key ────────────────────────────────────────────────────────────

/// Option byte of an alt-repeat entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AltRepeatOptions(pub u8);

impl AltRepeatOptions {
    pub const DEFAULT_TO_ALT: u8 = 1 << 0;
    pub const BIDIRECTIONAL: u8 = 1 << 1;
    pub const IGNORE_MOD_HANDEDNESS: u8 = 1 << 2;
    pub const ENABLED: u8 = 1 << 3;

    pub const fn has(self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    pub const fn enabled(self) -> bool {
        self.has(Self::ENABLED)
    }
}

/// Alternate output for the repeat key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AltRepeatKeyEntry {
    pub keycode: Keycode,
    pub alt_keycode: Keycode,
    pub allowed_mods: ModMask,
    pub options: AltRepeatOptions,
}

impl TableEntry for AltRepeatKeyEntry {
    const SIZE: usize = 6;
    const TABLE: Table = Table::AltRepeatKey;

    fn decode(b: &[u8]) -> Self {
        Self {
            keycode: read_keycode(b, 0),
            alt_keycode: read_keycode(b, 2),
            allowed_mods: ModMask(b[4]),
            options: AltRepeatOptions(b[5]),
        }
    }

    fn encode(&self, out: &mut [u8]) {
        write_u16(out, 0, self.keycode.0);
        write_u16(out, 2, self.alt_keycode.0);
        out[4] = self.allowed_mods.0;
        out[5] = self.options.0;
    }

    fn is_enabled(&self) -> bool {
        self.options.enabled()
    }
}

// ── One-shot ──────────────────────────────────────────────────────────────────

/// Global one-shot key behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OneShotSettings {
    /// Timeout in milliseconds; `0` disables the timeout.
    pub timeout: u16,
    /// Taps needed to lock a one-shot key; `0` disables tap-toggle.
    pub tap_toggle: u8,
}

impl TableEntry for OneShotSettings {
    const SIZE: usize = 3;
    const TABLE: Table = Table::OneShot;

    fn decode(b: &[u8]) -> Self {
        Self {
            timeout: read_u16(b, 0),
            tap_toggle: b[2],
        }
    }

    fn encode(&self, out: &mut [u8]) {
        write_u16(out, 0, self.timeout);
        out[2] = self.tap_toggle;
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

// ── Leader ────────────────────────────────────────────────────────────────────

/// Option byte of a leader entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaderOptions(pub u8);

impl LeaderOptions {
    pub const ENABLED: u8 = 1 << 7;

    pub const fn enabled(self) -> bool {
        self.0 & Self::ENABLED != 0
    }
}

/// A leader sequence (0-terminated, up to five keys) and its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeaderEntry {
    pub sequence: [Keycode; LEADER_SEQUENCE_LEN],
    pub output: Keycode,
    pub options: LeaderOptions,
}

impl LeaderEntry {
    /// Keys up to the first `Keycode::NO`.
    pub fn keys(&self) -> &[Keycode] {
        let len = self
            .sequence
            .iter()
            .position(|kc| kc.is_none())
            .unwrap_or(LEADER_SEQUENCE_LEN);
        &self.sequence[..len]
    }
}

impl TableEntry for LeaderEntry {
    const SIZE: usize = 13;
    const TABLE: Table = Table::Leader;

    fn decode(b: &[u8]) -> Self {
        let mut sequence = [Keycode::NO; LEADER_SEQUENCE_LEN];
        for (i, slot) in sequence.iter_mut().enumerate() {
            *slot = read_keycode(b, i * 2);
        }
        Self {
            sequence,
            output: read_keycode(b, 10),
            options: LeaderOptions(b[12]),
        }
    }

    fn encode(&self, out: &mut [u8]) {
        for (i, kc) in self.sequence.iter().enumerate() {
            write_u16(out, i * 2, kc.0);
        }
        write_u16(out, 10, self.output.0);
        out[12] = self.options.0;
    }

    fn is_enabled(&self) -> bool {
        self.options.enabled()
    }
}

// ── Byte helpers ──────────────────────────────────────────────────────────────

pub(crate) fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

pub(crate) fn write_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn read_keycode(buf: &[u8], offset: usize) -> Keycode {
    Keycode(read_u16(buf, offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycode::hid::*;

    fn encoded<E: TableEntry>(entry: &E) -> Vec<u8> {
        let mut buf = vec![0u8; E::SIZE];
        entry.encode(&mut buf);
        buf
    }

    #[test]
    fn test_custom_term_splits_flag_and_duration() {
        let term = CustomTerm(0x80C8);
        assert!(term.enabled());
        assert_eq!(term.term_ms(), 200);
        assert_eq!(CustomTerm::new(true, 200), term);
    }

    #[test]
    fn test_custom_term_truncates_to_fifteen_bits() {
        let term = CustomTerm::new(false, 0xFFFF);
        assert!(!term.enabled());
        assert_eq!(term.term_ms(), 0x7FFF);
    }

    #[test]
    fn test_tap_dance_wire_layout_is_little_endian() {
        let entry = TapDanceEntry {
            on_tap: KC_A,
            on_hold: KC_LEFT_CTRL,
            on_double_tap: KC_B,
            on_tap_hold: Keycode(0x1234),
            custom_term: CustomTerm::new(true, 0),
        };
        assert_eq!(
            encoded(&entry),
            vec![0x04, 0x00, 0xE0, 0x00, 0x05, 0x00, 0x34, 0x12, 0x00, 0x80]
        );
    }

    #[test]
    fn test_key_override_layers_are_little_endian() {
        let bytes = [0x04, 0, 0x05, 0, 0x01, 0x02, 0x03, 0x04, 0x02, 0x00, 0x02, 0x81];
        let entry = KeyOverrideEntry::decode(&bytes);
        assert_eq!(entry.layers, 0x0403_0201);
        assert_eq!(entry.trigger_mods, ModMask::LSFT);
        assert!(entry.is_enabled());
        assert_eq!(entry.options.behavior(), KeyOverrideOptions::ACTIVATION_TRIGGER_DOWN);
        assert_eq!(encoded(&entry), bytes.to_vec());
    }

    #[test]
    fn test_alt_repeat_enabled_bit_is_bit_three() {
        let mut entry = AltRepeatKeyEntry::default();
        assert!(!entry.is_enabled());
        entry.options = AltRepeatOptions(AltRepeatOptions::ENABLED);
        assert!(entry.is_enabled());
        assert_eq!(encoded(&entry)[5], 0x08);
    }

    #[test]
    fn test_leader_keys_stop_at_terminator() {
        let entry = LeaderEntry {
            sequence: [KC_G, KC_G, Keycode::NO, KC_A, Keycode::NO],
            output: KC_ESCAPE,
            options: LeaderOptions(LeaderOptions::ENABLED),
        };
        assert_eq!(entry.keys(), &[KC_G, KC_G]);
    }

    #[test]
    fn test_leader_keys_full_length() {
        let entry = LeaderEntry {
            sequence: [KC_A, KC_B, KC_C, KC_D, KC_E],
            ..LeaderEntry::default()
        };
        assert_eq!(entry.keys().len(), LEADER_SEQUENCE_LEN);
    }

    #[test]
    fn test_one_shot_layout() {
        let settings = OneShotSettings {
            timeout: 5000,
            tap_toggle: 5,
        };
        assert_eq!(encoded(&settings), vec![0x88, 0x13, 0x05]);
        assert_eq!(OneShotSettings::decode(&[0x88, 0x13, 0x05]), settings);
    }

    #[test]
    fn test_zeroed_entries_are_disabled() {
        assert!(!TapDanceEntry::decode(&[0; 10]).is_enabled());
        assert!(!ComboEntry::decode(&[0; 12]).is_enabled());
        assert!(!KeyOverrideEntry::decode(&[0; 12]).is_enabled());
        assert!(!AltRepeatKeyEntry::decode(&[0; 6]).is_enabled());
        assert!(!LeaderEntry::decode(&[0; 13]).is_enabled());
    }
}
