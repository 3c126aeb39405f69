//! Viable command ids and protocol constants.

use crate::storage::Table;

// ── Protocol constants ────────────────────────────────────────────────────────

/// First byte of every Viable request and reply.
pub const VIABLE_PREFIX: u8 = 0xDF;

/// Version reported by get-info.
pub const PROTOCOL_VERSION: u32 = 0x0000_0001;

/// Written over the command byte when the command is not recognized.
pub const COMMAND_ERROR: u8 = 0xFF;

// ── Command ids ───────────────────────────────────────────────────────────────

/// Every command the dispatcher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandId {
    GetInfo = 0x00,
    TapDanceGet = 0x01,
    TapDanceSet = 0x02,
    ComboGet = 0x03,
    ComboSet = 0x04,
    KeyOverrideGet = 0x05,
    KeyOverrideSet = 0x06,
    AltRepeatKeyGet = 0x07,
    AltRepeatKeySet = 0x08,
    OneShotGet = 0x09,
    OneShotSet = 0x0A,
    Save = 0x0B,
    Reset = 0x0C,
    DefinitionSize = 0x0D,
    DefinitionChunk = 0x0E,
    SettingsQuery = 0x10,
    SettingsGet = 0x11,
    SettingsSet = 0x12,
    SettingsReset = 0x13,
    LeaderGet = 0x14,
    LeaderSet = 0x15,
    FragmentGetHardware = 0x18,
    FragmentGetSelections = 0x19,
    FragmentSetSelections = 0x1A,
}

impl TryFrom<u8> for CommandId {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(CommandId::GetInfo),
            0x01 => Ok(CommandId::TapDanceGet),
            0x02 => Ok(CommandId::TapDanceSet),
            0x03 => Ok(CommandId::ComboGet),
            0x04 => Ok(CommandId::ComboSet),
            0x05 => Ok(CommandId::KeyOverrideGet),
            0x06 => Ok(CommandId::KeyOverrideSet),
            0x07 => Ok(CommandId::AltRepeatKeyGet),
            0x08 => Ok(CommandId::AltRepeatKeySet),
            0x09 => Ok(CommandId::OneShotGet),
            0x0A => Ok(CommandId::OneShotSet),
            0x0B => Ok(CommandId::Save),
            0x0C => Ok(CommandId::Reset),
            0x0D => Ok(CommandId::DefinitionSize),
            0x0E => Ok(CommandId::DefinitionChunk),
            0x10 => Ok(CommandId::SettingsQuery),
            0x11 => Ok(CommandId::SettingsGet),
            0x12 => Ok(CommandId::SettingsSet),
            0x13 => Ok(CommandId::SettingsReset),
            0x14 => Ok(CommandId::LeaderGet),
            0x15 => Ok(CommandId::LeaderSet),
            0x18 => Ok(CommandId::FragmentGetHardware),
            0x19 => Ok(CommandId::FragmentGetSelections),
            0x1A => Ok(CommandId::FragmentSetSelections),
            _ => Err(()),
        }
    }
}

/// Whether a table command reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Get,
    Set,
}

impl CommandId {
    /// The entry table and direction for the per-index get/set commands.
    pub fn table_access(self) -> Option<(Table, Access)> {
        let pair = match self {
            CommandId::TapDanceGet => (Table::TapDance, Access::Get),
            CommandId::TapDanceSet => (Table::TapDance, Access::Set),
            CommandId::ComboGet => (Table::Combo, Access::Get),
            CommandId::ComboSet => (Table::Combo, Access::Set),
            CommandId::KeyOverrideGet => (Table::KeyOverride, Access::Get),
            CommandId::KeyOverrideSet => (Table::KeyOverride, Access::Set),
            CommandId::AltRepeatKeyGet => (Table::AltRepeatKey, Access::Get),
            CommandId::AltRepeatKeySet => (Table::AltRepeatKey, Access::Set),
            CommandId::LeaderGet => (Table::Leader, Access::Get),
            CommandId::LeaderSet => (Table::Leader, Access::Set),
            _ => return None,
        };
        Some(pair)
    }
}
