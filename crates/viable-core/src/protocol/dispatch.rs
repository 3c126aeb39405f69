//! In-place Viable command dispatcher.
//!
//! Request and reply share one buffer:
//! ```text
//! request: [0xDF][command][payload...]
//! reply:   [0xDF][command][reply fields...]
//! ```
//! The prefix and command byte survive; everything after them may be
//! overwritten by the reply.  Multi-byte integers are little-endian.  An
//! unknown command overwrites byte 1 with [`COMMAND_ERROR`] and returns
//! [`DispatchError::UnknownCommand`]; the caller still decides whether to send
//! the buffer.

use thiserror::Error;
use tracing::{debug, warn};

use super::commands::{Access, CommandId, COMMAND_ERROR, PROTOCOL_VERSION};
use crate::definition::DEFINITION_CHUNK_SIZE;
use crate::device::Viable;
use crate::domain::OneShotSettings;
use crate::fragments::{FragmentReport, FRAGMENT_ID_NONE};
use crate::settings::SettingsError;
use crate::storage::layout::MAX_FRAGMENT_INSTANCES;
use crate::storage::{Storage, StoreError, Table};

/// Errors returned by [`dispatch`].  The buffer already holds the reply.
#[derive(Debug, Error, PartialEq)]
pub enum DispatchError {
    #[error("unknown command 0x{0:02X}")]
    UnknownCommand(u8),

    #[error("packet too short: need {needed} bytes, got {available}")]
    TooShort { needed: usize, available: usize },
}

/// Status byte for a successful set.
const STATUS_OK: u8 = 0x00;
/// Status byte for a table set that failed (index out of range).
const STATUS_TABLE_FAILED: u8 = 0x01;

// ── Public API ────────────────────────────────────────────────────────────────

/// Executes the command in `data` against `viable` and writes the reply into
/// `data`.
///
/// # Errors
///
/// [`DispatchError::UnknownCommand`] after writing the error sentinel,
/// [`DispatchError::TooShort`] (buffer untouched) when `data` cannot hold the
/// reply of its command.
pub fn dispatch<S: Storage>(viable: &mut Viable<S>, data: &mut [u8]) -> Result<(), DispatchError> {
    need(data, 2)?;
    let raw = data[1];
    let Ok(command) = CommandId::try_from(raw) else {
        warn!(command = raw, "unknown viable command");
        data[1] = COMMAND_ERROR;
        return Err(DispatchError::UnknownCommand(raw));
    };
    debug!(?command, "dispatching viable command");

    if let Some((table, access)) = command.table_access() {
        need(data, 3 + table.entry_size())?;
        match access {
            Access::Get => table_get(viable, table, data),
            Access::Set => table_set(viable, table, data),
        }
        return Ok(());
    }

    match command {
        CommandId::GetInfo => get_info(viable, data)?,
        CommandId::OneShotGet => {
            need(data, 5)?;
            let settings = viable.one_shot().unwrap_or_else(|err| {
                warn!(%err, "one-shot read failed");
                OneShotSettings::default()
            });
            data[2..4].copy_from_slice(&settings.timeout.to_le_bytes());
            data[4] = settings.tap_toggle;
        }
        CommandId::OneShotSet => {
            need(data, 5)?;
            let settings = OneShotSettings {
                timeout: u16::from_le_bytes([data[2], data[3]]),
                tap_toggle: data[4],
            };
            if let Err(err) = viable.set_one_shot(&settings) {
                warn!(%err, "one-shot write failed");
            }
        }
        CommandId::Save => viable.save(),
        CommandId::Reset => {
            if let Err(err) = viable.reset() {
                warn!(%err, "reset failed");
            }
        }
        CommandId::DefinitionSize => {
            need(data, 6)?;
            data[2..6].copy_from_slice(&viable.definition().size().to_le_bytes());
        }
        CommandId::DefinitionChunk => {
            need(data, 4)?;
            let offset = u16::from_le_bytes([data[2], data[3]]);
            let end = data.len().min(4 + DEFINITION_CHUNK_SIZE);
            viable.definition().chunk(offset, &mut data[4..end]);
        }
        CommandId::SettingsQuery => {
            need(data, 4)?;
            let qsid_gt = u16::from_le_bytes([data[2], data[3]]);
            viable.query_settings(qsid_gt, &mut data[2..]);
        }
        CommandId::SettingsGet => {
            need(data, 4)?;
            let qsid = u16::from_le_bytes([data[2], data[3]]);
            let result = viable.get_setting(qsid, &mut data[3..]);
            data[2] = settings_status(qsid, result);
        }
        CommandId::SettingsSet => {
            need(data, 4)?;
            let qsid = u16::from_le_bytes([data[2], data[3]]);
            let (head, value) = data.split_at_mut(4);
            let result = viable.set_setting(qsid, value);
            head[2] = settings_status(qsid, result);
        }
        CommandId::SettingsReset => {
            if let Err(err) = viable.reset_settings() {
                warn!(%err, "settings reset failed");
            }
        }
        CommandId::FragmentGetHardware => {
            need(data, 3 + MAX_FRAGMENT_INSTANCES)?;
            viable.detected_fragments().write_to(&mut data[2..]);
        }
        CommandId::FragmentGetSelections => {
            need(data, 3 + MAX_FRAGMENT_INSTANCES)?;
            let report = viable.fragment_selections().unwrap_or_else(|err| {
                warn!(%err, "fragment selection read failed");
                FragmentReport {
                    count: viable.config().fragment_instances,
                    ids: [FRAGMENT_ID_NONE; MAX_FRAGMENT_INSTANCES],
                }
            });
            report.write_to(&mut data[2..]);
        }
        CommandId::FragmentSetSelections => {
            need(data, 3)?;
            let status = match viable.set_fragment_selections(&data[2..]) {
                Ok(()) => STATUS_OK,
                Err(err) => {
                    debug!(%err, "fragment selections rejected");
                    err.status()
                }
            };
            data[2] = status;
        }
        // Table commands returned above.
        CommandId::TapDanceGet
        | CommandId::TapDanceSet
        | CommandId::ComboGet
        | CommandId::ComboSet
        | CommandId::KeyOverrideGet
        | CommandId::KeyOverrideSet
        | CommandId::AltRepeatKeyGet
        | CommandId::AltRepeatKeySet
        | CommandId::LeaderGet
        | CommandId::LeaderSet => {}
    }
    Ok(())
}

// ── Command handlers ──────────────────────────────────────────────────────────

fn need(data: &[u8], needed: usize) -> Result<(), DispatchError> {
    if data.len() < needed {
        return Err(DispatchError::TooShort {
            needed,
            available: data.len(),
        });
    }
    Ok(())
}

/// `[ver:4][td][combo][ko][ark][flags][uid:8][leader]`
fn get_info<S: Storage>(viable: &Viable<S>, data: &mut [u8]) -> Result<(), DispatchError> {
    need(data, 20)?;
    let config = viable.config();
    let caps = config.capacities;
    data[2..6].copy_from_slice(&PROTOCOL_VERSION.to_le_bytes());
    data[6] = caps.tap_dance;
    data[7] = caps.combo;
    data[8] = caps.key_override;
    data[9] = caps.alt_repeat_key;
    data[10] = config.features.info_byte();
    data[11..19].copy_from_slice(&config.keyboard_uid);
    data[19] = caps.leader;
    Ok(())
}

/// `[idx]` → `[idx][entry]`.  An out-of-range index echoes a zeroed entry.
fn table_get<S: Storage>(viable: &Viable<S>, table: Table, data: &mut [u8]) {
    let index = usize::from(data[2]);
    let entry = &mut data[3..3 + table.entry_size()];
    entry.fill(0);
    match viable.read_entry(table, index, entry) {
        Ok(()) => {}
        Err(StoreError::IndexOutOfRange { .. }) => {
            debug!(%table, index, "get past capacity");
        }
        Err(err) => {
            warn!(%table, index, %err, "entry read failed");
            entry.fill(0);
        }
    }
}

/// `[idx][entry]` → `[status]`.  The engine reloads only on success.
fn table_set<S: Storage>(viable: &mut Viable<S>, table: Table, data: &mut [u8]) {
    let index = usize::from(data[2]);
    let (head, entry) = data.split_at_mut(3);
    head[2] = match viable.write_entry(table, index, &entry[..table.entry_size()]) {
        Ok(()) => STATUS_OK,
        Err(err) => {
            debug!(%table, index, %err, "set rejected");
            STATUS_TABLE_FAILED
        }
    };
}

fn settings_status(qsid: u16, result: Result<(), SettingsError>) -> u8 {
    match result {
        Ok(()) => STATUS_OK,
        Err(err) => {
            debug!(qsid, %err, "settings command failed");
            SettingsError::STATUS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViableConfig;
    use crate::definition::KeyboardDefinition;
    use crate::settings::qsid;
    use crate::storage::{Capacities, Layout, MemoryStorage};

    const PACKET: usize = 32;

    fn device() -> Viable<MemoryStorage> {
        let config = ViableConfig {
            capacities: Capacities {
                tap_dance: 4,
                combo: 3,
                key_override: 2,
                alt_repeat_key: 1,
                leader: 5,
            },
            keyboard_uid: [1, 2, 3, 4, 5, 6, 7, 8],
            ..ViableConfig::default()
        };
        let size = Layout::new(config.capacities).total_size();
        let mut viable = Viable::new(MemoryStorage::new(size), config)
            .unwrap()
            .with_definition(KeyboardDefinition::new((1..=40).collect()));
        viable.init().unwrap();
        viable
    }

    fn packet(bytes: &[u8]) -> [u8; PACKET] {
        let mut p = [0u8; PACKET];
        p[..bytes.len()].copy_from_slice(bytes);
        p
    }

    #[test]
    fn test_get_info_layout() {
        let mut viable = device();
        let mut p = packet(&[0xDF, 0x00]);

        dispatch(&mut viable, &mut p).unwrap();

        assert_eq!(&p[..2], &[0xDF, 0x00]);
        assert_eq!(&p[2..6], &[1, 0, 0, 0]);
        assert_eq!(&p[6..10], &[4, 3, 2, 1]);
        assert_eq!(p[10], 0x04);
        assert_eq!(&p[11..19], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(p[19], 5);
    }

    #[test]
    fn test_unknown_command_writes_sentinel() {
        let mut viable = device();
        let mut p = packet(&[0xDF, 0x42, 9]);

        let result = dispatch(&mut viable, &mut p);

        assert_eq!(result, Err(DispatchError::UnknownCommand(0x42)));
        assert_eq!(p[1], COMMAND_ERROR);
        assert_eq!(p[2], 9);
    }

    #[test]
    fn test_combo_set_then_get() {
        let mut viable = device();
        let entry = [0x0D, 0, 0x0E, 0, 0, 0, 0, 0, 0x29, 0, 0x00, 0x80];
        let mut set = packet(&[0xDF, 0x04, 2]);
        set[3..15].copy_from_slice(&entry);

        dispatch(&mut viable, &mut set).unwrap();
        assert_eq!(set[2], 0);

        let mut get = packet(&[0xDF, 0x03, 2]);
        dispatch(&mut viable, &mut get).unwrap();
        assert_eq!(get[2], 2);
        assert_eq!(&get[3..15], &entry);
        assert_eq!(viable.engines().combo.get(2).unwrap().keys.len(), 2);
    }

    #[test]
    fn test_set_past_capacity_fails_without_writing() {
        let mut viable = device();
        let before = viable.store().storage().write_count();
        let mut p = packet(&[0xDF, 0x08, 1, 0xAA, 0xBB]);

        dispatch(&mut viable, &mut p).unwrap();

        assert_eq!(p[2], 1);
        assert_eq!(viable.store().storage().write_count(), before);
    }

    #[test]
    fn test_get_past_capacity_echoes_index_with_zeroed_entry() {
        let mut viable = device();
        // (get command, first out-of-range index, entry size)
        let cases = [
            (0x01u8, 4u8, 10usize),
            (0x03, 3, 12),
            (0x05, 2, 12),
            (0x07, 1, 6),
            (0x14, 5, 13),
        ];

        for (command, index, size) in cases {
            let mut p = [0xEEu8; PACKET];
            p[0] = 0xDF;
            p[1] = command;
            p[2] = index;

            dispatch(&mut viable, &mut p).unwrap();

            assert_eq!(p[2], index, "command 0x{command:02X}");
            assert!(
                p[3..3 + size].iter().all(|&b| b == 0),
                "command 0x{command:02X}"
            );
        }
    }

    #[test]
    fn test_one_shot_round_trip() {
        let mut viable = device();
        let mut set = packet(&[0xDF, 0x0A, 0xE8, 0x03, 3]);
        dispatch(&mut viable, &mut set).unwrap();

        let mut get = packet(&[0xDF, 0x09]);
        dispatch(&mut viable, &mut get).unwrap();

        assert_eq!(&get[2..5], &[0xE8, 0x03, 3]);
    }

    #[test]
    fn test_definition_size_and_last_chunk() {
        let mut viable = device();
        let mut size = packet(&[0xDF, 0x0D]);
        dispatch(&mut viable, &mut size).unwrap();
        assert_eq!(&size[2..6], &[40, 0, 0, 0]);

        let mut chunk = [0xEEu8; PACKET];
        chunk[..4].copy_from_slice(&[0xDF, 0x0E, 28, 0]);
        dispatch(&mut viable, &mut chunk).unwrap();

        assert_eq!(&chunk[2..4], &[28, 0]);
        assert_eq!(&chunk[4..16], &(29..=40).collect::<Vec<u8>>()[..]);
        assert!(chunk[16..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_settings_set_then_get() {
        let mut viable = device();
        let mut set = packet(&[0xDF, 0x12]);
        set[2..4].copy_from_slice(&qsid::TAPPING_TERM.to_le_bytes());
        set[4..6].copy_from_slice(&250u16.to_le_bytes());
        dispatch(&mut viable, &mut set).unwrap();
        assert_eq!(set[2], 0);

        let mut get = packet(&[0xDF, 0x11]);
        get[2..4].copy_from_slice(&qsid::TAPPING_TERM.to_le_bytes());
        dispatch(&mut viable, &mut get).unwrap();

        assert_eq!(get[2], 0);
        assert_eq!(&get[3..5], &250u16.to_le_bytes());
    }

    #[test]
    fn test_settings_unknown_qsid_reports_failure_status() {
        let mut viable = device();
        let mut get = packet(&[0xDF, 0x11, 8, 0]);

        dispatch(&mut viable, &mut get).unwrap();

        assert_eq!(get[2], SettingsError::STATUS);
    }

    #[test]
    fn test_settings_query_from_zero() {
        let mut viable = device();
        let mut p = packet(&[0xDF, 0x10, 0, 0]);

        dispatch(&mut viable, &mut p).unwrap();

        assert_eq!(&p[2..4], &qsid::GRAVE_ESC_OVERRIDE.to_le_bytes());
        assert_eq!(&p[4..6], &qsid::COMBO_TERM.to_le_bytes());
    }

    #[test]
    fn test_fragment_selection_count_too_large() {
        let mut viable = device();
        let mut p = packet(&[0xDF, 0x1A, 22]);

        dispatch(&mut viable, &mut p).unwrap();

        assert_eq!(p[2], 2);
    }

    #[test]
    fn test_short_buffer_is_rejected_untouched() {
        let mut viable = device();
        let mut p = [0xDF, 0x01, 0];

        let result = dispatch(&mut viable, &mut p);

        assert_eq!(
            result,
            Err(DispatchError::TooShort {
                needed: 13,
                available: 3
            })
        );
        assert_eq!(p, [0xDF, 0x01, 0]);
    }
}
