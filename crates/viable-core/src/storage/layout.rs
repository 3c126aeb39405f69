//! Declarative layout of the persistent region.
//!
//! The region is a sequence of back-to-back tables.  Their order is fixed by
//! [`Table::ALL`] and their sizes by the entry sizes and the configured
//! capacities; every offset is derived from that list once, in
//! [`Layout::new`].
//!
//! Appending a table at the end of [`Table::ALL`] is safe.  Reordering or
//! resizing any existing table makes previously stored bytes land in the
//! wrong table, so it must come with a new build stamp (which forces a reset).

use serde::{Deserialize, Serialize};

use crate::domain::{
    AltRepeatKeyEntry, ComboEntry, KeyOverrideEntry, LeaderEntry, OneShotSettings, TableEntry,
    TapDanceEntry,
};

/// Size of the build stamp.
pub const MAGIC_SIZE: usize = 6;

/// Size of the QMK settings record.
pub const QMK_SETTINGS_SIZE: usize = 42;

/// Maximum number of fragment instances; the fragment table is always this
/// many bytes regardless of how many instances a keyboard declares.
pub const MAX_FRAGMENT_INSTANCES: usize = 21;

/// Number of tables in the region.
pub const TABLE_COUNT: usize = 9;

/// One table of the persistent region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Table {
    TapDance,
    Combo,
    KeyOverride,
    AltRepeatKey,
    OneShot,
    Leader,
    Magic,
    QmkSettings,
    Fragments,
}

impl Table {
    /// Every table in storage order.
    pub const ALL: [Table; TABLE_COUNT] = [
        Table::TapDance,
        Table::Combo,
        Table::KeyOverride,
        Table::AltRepeatKey,
        Table::OneShot,
        Table::Leader,
        Table::Magic,
        Table::QmkSettings,
        Table::Fragments,
    ];

    /// Size in bytes of one record of this table.
    pub const fn entry_size(self) -> usize {
        match self {
            Table::TapDance => TapDanceEntry::SIZE,
            Table::Combo => ComboEntry::SIZE,
            Table::KeyOverride => KeyOverrideEntry::SIZE,
            Table::AltRepeatKey => AltRepeatKeyEntry::SIZE,
            Table::OneShot => OneShotSettings::SIZE,
            Table::Leader => LeaderEntry::SIZE,
            Table::Magic => MAGIC_SIZE,
            Table::QmkSettings => QMK_SETTINGS_SIZE,
            Table::Fragments => MAX_FRAGMENT_INSTANCES,
        }
    }

    /// Human-readable name used in logs and dumps.
    pub const fn name(self) -> &'static str {
        match self {
            Table::TapDance => "tap_dance",
            Table::Combo => "combo",
            Table::KeyOverride => "key_override",
            Table::AltRepeatKey => "alt_repeat_key",
            Table::OneShot => "one_shot",
            Table::Leader => "leader",
            Table::Magic => "magic",
            Table::QmkSettings => "qmk_settings",
            Table::Fragments => "fragments",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Entry counts of the variable-length tables.
///
/// These are build configuration, not negotiated over the protocol; a client
/// learns them from the get-info reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capacities {
    pub tap_dance: u8,
    pub combo: u8,
    pub key_override: u8,
    pub alt_repeat_key: u8,
    pub leader: u8,
}

impl Default for Capacities {
    fn default() -> Self {
        Self {
            tap_dance: 16,
            combo: 16,
            key_override: 16,
            alt_repeat_key: 16,
            leader: 16,
        }
    }
}

impl Capacities {
    /// Number of records in `table`.  Fixed tables report one record.
    pub const fn count(&self, table: Table) -> usize {
        match table {
            Table::TapDance => self.tap_dance as usize,
            Table::Combo => self.combo as usize,
            Table::KeyOverride => self.key_override as usize,
            Table::AltRepeatKey => self.alt_repeat_key as usize,
            Table::Leader => self.leader as usize,
            Table::OneShot | Table::Magic | Table::QmkSettings | Table::Fragments => 1,
        }
    }
}

/// Byte span of one table inside the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Offsets of every table, derived from [`Capacities`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    capacities: Capacities,
    spans: [Span; TABLE_COUNT],
    total: usize,
}

impl Layout {
    pub fn new(capacities: Capacities) -> Self {
        let mut spans = [Span { offset: 0, len: 0 }; TABLE_COUNT];
        let mut cursor = 0usize;
        for (slot, table) in spans.iter_mut().zip(Table::ALL) {
            let len = table.entry_size() * capacities.count(table);
            *slot = Span {
                offset: cursor,
                len,
            };
            cursor += len;
        }
        Self {
            capacities,
            spans,
            total: cursor,
        }
    }

    pub fn capacities(&self) -> &Capacities {
        &self.capacities
    }

    /// Span of the whole table.
    pub fn span(&self, table: Table) -> Span {
        self.spans[table as usize]
    }

    /// Number of records `table` holds.
    pub fn count(&self, table: Table) -> usize {
        self.capacities.count(table)
    }

    /// Offset of record `index` in `table`, or `None` past capacity.
    pub fn entry_offset(&self, table: Table, index: usize) -> Option<usize> {
        if index >= self.count(table) {
            return None;
        }
        Some(self.span(table).offset + index * table.entry_size())
    }

    /// Total bytes the region must provide.
    pub fn total_size(&self) -> usize {
        self.total
    }
}
