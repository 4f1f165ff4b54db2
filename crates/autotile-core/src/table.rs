//! The auto-tile lookup table.
//!
//! An [`AutoTileTable`] maps every 4-bit neighbor [`Bitmask`] to one of the 16
//! tile variants of an atlas. The table is total: it always holds exactly one
//! entry per bitmask value, so it can only be built from a complete set of
//! entries and only be changed by replacing it as a whole.

use thiserror::Error;

/// Number of entries in a table (one per 4-bit bitmask value).
pub const TABLE_LEN: usize = 16;

/// The canonical table, indexed by bitmask.
pub const DEFAULT_TABLE: [u8; TABLE_LEN] = [
    12, // 0b0000
    13, // 0b0001
    0,  // 0b0010
    3,  // 0b0011
    8,  // 0b0100
    1,  // 0b0101
    14, // 0b0110
    5,  // 0b0111
    15, // 0b1000
    4,  // 0b1001
    11, // 0b1010
    2,  // 0b1011
    9,  // 0b1100
    10, // 0b1101
    7,  // 0b1110
    6,  // 0b1111
];

// ---------------------------------------------------------------------------
// Bitmask
// ---------------------------------------------------------------------------

/// Occupancy of the 2×2 block of cells sampled for one cell `(x, y)`.
///
/// | bit | sampled cell |
/// |---|---|
/// | 3 | `(x - 1, y)` |
/// | 2 | `(x, y)` |
/// | 1 | `(x - 1, y - 1)` |
/// | 0 | `(x, y - 1)` |
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bitmask(u8);

impl Bitmask {
    /// All four sampled cells empty.
    pub const EMPTY: Self = Self(0b0000);
    /// All four sampled cells occupied.
    pub const FULL: Self = Self(0b1111);

    /// Wrap raw bits, or `None` if they do not fit in 4 bits.
    #[inline]
    pub const fn new(bits: u8) -> Option<Self> {
        if bits < TABLE_LEN as u8 {
            Some(Self(bits))
        } else {
            None
        }
    }

    /// Build a bitmask from the four sampled cells.
    #[inline]
    pub const fn from_corners(left: bool, here: bool, below_left: bool, below: bool) -> Self {
        Self(((left as u8) << 3) | ((here as u8) << 2) | ((below_left as u8) << 1) | below as u8)
    }

    /// The raw 4-bit value.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether bit `bit` (0..=3) is set.
    #[inline]
    pub const fn is_set(self, bit: u8) -> bool {
        bit < 4 && (self.0 >> bit) & 1 == 1
    }

    /// Number of occupied cells in the block.
    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }
}

impl From<Bitmask> for u8 {
    fn from(b: Bitmask) -> Self {
        b.0
    }
}

// ---------------------------------------------------------------------------
// TableError
// ---------------------------------------------------------------------------

/// Reasons a replacement table is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("auto-tile table needs exactly 16 entries, got {0}")]
    WrongLength(usize),
    #[error("bitmask {0} does not fit in 4 bits")]
    BitmaskOutOfRange(u8),
    #[error("bitmask {bitmask:#06b} maps to variant {variant}, variants go up to 15")]
    VariantOutOfRange { bitmask: u8, variant: u8 },
    #[error("bitmask {0:#06b} is listed more than once")]
    DuplicateBitmask(u8),
}

// ---------------------------------------------------------------------------
// AutoTileTable
// ---------------------------------------------------------------------------

/// A complete bitmask → variant mapping with the zero-bitmask variant cached.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<u8>", into = "Vec<u8>")
)]
pub struct AutoTileTable {
    entries: [u8; TABLE_LEN],
    zero_index: u8,
}

impl AutoTileTable {
    /// The canonical table.
    pub const fn new() -> Self {
        Self {
            entries: DEFAULT_TABLE,
            zero_index: DEFAULT_TABLE[0],
        }
    }

    /// Build a table from 16 variant indices, indexed by bitmask.
    pub fn from_entries(entries: &[u8]) -> Result<Self, TableError> {
        if entries.len() != TABLE_LEN {
            return Err(TableError::WrongLength(entries.len()));
        }
        let mut table = [0u8; TABLE_LEN];
        for (bitmask, &variant) in entries.iter().enumerate() {
            if variant as usize >= TABLE_LEN {
                return Err(TableError::VariantOutOfRange {
                    bitmask: bitmask as u8,
                    variant,
                });
            }
            table[bitmask] = variant;
        }
        Ok(Self {
            entries: table,
            zero_index: table[0],
        })
    }

    /// Build a table from `(bitmask, variant)` pairs in any order.
    ///
    /// Every bitmask 0..=15 must appear exactly once.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (u8, u8)>,
    {
        let mut table = [0u8; TABLE_LEN];
        let mut seen = 0u16;
        let mut count = 0usize;
        for (bitmask, variant) in pairs {
            count += 1;
            if bitmask as usize >= TABLE_LEN {
                return Err(TableError::BitmaskOutOfRange(bitmask));
            }
            if variant as usize >= TABLE_LEN {
                return Err(TableError::VariantOutOfRange { bitmask, variant });
            }
            if seen & (1 << bitmask) != 0 {
                return Err(TableError::DuplicateBitmask(bitmask));
            }
            seen |= 1 << bitmask;
            table[bitmask as usize] = variant;
        }
        if count != TABLE_LEN {
            return Err(TableError::WrongLength(count));
        }
        Ok(Self {
            entries: table,
            zero_index: table[0],
        })
    }

    /// Variant index for `bitmask`.
    #[inline]
    pub fn lookup(&self, bitmask: Bitmask) -> u8 {
        self.entries[bitmask.bits() as usize]
    }

    /// Variant shown for an entirely empty block. Render strategies that skip
    /// empty quads compare against this.
    #[inline]
    pub fn zero_index(&self) -> u8 {
        self.zero_index
    }

    /// Variant shown for an entirely occupied block.
    #[inline]
    pub fn full_index(&self) -> u8 {
        self.lookup(Bitmask::FULL)
    }

    /// All entries, indexed by bitmask.
    #[inline]
    pub fn entries(&self) -> &[u8; TABLE_LEN] {
        &self.entries
    }

    /// Swap in `other` as a whole and recompute the cached zero index.
    ///
    /// Index caches derived from the old table are not touched; see
    /// [`TileGrid::replace_table`](crate::TileGrid::replace_table).
    pub fn replace(&mut self, other: AutoTileTable) {
        self.entries = other.entries;
        self.zero_index = self.entries[0];
        log::debug!("auto-tile table replaced, zero index is now {}", self.zero_index);
    }
}

impl Default for AutoTileTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Vec<u8>> for AutoTileTable {
    type Error = TableError;

    fn try_from(entries: Vec<u8>) -> Result<Self, TableError> {
        Self::from_entries(&entries)
    }
}

impl From<AutoTileTable> for Vec<u8> {
    fn from(table: AutoTileTable) -> Self {
        table.entries.to_vec()
    }
}
