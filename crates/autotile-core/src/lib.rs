//! **autotile-core**: auto-tiling tile grid core.
//!
//! This crate holds the renderer-independent half of a tile layer: geometry
//! primitives, the bitmask → variant [`AutoTileTable`], the [`TileGrid`]
//! occupancy grid with incremental neighbor propagation, and the bit-packed
//! occupancy encoding in [`bitpack`].

pub mod bitpack;
pub mod geom;
pub mod grid;
pub mod table;

pub use bitpack::{BitPackError, pack, packed_len, unpack, unpack_bits};
pub use geom::{CellOrder, Point, Range, RangeIter};
pub use grid::{NEIGHBORS, TileGrid};
pub use table::{AutoTileTable, Bitmask, DEFAULT_TABLE, TABLE_LEN, TableError};
