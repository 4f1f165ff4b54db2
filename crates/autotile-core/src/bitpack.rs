//! Bit-packed occupancy encoding.
//!
//! Only occupancy is stored; variant indices are always re-derived on load.
//!
//! ## Layout
//!
//! ```text
//! bit position  = y * tiles_x + x     (y outer, x inner)
//! byte          = bit position / 8
//! bit in byte   = bit position % 8    (least significant bit first)
//! length        = ceil(tiles_x * tiles_y / 8)
//! ```
//!
//! A set bit means the cell is occupied. Unused high bits of the last byte
//! are written as zero and ignored when reading.

use thiserror::Error;

use crate::grid::TileGrid;
use crate::table::AutoTileTable;

/// Errors from [`unpack`] and [`unpack_bits`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitPackError {
    #[error("packed tiles are {actual} bytes, a {tiles_x}x{tiles_y} grid needs {expected}")]
    LengthMismatch {
        tiles_x: i32,
        tiles_y: i32,
        expected: usize,
        actual: usize,
    },
}

/// Bytes needed to pack a `tiles_x × tiles_y` grid.
#[inline]
pub fn packed_len(tiles_x: i32, tiles_y: i32) -> usize {
    let bits = (tiles_x.max(0) as usize) * (tiles_y.max(0) as usize);
    bits.div_ceil(8)
}

/// Pack the occupancy of `grid`.
pub fn pack(grid: &TileGrid) -> Vec<u8> {
    let mut bytes = vec![0u8; packed_len(grid.tiles_x(), grid.tiles_y())];
    // `cells` walks y outer, x inner, which is exactly bit order.
    for (bit, (_, occupied)) in grid.cells().enumerate() {
        if occupied {
            bytes[bit / 8] |= 1 << (bit % 8);
        }
    }
    bytes
}

/// Unpack `bytes` into row-major occupancy flags.
pub fn unpack_bits(bytes: &[u8], tiles_x: i32, tiles_y: i32) -> Result<Vec<bool>, BitPackError> {
    let expected = packed_len(tiles_x, tiles_y);
    if bytes.len() != expected {
        log::warn!(
            "rejecting packed tiles: {} bytes for {}x{} (expected {})",
            bytes.len(),
            tiles_x,
            tiles_y,
            expected
        );
        return Err(BitPackError::LengthMismatch {
            tiles_x,
            tiles_y,
            expected,
            actual: bytes.len(),
        });
    }
    let cells = (tiles_x.max(0) as usize) * (tiles_y.max(0) as usize);
    Ok((0..cells)
        .map(|bit| bytes[bit / 8] & (1 << (bit % 8)) != 0)
        .collect())
}

/// Unpack `bytes` into a new grid using `table`.
///
/// The grid starts empty and every cell is replayed through
/// [`TileGrid::set`], so indices come out exactly as if painted by hand.
pub fn unpack(
    bytes: &[u8],
    tiles_x: i32,
    tiles_y: i32,
    table: AutoTileTable,
) -> Result<TileGrid, BitPackError> {
    let bits = unpack_bits(bytes, tiles_x, tiles_y)?;
    Ok(TileGrid::from_occupancy(tiles_x, tiles_y, bits, table))
}
