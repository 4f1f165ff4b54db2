//! The [`TileGrid`] type: an occupancy grid plus its derived variant indices.
//!
//! Every cell stores whether a tile is present and, next to it, the atlas
//! variant index its 2×2 neighborhood selects through the grid's
//! [`AutoTileTable`]. The index cache is kept in sync incrementally: changing
//! one cell only recomputes the four cells whose neighborhood contains it.

use crate::geom::{Point, Range};
use crate::table::{AutoTileTable, Bitmask};

/// Offsets from a changed cell to the cells whose bitmask samples it.
///
/// Read the other way round, a cell `c` samples `c - NEIGHBORS[i]` for each
/// `i`, which is how [`TileGrid::bitmask_of`] assigns bits.
pub const NEIGHBORS: [Point; 4] = [
    Point::new(0, 0),
    Point::new(1, 0),
    Point::new(0, 1),
    Point::new(1, 1),
];

// ---------------------------------------------------------------------------
// TileGrid
// ---------------------------------------------------------------------------

/// A fixed-size occupancy grid with an incrementally maintained index cache.
///
/// Reads outside the grid return `false` and writes outside it are dropped,
/// so the grid behaves as if surrounded by an infinite empty border.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    occupancy: Vec<bool>,
    indices: Vec<u8>,
    width: i32,
    height: i32,
    table: AutoTileTable,
}

impl TileGrid {
    /// Create an empty grid using the canonical table.
    pub fn new(tiles_x: i32, tiles_y: i32) -> Self {
        Self::with_table(tiles_x, tiles_y, AutoTileTable::new())
    }

    /// Create an empty grid using `table`. Negative sizes are clamped to 0.
    pub fn with_table(tiles_x: i32, tiles_y: i32, table: AutoTileTable) -> Self {
        let width = tiles_x.max(0);
        let height = tiles_y.max(0);
        let len = (width as usize) * (height as usize);
        let zero = table.zero_index();
        Self {
            occupancy: vec![false; len],
            indices: vec![zero; len],
            width,
            height,
            table,
        }
    }

    /// Build a grid from row-major occupancy flags by replaying
    /// [`set`](Self::set) on an empty grid. Extra flags are ignored.
    pub fn from_occupancy<I>(tiles_x: i32, tiles_y: i32, cells: I, table: AutoTileTable) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut grid = Self::with_table(tiles_x, tiles_y, table);
        let points = grid.bounds().iter();
        grid.load(points.zip(cells));
        grid
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if self.is_out_of_bounds(x, y) {
            None
        } else {
            Some((y as usize) * (self.width as usize) + (x as usize))
        }
    }

    /// Number of columns.
    #[inline]
    pub fn tiles_x(&self) -> i32 {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn tiles_y(&self) -> i32 {
        self.height
    }

    /// The range of valid cells, `[(0, 0), (tiles_x, tiles_y))`.
    #[inline]
    pub fn bounds(&self) -> Range {
        Range::new(0, 0, self.width, self.height)
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.occupancy.len()
    }

    /// Whether the grid has no cells at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.occupancy.is_empty()
    }

    #[inline]
    pub fn is_out_of_bounds(&self, x: i32, y: i32) -> bool {
        x < 0 || y < 0 || x >= self.width || y >= self.height
    }

    /// The table this grid derives its indices with.
    #[inline]
    pub fn table(&self) -> &AutoTileTable {
        &self.table
    }

    /// Whether a tile is present at `(x, y)`. Out of bounds reads as `false`.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> bool {
        self.offset(x, y).is_some_and(|i| self.occupancy[i])
    }

    /// [`get`](Self::get) taking a [`Point`].
    #[inline]
    pub fn at(&self, p: Point) -> bool {
        self.get(p.x, p.y)
    }

    /// Cached variant index at `(x, y)`, or `None` out of bounds.
    #[inline]
    pub fn index(&self, x: i32, y: i32) -> Option<u8> {
        self.offset(x, y).map(|i| self.indices[i])
    }

    /// Recompute the bitmask of `(x, y)` from the current occupancy.
    /// Empty wherever none of the sampled cells is in bounds.
    pub fn bitmask_of(&self, x: i32, y: i32) -> Bitmask {
        // samples are `(x - 1..=x, y - 1..=y)`
        if !(0..=self.width).contains(&x) || !(0..=self.height).contains(&y) {
            return Bitmask::EMPTY;
        }
        let c = Point::new(x, y);
        Bitmask::from_corners(
            self.at(c - NEIGHBORS[1]),
            self.at(c - NEIGHBORS[0]),
            self.at(c - NEIGHBORS[3]),
            self.at(c - NEIGHBORS[2]),
        )
    }

    /// Set occupancy at `(x, y)` and refresh the indices of the four cells
    /// that sample it. No-op when out of bounds.
    pub fn set(&mut self, x: i32, y: i32, state: bool) {
        let Some(i) = self.offset(x, y) else {
            return;
        };
        self.occupancy[i] = state;
        let p = Point::new(x, y);
        for n in NEIGHBORS {
            let q = p + n;
            if let Some(j) = self.offset(q.x, q.y) {
                self.indices[j] = self.table.lookup(self.bitmask_of(q.x, q.y));
            }
        }
    }

    /// [`set`](Self::set) taking a [`Point`].
    #[inline]
    pub fn set_at(&mut self, p: Point, state: bool) {
        self.set(p.x, p.y, state);
    }

    /// Set every cell to `state`.
    ///
    /// Every index becomes the full (or empty) variant, edges included: the
    /// border is not sampled on this path, unlike [`set`](Self::set).
    pub fn fill(&mut self, state: bool) {
        self.occupancy.fill(state);
        let bitmask = if state { Bitmask::FULL } else { Bitmask::EMPTY };
        self.indices.fill(self.table.lookup(bitmask));
    }

    /// Replay `set` for every `(point, state)` pair, in order.
    pub fn load<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = (Point, bool)>,
    {
        for (p, state) in cells {
            self.set_at(p, state);
        }
    }

    /// Recompute every index from occupancy.
    ///
    /// Unlike [`fill`](Self::fill) this samples the empty border, so edge
    /// cells of a filled grid get their edge variants.
    pub fn rebuild_indices(&mut self) {
        for p in self.bounds().iter() {
            let bitmask = self.bitmask_of(p.x, p.y);
            let i = (p.y as usize) * (self.width as usize) + (p.x as usize);
            self.indices[i] = self.table.lookup(bitmask);
        }
    }

    /// Swap in a new table and re-derive every index with it.
    pub fn replace_table(&mut self, table: AutoTileTable) {
        self.table.replace(table);
        self.rebuild_indices();
        log::debug!(
            "re-derived {} indices for {}x{} grid",
            self.indices.len(),
            self.width,
            self.height
        );
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.occupancy.iter().filter(|&&b| b).count()
    }

    /// Row-major iterator over `(Point, occupied)` pairs.
    pub fn cells(&self) -> impl Iterator<Item = (Point, bool)> + '_ {
        self.bounds().iter().zip(self.occupancy.iter().copied())
    }
}
