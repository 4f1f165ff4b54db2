//! Cell coordinates and rectangles of cells.
//!
//! Coordinates are y-up: `(0, 0)` is the bottom-left cell of a grid, x grows
//! right and y grows up, matching the world space tiles are drawn in.

use std::fmt;
use std::ops::{Add, Sub};

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A cell coordinate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

impl Add for Point {
    type Output = Self;
    #[inline]
    fn add(self, o: Self) -> Self {
        Self::new(self.x + o.x, self.y + o.y)
    }
}

impl Sub for Point {
    type Output = Self;
    #[inline]
    fn sub(self, o: Self) -> Self {
        Self::new(self.x - o.x, self.y - o.y)
    }
}

impl From<(i32, i32)> for Point {
    #[inline]
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// A half-open rectangle of cells, `min` inclusive and `max` exclusive.
///
/// A range whose `min` is not strictly below `max` on both axes holds no
/// cells. Culling windows are built with [`Range::from_corners`] so that a
/// window lying past the grid stays empty instead of being flipped.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub min: Point,
    pub max: Point,
}

impl Range {
    /// Range spanning two corners given in any order.
    #[inline]
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self::from_corners(
            Point::new(x0.min(x1), y0.min(y1)),
            Point::new(x0.max(x1), y0.max(y1)),
        )
    }

    /// Range with exactly these corners.
    #[inline]
    pub const fn from_corners(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Columns covered, zero when empty.
    #[inline]
    pub fn width(self) -> i32 {
        (self.max.x - self.min.x).max(0)
    }

    /// Rows covered, zero when empty.
    #[inline]
    pub fn height(self) -> i32 {
        (self.max.y - self.min.y).max(0)
    }

    #[inline]
    pub fn len(self) -> usize {
        self.width() as usize * self.height() as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn contains(self, p: Point) -> bool {
        (self.min.x..self.max.x).contains(&p.x) && (self.min.y..self.max.y).contains(&p.y)
    }

    /// Cells in the given order.
    #[inline]
    pub fn cells(self, order: CellOrder) -> RangeIter {
        RangeIter {
            range: self,
            order,
            next: 0,
            len: self.len(),
        }
    }

    /// Cells row by row: y outer, x inner. This is storage and bit order.
    #[inline]
    pub fn iter(self) -> RangeIter {
        self.cells(CellOrder::RowMajor)
    }

    /// Cells column by column: x outer, y inner. This is render order.
    #[inline]
    pub fn iter_columns(self) -> RangeIter {
        self.cells(CellOrder::ColumnMajor)
    }
}

impl IntoIterator for Range {
    type Item = Point;
    type IntoIter = RangeIter;
    #[inline]
    fn into_iter(self) -> RangeIter {
        self.iter()
    }
}

/// Visiting order of [`Range::cells`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CellOrder {
    RowMajor,
    ColumnMajor,
}

/// Iterator over the cells of a [`Range`].
#[derive(Clone, Debug)]
pub struct RangeIter {
    range: Range,
    order: CellOrder,
    next: usize,
    len: usize,
}

impl Iterator for RangeIter {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.next >= self.len {
            return None;
        }
        let i = self.next;
        self.next += 1;
        let (w, h) = (self.range.width() as usize, self.range.height() as usize);
        let (dx, dy) = match self.order {
            CellOrder::RowMajor => (i % w, i / w),
            CellOrder::ColumnMajor => (i / h, i % h),
        };
        Some(Point::new(
            self.range.min.x + dx as i32,
            self.range.min.y + dy as i32,
        ))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len - self.next;
        (n, Some(n))
    }
}

impl ExactSizeIterator for RangeIter {}
