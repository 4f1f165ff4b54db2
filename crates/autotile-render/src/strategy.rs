//! Render strategies: which cells to visit and which of them to draw.
//!
//! A strategy combines two independent choices:
//!
//! - the **cell range**, either every cell of the grid or only the window of
//!   cells overlapping the view rectangle;
//! - the **quad policy**, either drawing every visited cell or skipping cells
//!   whose variant is the table's zero index (nothing to show).
//!
//! The four combinations are the [`BuiltinStrategy`] variants. Anything else
//! implements [`RenderStrategy`] and is installed as
//! [`LayerStrategy::Custom`].

use std::fmt;
use std::str::FromStr;

use autotile_core::{Point, Range, TileGrid};
use thiserror::Error;

use crate::atlas::TileAtlas;
use crate::sink::QuadSink;
use crate::view::ViewRect;

/// Errors naming or parsing a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error("unknown render strategy {0:?}")]
    UnknownName(String),
    #[error("custom render strategies have no name and cannot be persisted")]
    Unnamed,
}

// ---------------------------------------------------------------------------
// RenderContext / RenderStats
// ---------------------------------------------------------------------------

/// Everything a strategy reads during one render call.
pub struct RenderContext<'a, T> {
    pub grid: &'a TileGrid,
    pub atlas: &'a TileAtlas<T>,
    pub view: ViewRect,
    pub unit_scale: f32,
    pub tile_width: f32,
    pub tile_height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl<T> RenderContext<'_, T> {
    /// Size of one tile in world units.
    #[inline]
    pub fn scaled_tile_size(&self) -> (f32, f32) {
        (
            self.tile_width * self.unit_scale,
            self.tile_height * self.unit_scale,
        )
    }

    /// World position of the quad for cell `p`.
    #[inline]
    pub fn quad_position(&self, p: Point) -> (f32, f32) {
        (
            (self.offset_x + p.x as f32 * self.tile_width) * self.unit_scale,
            (self.offset_y + p.y as f32 * self.tile_height) * self.unit_scale,
        )
    }

    /// Cells overlapping the view, clamped to the grid. Empty when the view
    /// lies entirely outside it.
    pub fn view_window(&self) -> Range {
        let (sw, sh) = self.scaled_tile_size();
        let v = &self.view;
        let col1 = floor_to_cell((v.x - self.offset_x) / sw).max(0);
        let col2 = floor_to_cell(v.right() / sw)
            .saturating_add(1)
            .min(self.grid.tiles_x());
        let row1 = floor_to_cell((v.y - self.offset_y) / sh).max(0);
        let row2 = floor_to_cell(v.top() / sh)
            .saturating_add(1)
            .min(self.grid.tiles_y());
        Range::from_corners(Point::new(col1, row1), Point::new(col2, row2))
    }

    /// Draw cell `p` with its cached variant.
    #[inline]
    pub fn draw_cell(&self, sink: &mut dyn QuadSink<T>, p: Point, index: u8) {
        let (x, y) = self.quad_position(p);
        let (w, h) = self.scaled_tile_size();
        sink.draw_quad(self.atlas.texture(), self.atlas.region(index), x, y, w, h);
    }
}

#[inline]
fn floor_to_cell(v: f32) -> i32 {
    // `as` saturates and maps NaN to 0.
    v.floor() as i32
}

/// Counters produced by one render call.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderStats {
    /// Occupied cells visited.
    pub tiles_rendered: usize,
    /// Quads emitted to the sink.
    pub quads_rendered: usize,
}

/// A culling and drawing policy.
pub trait RenderStrategy<T> {
    fn render(&self, ctx: &RenderContext<'_, T>, sink: &mut dyn QuadSink<T>) -> RenderStats;
}

// ---------------------------------------------------------------------------
// BuiltinStrategy
// ---------------------------------------------------------------------------

/// Which cells a strategy visits.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CellRange {
    All,
    View,
}

/// Which visited cells a strategy draws.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum QuadPolicy {
    All,
    SkipEmpty,
}

/// The four named strategies.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum BuiltinStrategy {
    AllTilesAllQuads,
    AllTilesViewQuads,
    ViewTilesAllQuads,
    #[default]
    ViewTilesViewQuads,
}

impl BuiltinStrategy {
    pub const ALL: [Self; 4] = [
        Self::AllTilesAllQuads,
        Self::AllTilesViewQuads,
        Self::ViewTilesAllQuads,
        Self::ViewTilesViewQuads,
    ];

    pub const fn from_parts(range: CellRange, policy: QuadPolicy) -> Self {
        match (range, policy) {
            (CellRange::All, QuadPolicy::All) => Self::AllTilesAllQuads,
            (CellRange::All, QuadPolicy::SkipEmpty) => Self::AllTilesViewQuads,
            (CellRange::View, QuadPolicy::All) => Self::ViewTilesAllQuads,
            (CellRange::View, QuadPolicy::SkipEmpty) => Self::ViewTilesViewQuads,
        }
    }

    pub const fn cell_range(self) -> CellRange {
        match self {
            Self::AllTilesAllQuads | Self::AllTilesViewQuads => CellRange::All,
            Self::ViewTilesAllQuads | Self::ViewTilesViewQuads => CellRange::View,
        }
    }

    pub const fn quad_policy(self) -> QuadPolicy {
        match self {
            Self::AllTilesAllQuads | Self::ViewTilesAllQuads => QuadPolicy::All,
            Self::AllTilesViewQuads | Self::ViewTilesViewQuads => QuadPolicy::SkipEmpty,
        }
    }

    /// Persisted name, e.g. `VIEW_TILES_VIEW_QUADS`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::AllTilesAllQuads => "ALL_TILES_ALL_QUADS",
            Self::AllTilesViewQuads => "ALL_TILES_VIEW_QUADS",
            Self::ViewTilesAllQuads => "VIEW_TILES_ALL_QUADS",
            Self::ViewTilesViewQuads => "VIEW_TILES_VIEW_QUADS",
        }
    }
}

impl fmt::Display for BuiltinStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuiltinStrategy {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.name() == s)
            .ok_or_else(|| StrategyError::UnknownName(s.to_owned()))
    }
}

impl<T> RenderStrategy<T> for BuiltinStrategy {
    fn render(&self, ctx: &RenderContext<'_, T>, sink: &mut dyn QuadSink<T>) -> RenderStats {
        let window = match self.cell_range() {
            CellRange::All => ctx.grid.bounds(),
            CellRange::View => ctx.view_window(),
        };
        let skip_empty = self.quad_policy() == QuadPolicy::SkipEmpty;
        let zero = ctx.grid.table().zero_index();

        let mut stats = RenderStats::default();
        for p in window.iter_columns() {
            let Some(index) = ctx.grid.index(p.x, p.y) else {
                continue;
            };
            if ctx.grid.at(p) {
                stats.tiles_rendered += 1;
            }
            if skip_empty && index == zero {
                continue;
            }
            ctx.draw_cell(sink, p, index);
            stats.quads_rendered += 1;
        }
        stats
    }
}

// ---------------------------------------------------------------------------
// LayerStrategy
// ---------------------------------------------------------------------------

/// The strategy installed on a layer: a named built-in or a custom one.
pub enum LayerStrategy<T> {
    Builtin(BuiltinStrategy),
    Custom(Box<dyn RenderStrategy<T>>),
}

impl<T> LayerStrategy<T> {
    /// Persisted name, `None` for custom strategies.
    pub fn name(&self) -> Option<&'static str> {
        self.builtin().map(BuiltinStrategy::name)
    }

    pub fn builtin(&self) -> Option<BuiltinStrategy> {
        match self {
            Self::Builtin(b) => Some(*b),
            Self::Custom(_) => None,
        }
    }

    /// Like [`builtin`](Self::builtin), failing for custom strategies.
    pub fn require_builtin(&self) -> Result<BuiltinStrategy, StrategyError> {
        self.builtin().ok_or(StrategyError::Unnamed)
    }

    pub fn render(&self, ctx: &RenderContext<'_, T>, sink: &mut dyn QuadSink<T>) -> RenderStats {
        match self {
            Self::Builtin(b) => b.render(ctx, sink),
            Self::Custom(s) => s.render(ctx, sink),
        }
    }
}

impl<T> Default for LayerStrategy<T> {
    fn default() -> Self {
        Self::Builtin(BuiltinStrategy::default())
    }
}

impl<T> From<BuiltinStrategy> for LayerStrategy<T> {
    fn from(b: BuiltinStrategy) -> Self {
        Self::Builtin(b)
    }
}

impl<T> From<Box<dyn RenderStrategy<T>>> for LayerStrategy<T> {
    fn from(s: Box<dyn RenderStrategy<T>>) -> Self {
        Self::Custom(s)
    }
}

impl<T> fmt::Debug for LayerStrategy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(b) => f.debug_tuple("Builtin").field(b).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{Inset, SourceRegion, TextureSize};
    use crate::sink::{DrawCommand, RecordingSink};
    use autotile_core::AutoTileTable;

    #[derive(Copy, Clone, Debug, PartialEq)]
    struct Tex;

    impl TextureSize for Tex {
        fn width(&self) -> u32 {
            64
        }
        fn height(&self) -> u32 {
            64
        }
    }

    fn atlas() -> TileAtlas<Tex> {
        TileAtlas::new(Tex, SourceRegion::ORIGIN, 16.0, 16.0, Inset::default()).unwrap()
    }

    fn ctx<'a>(
        grid: &'a TileGrid,
        atlas: &'a TileAtlas<Tex>,
        view: ViewRect,
    ) -> RenderContext<'a, Tex> {
        RenderContext {
            grid,
            atlas,
            view,
            unit_scale: 1.0 / 16.0,
            tile_width: 16.0,
            tile_height: 16.0,
            offset_x: 8.0,
            offset_y: 8.0,
        }
    }

    fn run(
        strategy: BuiltinStrategy,
        ctx: &RenderContext<'_, Tex>,
    ) -> (RenderStats, RecordingSink<Tex, ()>) {
        let mut sink = RecordingSink::new();
        let stats = strategy.render(ctx, &mut sink);
        (stats, sink)
    }

    fn single_tile_grid() -> TileGrid {
        let mut g = TileGrid::new(4, 4);
        g.set(1, 1, true);
        g
    }

    #[test]
    fn quad_counts_for_single_tile() {
        let grid = single_tile_grid();
        let atlas = atlas();
        let c = ctx(&grid, &atlas, ViewRect::new(-1.0, -1.0, 10.0, 10.0));
        for b in BuiltinStrategy::ALL {
            let (stats, sink) = run(b, &c);
            let expected = match b.quad_policy() {
                QuadPolicy::All => 16,
                QuadPolicy::SkipEmpty => 4,
            };
            assert_eq!(stats.quads_rendered, expected, "{b}");
            assert_eq!(sink.quad_count(), expected, "{b}");
            assert_eq!(stats.tiles_rendered, 1, "{b}");
        }
    }

    #[test]
    fn view_outside_grid_draws_nothing() {
        let mut grid = TileGrid::new(4, 4);
        grid.fill(true);
        let atlas = atlas();
        for view in [
            ViewRect::new(100.0, 100.0, 5.0, 5.0),
            ViewRect::new(-50.0, -50.0, 5.0, 5.0),
            ViewRect::new(100.0, 0.0, 5.0, 5.0),
        ] {
            let c = ctx(&grid, &atlas, view);
            assert!(c.view_window().is_empty(), "{view:?}");
            for b in [BuiltinStrategy::ViewTilesAllQuads, BuiltinStrategy::ViewTilesViewQuads] {
                let (stats, sink) = run(b, &c);
                assert_eq!(stats, RenderStats::default());
                assert_eq!(sink.quad_count(), 0);
            }
        }
    }

    #[test]
    fn view_window_clamps_to_grid() {
        let grid = TileGrid::new(10, 8);
        let atlas = atlas();
        let mut c = ctx(&grid, &atlas, ViewRect::new(40.0, 20.0, 30.0, 20.0));
        c.unit_scale = 1.0;
        // the low edge backs off by the unscaled half-tile offset
        assert_eq!(c.view_window(), Range::new(2, 0, 5, 3));

        let c = ctx(&grid, &atlas, ViewRect::new(-5.0, -5.0, 100.0, 100.0));
        assert_eq!(c.view_window(), grid.bounds());
    }

    #[test]
    fn visits_columns_first() {
        let mut grid = TileGrid::new(2, 2);
        grid.fill(true);
        let atlas = atlas();
        let c = ctx(&grid, &atlas, ViewRect::default());
        let (_, sink) = run(BuiltinStrategy::AllTilesAllQuads, &c);
        let positions: Vec<(f32, f32)> = sink
            .quads()
            .filter_map(|cmd| match cmd {
                DrawCommand::Quad { x, y, .. } => Some((*x, *y)),
                _ => None,
            })
            .collect();
        assert_eq!(positions, vec![(0.5, 0.5), (0.5, 1.5), (1.5, 0.5), (1.5, 1.5)]);
    }

    #[test]
    fn quads_use_cached_region() {
        let grid = single_tile_grid();
        let atlas = atlas();
        let c = ctx(&grid, &atlas, ViewRect::default());
        let (_, sink) = run(BuiltinStrategy::AllTilesViewQuads, &c);
        for cmd in sink.quads() {
            if let DrawCommand::Quad { region, x, y, width, height, .. } = cmd {
                let cx = (x / 1.0 - 0.5) as i32;
                let cy = (y / 1.0 - 0.5) as i32;
                assert_eq!(Some(region.index), grid.index(cx, cy));
                assert_eq!((*width, *height), (1.0, 1.0));
            }
        }
    }

    #[test]
    fn skip_uses_grid_table_zero_index() {
        let entries = [0, 13, 12, 3, 8, 1, 14, 5, 15, 4, 11, 2, 9, 10, 7, 6];
        let table = AutoTileTable::from_entries(&entries).unwrap();
        let mut grid = TileGrid::with_table(4, 4, table);
        grid.set(1, 1, true);
        let atlas = atlas();
        let c = ctx(&grid, &atlas, ViewRect::default());
        let (stats, _) = run(BuiltinStrategy::AllTilesViewQuads, &c);
        assert_eq!(stats.quads_rendered, 4);
    }

    #[test]
    fn names_round_trip() {
        for b in BuiltinStrategy::ALL {
            assert_eq!(b.name().parse::<BuiltinStrategy>(), Ok(b));
            assert_eq!(BuiltinStrategy::from_parts(b.cell_range(), b.quad_policy()), b);
        }
        assert_eq!(BuiltinStrategy::default().name(), "VIEW_TILES_VIEW_QUADS");
        assert_eq!(
            "view_tiles_view_quads".parse::<BuiltinStrategy>(),
            Err(StrategyError::UnknownName("view_tiles_view_quads".into()))
        );
    }

    struct EveryOther;

    impl RenderStrategy<Tex> for EveryOther {
        fn render(
            &self,
            ctx: &RenderContext<'_, Tex>,
            sink: &mut dyn QuadSink<Tex>,
        ) -> RenderStats {
            let mut stats = RenderStats::default();
            for p in ctx.grid.bounds().iter_columns().step_by(2) {
                if let Some(index) = ctx.grid.index(p.x, p.y) {
                    ctx.draw_cell(sink, p, index);
                    stats.quads_rendered += 1;
                }
            }
            stats
        }
    }

    #[test]
    fn custom_strategy_has_no_name() {
        let custom: LayerStrategy<Tex> = LayerStrategy::Custom(Box::new(EveryOther));
        assert_eq!(custom.name(), None);
        assert_eq!(custom.require_builtin(), Err(StrategyError::Unnamed));

        let grid = TileGrid::new(4, 4);
        let atlas = atlas();
        let c = ctx(&grid, &atlas, ViewRect::default());
        let mut sink: RecordingSink<Tex, ()> = RecordingSink::new();
        assert_eq!(custom.render(&c, &mut sink).quads_rendered, 8);

        let builtin: LayerStrategy<Tex> = BuiltinStrategy::AllTilesAllQuads.into();
        assert_eq!(builtin.name(), Some("ALL_TILES_ALL_QUADS"));
    }
}
