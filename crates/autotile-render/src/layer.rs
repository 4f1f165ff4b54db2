//! The [`TileLayer`] coordinator.
//!
//! A layer owns one [`TileGrid`] and everything needed to draw it: the variant
//! atlas, an optional overlay pass, the current view rectangle and the active
//! [`LayerStrategy`]. Rendering is a single call per frame against a
//! [`DrawSink`].

use autotile_core::{AutoTileTable, Point, TileGrid};

use crate::atlas::{AtlasError, Inset, SourceRegion, TextureSize, TileAtlas};
use crate::sink::{DrawSink, Uniform};
use crate::strategy::{BuiltinStrategy, LayerStrategy, RenderContext, RenderStats};
use crate::view::{OrthoCamera, ViewRect};

/// Uniform selecting the overlay sampler.
pub const U_OVERLAY: &str = "u_overlay";
/// Uniform selecting the tile-set sampler.
pub const U_TEXTURE: &str = "u_texture";
/// Uniform carrying the overlay's texel-per-world-unit scale.
pub const U_SCALE: &str = "u_scale";

/// Texture unit the tile set is bound to.
pub const TILE_SET_UNIT: u32 = 0;
/// Texture unit the overlay texture is bound to.
pub const OVERLAY_UNIT: u32 = 1;

// ---------------------------------------------------------------------------
// LayerConfig
// ---------------------------------------------------------------------------

/// Construction parameters of a [`TileLayer`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayerConfig {
    pub tiles_x: i32,
    pub tiles_y: i32,
    /// Tile width in texels.
    pub tile_width: f32,
    /// Tile height in texels.
    pub tile_height: f32,
    /// World units per texel.
    pub unit_scale: f32,
    /// Start with every cell occupied.
    pub filled: bool,
    pub strategy: BuiltinStrategy,
    pub inset: Inset,
    pub table: AutoTileTable,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            tiles_x: 64,
            tiles_y: 64,
            tile_width: 16.0,
            tile_height: 16.0,
            unit_scale: 1.0,
            filled: false,
            strategy: BuiltinStrategy::default(),
            inset: Inset::default(),
            table: AutoTileTable::default(),
        }
    }
}

/// Texture and shader used by the overlay pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Overlay<T, S> {
    pub texture: T,
    pub shader: S,
}

// ---------------------------------------------------------------------------
// TileLayer
// ---------------------------------------------------------------------------

/// One auto-tiled layer: grid, atlas, overlay, view and render strategy.
///
/// `T` is the renderer's texture handle and `S` its shader handle. The layer
/// keeps clones of the handles it is given and never releases the resources
/// behind them.
#[derive(Debug)]
pub struct TileLayer<T, S> {
    grid: TileGrid,
    atlas: Option<TileAtlas<T>>,
    overlay: Option<Overlay<T, S>>,
    view: ViewRect,
    strategy: LayerStrategy<T>,
    tile_width: f32,
    tile_height: f32,
    offset_x: f32,
    offset_y: f32,
    unit_scale: f32,
    overlay_scale: f32,
    inset: Inset,
    stats: RenderStats,
}

impl<T, S> TileLayer<T, S> {
    pub fn new(config: LayerConfig) -> Self {
        let mut grid = TileGrid::with_table(config.tiles_x, config.tiles_y, config.table);
        if config.filled {
            grid.fill(true);
        }
        Self::from_grid(grid, config.tile_width, config.tile_height, config.unit_scale)
            .with_strategy(config.strategy)
            .with_inset(config.inset)
    }

    /// Wrap an existing grid. The strategy and inset start at their defaults.
    pub fn from_grid(grid: TileGrid, tile_width: f32, tile_height: f32, unit_scale: f32) -> Self {
        Self {
            grid,
            atlas: None,
            overlay: None,
            view: ViewRect::default(),
            strategy: LayerStrategy::default(),
            tile_width,
            tile_height,
            offset_x: tile_width / 2.0,
            offset_y: tile_height / 2.0,
            unit_scale,
            overlay_scale: 0.0,
            inset: Inset::default(),
            stats: RenderStats::default(),
        }
    }

    fn with_strategy(mut self, strategy: BuiltinStrategy) -> Self {
        self.strategy = strategy.into();
        self
    }

    fn with_inset(mut self, inset: Inset) -> Self {
        self.inset = inset;
        self
    }

    // Dimensions

    #[inline]
    pub fn tiles_x(&self) -> i32 {
        self.grid.tiles_x()
    }

    #[inline]
    pub fn tiles_y(&self) -> i32 {
        self.grid.tiles_y()
    }

    #[inline]
    pub fn tile_width(&self) -> f32 {
        self.tile_width
    }

    #[inline]
    pub fn tile_height(&self) -> f32 {
        self.tile_height
    }

    #[inline]
    pub fn offset_x(&self) -> f32 {
        self.offset_x
    }

    #[inline]
    pub fn offset_y(&self) -> f32 {
        self.offset_y
    }

    #[inline]
    pub fn unit_scale(&self) -> f32 {
        self.unit_scale
    }

    pub fn set_unit_scale(&mut self, unit_scale: f32) {
        self.unit_scale = unit_scale;
    }

    // Overlay

    #[inline]
    pub fn overlay_scale(&self) -> f32 {
        self.overlay_scale
    }

    pub fn set_overlay_scale(&mut self, overlay_scale: f32) {
        self.overlay_scale = overlay_scale;
    }

    #[inline]
    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    #[inline]
    pub fn overlay(&self) -> Option<&Overlay<T, S>> {
        self.overlay.as_ref()
    }

    /// Remove the overlay, returning its handles. The overlay scale is kept.
    pub fn clear_overlay(&mut self) -> Option<Overlay<T, S>> {
        self.overlay.take()
    }

    // Tile set

    #[inline]
    pub fn has_tile_set(&self) -> bool {
        self.atlas.is_some()
    }

    #[inline]
    pub fn atlas(&self) -> Option<&TileAtlas<T>> {
        self.atlas.as_ref()
    }

    #[inline]
    pub fn tile_set_texture(&self) -> Option<&T> {
        self.atlas.as_ref().map(TileAtlas::texture)
    }

    #[inline]
    pub fn inset(&self) -> Inset {
        self.inset
    }

    // View and strategy

    #[inline]
    pub fn view(&self) -> ViewRect {
        self.view
    }

    /// Store the view rectangle used by the next [`render`](Self::render).
    pub fn set_view(&mut self, view: ViewRect) {
        self.view = view;
    }

    pub fn set_view_from_camera(&mut self, camera: &OrthoCamera) {
        self.view = ViewRect::from_camera(camera);
    }

    #[inline]
    pub fn strategy(&self) -> &LayerStrategy<T> {
        &self.strategy
    }

    pub fn set_strategy(&mut self, strategy: impl Into<LayerStrategy<T>>) {
        self.strategy = strategy.into();
    }

    /// Stats of the last render call.
    #[inline]
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    #[inline]
    pub fn tiles_rendered(&self) -> usize {
        self.stats.tiles_rendered
    }

    #[inline]
    pub fn quads_rendered(&self) -> usize {
        self.stats.quads_rendered
    }

    // Grid

    #[inline]
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    #[inline]
    pub fn grid_mut(&mut self) -> &mut TileGrid {
        &mut self.grid
    }

    #[inline]
    pub fn tile_at(&self, x: i32, y: i32) -> bool {
        self.grid.get(x, y)
    }

    #[inline]
    pub fn set_tile_at(&mut self, x: i32, y: i32, state: bool) {
        self.grid.set(x, y, state);
    }

    #[inline]
    pub fn fill(&mut self, state: bool) {
        self.grid.fill(state);
    }

    #[inline]
    pub fn is_out_of_bounds(&self, x: i32, y: i32) -> bool {
        self.grid.is_out_of_bounds(x, y)
    }

    /// Occupancy point nearest the world-space point `(wx, wy)`, if any.
    ///
    /// Quad `(x, y)` is drawn from `(offset + x * tile) * unit_scale`, and
    /// point `(x, y)` is the corner shared by quads `x..=x + 1, y..=y + 1`, so
    /// it shows at `(offset + (x + 1) * tile) * unit_scale`. This is the
    /// point to paint for a click at `(wx, wy)`.
    pub fn point_at_world(&self, wx: f32, wy: f32) -> Option<Point> {
        let x = (wx / self.unit_scale - self.offset_x) / self.tile_width - 0.5;
        let y = (wy / self.unit_scale - self.offset_y) / self.tile_height - 0.5;
        let p = Point::new(x.floor() as i32, y.floor() as i32);
        (!self.grid.is_out_of_bounds(p.x, p.y)).then_some(p)
    }

    /// Replace the grid's table and re-derive every index.
    pub fn replace_table(&mut self, table: AutoTileTable) {
        self.grid.replace_table(table);
    }

    /// Render the layer into `sink`.
    ///
    /// Does nothing until a tile set is installed. With an overlay the quads
    /// are drawn through the overlay shader, with the overlay texture on
    /// [`OVERLAY_UNIT`] and the tile set on [`TILE_SET_UNIT`].
    pub fn render<D: DrawSink<T, S>>(&mut self, sink: &mut D) -> RenderStats {
        let Some(atlas) = self.atlas.as_ref() else {
            return RenderStats::default();
        };

        if let Some(overlay) = &self.overlay {
            sink.bind_shader(&overlay.shader);
            sink.set_uniform(U_OVERLAY, Uniform::Int(OVERLAY_UNIT as i32));
            sink.set_uniform(U_TEXTURE, Uniform::Int(TILE_SET_UNIT as i32));
            sink.set_uniform(U_SCALE, Uniform::Float(self.overlay_scale / self.unit_scale));
            sink.bind_texture(&overlay.texture, OVERLAY_UNIT);
            sink.bind_texture(atlas.texture(), TILE_SET_UNIT);
        }

        let ctx = RenderContext {
            grid: &self.grid,
            atlas,
            view: self.view,
            unit_scale: self.unit_scale,
            tile_width: self.tile_width,
            tile_height: self.tile_height,
            offset_x: self.offset_x,
            offset_y: self.offset_y,
        };
        let stats = self.strategy.render(&ctx, sink);

        if self.overlay.is_some() {
            sink.unbind_shader();
        }

        log::trace!(
            "rendered {} tiles / {} quads",
            stats.tiles_rendered,
            stats.quads_rendered
        );
        self.stats = stats;
        stats
    }
}

impl<T: TextureSize, S> TileLayer<T, S> {
    /// Cut the variant atlas out of `texture` at `source`.
    pub fn set_tile_set(&mut self, texture: T, source: SourceRegion) -> Result<(), AtlasError> {
        let atlas = TileAtlas::new(texture, source, self.tile_width, self.tile_height, self.inset)?;
        self.atlas = Some(atlas);
        Ok(())
    }

    /// Change the inset, re-cutting the atlas if one is installed.
    pub fn set_inset(&mut self, inset: Inset) {
        self.inset = inset;
        if let Some(atlas) = &mut self.atlas {
            atlas.set_inset(inset);
        }
    }

    /// Install an overlay. The overlay scale becomes one over the overlay
    /// texture's width.
    pub fn set_overlay(&mut self, texture: T, shader: S) {
        let width = texture.width();
        if width > 0 {
            self.overlay_scale = 1.0 / width as f32;
        } else {
            log::warn!(
                "overlay texture has zero width, keeping overlay scale {}",
                self.overlay_scale
            );
        }
        self.overlay = Some(Overlay { texture, shader });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{DrawCommand, QuadSink, RecordingSink};
    use crate::strategy::{RenderStrategy, StrategyError};

    #[derive(Copy, Clone, Debug, PartialEq)]
    struct Tex {
        id: u32,
        width: u32,
    }

    impl TextureSize for Tex {
        fn width(&self) -> u32 {
            self.width
        }
        fn height(&self) -> u32 {
            self.width
        }
    }

    const TILES: Tex = Tex { id: 1, width: 64 };
    const OVERLAY: Tex = Tex { id: 2, width: 256 };

    type Sink = RecordingSink<Tex, &'static str>;

    fn layer(tiles_x: i32, tiles_y: i32) -> TileLayer<Tex, &'static str> {
        TileLayer::new(LayerConfig {
            tiles_x,
            tiles_y,
            unit_scale: 1.0 / 16.0,
            ..LayerConfig::default()
        })
    }

    #[test]
    fn new_layer() {
        let l = layer(8, 4);
        assert_eq!((l.tiles_x(), l.tiles_y()), (8, 4));
        assert_eq!((l.offset_x(), l.offset_y()), (8.0, 8.0));
        assert_eq!(l.strategy().name(), Some("VIEW_TILES_VIEW_QUADS"));
        assert!(!l.has_tile_set());
        assert!(!l.has_overlay());
        assert_eq!(l.grid().occupied_count(), 0);

        let filled: TileLayer<Tex, ()> = TileLayer::new(LayerConfig {
            tiles_x: 3,
            tiles_y: 3,
            filled: true,
            ..LayerConfig::default()
        });
        assert_eq!(filled.grid().occupied_count(), 9);
        assert!(filled.tile_at(2, 2));
    }

    #[test]
    fn render_without_tile_set_is_noop() {
        let mut l = layer(4, 4);
        l.set_overlay(OVERLAY, "overlay");
        l.fill(true);
        let mut sink = Sink::new();
        assert_eq!(l.render(&mut sink), RenderStats::default());
        assert!(sink.commands().is_empty());
    }

    #[test]
    fn render_records_stats() {
        let mut l = layer(4, 4);
        l.set_tile_set(TILES, SourceRegion::ORIGIN).unwrap();
        l.set_tile_at(1, 1, true);
        l.set_view(ViewRect::new(0.0, 0.0, 4.0, 4.0));
        let mut sink = Sink::new();
        let stats = l.render(&mut sink);
        assert_eq!(stats.quads_rendered, 4);
        assert_eq!(l.quads_rendered(), 4);
        assert_eq!(l.tiles_rendered(), 1);
        // no overlay: only quads
        assert_eq!(sink.commands().len(), 4);

        l.set_strategy(BuiltinStrategy::AllTilesAllQuads);
        sink.clear();
        l.render(&mut sink);
        assert_eq!(l.quads_rendered(), 16);
    }

    #[test]
    fn overlay_binding_order() {
        let mut l = layer(2, 2);
        l.set_tile_set(TILES, SourceRegion::ORIGIN).unwrap();
        l.set_overlay(OVERLAY, "overlay");
        assert_eq!(l.overlay_scale(), 1.0 / 256.0);
        l.fill(true);
        l.set_strategy(BuiltinStrategy::AllTilesAllQuads);

        let mut sink = Sink::new();
        l.render(&mut sink);
        let cmds = sink.commands();
        assert_eq!(cmds[0], DrawCommand::BindShader("overlay"));
        assert_eq!(
            cmds[1],
            DrawCommand::SetUniform {
                name: U_OVERLAY.into(),
                value: Uniform::Int(1)
            }
        );
        assert_eq!(
            cmds[2],
            DrawCommand::SetUniform {
                name: U_TEXTURE.into(),
                value: Uniform::Int(0)
            }
        );
        assert_eq!(
            cmds[3],
            DrawCommand::SetUniform {
                name: U_SCALE.into(),
                value: Uniform::Float((1.0 / 256.0) / (1.0 / 16.0))
            }
        );
        assert_eq!(
            cmds[4],
            DrawCommand::BindTexture {
                texture: OVERLAY,
                unit: 1
            }
        );
        assert_eq!(
            cmds[5],
            DrawCommand::BindTexture {
                texture: TILES,
                unit: 0
            }
        );
        assert!(
            cmds[6..10]
                .iter()
                .all(|c| matches!(c, DrawCommand::Quad { texture, .. } if *texture == TILES))
        );
        assert_eq!(cmds[10], DrawCommand::UnbindShader);
        assert_eq!(cmds.len(), 11);
    }

    #[test]
    fn clear_overlay_keeps_scale() {
        let mut l = layer(2, 2);
        l.set_overlay(OVERLAY, "overlay");
        l.set_overlay_scale(0.5);
        let removed = l.clear_overlay();
        assert_eq!(removed.map(|o| o.shader), Some("overlay"));
        assert!(!l.has_overlay());
        assert_eq!(l.overlay_scale(), 0.5);
    }

    #[test]
    fn set_inset_recuts_installed_atlas() {
        let mut l = layer(2, 2);
        l.set_inset(Inset::new(0.0, 0.0));
        l.set_tile_set(TILES, SourceRegion::ORIGIN).unwrap();
        assert_eq!(l.atlas().map(|a| a.region(0).u), Some(0.0));
        l.set_inset(Inset::new(1.0, 1.0));
        assert_eq!(l.atlas().map(|a| a.region(0).u), Some(1.0 / 64.0));
        assert_eq!(l.tile_set_texture(), Some(&TILES));
    }

    #[test]
    fn bad_tile_set_keeps_previous() {
        let mut l = layer(2, 2);
        l.set_tile_set(TILES, SourceRegion::ORIGIN).unwrap();
        let err = l.set_tile_set(Tex { id: 3, width: 0 }, SourceRegion::ORIGIN);
        assert!(err.is_err());
        assert_eq!(l.tile_set_texture(), Some(&TILES));
    }

    #[test]
    fn camera_sets_view() {
        let mut l = layer(64, 64);
        let mut cam = OrthoCamera::new(20.0, 12.0);
        cam.look_at(32.0, 32.0);
        l.set_view_from_camera(&cam);
        assert_eq!(l.view(), ViewRect::new(22.0, 26.0, 20.0, 12.0));
    }

    #[test]
    fn point_at_world_is_nearest_corner() {
        let l = layer(8, 8);
        // point (2, 1) is the corner shared by quads (2..=3, 1..=2), at (3.5, 2.5)
        assert_eq!(l.point_at_world(3.6, 2.9), Some(Point::new(2, 1)));
        assert_eq!(l.point_at_world(1.0, 1.0), Some(Point::new(0, 0)));
        assert_eq!(l.point_at_world(8.9, 8.9), Some(Point::new(7, 7)));
        assert_eq!(l.point_at_world(0.2, 0.2), None);
        assert_eq!(l.point_at_world(100.0, 1.0), None);
    }

    #[test]
    fn painted_blob_centres_on_click() {
        let mut l = layer(8, 8);
        let (wx, wy) = (3.6, 2.9);
        let p = l.point_at_world(wx, wy).unwrap();
        l.set_tile_at(p.x, p.y, true);

        let zero = l.grid().table().zero_index();
        let drawn: Vec<Point> = l
            .grid()
            .bounds()
            .into_iter()
            .filter(|q| l.grid().index(q.x, q.y) != Some(zero))
            .collect();
        assert_eq!(drawn.len(), 4);
        // quad (x, y) spans (x + 0.5)..(x + 1.5) in world units
        let n = drawn.len() as f32;
        let cx = drawn.iter().map(|q| q.x as f32 + 1.0).sum::<f32>() / n;
        let cy = drawn.iter().map(|q| q.y as f32 + 1.0).sum::<f32>() / n;
        assert!((cx - wx).abs() <= 0.5, "centre x {cx}");
        assert!((cy - wy).abs() <= 0.5, "centre y {cy}");
    }

    #[test]
    fn replace_table_rederives() {
        let mut l = layer(3, 3);
        l.set_tile_at(1, 1, true);
        let mut swapped = autotile_core::DEFAULT_TABLE;
        swapped.swap(0, 15);
        l.replace_table(AutoTileTable::from_entries(&swapped).unwrap());
        assert_eq!(l.grid().index(0, 0), Some(swapped[0]));
        assert_eq!(l.grid().table().zero_index(), 6);
    }

    struct Nothing;

    impl RenderStrategy<Tex> for Nothing {
        fn render(&self, _: &RenderContext<'_, Tex>, _: &mut dyn QuadSink<Tex>) -> RenderStats {
            RenderStats::default()
        }
    }

    #[test]
    fn custom_strategy_renders() {
        let mut l = layer(4, 4);
        l.set_tile_set(TILES, SourceRegion::ORIGIN).unwrap();
        l.fill(true);
        l.set_strategy(LayerStrategy::Custom(Box::new(Nothing)));
        assert_eq!(l.strategy().name(), None);
        assert_eq!(l.strategy().require_builtin(), Err(StrategyError::Unnamed));
        let mut sink = Sink::new();
        assert_eq!(l.render(&mut sink), RenderStats::default());
    }
}
