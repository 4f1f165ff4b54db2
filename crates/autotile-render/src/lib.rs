//! **autotile-render**: drawing auto-tiled layers.
//!
//! Built on [`autotile_core`], this crate turns a [`TileGrid`] into textured
//! quads. It does not depend on any graphics API: a renderer plugs in by
//! implementing [`QuadSink`] and [`DrawSink`] for its own texture and shader
//! handles.
//!
//! - [`TileAtlas`] cuts the sixteen variant regions out of a tile-set texture.
//! - [`BuiltinStrategy`] and [`RenderStrategy`] decide which cells are drawn.
//! - [`TileLayer`] ties grid, atlas, overlay pass and view together.
//! - [`LayerRecord`] persists a layer's grid and settings.
//!
//! ## Quick start
//!
//! ```
//! use autotile_render::{
//!     LayerConfig, RecordingSink, SourceRegion, TextureSize, TileLayer, ViewRect,
//! };
//!
//! #[derive(Clone, Copy, Debug, PartialEq)]
//! struct Texture;
//! impl TextureSize for Texture {
//!     fn width(&self) -> u32 { 64 }
//!     fn height(&self) -> u32 { 64 }
//! }
//!
//! let mut layer: TileLayer<Texture, ()> = TileLayer::new(LayerConfig {
//!     tiles_x: 4,
//!     tiles_y: 4,
//!     unit_scale: 1.0 / 16.0,
//!     ..LayerConfig::default()
//! });
//! layer.set_tile_set(Texture, SourceRegion::ORIGIN).unwrap();
//! layer.set_tile_at(1, 1, true);
//! layer.set_view(ViewRect::new(0.0, 0.0, 4.0, 4.0));
//!
//! let mut sink = RecordingSink::new();
//! layer.render(&mut sink);
//! assert_eq!(layer.quads_rendered(), 4);
//! ```
//!
//! [`TileGrid`]: autotile_core::TileGrid

pub mod atlas;
pub mod layer;
pub mod record;
pub mod sink;
pub mod strategy;
pub mod view;

pub use autotile_core;

pub use atlas::{
    ATLAS_COLUMNS, ATLAS_LEN, AtlasError, AtlasRegion, Inset, SourceRegion, TextureSize, TileAtlas,
};
pub use layer::{
    LayerConfig, OVERLAY_UNIT, Overlay, TILE_SET_UNIT, TileLayer, U_OVERLAY, U_SCALE, U_TEXTURE,
};
pub use record::{LayerRecord, RecordDecoder, RecordEncoder, RecordError};
pub use sink::{DrawCommand, DrawSink, QuadSink, RecordingSink, Uniform};
pub use strategy::{
    BuiltinStrategy, CellRange, LayerStrategy, QuadPolicy, RenderContext, RenderStats,
    RenderStrategy, StrategyError,
};
pub use view::{OrthoCamera, ViewRect};
