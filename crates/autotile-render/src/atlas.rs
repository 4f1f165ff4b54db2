//! The 4×4 variant atlas cut from a tile-set texture.
//!
//! A tile set is a 4×4 block of equally sized tiles starting at some texel
//! position inside a texture. Variant `i + j * 4` is the tile in column `i`
//! and row `j`. Each region is shrunk by a small inset on every side so that
//! neighboring tiles never bleed in under filtering.

use thiserror::Error;

/// Columns (and rows) of the variant atlas.
pub const ATLAS_COLUMNS: usize = 4;

/// Number of variant regions in an atlas.
pub const ATLAS_LEN: usize = ATLAS_COLUMNS * ATLAS_COLUMNS;

/// Texel dimensions of a texture handle.
pub trait TextureSize {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// Errors from building a [`TileAtlas`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AtlasError {
    #[error("texture is {width}x{height}, cannot cut tiles from it")]
    EmptyTexture { width: u32, height: u32 },
    #[error("tile size must be positive, got {width}x{height}")]
    BadTileSize { width: f32, height: f32 },
}

// ---------------------------------------------------------------------------
// Inset / SourceRegion
// ---------------------------------------------------------------------------

/// Per-side shrink of each region, in texels.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Inset {
    pub x: f32,
    pub y: f32,
}

impl Inset {
    pub const DEFAULT: Self = Self { x: 0.01, y: 0.01 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Default for Inset {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Where the 4×4 block starts inside its texture, in normalized coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceRegion {
    pub u: f32,
    pub v: f32,
}

impl SourceRegion {
    /// The block starts at the texture origin.
    pub const ORIGIN: Self = Self { u: 0.0, v: 0.0 };

    pub const fn new(u: f32, v: f32) -> Self {
        Self { u, v }
    }

    /// Block starting at texel `(x, y)` of `texture`.
    pub fn from_texels<T: TextureSize>(texture: &T, x: u32, y: u32) -> Self {
        let (w, h) = (texture.width().max(1) as f32, texture.height().max(1) as f32);
        Self {
            u: x as f32 / w,
            v: y as f32 / h,
        }
    }
}

// ---------------------------------------------------------------------------
// AtlasRegion
// ---------------------------------------------------------------------------

/// One variant's sub-rectangle of the tile-set texture, normalized.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AtlasRegion {
    /// Variant index this region draws.
    pub index: u8,
    pub u: f32,
    pub v: f32,
    pub u2: f32,
    pub v2: f32,
}

impl AtlasRegion {
    #[inline]
    pub fn width(&self) -> f32 {
        self.u2 - self.u
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.v2 - self.v
    }
}

// ---------------------------------------------------------------------------
// TileAtlas
// ---------------------------------------------------------------------------

/// A tile-set texture and its sixteen variant regions.
#[derive(Clone, Debug)]
pub struct TileAtlas<T> {
    texture: T,
    source: SourceRegion,
    tile_width: f32,
    tile_height: f32,
    inset: Inset,
    regions: [AtlasRegion; ATLAS_LEN],
}

impl<T: TextureSize> TileAtlas<T> {
    /// Cut a 4×4 atlas of `tile_width × tile_height` texel tiles out of
    /// `texture`, starting at `source`.
    pub fn new(
        texture: T,
        source: SourceRegion,
        tile_width: f32,
        tile_height: f32,
        inset: Inset,
    ) -> Result<Self, AtlasError> {
        if texture.width() == 0 || texture.height() == 0 {
            return Err(AtlasError::EmptyTexture {
                width: texture.width(),
                height: texture.height(),
            });
        }
        if !(tile_width > 0.0 && tile_height > 0.0) {
            return Err(AtlasError::BadTileSize {
                width: tile_width,
                height: tile_height,
            });
        }
        let regions = cut_regions(&texture, source, tile_width, tile_height, inset);
        log::debug!(
            "cut {} regions from {}x{} texture at ({}, {}), tile {}x{}",
            ATLAS_LEN,
            texture.width(),
            texture.height(),
            source.u,
            source.v,
            tile_width,
            tile_height
        );
        Ok(Self {
            texture,
            source,
            tile_width,
            tile_height,
            inset,
            regions,
        })
    }

    /// Re-cut every region with a new inset.
    pub fn set_inset(&mut self, inset: Inset) {
        self.inset = inset;
        self.regions = cut_regions(
            &self.texture,
            self.source,
            self.tile_width,
            self.tile_height,
            inset,
        );
    }
}

impl<T> TileAtlas<T> {
    #[inline]
    pub fn texture(&self) -> &T {
        &self.texture
    }

    #[inline]
    pub fn source(&self) -> SourceRegion {
        self.source
    }

    #[inline]
    pub fn inset(&self) -> Inset {
        self.inset
    }

    /// Region for variant `index`. Indices come from an
    /// [`AutoTileTable`](autotile_core::AutoTileTable) and are always below
    /// [`ATLAS_LEN`]; larger values wrap.
    #[inline]
    pub fn region(&self, index: u8) -> &AtlasRegion {
        &self.regions[usize::from(index) % ATLAS_LEN]
    }

    #[inline]
    pub fn regions(&self) -> &[AtlasRegion; ATLAS_LEN] {
        &self.regions
    }
}

fn cut_regions<T: TextureSize>(
    texture: &T,
    source: SourceRegion,
    tile_width: f32,
    tile_height: f32,
    inset: Inset,
) -> [AtlasRegion; ATLAS_LEN] {
    let tex_w = texture.width() as f32;
    let tex_h = texture.height() as f32;
    let w = tile_width / tex_w;
    let h = tile_height / tex_h;
    let inset_x = inset.x / tex_w;
    let inset_y = inset.y / tex_h;
    std::array::from_fn(|index| {
        let i = (index % ATLAS_COLUMNS) as f32;
        let j = (index / ATLAS_COLUMNS) as f32;
        let u = source.u + i * w + inset_x;
        let v = source.v + j * h + inset_y;
        AtlasRegion {
            index: index as u8,
            u,
            v,
            u2: u + w - 2.0 * inset_x,
            v2: v + h - 2.0 * inset_y,
        }
    })
}
