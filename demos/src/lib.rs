//! Shared scene for the demo binaries.
//!
//! There is no window here: textures and shaders are plain handles and the
//! drawing sink only counts what it is asked to do. Everything else (two
//! overlaid layers, a clamped camera, brush painting) is set up the way a
//! real game would.

use autotile_core::Point;
use autotile_render::{
    AtlasError, AtlasRegion, BuiltinStrategy, DrawSink, LayerConfig, OrthoCamera, QuadSink,
    RenderStats, SourceRegion, TextureSize, TileLayer, Uniform,
};
use rand::{Rng, RngExt};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

pub const MAP_TILES: i32 = 64;
pub const TILE_SIZE: f32 = 16.0;
pub const UNIT_SCALE: f32 = 1.0 / TILE_SIZE;

pub const VIEWPORT_WIDTH: f32 = 40.0;
pub const VIEWPORT_HEIGHT: f32 = 22.5;
pub const START_ZOOM: f32 = 1.0 / 2.5;
pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 1.5;
pub const CAMERA_SPEED: f32 = 21.0;
pub const ZOOM_SPEED: f32 = 21.0;

/// Install a log subscriber honoring `RUST_LOG`, `info` by default.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();
}

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// A texture handle. Only its size matters to the layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Texture {
    pub id: u32,
    pub width: u32,
    pub height: u32,
}

impl TextureSize for Texture {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Shader {
    pub id: u32,
}

pub const DIRT: Texture = Texture {
    id: 1,
    width: 64,
    height: 64,
};
pub const DIRT_OVERLAY: Texture = Texture {
    id: 2,
    width: 128,
    height: 128,
};
pub const GRASS: Texture = Texture {
    id: 3,
    width: 64,
    height: 64,
};
pub const GRASS_OVERLAY: Texture = Texture {
    id: 4,
    width: 128,
    height: 128,
};
pub const OVERLAY_SHADER: Shader = Shader { id: 1 };

pub type Layer = TileLayer<Texture, Shader>;

// ---------------------------------------------------------------------------
// FrameCounter
// ---------------------------------------------------------------------------

/// A sink that tallies calls instead of drawing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameCounter {
    pub quads: usize,
    pub shader_binds: usize,
    pub texture_binds: usize,
    pub uniforms: usize,
    bound: Option<Shader>,
}

impl FrameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shader currently bound, if any.
    pub fn bound_shader(&self) -> Option<Shader> {
        self.bound
    }
}

impl QuadSink<Texture> for FrameCounter {
    fn draw_quad(&mut self, _: &Texture, _: &AtlasRegion, _: f32, _: f32, _: f32, _: f32) {
        self.quads += 1;
    }
}

impl DrawSink<Texture, Shader> for FrameCounter {
    fn bind_shader(&mut self, shader: &Shader) {
        self.shader_binds += 1;
        self.bound = Some(*shader);
    }

    fn unbind_shader(&mut self) {
        self.bound = None;
    }

    fn set_uniform(&mut self, _: &str, _: Uniform) {
        self.uniforms += 1;
    }

    fn bind_texture(&mut self, _: &Texture, _: u32) {
        self.texture_binds += 1;
    }
}

// ---------------------------------------------------------------------------
// Brush
// ---------------------------------------------------------------------------

/// Paints or erases a disc of cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Brush {
    pub radius: i32,
}

impl Brush {
    pub const fn new(radius: i32) -> Self {
        Self { radius }
    }

    /// Set every cell within `radius` of `center`. Cells off the grid are
    /// dropped by the layer.
    pub fn paint(&self, layer: &mut Layer, center: Point, state: bool) {
        let r = self.radius.max(0);
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    layer.set_tile_at(center.x + dx, center.y + dy, state);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// A filled dirt layer under an initially empty grass layer, both overlaid,
/// viewed through one camera.
pub struct Scene {
    pub dirt: Layer,
    pub grass: Layer,
    pub camera: OrthoCamera,
    target_zoom: f32,
}

impl Scene {
    pub fn new() -> Result<Self, AtlasError> {
        let config = LayerConfig {
            tiles_x: MAP_TILES,
            tiles_y: MAP_TILES,
            tile_width: TILE_SIZE,
            tile_height: TILE_SIZE,
            unit_scale: UNIT_SCALE,
            ..LayerConfig::default()
        };

        let mut dirt = Layer::new(LayerConfig {
            filled: true,
            ..config.clone()
        });
        dirt.set_tile_set(DIRT, SourceRegion::ORIGIN)?;
        dirt.set_overlay(DIRT_OVERLAY, OVERLAY_SHADER);

        let mut grass = Layer::new(config);
        grass.set_tile_set(GRASS, SourceRegion::ORIGIN)?;
        grass.set_overlay(GRASS_OVERLAY, OVERLAY_SHADER);

        let mut camera = OrthoCamera::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT);
        camera.zoom = START_ZOOM;
        let mut scene = Self {
            dirt,
            grass,
            camera,
            target_zoom: START_ZOOM,
        };
        scene.clamp_camera();
        log::info!(
            "scene ready: {}x{} tiles, {:.1}x{:.1} world units",
            MAP_TILES,
            MAP_TILES,
            scene.map_size().0,
            scene.map_size().1
        );
        Ok(scene)
    }

    /// Map extent in world units.
    pub fn map_size(&self) -> (f32, f32) {
        let l = &self.dirt;
        (
            l.tiles_x() as f32 * l.tile_width() * l.unit_scale(),
            l.tiles_y() as f32 * l.tile_height() * l.unit_scale(),
        )
    }

    /// Request a zoom change; the camera eases toward it in [`update`](Self::update).
    pub fn zoom_by(&mut self, amount: f32) {
        self.target_zoom = clamp(self.target_zoom + amount * 0.25, MIN_ZOOM, MAX_ZOOM);
    }

    pub fn target_zoom(&self) -> f32 {
        self.target_zoom
    }

    /// Advance the camera by `delta` seconds moving along `(dx, dy)`.
    pub fn update(&mut self, dx: f32, dy: f32, delta: f32) {
        if self.camera.zoom != self.target_zoom {
            let t = delta * ZOOM_SPEED;
            self.camera.zoom = if t >= 1.0 {
                self.target_zoom
            } else {
                self.camera.zoom + (self.target_zoom - self.camera.zoom) * t
            };
        }
        let len = (dx * dx + dy * dy).sqrt();
        let (vx, vy) = if len > 1.0 { (dx / len, dy / len) } else { (dx, dy) };
        self.camera
            .translate(vx * CAMERA_SPEED * delta, vy * CAMERA_SPEED * delta);
        self.clamp_camera();
    }

    /// Keep the camera's view inside the map.
    pub fn clamp_camera(&mut self) {
        let half_w = VIEWPORT_WIDTH / 2.0 * self.camera.zoom;
        let half_h = VIEWPORT_HEIGHT / 2.0 * self.camera.zoom;
        let (map_w, map_h) = self.map_size();
        self.camera.x = clamp(self.camera.x, half_w + 1.0, map_w - half_w);
        self.camera.y = clamp(self.camera.y, half_h + 1.0, map_h - half_h);
    }

    /// Paint grass around the occupancy point nearest world point `(wx, wy)`.
    /// Returns whether the point hit the map.
    pub fn paint(&mut self, brush: &Brush, wx: f32, wy: f32, state: bool) -> bool {
        match self.grass.point_at_world(wx, wy) {
            Some(cell) => {
                brush.paint(&mut self.grass, cell, state);
                true
            }
            None => false,
        }
    }

    /// Scatter `strokes` brush strokes over the grass layer.
    pub fn scatter<R: Rng>(&mut self, rng: &mut R, brush: &Brush, strokes: usize) {
        for _ in 0..strokes {
            let center = Point::new(rng.random_range(0..MAP_TILES), rng.random_range(0..MAP_TILES));
            brush.paint(&mut self.grass, center, rng.random_bool(0.8));
        }
    }

    pub fn set_strategy(&mut self, strategy: BuiltinStrategy) {
        self.dirt.set_strategy(strategy);
        self.grass.set_strategy(strategy);
    }

    /// Render dirt, then grass, from the camera's point of view.
    pub fn render<D: DrawSink<Texture, Shader>>(&mut self, sink: &mut D) -> [RenderStats; 2] {
        self.dirt.set_view_from_camera(&self.camera);
        self.grass.set_view_from_camera(&self.camera);
        [self.dirt.render(sink), self.grass.render(sink)]
    }
}

/// Clamp that prefers `lo` when the bounds cross.
fn clamp(v: f32, lo: f32, hi: f32) -> f32 {
    if v < lo {
        lo
    } else if v > hi {
        hi
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn scene_layers() {
        let scene = Scene::new().unwrap();
        assert_eq!(scene.dirt.grid().occupied_count(), 64 * 64);
        assert_eq!(scene.grass.grid().occupied_count(), 0);
        assert!(scene.dirt.has_overlay() && scene.grass.has_overlay());
        assert_eq!(scene.dirt.overlay_scale(), 1.0 / 128.0);
        assert_eq!(scene.map_size(), (64.0, 64.0));
    }

    #[test]
    fn camera_stays_on_map() {
        let mut scene = Scene::new().unwrap();
        for _ in 0..200 {
            scene.update(-1.0, -1.0, 0.1);
        }
        let half_w = VIEWPORT_WIDTH / 2.0 * scene.camera.zoom;
        assert_eq!(scene.camera.x, half_w + 1.0);
        for _ in 0..200 {
            scene.update(1.0, 1.0, 0.1);
        }
        let half_h = VIEWPORT_HEIGHT / 2.0 * scene.camera.zoom;
        assert_eq!(scene.camera.y, 64.0 - half_h);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut scene = Scene::new().unwrap();
        for _ in 0..20 {
            scene.zoom_by(1.0);
        }
        assert_eq!(scene.target_zoom(), MAX_ZOOM);
        scene.update(0.0, 0.0, 1.0);
        assert_eq!(scene.camera.zoom, MAX_ZOOM);
    }

    #[test]
    fn brush_paints_disc() {
        let mut scene = Scene::new().unwrap();
        assert!(scene.paint(&Brush::new(1), 10.0, 10.0, true));
        assert_eq!(scene.grass.grid().occupied_count(), 5);
        // centre point (9, 9) shows at world (10.5, 10.5)
        assert!(scene.grass.tile_at(9, 9));
        assert!(scene.grass.tile_at(8, 9) && scene.grass.tile_at(10, 9));
        assert!(!scene.grass.tile_at(10, 10));
        assert!(!scene.paint(&Brush::new(1), -10.0, 10.0, true));
    }

    #[test]
    fn grass_draws_less_than_dirt() {
        let mut scene = Scene::new().unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        scene.scatter(&mut rng, &Brush::new(2), 10);

        let mut counter = FrameCounter::new();
        let [dirt, grass] = scene.render(&mut counter);
        assert!(grass.quads_rendered <= dirt.quads_rendered);
        assert_eq!(counter.quads, dirt.quads_rendered + grass.quads_rendered);
        assert_eq!(counter.shader_binds, 2);
        assert_eq!(counter.texture_binds, 4);
        assert_eq!(counter.bound_shader(), None);
    }
}
