//! The world-space view rectangle used for culling.

/// A world-space rectangle, `(x, y)` being its bottom-left corner.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Bounding rectangle of what `camera` sees.
    ///
    /// A rotated camera is covered by swapping viewport extents in proportion
    /// to its up vector, so a quarter turn yields the transposed rectangle.
    pub fn from_camera(camera: &OrthoCamera) -> Self {
        let vw = camera.viewport_width * camera.zoom;
        let vh = camera.viewport_height * camera.zoom;
        let (ux, uy) = (camera.up_x.abs(), camera.up_y.abs());
        let width = vw * uy + vh * ux;
        let height = vh * uy + vw * ux;
        Self {
            x: camera.x - width / 2.0,
            y: camera.y - height / 2.0,
            width,
            height,
        }
    }
}

impl From<&OrthoCamera> for ViewRect {
    fn from(camera: &OrthoCamera) -> Self {
        Self::from_camera(camera)
    }
}

/// The parts of an orthographic camera that determine its view.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrthoCamera {
    /// Center of the view in world units.
    pub x: f32,
    pub y: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub zoom: f32,
    /// Unit up vector. `(0, 1)` is unrotated.
    pub up_x: f32,
    pub up_y: f32,
}

impl OrthoCamera {
    /// An unrotated camera at zoom 1 centered on the origin.
    pub const fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            viewport_width,
            viewport_height,
            zoom: 1.0,
            up_x: 0.0,
            up_y: 1.0,
        }
    }

    pub fn look_at(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }
}

impl Default for OrthoCamera {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}
