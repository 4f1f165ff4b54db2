//! The drawing sink a tile layer renders into.
//!
//! A tile layer never talks to a GPU API directly. It emits textured quads and
//! a few shader/texture binding calls through these traits, and the batched
//! quad renderer on the other side decides what they mean.
//!
//! - [`QuadSink`] is all a [`RenderStrategy`](crate::RenderStrategy) needs and
//!   is object safe.
//! - [`DrawSink`] adds the binding calls used for the overlay pass.
//!
//! [`RecordingSink`] implements both by logging every call as a
//! [`DrawCommand`], which is what tests and headless tools use.

use crate::atlas::AtlasRegion;

/// Value for a shader uniform.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Uniform {
    Int(i32),
    Float(f32),
}

/// Receives textured quads.
pub trait QuadSink<T> {
    /// Draw `region` of `texture` as an axis-aligned quad with its bottom-left
    /// corner at `(x, y)`.
    fn draw_quad(
        &mut self,
        texture: &T,
        region: &AtlasRegion,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    );
}

/// A [`QuadSink`] that can also bind shaders and textures.
///
/// `T` is the renderer's texture handle, `S` its shader handle. Handles are
/// borrowed for the duration of each call; the sink must not assume it owns
/// them.
pub trait DrawSink<T, S>: QuadSink<T> {
    /// Route subsequent quads through `shader`.
    fn bind_shader(&mut self, shader: &S);

    /// Go back to the renderer's default shader.
    fn unbind_shader(&mut self);

    /// Set a uniform on the currently bound shader.
    fn set_uniform(&mut self, name: &str, value: Uniform);

    /// Bind `texture` to texture unit `unit`.
    fn bind_texture(&mut self, texture: &T, unit: u32);
}

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

/// One call made on a [`RecordingSink`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand<T, S> {
    Quad {
        texture: T,
        region: AtlasRegion,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    BindShader(S),
    UnbindShader,
    SetUniform { name: String, value: Uniform },
    BindTexture { texture: T, unit: u32 },
}

/// A sink that records every call it receives, in order.
#[derive(Clone, Debug)]
pub struct RecordingSink<T, S> {
    commands: Vec<DrawCommand<T, S>>,
}

impl<T, S> RecordingSink<T, S> {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Every command recorded so far.
    pub fn commands(&self) -> &[DrawCommand<T, S>] {
        &self.commands
    }

    /// Take the recorded commands, leaving the sink empty.
    pub fn take(&mut self) -> Vec<DrawCommand<T, S>> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Only the quad commands.
    pub fn quads(&self) -> impl Iterator<Item = &DrawCommand<T, S>> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Quad { .. }))
    }

    /// Number of quads drawn.
    pub fn quad_count(&self) -> usize {
        self.quads().count()
    }
}

impl<T, S> Default for RecordingSink<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, S> QuadSink<T> for RecordingSink<T, S> {
    fn draw_quad(
        &mut self,
        texture: &T,
        region: &AtlasRegion,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) {
        self.commands.push(DrawCommand::Quad {
            texture: texture.clone(),
            region: *region,
            x,
            y,
            width,
            height,
        });
    }
}

impl<T: Clone, S: Clone> DrawSink<T, S> for RecordingSink<T, S> {
    fn bind_shader(&mut self, shader: &S) {
        self.commands.push(DrawCommand::BindShader(shader.clone()));
    }

    fn unbind_shader(&mut self) {
        self.commands.push(DrawCommand::UnbindShader);
    }

    fn set_uniform(&mut self, name: &str, value: Uniform) {
        self.commands.push(DrawCommand::SetUniform {
            name: name.to_owned(),
            value,
        });
    }

    fn bind_texture(&mut self, texture: &T, unit: u32) {
        self.commands.push(DrawCommand::BindTexture {
            texture: texture.clone(),
            unit,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> AtlasRegion {
        AtlasRegion {
            index: 3,
            u: 0.0,
            v: 0.0,
            u2: 0.25,
            v2: 0.25,
        }
    }

    #[test]
    fn records_in_order() {
        let mut sink: RecordingSink<u32, &str> = RecordingSink::new();
        sink.bind_shader(&"overlay");
        sink.set_uniform("u_scale", Uniform::Float(0.5));
        sink.bind_texture(&7, 1);
        sink.draw_quad(&7, &region(), 1.0, 2.0, 3.0, 4.0);
        sink.unbind_shader();

        assert_eq!(sink.commands().len(), 5);
        assert_eq!(sink.commands()[0], DrawCommand::BindShader("overlay"));
        assert_eq!(
            sink.commands()[1],
            DrawCommand::SetUniform {
                name: "u_scale".into(),
                value: Uniform::Float(0.5)
            }
        );
        assert_eq!(sink.commands()[4], DrawCommand::UnbindShader);
        assert_eq!(sink.quad_count(), 1);
    }

    #[test]
    fn take_empties_sink() {
        let mut sink: RecordingSink<u32, ()> = RecordingSink::default();
        sink.draw_quad(&1, &region(), 0.0, 0.0, 1.0, 1.0);
        let taken = sink.take();
        assert_eq!(taken.len(), 1);
        assert!(sink.commands().is_empty());
    }

    #[test]
    fn quad_sink_is_object_safe() {
        let mut sink: RecordingSink<u32, ()> = RecordingSink::new();
        let dyn_sink: &mut dyn QuadSink<u32> = &mut sink;
        dyn_sink.draw_quad(&2, &region(), 0.0, 0.0, 1.0, 1.0);
        assert_eq!(sink.quad_count(), 1);
    }
}
