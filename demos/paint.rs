//! Headless painting session.
//!
//! Pans a camera across a 64×64 map while a seeded random brush paints and
//! erases grass, then prints what each render strategy would have drawn for
//! the same frames.
//!
//! Run with `cargo run --bin paint [frames] [seed]`.

use std::error::Error;

use autotile_demos::{Brush, FrameCounter, Scene};
use autotile_render::BuiltinStrategy;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

const FRAME_DELTA: f32 = 1.0 / 60.0;
const REPORT_EVERY: usize = 60;

fn main() -> Result<(), Box<dyn Error>> {
    autotile_demos::init_logging();

    let mut args = std::env::args().skip(1);
    let frames: usize = args.next().map(|a| a.parse()).transpose()?.unwrap_or(600);
    let seed: u64 = args.next().map(|a| a.parse()).transpose()?.unwrap_or(42);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut scene = Scene::new()?;
    let brush = Brush::new(1);

    // Start with a few patches so there are edges from the first frame.
    scene.scatter(&mut rng, &Brush::new(3), 12);

    let (mut dx, mut dy) = (1.0f32, 0.5f32);
    let mut erasing = false;
    for frame in 1..=frames {
        // Change heading and brush mode now and then.
        if rng.random_bool(0.02) {
            dx = rng.random_range(-1.0..=1.0);
            dy = rng.random_range(-1.0..=1.0);
        }
        if rng.random_bool(0.05) {
            erasing = !erasing;
        }
        if rng.random_bool(0.01) {
            scene.zoom_by(rng.random_range(-1.0..=1.0));
        }
        scene.update(dx, dy, FRAME_DELTA);

        let (wx, wy) = (
            scene.camera.x + rng.random_range(-4.0..=4.0),
            scene.camera.y + rng.random_range(-3.0..=3.0),
        );
        scene.paint(&brush, wx, wy, !erasing);

        if frame % REPORT_EVERY == 0 {
            report(frame, &mut scene);
        }
    }

    log::info!(
        "painted {} grass tiles over {} frames",
        scene.grass.grid().occupied_count(),
        frames
    );
    Ok(())
}

fn report(frame: usize, scene: &mut Scene) {
    println!(
        "frame {frame:>5}  camera ({:6.2}, {:6.2}) zoom {:.2}  grass {:>4}",
        scene.camera.x,
        scene.camera.y,
        scene.camera.zoom,
        scene.grass.grid().occupied_count()
    );
    for strategy in BuiltinStrategy::ALL {
        scene.set_strategy(strategy);
        let mut counter = FrameCounter::new();
        let [dirt, grass] = scene.render(&mut counter);
        println!(
            "  {:<22} dirt {:>5} tiles {:>5} quads | grass {:>5} tiles {:>5} quads",
            strategy.name(),
            dirt.tiles_rendered,
            dirt.quads_rendered,
            grass.tiles_rendered,
            grass.quads_rendered
        );
    }
    scene.set_strategy(BuiltinStrategy::default());
}
