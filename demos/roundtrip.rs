//! Save a painted layer to disk and load it back.
//!
//! Run with `cargo run --bin roundtrip [path] [seed]`. Without a path the
//! record goes to the system temp directory and is removed afterwards.

use std::error::Error;
use std::path::PathBuf;

use autotile_core::Point;
use autotile_demos::{Brush, GRASS, Layer, MAP_TILES, TILE_SIZE, UNIT_SCALE};
use autotile_render::{BuiltinStrategy, LayerConfig, SourceRegion};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

fn main() -> Result<(), Box<dyn Error>> {
    autotile_demos::init_logging();

    let mut args = std::env::args().skip(1);
    let (path, keep) = match args.next() {
        Some(p) => (PathBuf::from(p), true),
        None => (std::env::temp_dir().join("autotile-roundtrip.layer"), false),
    };
    let seed: u64 = args.next().map(|a| a.parse()).transpose()?.unwrap_or(7);

    let mut layer = Layer::new(LayerConfig {
        tiles_x: MAP_TILES,
        tiles_y: MAP_TILES,
        tile_width: TILE_SIZE,
        tile_height: TILE_SIZE,
        unit_scale: UNIT_SCALE,
        strategy: BuiltinStrategy::AllTilesViewQuads,
        ..LayerConfig::default()
    });
    layer.set_overlay_scale(1.0 / 128.0);

    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..200 {
        let center = Point::new(rng.random_range(0..MAP_TILES), rng.random_range(0..MAP_TILES));
        let brush = Brush::new(rng.random_range(0..=3));
        brush.paint(&mut layer, center, rng.random_bool(0.7));
    }

    layer.save(&path)?;
    let size = std::fs::metadata(&path)?.len();
    println!(
        "saved {} occupied tiles to {} ({size} bytes)",
        layer.grid().occupied_count(),
        path.display()
    );

    let mut loaded = Layer::load(&path)?;
    if !keep {
        std::fs::remove_file(&path)?;
    }

    if loaded.grid() != layer.grid() {
        return Err("loaded grid differs from the saved one".into());
    }
    if loaded.strategy().builtin() != layer.strategy().builtin()
        || loaded.overlay_scale() != layer.overlay_scale()
        || loaded.unit_scale() != layer.unit_scale()
    {
        return Err("loaded layer settings differ from the saved ones".into());
    }
    // Textures are not part of the record.
    loaded.set_tile_set(GRASS, SourceRegion::ORIGIN)?;

    println!(
        "loaded {}x{} layer, {} occupied, strategy {}",
        loaded.tiles_x(),
        loaded.tiles_y(),
        loaded.grid().occupied_count(),
        loaded.strategy().name().unwrap_or("custom")
    );
    Ok(())
}
