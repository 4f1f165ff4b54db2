//! Persisted tile-layer records.
//!
//! A record stores what is needed to rebuild a [`TileLayer`] without its
//! textures: grid and tile dimensions, scales, the strategy name and the
//! bit-packed occupancy. Variant indices are never stored; loading replays
//! every cell through the grid so indices come out as if painted.
//!
//! ## Wire format
//!
//! All integers and floats little-endian:
//! ```text
//! [tiles_x: u32] [tiles_y: u32]
//! [tile_width: f32] [tile_height: f32]
//! [unit_scale: f32] [overlay_scale: f32]
//! [name_len: u16] [strategy name: name_len bytes, UTF-8]
//! [tiles_len: u32] [packed occupancy: tiles_len bytes]
//! ```
//!
//! There is no magic number or version field.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use autotile_core::{AutoTileTable, BitPackError, pack, packed_len, unpack};
use thiserror::Error;

use crate::layer::TileLayer;
use crate::strategy::{BuiltinStrategy, StrategyError};

/// Errors reading or writing a [`LayerRecord`].
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Strategy(#[from] StrategyError),
    #[error(transparent)]
    BitPack(#[from] BitPackError),
    #[error("strategy name is not valid UTF-8")]
    BadName,
    #[error("grid dimension {0} is too large")]
    DimensionTooLarge(u32),
}

// ---------------------------------------------------------------------------
// LayerRecord
// ---------------------------------------------------------------------------

/// The persisted form of a [`TileLayer`].
#[derive(Clone, Debug, PartialEq)]
pub struct LayerRecord {
    pub tiles_x: u32,
    pub tiles_y: u32,
    pub tile_width: f32,
    pub tile_height: f32,
    pub unit_scale: f32,
    pub overlay_scale: f32,
    pub strategy: BuiltinStrategy,
    /// Bit-packed occupancy, see [`autotile_core::bitpack`].
    pub tiles: Vec<u8>,
}

impl LayerRecord {
    /// Snapshot `layer`. Fails for custom strategies.
    pub fn from_layer<T, S>(layer: &TileLayer<T, S>) -> Result<Self, RecordError> {
        let strategy = layer.strategy().require_builtin()?;
        Ok(Self {
            tiles_x: layer.tiles_x().max(0) as u32,
            tiles_y: layer.tiles_y().max(0) as u32,
            tile_width: layer.tile_width(),
            tile_height: layer.tile_height(),
            unit_scale: layer.unit_scale(),
            overlay_scale: layer.overlay_scale(),
            strategy,
            tiles: pack(layer.grid()),
        })
    }

    /// Rebuild a layer using `table`. The layer has no tile set or overlay
    /// installed.
    pub fn into_layer<T, S>(self, table: AutoTileTable) -> Result<TileLayer<T, S>, RecordError> {
        let tiles_x = grid_dim(self.tiles_x)?;
        let tiles_y = grid_dim(self.tiles_y)?;
        let grid = unpack(&self.tiles, tiles_x, tiles_y, table)?;
        let mut layer =
            TileLayer::from_grid(grid, self.tile_width, self.tile_height, self.unit_scale);
        layer.set_overlay_scale(self.overlay_scale);
        layer.set_strategy(self.strategy);
        Ok(layer)
    }
}

fn grid_dim(v: u32) -> Result<i32, RecordError> {
    i32::try_from(v).map_err(|_| RecordError::DimensionTooLarge(v))
}

// ---------------------------------------------------------------------------
// RecordEncoder
// ---------------------------------------------------------------------------

/// Writes [`LayerRecord`]s to a byte-oriented writer.
pub struct RecordEncoder<W: Write> {
    writer: W,
}

impl<W: Write> RecordEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn encode(&mut self, record: &LayerRecord) -> Result<(), RecordError> {
        let name = record.strategy.name().as_bytes();
        let w = &mut self.writer;
        w.write_all(&record.tiles_x.to_le_bytes())?;
        w.write_all(&record.tiles_y.to_le_bytes())?;
        w.write_all(&record.tile_width.to_le_bytes())?;
        w.write_all(&record.tile_height.to_le_bytes())?;
        w.write_all(&record.unit_scale.to_le_bytes())?;
        w.write_all(&record.overlay_scale.to_le_bytes())?;
        // Built-in names are short ASCII constants.
        w.write_all(&(name.len() as u16).to_le_bytes())?;
        w.write_all(name)?;
        w.write_all(&(record.tiles.len() as u32).to_le_bytes())?;
        w.write_all(&record.tiles)?;
        log::debug!(
            "wrote {}x{} layer record ({}, {} packed bytes)",
            record.tiles_x,
            record.tiles_y,
            record.strategy,
            record.tiles.len()
        );
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

// ---------------------------------------------------------------------------
// RecordDecoder
// ---------------------------------------------------------------------------

/// Reads [`LayerRecord`]s from a byte-oriented reader.
pub struct RecordDecoder<R: Read> {
    reader: R,
}

impl<R: Read> RecordDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read one record. Truncated input is an [`io::ErrorKind::UnexpectedEof`]
    /// error.
    pub fn decode(&mut self) -> Result<LayerRecord, RecordError> {
        let tiles_x = u32::from_le_bytes(self.read_array()?);
        let tiles_y = u32::from_le_bytes(self.read_array()?);
        let tile_width = f32::from_le_bytes(self.read_array()?);
        let tile_height = f32::from_le_bytes(self.read_array()?);
        let unit_scale = f32::from_le_bytes(self.read_array()?);
        let overlay_scale = f32::from_le_bytes(self.read_array()?);

        let (gx, gy) = (grid_dim(tiles_x)?, grid_dim(tiles_y)?);

        let name_len = u16::from_le_bytes(self.read_array()?);
        let mut name = vec![0u8; usize::from(name_len)];
        self.reader.read_exact(&mut name)?;
        let name = String::from_utf8(name).map_err(|_| RecordError::BadName)?;
        let strategy: BuiltinStrategy = name.parse().inspect_err(|_| {
            log::warn!("rejecting layer record with unknown strategy {name:?}");
        })?;

        let tiles_len = u32::from_le_bytes(self.read_array()?) as usize;
        let expected = packed_len(gx, gy);
        if tiles_len != expected {
            log::warn!("rejecting layer record: {tiles_len} packed bytes for {tiles_x}x{tiles_y}");
            return Err(BitPackError::LengthMismatch {
                tiles_x: gx,
                tiles_y: gy,
                expected,
                actual: tiles_len,
            }
            .into());
        }
        // The length is as untrusted as the dimensions it matched, so the
        // buffer only grows with bytes actually read.
        let mut tiles = Vec::new();
        (&mut self.reader).take(tiles_len as u64).read_to_end(&mut tiles)?;
        if tiles.len() != tiles_len {
            log::warn!("layer record ends after {} of {tiles_len} packed bytes", tiles.len());
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }

        log::debug!("read {tiles_x}x{tiles_y} layer record ({strategy})");
        Ok(LayerRecord {
            tiles_x,
            tiles_y,
            tile_width,
            tile_height,
            unit_scale,
            overlay_scale,
            strategy,
            tiles,
        })
    }

    fn read_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.reader.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

// ---------------------------------------------------------------------------
// TileLayer persistence
// ---------------------------------------------------------------------------

impl<T, S> TileLayer<T, S> {
    /// Write this layer as a record.
    pub fn write<W: Write>(&self, writer: W) -> Result<(), RecordError> {
        let record = LayerRecord::from_layer(self)?;
        let mut enc = RecordEncoder::new(writer);
        enc.encode(&record)?;
        enc.flush()?;
        Ok(())
    }

    /// Read a layer written by [`write`](Self::write), using the default
    /// table.
    pub fn read<R: Read>(reader: R) -> Result<Self, RecordError> {
        Self::read_with_table(reader, AutoTileTable::default())
    }

    /// Read a layer, deriving its indices with `table`.
    pub fn read_with_table<R: Read>(reader: R, table: AutoTileTable) -> Result<Self, RecordError> {
        RecordDecoder::new(reader).decode()?.into_layer(table)
    }

    /// Write this layer to the file at `path`, replacing it.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RecordError> {
        let file = File::create(path)?;
        self.write(BufWriter::new(file))
    }

    /// Read a layer from the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }
}
