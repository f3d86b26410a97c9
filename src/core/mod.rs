//! Core coordinate and tiling functionality
//!
//! This module contains the absolute coordinate system, the zoom pyramid,
//! the chromosome span splitter and the raw record mapper.

mod error;
pub mod genome;
pub mod io;
mod pyramid;
mod record;
mod span;

pub use error::{
    GenomeError, GenomeResult, RecordError, RecordResult, Result, TileError, TileResult,
    TilerError,
};
pub use genome::{parse_chrom_sizes, read_chrom_sizes, ChromosomeEntry, CoordinateSystem};
pub use io::{
    detect_compression, open_mapped, open_text, CompressionFormat, LineReader, MMAP_THRESHOLD,
    READ_BUFFER_SIZE,
};
pub use pyramid::{AbsoluteInterval, PyramidMetadata, TileRequest, DEFAULT_TILE_SIZE};
pub use record::{new_uid, FeatureRecord, MIN_FIELDS};
pub use span::{split, ChromosomeSpan};
