//! TabixTiler - zoom-pyramid tiles over genomic interval files
//!
//! Serves coordinate-sorted interval records (gene/transcript annotations)
//! as tiles of a binary zoom pyramid laid over the whole genome.
//!
//! # Features
//!
//! - Absolute genome coordinates from a chromosome sizes table
//! - Exact tile-to-chromosome span splitting at chromosome boundaries
//! - Pluggable range-query source (in-memory interval index included)
//! - Parallel batch tile fetching with rayon
//!
//! # Example
//!
//! ```ignore
//! use tabix_tiler::{DataConfig, TileDataset};
//!
//! let config = DataConfig::new("genes.bed.gz", "hg38.chrom.sizes");
//! let dataset = TileDataset::open(&config)?;
//!
//! let info = dataset.tileset_info();
//! let tiles = dataset.get_tiles(&["0.0", "1.0", "1.1"]);
//! ```

pub mod core;
pub mod fetcher;
pub mod source;

// Re-export commonly used types
pub use core::{
    split, AbsoluteInterval, ChromosomeEntry, ChromosomeSpan, CoordinateSystem, FeatureRecord,
    GenomeError, PyramidMetadata, RecordError, TileError, TileRequest, TilerError,
};
pub use fetcher::{CancelFlag, DataConfig, Tile, TileAssembler, TileDataset, TilesetInfo};
pub use source::{IntervalFileSource, LineStream, RangeQuery, RangeQueryError};
