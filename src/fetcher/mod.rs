//! Tile fetching
//!
//! Assembles tiles from the core engine and a range source, and exposes the
//! dataset-level tileset-info / get-tiles interface.

mod assembler;
mod config;
mod dataset;

pub use assembler::{build_pool, CancelFlag, Tile, TileAssembler};
pub use config::DataConfig;
pub use dataset::{TileDataset, TilesetInfo};
