//! Dataset handle: the exposed tileset-info / get-tiles interface
//!
//! Holds the coordinate system (absent when the chromosome sizes could not be
//! loaded), the lazily computed pyramid metadata and the range source.

use crate::core::{
    read_chrom_sizes, CoordinateSystem, GenomeResult, PyramidMetadata, TileError, TileRequest,
    TileResult, TilerError,
};
use crate::fetcher::assembler::{build_pool, CancelFlag, Tile, TileAssembler};
use crate::fetcher::config::DataConfig;
use crate::source::{IntervalFileSource, RangeQuery};
use log::{error, info, warn};
use rayon::ThreadPool;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

/// Tileset description returned to the visualization client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TilesetInfo {
    Ready {
        tile_size: u64,
        max_zoom: u32,
        max_width: u64,
        min_pos: Vec<u64>,
        max_pos: Vec<u64>,
    },
    Error {
        error: String,
    },
}

impl TilesetInfo {
    pub fn is_error(&self) -> bool {
        matches!(self, TilesetInfo::Error { .. })
    }
}

impl From<&PyramidMetadata> for TilesetInfo {
    fn from(meta: &PyramidMetadata) -> Self {
        TilesetInfo::Ready {
            tile_size: meta.tile_size,
            max_zoom: meta.max_zoom,
            max_width: meta.max_width,
            min_pos: vec![meta.min_pos],
            max_pos: vec![meta.max_pos],
        }
    }
}

impl From<&TileError> for TilesetInfo {
    fn from(err: &TileError) -> Self {
        TilesetInfo::Error {
            error: format!("Error loading tileset info: {}", err),
        }
    }
}

/// One tiled dataset: coordinate system + range source
pub struct TileDataset {
    coords: Option<Arc<CoordinateSystem>>,
    source: Arc<dyn RangeQuery>,
    tile_size: u64,
    /// Shared by every `get_tiles` call; `None` fetches sequentially
    pool: Option<ThreadPool>,
    pyramid: OnceLock<GenomeResult<PyramidMetadata>>,
}

impl TileDataset {
    pub fn new(coords: Option<CoordinateSystem>, source: Arc<dyn RangeQuery>, tile_size: u64) -> Self {
        Self {
            coords: coords.map(Arc::new),
            source,
            tile_size,
            pool: None,
            pyramid: OnceLock::new(),
        }
    }

    /// Worker threads used by [`TileDataset::get_tiles`]
    ///
    /// The pool is built here once and reused for every batch.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.pool = build_pool(threads);
        self
    }

    /// Number of threads batches are fetched on
    pub fn threads(&self) -> usize {
        self.pool.as_ref().map_or(1, ThreadPool::current_num_threads)
    }

    /// Open the files named by a data config
    ///
    /// A chromosome sizes file that cannot be read leaves the dataset without
    /// a coordinate system; every request then reports
    /// [`TileError::NoCoordinateSystem`]. A missing interval file is an error.
    pub fn open(config: &DataConfig) -> Result<Self, TilerError> {
        config.validate()?;

        let coords = match read_chrom_sizes(&config.chrom_sizes_path) {
            Ok(coords) => {
                info!(
                    "Loaded {} chromosomes ({} bp) from {:?}",
                    coords.len(),
                    coords.total_length(),
                    config.chrom_sizes_path
                );
                Some(coords)
            }
            Err(e) => {
                error!(
                    "Chromosome sizes unavailable at {:?}: {}",
                    config.chrom_sizes_path, e
                );
                None
            }
        };

        let source = IntervalFileSource::from_path(&config.data_path)?;
        Ok(Self::new(coords, Arc::new(source), config.tile_size).with_threads(config.threads))
    }

    pub fn coords(&self) -> Option<&CoordinateSystem> {
        self.coords.as_deref()
    }

    /// Pyramid metadata, computed on first use and cached
    pub fn pyramid(&self) -> TileResult<PyramidMetadata> {
        self.ready().map(|(_, meta)| meta)
    }

    fn ready(&self) -> TileResult<(&CoordinateSystem, PyramidMetadata)> {
        let coords = self.coords.as_deref().ok_or(TileError::NoCoordinateSystem)?;
        let meta = self
            .pyramid
            .get_or_init(|| PyramidMetadata::compute(coords.total_length(), self.tile_size))
            .clone()?;
        Ok((coords, meta))
    }

    /// Tileset description, or an `error` entry when it cannot be derived
    pub fn tileset_info(&self) -> TilesetInfo {
        match self.pyramid() {
            Ok(meta) => TilesetInfo::from(&meta),
            Err(e) => {
                error!("{}", e);
                TilesetInfo::from(&e)
            }
        }
    }

    /// Fetch a single tile
    pub fn tile(&self, request: TileRequest) -> TileResult<Tile> {
        self.tile_cancellable(request, &CancelFlag::default())
    }

    pub fn tile_cancellable(&self, request: TileRequest, cancel: &CancelFlag) -> TileResult<Tile> {
        let (coords, pyramid) = self.ready()?;
        TileAssembler::new(coords, &pyramid, self.source.as_ref()).get_tile_cancellable(request, cancel)
    }

    /// Fetch tiles by id (`"z.x"`)
    ///
    /// Ids whose zoom or position is not an integer are skipped with a warning.
    /// Each remaining id maps to its own tile or error.
    pub fn get_tiles<S: AsRef<str>>(&self, tile_ids: &[S]) -> BTreeMap<String, TileResult<Tile>> {
        let mut requests = Vec::with_capacity(tile_ids.len());
        for tile_id in tile_ids {
            let tile_id = tile_id.as_ref();
            match TileRequest::parse(tile_id) {
                Some(request) => {
                    if TileRequest::is_legacy_id(tile_id) {
                        warn!("Deprecated tile id '{}', use '{}'", tile_id, request);
                    }
                    requests.push((tile_id.to_string(), request));
                }
                None => warn!("Invalid tile zoom or position: '{}'", tile_id),
            }
        }

        match self.ready() {
            Ok((coords, pyramid)) => TileAssembler::new(coords, &pyramid, self.source.as_ref())
                .with_pool(self.pool.as_ref())
                .get_keyed_tiles(requests),
            // every id gets its own copy of the dataset-level error
            Err(_) => requests
                .into_iter()
                .map(|(id, request)| (id, self.tile(request)))
                .collect(),
        }
    }
}
