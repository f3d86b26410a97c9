//! Tile assembly
//!
//! A tile is assembled by resolving its absolute interval, splitting it into
//! chromosome spans and querying the range source span by span. Spans are
//! queried strictly in genome order so records come out sorted by position;
//! only whole tiles are fetched in parallel.

use crate::core::{
    split, CoordinateSystem, FeatureRecord, PyramidMetadata, TileError, TileRequest, TileResult,
};
use crate::source::{RangeQuery, RangeQueryError};
use log::{debug, warn};
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Records for one `(zoom, index)` tile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tile {
    /// Canonical `"z.x"` id
    #[serde(rename = "tileId")]
    pub id: String,
    #[serde(rename = "zoomLevel")]
    pub zoom: u32,
    #[serde(rename = "tilePos")]
    pub tile_pos: Vec<u64>,
    /// Records in span order, then in source order within a span
    #[serde(rename = "tileData")]
    pub records: Vec<FeatureRecord>,
    /// Lines dropped because they did not match the record schema
    #[serde(skip)]
    pub malformed: usize,
}

impl Tile {
    fn empty(request: TileRequest) -> Self {
        Self {
            id: request.tile_id(),
            zoom: request.zoom,
            tile_pos: vec![request.index],
            records: Vec::new(),
            malformed: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Shared flag a caller sets to abandon in-flight tile fetches
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Thread pool for batched tile fetches, or `None` when `threads <= 1`
///
/// A pool that fails to build falls back to sequential fetching.
pub fn build_pool(threads: usize) -> Option<ThreadPool> {
    if threads <= 1 {
        return None;
    }
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => Some(pool),
        Err(e) => {
            warn!("Failed to create thread pool, fetching sequentially: {}", e);
            None
        }
    }
}

/// Builds tiles from a coordinate system, its pyramid and a range source
pub struct TileAssembler<'a, Q: RangeQuery + ?Sized> {
    coords: &'a CoordinateSystem,
    pyramid: &'a PyramidMetadata,
    source: &'a Q,
    pool: Option<&'a ThreadPool>,
}

impl<'a, Q: RangeQuery + ?Sized> TileAssembler<'a, Q> {
    pub fn new(coords: &'a CoordinateSystem, pyramid: &'a PyramidMetadata, source: &'a Q) -> Self {
        Self {
            coords,
            pyramid,
            source,
            pool: None,
        }
    }

    /// Fetch batches in parallel on `pool`
    pub fn with_pool(mut self, pool: Option<&'a ThreadPool>) -> Self {
        self.pool = pool;
        self
    }

    /// Fetch one tile
    ///
    /// Malformed lines are dropped and counted in [`Tile::malformed`]; a failing
    /// range query fails the whole tile.
    pub fn get_tile(&self, request: TileRequest) -> TileResult<Tile> {
        self.get_tile_cancellable(request, &CancelFlag::default())
    }

    /// Fetch one tile, giving up as soon as `cancel` is set
    ///
    /// The flag is checked before every span and every line; the pending line
    /// stream is dropped on cancellation.
    pub fn get_tile_cancellable(&self, request: TileRequest, cancel: &CancelFlag) -> TileResult<Tile> {
        let interval = self.pyramid.resolve(request);
        let spans = split(interval, self.coords);
        debug!(
            "tile {}: [{}, {}) -> {} span(s)",
            request, interval.start, interval.end, spans.len()
        );

        let mut tile = Tile::empty(request);
        for span in spans {
            if cancel.is_cancelled() {
                return Err(TileError::Cancelled);
            }

            let range_error = |source: RangeQueryError| TileError::RangeQuery {
                chrom: span.chrom().to_string(),
                start: span.local_start,
                end: span.local_end,
                source,
            };

            let lines = self
                .source
                .query(span.chrom(), span.local_start, span.local_end)
                .map_err(range_error)?;

            for line in lines {
                if cancel.is_cancelled() {
                    return Err(TileError::Cancelled);
                }
                let line = line.map_err(range_error)?;
                match FeatureRecord::from_line(&line, span.chrom_offset()) {
                    Ok(record) => tile.records.push(record),
                    Err(e) => {
                        warn!("Dropping malformed record in tile {}: {}", tile.id, e);
                        tile.malformed += 1;
                    }
                }
            }
        }

        Ok(tile)
    }

    /// Fetch a batch of tiles keyed by their `"z.x"` id
    ///
    /// Every tile succeeds or fails on its own. With a pool attached tiles are
    /// fetched in parallel.
    pub fn get_many_tiles(&self, requests: &[TileRequest]) -> BTreeMap<String, TileResult<Tile>> {
        let keyed = requests.iter().map(|r| (r.tile_id(), *r)).collect();
        self.get_keyed_tiles(keyed)
    }

    /// Fetch a batch of tiles keyed by caller-supplied ids
    pub fn get_keyed_tiles(&self, requests: Vec<(String, TileRequest)>) -> BTreeMap<String, TileResult<Tile>> {
        if let Some(pool) = self.pool.filter(|_| requests.len() > 1) {
            return pool.install(|| {
                requests
                    .into_par_iter()
                    .map(|(id, request)| (id, self.get_tile(request)))
                    .collect()
            });
        }

        requests
            .into_iter()
            .map(|(id, request)| (id, self.get_tile(request)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{IntervalFileSource, LineStream};

    const LINES: &[u8] = b"\
chr1\t100\t200\tA\t1\t+\t.\tGA
chr1\t950\t1000\tB\t2\t+\t.\tGB
chr2\t10\t90\tC\t3\t-\t.\tGC
chr2\t50\t60\tshort
chr2\t400\t450\tD\t4\t+\t.\tGD
";

    fn genome() -> (CoordinateSystem, PyramidMetadata) {
        let coords = CoordinateSystem::build([("chr1", 1000), ("chr2", 500)]).unwrap();
        let pyramid = PyramidMetadata::compute(coords.total_length(), 1024).unwrap();
        (coords, pyramid)
    }

    /// Serves fixed lines for chr1 and fails every chr2 query
    struct FailingSource;

    impl RangeQuery for FailingSource {
        fn query(&self, chrom: &str, start: u64, end: u64) -> Result<LineStream<'_>, RangeQueryError> {
            if chrom == "chr2" {
                return Err(RangeQueryError::Query("index block unavailable".to_string()));
            }
            let lines = ["chr1\t100\t200\tA\t1\t+\t.\tGA", "chr1\t950\t1000\tB\t2\t+\t.\tGB"];
            Ok(Box::new(
                lines
                    .into_iter()
                    .filter(move |line| {
                        let cols: Vec<u64> = line
                            .split('\t')
                            .skip(1)
                            .take(2)
                            .filter_map(|c| c.parse().ok())
                            .collect();
                        cols[0] < end && cols[1] > start
                    })
                    .map(|line| Ok::<_, RangeQueryError>(line.to_string())),
            ))
        }
    }

    /// Returns the same raw lines for every query
    struct FixedSource(Vec<&'static str>);

    impl RangeQuery for FixedSource {
        fn query(&self, _chrom: &str, _start: u64, _end: u64) -> Result<LineStream<'_>, RangeQueryError> {
            Ok(Box::new(
                self.0
                    .iter()
                    .map(|line| Ok::<_, RangeQueryError>(line.to_string())),
            ))
        }
    }

    #[test]
    fn test_root_tile_collects_everything_in_order() {
        let (coords, pyramid) = genome();
        let source = IntervalFileSource::from_reader(LINES).unwrap();
        let assembler = TileAssembler::new(&coords, &pyramid, &source);

        let tile = assembler.get_tile(TileRequest::new(0, 0)).unwrap();
        assert_eq!(tile.id, "0.0");
        assert_eq!(tile.tile_pos, vec![0]);

        let starts: Vec<u64> = tile.records.iter().map(|r| r.start_abs).collect();
        assert_eq!(starts, vec![100, 950, 1010, 1400]);
        assert_eq!(tile.malformed, 1);
    }

    #[test]
    fn test_tile_across_chromosome_boundary() {
        let (coords, pyramid) = genome();
        let source = IntervalFileSource::from_reader(LINES).unwrap();
        let assembler = TileAssembler::new(&coords, &pyramid, &source);

        // max_width 2048, zoom 2 -> width 512, tile 1 = [512, 1024)
        let tile = assembler.get_tile(TileRequest::new(2, 1)).unwrap();
        let ids: Vec<&str> = tile.records.iter().map(|r| r.transcript_id.as_str()).collect();
        assert_eq!(ids, vec!["GB_chr1_950_1000", "GC_chr2_10_90"]);
        assert_eq!(tile.records[1].chrom_offset, 1000);
    }

    #[test]
    fn test_out_of_range_tile_is_empty() {
        let (coords, pyramid) = genome();
        let source = IntervalFileSource::from_reader(LINES).unwrap();
        let assembler = TileAssembler::new(&coords, &pyramid, &source);

        let tile = assembler.get_tile(TileRequest::new(1, 7)).unwrap();
        assert!(tile.is_empty());
    }

    #[test]
    fn test_range_query_failure_is_reported() {
        let (coords, pyramid) = genome();
        let assembler = TileAssembler::new(&coords, &pyramid, &FailingSource);

        let result = assembler.get_tile(TileRequest::new(0, 0));
        assert!(matches!(
            result,
            Err(TileError::RangeQuery { ref chrom, .. }) if chrom == "chr2"
        ));
    }

    #[test]
    fn test_batch_isolates_failures() {
        let (coords, pyramid) = genome();
        let assembler = TileAssembler::new(&coords, &pyramid, &FailingSource);

        let pool = build_pool(2);
        assert!(pool.is_some());
        let assembler = assembler.with_pool(pool.as_ref());

        let requests = [TileRequest::new(1, 0), TileRequest::new(1, 1), TileRequest::new(2, 0)];
        let tiles = assembler.get_many_tiles(&requests);

        assert_eq!(tiles.len(), 3);
        // [0, 1024) crosses into chr2
        assert!(tiles["1.0"].is_err());
        // [1024, 2048) lies on chr2 only
        assert!(tiles["1.1"].is_err());
        // [0, 512) lies on chr1 only
        let chr1 = tiles["2.0"].as_ref().unwrap();
        assert_eq!(chr1.len(), 1);
        assert_eq!(chr1.records[0].transcript_id, "GA_chr1_100_200");
    }

    #[test]
    fn test_build_pool_single_thread_is_sequential() {
        assert!(build_pool(0).is_none());
        assert!(build_pool(1).is_none());
    }

    #[test]
    fn test_overflowing_record_is_dropped() {
        let (coords, pyramid) = genome();
        let source = FixedSource(vec![
            "chr2\t18446744073709551615\t18446744073709551615\tn\t1\t+\t.\tG",
            "chr2\t10\t90\tC\t3\t-\t.\tGC",
        ]);
        let assembler = TileAssembler::new(&coords, &pyramid, &source);

        // [1024, 2048) lies on chr2, offset 1000
        let tile = assembler.get_tile(TileRequest::new(1, 1)).unwrap();
        assert_eq!(tile.malformed, 1);
        assert_eq!(tile.len(), 1);
        assert_eq!(tile.records[0].start_abs, 1010);
    }

    #[test]
    fn test_cancelled_fetch() {
        let (coords, pyramid) = genome();
        let source = IntervalFileSource::from_reader(LINES).unwrap();
        let assembler = TileAssembler::new(&coords, &pyramid, &source);

        let cancel = CancelFlag::new();
        cancel.cancel();
        let result = assembler.get_tile_cancellable(TileRequest::new(0, 0), &cancel);
        assert!(matches!(result, Err(TileError::Cancelled)));
    }

    #[test]
    fn test_tile_serializes_consumer_keys() {
        let (coords, pyramid) = genome();
        let source = IntervalFileSource::from_reader(LINES).unwrap();
        let assembler = TileAssembler::new(&coords, &pyramid, &source);

        let tile = assembler.get_tile(TileRequest::new(2, 0)).unwrap();
        let json = serde_json::to_value(&tile).unwrap();
        assert_eq!(json["tileId"], "2.0");
        assert_eq!(json["zoomLevel"], 2);
        assert_eq!(json["tileData"].as_array().unwrap().len(), 1);
        assert!(json.get("malformed").is_none());
    }
}
