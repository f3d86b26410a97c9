//! Zoom pyramid over the absolute coordinate system
//!
//! Zoom level `z` divides `[0, max_width)` into `2^z` tiles of equal width.
//! `max_width` is a power of two, so tile widths halve exactly at every level;
//! they only become fractional once `2^z` exceeds `max_width`.

use crate::core::error::{GenomeError, GenomeResult};
use std::fmt;

/// Default number of bins a tile is rendered with
pub const DEFAULT_TILE_SIZE: u64 = 1024;

/// Legacy tile id prefix (`tabix.z.x`)
const LEGACY_TILE_PREFIX: &str = "tabix.";

/// Zoom pyramid parameters derived from the genome length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PyramidMetadata {
    pub tile_size: u64,
    pub max_zoom: u32,
    pub max_width: u64,
    pub min_pos: u64,
    pub max_pos: u64,
}

impl PyramidMetadata {
    /// Derive pyramid parameters for a genome of `total_length` bases
    ///
    /// `max_zoom` is the smallest `z >= 0` with `tile_size * 2^z >= total_length`;
    /// `max_width` is the smallest power of two `>= total_length`. The two are
    /// derived independently and tile widths use `max_width`.
    ///
    /// # Example
    /// ```
    /// use tabix_tiler::core::PyramidMetadata;
    ///
    /// let meta = PyramidMetadata::compute(1000, 1024).unwrap();
    /// assert_eq!(meta.max_zoom, 0);
    /// assert_eq!(meta.max_width, 1024);
    /// ```
    pub fn compute(total_length: u64, tile_size: u64) -> GenomeResult<Self> {
        if total_length == 0 {
            return Err(GenomeError::InvalidInput(
                "total genome length must be positive".to_string(),
            ));
        }
        if tile_size == 0 {
            return Err(GenomeError::InvalidInput(
                "tile size must be positive".to_string(),
            ));
        }

        let max_width = total_length.checked_next_power_of_two().ok_or_else(|| {
            GenomeError::InvalidInput(format!(
                "total genome length {} has no power-of-two width",
                total_length
            ))
        })?;

        let mut max_zoom = 0u32;
        let mut covered = tile_size as u128;
        while covered < total_length as u128 {
            covered <<= 1;
            max_zoom += 1;
        }

        Ok(Self {
            tile_size,
            max_zoom,
            max_width,
            min_pos: 0,
            max_pos: total_length,
        })
    }

    /// Width in bases of one tile at `zoom`
    #[inline]
    pub fn tile_width(&self, zoom: u32) -> f64 {
        self.max_width as f64 / 2f64.powf(zoom as f64)
    }

    /// Absolute interval covered by a tile
    ///
    /// No clamping: indices past the last tile yield intervals past the end of
    /// the genome, which split into zero spans.
    pub fn resolve(&self, request: TileRequest) -> AbsoluteInterval {
        let width = self.tile_width(request.zoom);
        let min_pos = self.min_pos as f64;
        AbsoluteInterval {
            start: min_pos + request.index as f64 * width,
            end: min_pos + (request.index as f64 + 1.0) * width,
        }
    }

    /// Number of tiles at `zoom`
    pub fn tiles_at(&self, zoom: u32) -> u128 {
        1u128.checked_shl(zoom).unwrap_or(u128::MAX)
    }
}

/// A `(zoom, index)` tile address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileRequest {
    pub zoom: u32,
    pub index: u64,
}

impl TileRequest {
    pub fn new(zoom: u32, index: u64) -> Self {
        Self { zoom, index }
    }

    /// Parse a `"z.x"` tile id
    ///
    /// The legacy `"tabix.z.x"` form is accepted too. Anything else, including
    /// non-integer parts, returns `None`.
    ///
    /// # Example
    /// ```
    /// use tabix_tiler::core::TileRequest;
    ///
    /// assert_eq!(TileRequest::parse("3.5"), Some(TileRequest::new(3, 5)));
    /// assert_eq!(TileRequest::parse("3.x"), None);
    /// ```
    pub fn parse(tile_id: &str) -> Option<Self> {
        let body = tile_id.strip_prefix(LEGACY_TILE_PREFIX).unwrap_or(tile_id);
        let (zoom, index) = body.split_once('.')?;
        Some(Self {
            zoom: zoom.parse().ok()?,
            index: index.parse().ok()?,
        })
    }

    /// Whether `tile_id` uses the legacy `tabix.` prefix
    pub fn is_legacy_id(tile_id: &str) -> bool {
        tile_id.starts_with(LEGACY_TILE_PREFIX)
    }

    /// Canonical `"z.x"` id
    pub fn tile_id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TileRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.zoom, self.index)
    }
}

/// Half-open `[start, end)` interval in absolute coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsoluteInterval {
    pub start: f64,
    pub end: f64,
}

impl AbsoluteInterval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}
