//! Error types for TabixTiler
//!
//! Defines all error types used throughout the library.

use crate::source::RangeQueryError;
use thiserror::Error;

/// Main error type for TabixTiler operations
#[derive(Debug, Error)]
pub enum TilerError {
    /// Coordinate system / pyramid errors
    #[error("Genome error: {0}")]
    Genome(#[from] GenomeError),

    /// Raw record errors
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    /// Tile assembly errors
    #[error("Tile error: {0}")]
    Tile(#[from] TileError),

    /// Range source errors
    #[error("Range query error: {0}")]
    RangeQuery(#[from] RangeQueryError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while building the coordinate system or pyramid metadata
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenomeError {
    /// Bad chromosome-length data, non-positive total length or tile size
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Lookup of a chromosome name that is not part of the genome
    #[error("Unknown chromosome: {0}")]
    UnknownChromosome(String),
}

/// Errors raised when a raw line does not match the record schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Fewer fields than the schema requires
    #[error("Expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    /// Start or end column is not a non-negative integer
    #[error("Invalid {field} coordinate '{value}'")]
    InvalidCoordinate { field: &'static str, value: String },
}

/// Errors reported for a single tile
#[derive(Debug, Error)]
pub enum TileError {
    /// The chromosome sizes could not be loaded for this dataset
    #[error("No coordinate system available (chromosome sizes failed to load)")]
    NoCoordinateSystem,

    /// Pyramid metadata could not be derived
    #[error("{0}")]
    Genome(#[from] GenomeError),

    /// The range-query collaborator failed
    #[error("Range query failed for {chrom}:{start}-{end}: {source}")]
    RangeQuery {
        chrom: String,
        start: u64,
        end: u64,
        #[source]
        source: RangeQueryError,
    },

    /// The caller abandoned the fetch
    #[error("Tile fetch cancelled")]
    Cancelled,
}

/// Result type alias for TabixTiler operations
pub type Result<T> = std::result::Result<T, TilerError>;

/// Result type alias for genome operations
pub type GenomeResult<T> = std::result::Result<T, GenomeError>;

/// Result type alias for record mapping
pub type RecordResult<T> = std::result::Result<T, RecordError>;

/// Result type alias for tile assembly
pub type TileResult<T> = std::result::Result<T, TileError>;
