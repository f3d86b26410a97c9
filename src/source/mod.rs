//! Range-query collaborators
//!
//! The tiling engine only needs one operation from the indexed file: the raw
//! lines overlapping a chromosome-local half-open range, in file order.

mod interval_file;

pub use interval_file::{IntervalFileSource, LoadStats, RawLine, RecordInterval};

use thiserror::Error;

/// Errors raised by a range-query collaborator
#[derive(Debug, Error)]
pub enum RangeQueryError {
    /// Underlying I/O failure (file read, network fetch)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Index lookup or decoding failure
    #[error("{0}")]
    Query(String),
}

/// Lazy stream of raw lines for one range query
pub type LineStream<'a> = Box<dyn Iterator<Item = Result<String, RangeQueryError>> + Send + 'a>;

/// "Lines overlapping a chromosome-local range" over an indexed file
///
/// Implementations must return an empty stream, not an error, for ranges or
/// chromosomes without records. Dropping the stream abandons the query.
pub trait RangeQuery: Send + Sync {
    fn query(&self, chrom: &str, start: u64, end: u64) -> Result<LineStream<'_>, RangeQueryError>;
}

impl<T: RangeQuery + ?Sized> RangeQuery for &T {
    fn query(&self, chrom: &str, start: u64, end: u64) -> Result<LineStream<'_>, RangeQueryError> {
        (**self).query(chrom, start, end)
    }
}

impl<T: RangeQuery + ?Sized> RangeQuery for std::sync::Arc<T> {
    fn query(&self, chrom: &str, start: u64, end: u64) -> Result<LineStream<'_>, RangeQueryError> {
        (**self).query(chrom, start, end)
    }
}
