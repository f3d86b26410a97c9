//! Splitting absolute intervals at chromosome boundaries

use crate::core::genome::{ChromosomeEntry, CoordinateSystem};
use crate::core::pyramid::AbsoluteInterval;

/// A half-open, chromosome-local piece of an absolute interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromosomeSpan<'a> {
    pub chromosome: &'a ChromosomeEntry,
    pub local_start: u64,
    pub local_end: u64,
}

impl<'a> ChromosomeSpan<'a> {
    /// Chromosome name to pass to the range query
    #[inline]
    pub fn chrom(&self) -> &'a str {
        &self.chromosome.name
    }

    /// Absolute offset of the owning chromosome
    #[inline]
    pub fn chrom_offset(&self) -> u64 {
        self.chromosome.absolute_start
    }

    pub fn len(&self) -> u64 {
        self.local_end.saturating_sub(self.local_start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split an absolute interval into chromosome-local spans, in genome order
///
/// The scan starts at the chromosome containing `interval.start` (a position
/// on a boundary belongs to the following chromosome). Chromosomes that end
/// inside the interval contribute a span up to their full length; the
/// chromosome holding `interval.end` contributes the terminating span, whose
/// end is rounded up. Starts are rounded down. An interval starting at or
/// past the end of the genome yields no spans.
///
/// # Example
/// ```
/// use tabix_tiler::core::{split, AbsoluteInterval, CoordinateSystem};
///
/// let coords = CoordinateSystem::build([("chr1", 1000), ("chr2", 500)]).unwrap();
/// let spans = split(AbsoluteInterval::new(900.0, 1100.0), &coords);
///
/// assert_eq!(spans.len(), 2);
/// assert_eq!((spans[0].chrom(), spans[0].local_start, spans[0].local_end), ("chr1", 900, 1000));
/// assert_eq!((spans[1].chrom(), spans[1].local_start, spans[1].local_end), ("chr2", 0, 100));
/// ```
pub fn split(interval: AbsoluteInterval, coords: &CoordinateSystem) -> Vec<ChromosomeSpan<'_>> {
    let mut spans = Vec::new();

    let entries = coords.entries();
    let Some(first) = entries.iter().position(|entry| entry.contains(interval.start)) else {
        return spans;
    };

    let mut cursor = interval.start;
    for entry in &entries[first..] {
        if cursor >= interval.end {
            break;
        }
        if entry.length == 0 {
            continue;
        }

        let chrom_start = entry.absolute_start as f64;
        let local_start = (cursor - chrom_start).floor() as u64;

        if entry.absolute_end() as f64 <= interval.end {
            // interval runs past this chromosome: take the rest of it
            spans.push(ChromosomeSpan {
                chromosome: entry,
                local_start,
                local_end: entry.length,
            });
            cursor = entry.absolute_end() as f64;
        } else {
            spans.push(ChromosomeSpan {
                chromosome: entry,
                local_start,
                local_end: (interval.end - chrom_start).ceil() as u64,
            });
            break;
        }
    }

    spans
}
