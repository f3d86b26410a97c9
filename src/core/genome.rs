//! Genome-wide absolute coordinate system
//!
//! Chromosomes are laid end to end in the order they are given (the order of
//! the chromosome sizes file). An absolute coordinate is a position on that
//! virtual concatenation; the order is never re-sorted.

use crate::core::error::{GenomeError, GenomeResult};
use crate::core::io::{open_text, LineReader};
use crate::core::TilerError;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

/// One chromosome and its place in the absolute coordinate system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromosomeEntry {
    /// 0-based position in input order
    pub index: usize,
    /// Chromosome name as it appears in the range-indexed file
    pub name: String,
    /// Chromosome length in bases
    pub length: u64,
    /// Sum of the lengths of all preceding chromosomes
    pub absolute_start: u64,
}

impl ChromosomeEntry {
    /// Absolute coordinate one past the last base of this chromosome
    #[inline]
    pub fn absolute_end(&self) -> u64 {
        self.absolute_start + self.length
    }

    /// Whether an absolute position falls inside `[absolute_start, absolute_end)`
    ///
    /// A position equal to the end boundary belongs to the next chromosome.
    #[inline]
    pub fn contains(&self, pos: f64) -> bool {
        self.absolute_start as f64 <= pos && pos < self.absolute_end() as f64
    }
}

/// Ordered chromosomes with their absolute offsets
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct CoordinateSystem {
    entries: Vec<ChromosomeEntry>,
    by_name: HashMap<String, usize>,
    total_length: u64,
}

impl CoordinateSystem {
    /// Build the coordinate system from `(name, length)` pairs in genome order
    ///
    /// # Example
    /// ```
    /// use tabix_tiler::core::CoordinateSystem;
    ///
    /// let coords = CoordinateSystem::build([("chr1", 1000), ("chr2", 500)]).unwrap();
    /// assert_eq!(coords.total_length(), 1500);
    /// assert_eq!(coords.absolute_start_of("chr2").unwrap(), 1000);
    /// ```
    pub fn build<I, S>(chromosomes: I) -> GenomeResult<Self>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut entries = Vec::new();
        let mut by_name = HashMap::new();
        let mut total_length: u64 = 0;

        for (index, (name, length)) in chromosomes.into_iter().enumerate() {
            let name = name.into();
            if name.is_empty() {
                return Err(GenomeError::InvalidInput(format!(
                    "empty chromosome name at position {}",
                    index
                )));
            }
            if by_name.insert(name.clone(), index).is_some() {
                return Err(GenomeError::InvalidInput(format!(
                    "duplicate chromosome '{}'",
                    name
                )));
            }

            let absolute_start = total_length;
            total_length = total_length.checked_add(length).ok_or_else(|| {
                GenomeError::InvalidInput("total genome length overflows u64".to_string())
            })?;

            entries.push(ChromosomeEntry {
                index,
                name,
                length,
                absolute_start,
            });
        }

        if entries.is_empty() {
            return Err(GenomeError::InvalidInput(
                "chromosome list is empty".to_string(),
            ));
        }

        Ok(Self {
            entries,
            by_name,
            total_length,
        })
    }

    /// Absolute offset of the first base of `name`
    pub fn absolute_start_of(&self, name: &str) -> GenomeResult<u64> {
        self.get(name)
            .map(|entry| entry.absolute_start)
            .ok_or_else(|| GenomeError::UnknownChromosome(name.to_string()))
    }

    /// Sum of all chromosome lengths
    #[inline]
    pub fn total_length(&self) -> u64 {
        self.total_length
    }

    pub fn get(&self, name: &str) -> Option<&ChromosomeEntry> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    /// Entries in genome order
    pub fn entries(&self) -> &[ChromosomeEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChromosomeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert a chromosome-local position to an absolute one
    pub fn to_absolute(&self, name: &str, local: u64) -> GenomeResult<u64> {
        Ok(self.absolute_start_of(name)? + local)
    }

    /// Convert an absolute position to `(chromosome, local position)`
    ///
    /// Returns `None` at or past the end of the genome.
    pub fn to_local(&self, absolute: u64) -> Option<(&ChromosomeEntry, u64)> {
        if absolute >= self.total_length {
            return None;
        }
        // first entry whose end lies strictly after the position
        let idx = self
            .entries
            .partition_point(|entry| entry.absolute_end() <= absolute);
        self.entries
            .get(idx)
            .map(|entry| (entry, absolute - entry.absolute_start))
    }
}

impl<'a> IntoIterator for &'a CoordinateSystem {
    type Item = &'a ChromosomeEntry;
    type IntoIter = std::slice::Iter<'a, ChromosomeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Parse a chromosome sizes table (`name<TAB>length`, extra columns ignored)
///
/// Blank lines and `#` comments are skipped. A negative or non-numeric length
/// is an [`GenomeError::InvalidInput`].
pub fn parse_chrom_sizes<R: BufRead>(reader: R) -> Result<Vec<(String, u64)>, TilerError> {
    let mut lines = LineReader::new(reader);
    let mut sizes = Vec::new();

    while let Some(line) = lines.next_line() {
        let (line_number, line) = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut fields = trimmed.split('\t');
        let name = fields.next().unwrap_or_default();
        let length = fields.next().ok_or_else(|| {
            GenomeError::InvalidInput(format!(
                "missing length for '{}' at line {}",
                name, line_number
            ))
        })?;
        let length: u64 = length.trim().parse().map_err(|_| {
            GenomeError::InvalidInput(format!(
                "invalid length '{}' for '{}' at line {}",
                length, name, line_number
            ))
        })?;

        sizes.push((name.to_string(), length));
    }

    Ok(sizes)
}

/// Read and build a coordinate system from a (possibly compressed) sizes file
pub fn read_chrom_sizes<P: AsRef<Path>>(path: P) -> Result<CoordinateSystem, TilerError> {
    let reader = open_text(path)?;
    let sizes = parse_chrom_sizes(reader)?;
    Ok(CoordinateSystem::build(sizes)?)
}
