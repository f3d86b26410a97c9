//! In-memory interval index over a tab-delimited interval file
//!
//! Loads a BED-like file (`chrom<TAB>start<TAB>end<TAB>...`, optionally
//! gzip/BGZF/bzip2 compressed) into one rust-lapper index per chromosome.
//! Queries return the raw lines overlapping the requested range ordered by
//! start, ties kept in file order, the way a tabix lookup does.

use crate::core::io::{open_text, LineReader};
use crate::source::{LineStream, RangeQuery, RangeQueryError};
use log::{debug, info, warn};
use memchr::memchr;
use rust_lapper::{Interval, Lapper};
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

/// One raw line and its position among the file's indexed records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub order: usize,
    pub text: String,
}

/// Interval holding one raw line
pub type RecordInterval = Interval<u64, RawLine>;

/// Counters collected while loading an interval file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub total: usize,
    pub indexed: usize,
    pub headers: usize,
    pub invalid: usize,
}

/// Range source backed by per-chromosome interval trees
pub struct IntervalFileSource {
    /// Chromosome -> interval tree
    maps: HashMap<String, Lapper<u64, RawLine>>,
    /// Normalized chromosome name mapping (lowercase, no "chr" -> original)
    chrom_aliases: HashMap<String, String>,
    stats: LoadStats,
}

impl IntervalFileSource {
    /// Load an interval file from disk
    ///
    /// Compression is detected from the extension or magic bytes.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RangeQueryError> {
        let path = path.as_ref();
        info!("Loading interval file: {:?}", path);
        let reader = open_text(path)?;
        let source = Self::from_reader(reader)?;
        info!(
            "Indexed {} records on {} chromosomes ({} headers, {} invalid lines skipped)",
            source.stats.indexed,
            source.maps.len(),
            source.stats.headers,
            source.stats.invalid
        );
        Ok(source)
    }

    /// Load interval lines from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, RangeQueryError> {
        let mut stats = LoadStats::default();
        let mut by_chrom: HashMap<String, Vec<RecordInterval>> = HashMap::new();
        let mut lines = LineReader::new(reader);

        while let Some(line) = lines.next_line() {
            let (line_number, line) = line?;
            if line.is_empty() {
                continue;
            }
            stats.total += 1;

            if is_header(line) {
                stats.headers += 1;
                continue;
            }

            match parse_interval(line) {
                Some((chrom, start, end)) => {
                    // tabix treats zero-length records as covering one base
                    let stop = end.max(start.saturating_add(1));
                    by_chrom.entry(chrom.to_string()).or_default().push(Interval {
                        start,
                        stop,
                        val: RawLine {
                            order: stats.indexed,
                            text: line.to_string(),
                        },
                    });
                    stats.indexed += 1;
                }
                None => {
                    warn!("Skipping line {}: no valid chrom/start/end columns", line_number);
                    stats.invalid += 1;
                }
            }
        }

        let mut maps = HashMap::with_capacity(by_chrom.len());
        let mut chrom_aliases = HashMap::with_capacity(by_chrom.len());
        for (chrom, intervals) in by_chrom {
            chrom_aliases.insert(normalize_chrom_key(&chrom), chrom.clone());
            maps.insert(chrom, Lapper::new(intervals));
        }

        Ok(Self {
            maps,
            chrom_aliases,
            stats,
        })
    }

    /// Raw lines overlapping `[start, end)` on `chrom`, by start then file order
    pub fn lines(&self, chrom: &str, start: u64, end: u64) -> impl Iterator<Item = &str> + '_ {
        // Lapper orders equal starts by stop
        let mut hits: Vec<&RecordInterval> = self
            .find_lapper(chrom)
            .filter(|_| start < end)
            .into_iter()
            .flat_map(|lapper| lapper.find(start, end))
            .collect();
        hits.sort_by_key(|iv| (iv.start, iv.val.order));
        hits.into_iter().map(|iv| iv.val.text.as_str())
    }

    /// Find the Lapper for a chromosome, trying different naming styles
    fn find_lapper(&self, chrom: &str) -> Option<&Lapper<u64, RawLine>> {
        if let Some(l) = self.maps.get(chrom) {
            return Some(l);
        }
        self.chrom_aliases
            .get(&normalize_chrom_key(chrom))
            .and_then(|original| self.maps.get(original))
    }

    pub fn has_chrom(&self, chrom: &str) -> bool {
        self.find_lapper(chrom).is_some()
    }

    pub fn chroms(&self) -> impl Iterator<Item = &str> {
        self.maps.keys().map(|s| s.as_str())
    }

    pub fn record_count(&self, chrom: &str) -> usize {
        self.find_lapper(chrom).map(|l| l.len()).unwrap_or(0)
    }

    pub fn total_records(&self) -> usize {
        self.maps.values().map(|l| l.len()).sum()
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }
}

impl RangeQuery for IntervalFileSource {
    fn query(&self, chrom: &str, start: u64, end: u64) -> Result<LineStream<'_>, RangeQueryError> {
        debug!("query {}:{}-{}", chrom, start, end);
        Ok(Box::new(
            self.lines(chrom, start, end)
                .map(|line| Ok::<_, RangeQueryError>(line.to_string())),
        ))
    }
}

fn is_header(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("track") || line.starts_with("browser")
}

/// Split off the first three columns using memchr for tab characters
fn parse_interval(line: &str) -> Option<(&str, u64, u64)> {
    let bytes = line.as_bytes();

    let chrom_end = memchr(b'\t', bytes)?;
    let start_from = chrom_end + 1;
    let start_end = start_from + memchr(b'\t', &bytes[start_from..])?;
    let end_from = start_end + 1;
    let end_end = memchr(b'\t', &bytes[end_from..])
        .map(|i| end_from + i)
        .unwrap_or(bytes.len());

    let chrom = &line[..chrom_end];
    let start: u64 = line[start_from..start_end].parse().ok()?;
    let end: u64 = line[end_from..end_end].parse().ok()?;
    if chrom.is_empty() || end < start {
        return None;
    }
    Some((chrom, start, end))
}

/// Normalize chromosome name for flexible matching
///
/// Converts to lowercase and removes the "chr" prefix.
fn normalize_chrom_key(chrom: &str) -> String {
    let lower = chrom.to_lowercase();
    match lower.strip_prefix("chr") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}
