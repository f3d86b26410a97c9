//! Raw range-query lines to feature records
//!
//! Lines follow the transcript-annotation layout produced for HiGlass tabix
//! tracks: `chrom, start, end, name, score, strand, ..., gene/transcript id`,
//! tab separated. Only the coordinate columns, the score and the id column
//! are interpreted; every field is kept verbatim in [`FeatureRecord::fields`].

use crate::core::error::{RecordError, RecordResult};
use serde::Serialize;
use uuid::Uuid;

/// Minimum number of tab-separated fields in a raw line
pub const MIN_FIELDS: usize = 8;

const CHROM_FIELD: usize = 0;
const START_FIELD: usize = 1;
const END_FIELD: usize = 2;
const SCORE_FIELD: usize = 4;
const EXTERNAL_ID_FIELD: usize = 7;

/// One interval record placed on the absolute coordinate system
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRecord {
    #[serde(rename = "xStart")]
    pub start_abs: u64,
    #[serde(rename = "xEnd")]
    pub end_abs: u64,
    #[serde(rename = "chrOffset")]
    pub chrom_offset: u64,
    /// Score column; NaN when the column is not numeric
    pub importance: f64,
    /// Random per-fetch id, not derived from the content
    pub uid: String,
    pub transcript_id: String,
    pub fields: Vec<String>,
}

impl FeatureRecord {
    /// Map a raw line returned for a chromosome starting at `chrom_offset`
    ///
    /// # Example
    /// ```
    /// use tabix_tiler::core::FeatureRecord;
    ///
    /// let record = FeatureRecord::from_line("chr1\t100\t200\tname\t5.0\t+\t.\tGENEX", 0).unwrap();
    /// assert_eq!(record.start_abs, 100);
    /// assert_eq!(record.end_abs, 200);
    /// assert_eq!(record.transcript_id, "GENEX_chr1_100_200");
    /// ```
    pub fn from_line(line: &str, chrom_offset: u64) -> RecordResult<Self> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < MIN_FIELDS {
            return Err(RecordError::TooFewFields {
                expected: MIN_FIELDS,
                found: fields.len(),
            });
        }

        let start_abs = to_absolute("start", fields[START_FIELD], chrom_offset)?;
        let end_abs = to_absolute("end", fields[END_FIELD], chrom_offset)?;
        let importance = fields[SCORE_FIELD].trim().parse::<f64>().unwrap_or(f64::NAN);

        let transcript_id = format!(
            "{}_{}_{}_{}",
            fields[EXTERNAL_ID_FIELD], fields[CHROM_FIELD], fields[START_FIELD], fields[END_FIELD]
        );

        Ok(Self {
            start_abs,
            end_abs,
            chrom_offset,
            importance,
            uid: new_uid(),
            transcript_id,
            fields: fields.into_iter().map(str::to_string).collect(),
        })
    }

    /// Chromosome column of the raw line
    pub fn chrom(&self) -> &str {
        &self.fields[CHROM_FIELD]
    }
}

/// Parse a local coordinate and shift it by the chromosome offset
///
/// Values that do not parse, or that overflow once shifted, are invalid.
fn to_absolute(field: &'static str, value: &str, chrom_offset: u64) -> RecordResult<u64> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(|local| local.checked_add(chrom_offset))
        .ok_or_else(|| RecordError::InvalidCoordinate {
            field,
            value: value.to_string(),
        })
}

/// Fresh opaque record id
pub fn new_uid() -> String {
    Uuid::new_v4().simple().to_string()
}
