//! Readers for the text inputs (chromosome sizes, interval files)
//!
//! Inputs may be plain, gzip/BGZF or bzip2 compressed. Large plain files are
//! memory-mapped instead of read through a buffer.

use flate2::read::MultiGzDecoder;
use log::debug;
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::path::Path;

/// Read buffer for streamed inputs (128KB)
pub const READ_BUFFER_SIZE: usize = 128 * 1024;

/// Plain files at least this large are memory-mapped (100MB)
pub const MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const BZIP2_MAGIC: &[u8] = b"BZh";

/// Compression format of a text input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    Plain,
    /// Gzip or BGZF (.gz, .bgz)
    Gzip,
    /// Bzip2 (.bz2)
    Bzip2,
}

/// Detect compression from the extension, falling back to magic bytes
pub fn detect_compression(path: &Path) -> io::Result<CompressionFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("gz" | "bgz") => return Ok(CompressionFormat::Gzip),
        Some("bz2") => return Ok(CompressionFormat::Bzip2),
        _ => {}
    }

    let mut head = Vec::with_capacity(BZIP2_MAGIC.len());
    File::open(path)?
        .take(BZIP2_MAGIC.len() as u64)
        .read_to_end(&mut head)?;

    Ok(if head.starts_with(GZIP_MAGIC) {
        CompressionFormat::Gzip
    } else if head.starts_with(BZIP2_MAGIC) {
        CompressionFormat::Bzip2
    } else {
        CompressionFormat::Plain
    })
}

/// Memory-map a whole file as a buffered reader
pub fn open_mapped<P: AsRef<Path>>(path: P) -> io::Result<Cursor<Mmap>> {
    let file = File::open(path.as_ref())?;
    // SAFETY: inputs are read-only for the lifetime of the reader
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(Cursor::new(mmap))
}

/// Open a text input, decoding it if it is compressed
///
/// BGZF files are read with a multi-member gzip decoder so every block is
/// decoded, not just the first one.
pub fn open_text<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead + Send>> {
    let path = path.as_ref();
    let format = detect_compression(path)?;
    let file = File::open(path)?;

    Ok(match format {
        CompressionFormat::Gzip => Box::new(BufReader::with_capacity(
            READ_BUFFER_SIZE,
            MultiGzDecoder::new(file),
        )),
        CompressionFormat::Bzip2 => Box::new(BufReader::with_capacity(
            READ_BUFFER_SIZE,
            bzip2::read::MultiBzDecoder::new(file),
        )),
        CompressionFormat::Plain if file.metadata()?.len() >= MMAP_THRESHOLD => {
            debug!("Memory-mapping {:?}", path);
            Box::new(open_mapped(path)?)
        }
        CompressionFormat::Plain => Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, file)),
    })
}

/// Line reader that reuses one buffer and numbers lines from 1
///
/// Line terminators (`\n` or `\r\n`) are stripped.
pub struct LineReader<R> {
    reader: R,
    buffer: String,
    line_number: usize,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: String::with_capacity(1024),
            line_number: 0,
        }
    }

    /// Next line and its number, or `None` at end of input
    pub fn next_line(&mut self) -> Option<io::Result<(usize, &str)>> {
        self.buffer.clear();
        match self.reader.read_line(&mut self.buffer) {
            Ok(0) => None,
            Ok(_) => {
                self.line_number += 1;
                let len = self.buffer.trim_end_matches(['\n', '\r']).len();
                self.buffer.truncate(len);
                Some(Ok((self.line_number, &self.buffer)))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
