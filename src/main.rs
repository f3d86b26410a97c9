//! TabixTiler CLI entry point
//!
//! Serves tileset info and tiles for a genomic interval file as JSON.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Map, Value};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use tabix_tiler::core::{read_chrom_sizes, PyramidMetadata, DEFAULT_TILE_SIZE};
use tabix_tiler::{DataConfig, TileDataset, TilesetInfo};

#[derive(Parser)]
#[command(name = "tabix-tiler")]
#[command(about = "Zoom-pyramid tiles over coordinate-sorted genomic interval files")]
#[command(version)]
#[command(author = "TabixTiler Contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Dataset location: a JSON data config or explicit paths
#[derive(Args)]
struct DatasetArgs {
    /// JSON data config ({"url": ..., "chromSizesUrl": ..., "tileSize": ...})
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
    /// Interval file (plain, gzip/BGZF or bzip2)
    #[arg(short = 'd', long)]
    data: Option<PathBuf>,
    /// Chromosome sizes file
    #[arg(short = 's', long)]
    chromsizes: Option<PathBuf>,
    /// Tile size (bins per tile)
    #[arg(long = "tile-size", default_value_t = DEFAULT_TILE_SIZE)]
    tile_size: u64,
    /// Number of threads for batched tile fetches
    #[arg(short = 't', long, default_value = "1")]
    threads: usize,
}

impl DatasetArgs {
    fn to_config(&self) -> anyhow::Result<DataConfig> {
        if let Some(path) = &self.config {
            return DataConfig::from_json_file(path)
                .with_context(|| format!("Failed to load data config {:?}", path));
        }
        let (Some(data), Some(chromsizes)) = (&self.data, &self.chromsizes) else {
            bail!("either --config or both --data and --chromsizes are required");
        };
        let config = DataConfig {
            tile_size: self.tile_size,
            threads: self.threads,
            ..DataConfig::new(data, chromsizes)
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print tileset info (tile size, max zoom, max width)
    Info {
        /// Chromosome sizes file
        chromsizes: PathBuf,
        /// Tile size (bins per tile)
        #[arg(long = "tile-size", default_value_t = DEFAULT_TILE_SIZE)]
        tile_size: u64,
    },
    /// Fetch tiles by id ("z.x") and print them as JSON
    Tiles {
        #[command(flatten)]
        dataset: DatasetArgs,
        /// Tile ids, e.g. 0.0 1.0 1.1
        #[arg(required = true)]
        tile_ids: Vec<String>,
        /// Output file (optional, stdout if not specified)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Convert absolute genome positions to chromosome:position
    Locate {
        /// Chromosome sizes file
        chromsizes: PathBuf,
        /// Absolute positions
        #[arg(required = true)]
        positions: Vec<u64>,
    },
}

fn write_json(value: &Value, output: Option<&PathBuf>, pretty: bool) -> anyhow::Result<()> {
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {:?}", path))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    if pretty {
        serde_json::to_writer_pretty(&mut writer, value)?;
    } else {
        serde_json::to_writer(&mut writer, value)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    match cli.command {
        Commands::Info { chromsizes, tile_size } => {
            let info = match read_chrom_sizes(&chromsizes)
                .and_then(|coords| Ok(PyramidMetadata::compute(coords.total_length(), tile_size)?))
            {
                Ok(meta) => TilesetInfo::from(&meta),
                Err(e) => TilesetInfo::Error {
                    error: format!("Error loading tileset info: {}", e),
                },
            };
            write_json(&serde_json::to_value(&info)?, None, true)?;
        }

        Commands::Tiles { dataset, tile_ids, output, pretty } => {
            let config = dataset.to_config()?;
            eprintln!("Loading dataset: {:?}", config.data_path);
            let dataset = TileDataset::open(&config)
                .map_err(|e| anyhow::anyhow!("Failed to open dataset: {}", e))?;
            eprintln!("Dataset loaded in {:.2}s", start.elapsed().as_secs_f64());

            let tiles = dataset.get_tiles(&tile_ids);

            let mut records = 0usize;
            let mut malformed = 0usize;
            let mut failed = 0usize;
            let mut body = Map::new();
            for (id, result) in tiles {
                let value = match result {
                    Ok(tile) => {
                        records += tile.len();
                        malformed += tile.malformed;
                        serde_json::to_value(&tile)?
                    }
                    Err(e) => {
                        failed += 1;
                        json!({ "error": e.to_string() })
                    }
                };
                body.insert(id, value);
            }
            let fetched = body.len();
            write_json(&Value::Object(body), output.as_ref(), pretty)?;

            eprintln!("\n=== Tile Statistics ===");
            eprintln!("Requested ids:   {}", tile_ids.len());
            eprintln!("Fetched tiles:   {}", fetched - failed);
            eprintln!("Failed tiles:    {}", failed);
            eprintln!("Records:         {}", records);
            eprintln!("Malformed rows:  {}", malformed);
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }

        Commands::Locate { chromsizes, positions } => {
            let coords = read_chrom_sizes(&chromsizes)
                .map_err(|e| anyhow::anyhow!("Failed to load chromosome sizes: {}", e))?;
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            for pos in positions {
                match coords.to_local(pos) {
                    Some((entry, local)) => writeln!(out, "{}\t{}:{}", pos, entry.name, local)?,
                    None => writeln!(out, "{}\tout_of_range", pos)?,
                }
            }
            out.flush()?;
        }
    }

    Ok(())
}
