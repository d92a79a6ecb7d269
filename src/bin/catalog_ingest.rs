//! Command-line front end: ingest one workbook and write the catalog as JSON.
//!
//! ```sh
//! catalog-ingest products.xlsx -o output/products.json --image-dir output
//! RUST_LOG=debug catalog-ingest products.xlsx --config ingest.yaml
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use catalog_ingest::{FsImageStore, IngestConfig, JsonCatalogWriter, ingest};

/// Consolidate spreadsheet product rows and their embedded images into per-SKU records
#[derive(Parser, Debug)]
#[command(name = "catalog-ingest", version)]
struct Args {
    /// Workbook (.xlsx) to ingest
    #[arg(value_name = "WORKBOOK")]
    workbook: PathBuf,

    /// YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Where to write the catalog JSON
    #[arg(short, long, value_name = "FILE", default_value = "output/products.json")]
    output: PathBuf,

    /// Root directory of persisted images (overrides the configuration)
    #[arg(long, value_name = "DIR")]
    image_dir: Option<PathBuf>,

    /// Directory to unpack the workbook into (removed afterwards)
    #[arg(long, value_name = "DIR")]
    scratch_dir: Option<PathBuf>,

    /// Base URL prepended to image keys
    #[arg(long, value_name = "URL")]
    public_base_url: Option<String>,

    /// Persist every image, even when its bytes were already persisted
    #[arg(long)]
    no_dedupe: bool,

    /// Process sheets one at a time
    #[arg(long)]
    sequential: bool,
}

impl Args {
    fn into_config(self) -> catalog_ingest::Result<(IngestConfig, PathBuf, PathBuf)> {
        let mut config = match &self.config {
            Some(path) => IngestConfig::load(path)?,
            None => IngestConfig::default(),
        };

        if let Some(dir) = self.image_dir {
            config.image_dir = dir;
        }
        if let Some(dir) = self.scratch_dir {
            config.scratch_dir = Some(dir);
        }
        if let Some(url) = self.public_base_url {
            config.public_base_url = Some(url);
        }
        if self.no_dedupe {
            config.dedupe_images = false;
        }
        if self.sequential {
            config.parallel = false;
        }

        Ok((config, self.workbook, self.output))
    }
}

fn run(args: Args) -> catalog_ingest::Result<()> {
    let (config, workbook, output) = args.into_config()?;
    let store = FsImageStore::from_config(&config);

    let catalog = ingest(&workbook, &config, &store)?;

    let mut sink = JsonCatalogWriter::create(&output)?;
    catalog.write_to(&mut sink)?;
    tracing::info!(output = %output.display(), records = catalog.len(), "catalog written");
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "ingestion failed");
            ExitCode::FAILURE
        },
    }
}
