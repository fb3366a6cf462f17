// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tile_tiff::batch::{export_tile, import_tile, process_batch};
use tile_tiff::cli::{Cli, Commands};
use tile_tiff::io::{ExportToTiff, ImportFromTiff};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Export {
            tile,
            feature,
            folder,
            output,
            bands,
            dates,
            dtype,
            no_data,
        } => {
            let exporter = ExportToTiff::new(feature)
                .folder(folder)
                .band_indices(bands)
                .date_indices(dates)
                .image_dtype(dtype)
                .no_data_value(no_data);
            export_tile(&tile, &exporter, &output)
                .with_context(|| format!("exporting {}", tile.display()))?;
        }
        Commands::Import {
            tile,
            source,
            mask_name,
            output,
            width,
            height,
            fill,
        } => {
            let importer = ImportFromTiff::new(&source, mask_name).fill(fill);
            let output = output.unwrap_or_else(|| tile.clone());
            import_tile(&tile, &importer, width, height, &output)
                .with_context(|| format!("importing {} into {}", source.display(), tile.display()))?;
        }
        Commands::Batch { config } => {
            process_batch(&config).with_context(|| format!("running batch {}", config.display()))?;
        }
    }

    Ok(())
}
