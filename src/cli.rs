use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::io::BoundlessFill;
use crate::selection::{BandSelection, DateSelection};
use crate::tile::{Feature, PixelType};

#[derive(Parser)]
#[command(name = "tile-tiff")]
#[command(about = "Export tile features to GeoTIFF and read GeoTIFF windows into tiles")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level filter, overridden by RUST_LOG
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export one feature of a tile to a GeoTIFF
    Export {
        /// Tile JSON file
        #[arg(short, long)]
        tile: PathBuf,

        /// Feature to export, as <type>/<name> (e.g. data/BANDS)
        #[arg(short, long)]
        feature: Feature,

        /// Output folder
        #[arg(long, default_value = ".")]
        folder: PathBuf,

        /// Output file name, relative to the folder
        #[arg(short, long, default_value = "output.tif")]
        output: PathBuf,

        /// Bands as a list (0,2,1) or an inclusive range (0..3)
        #[arg(short, long, default_value = "0")]
        bands: BandSelection,

        /// Dates as a list (0,1), an index range (0..2) or a date range (2017-01-01..2017-02-01)
        #[arg(short, long, default_value = "0")]
        dates: DateSelection,

        /// Output pixel type
        #[arg(long, value_enum, default_value_t = PixelType::U8)]
        dtype: PixelType,

        /// No-data value recorded in the GeoTIFF
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        no_data: f64,
    },

    /// Read the window of a GeoTIFF under a tile into a mask_timeless feature
    Import {
        /// Tile JSON file
        #[arg(short, long)]
        tile: PathBuf,

        /// Source GeoTIFF
        #[arg(short, long)]
        source: PathBuf,

        /// Name of the new mask_timeless feature
        #[arg(short, long)]
        mask_name: String,

        /// Output tile JSON file (defaults to overwriting the input tile)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output width in pixels
        #[arg(long)]
        width: Option<usize>,

        /// Output height in pixels
        #[arg(long)]
        height: Option<usize>,

        /// Fill for pixels outside the source: nodata, zero or a number
        #[arg(long, default_value = "nodata", allow_negative_numbers = true)]
        fill: BoundlessFill,
    },

    /// Run export/import operations from a JSON config
    Batch {
        /// Batch config file
        config: PathBuf,
    },
}
