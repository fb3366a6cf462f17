// src/batch.rs
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::io::{BoundlessFill, ExportToTiff, ImportFromTiff};
use crate::selection::{BandSelection, DateSelection};
use crate::tile::{Feature, PixelType, Tile};

#[derive(Deserialize, Debug)]
pub struct BatchConfig {
    #[serde(default)]
    pub global: GlobalParams,
    pub operations: Vec<Operation>,
}

#[derive(Deserialize, Debug)]
pub struct GlobalParams {
    #[serde(default = "default_folder")]
    pub folder: PathBuf,
    #[serde(default)]
    pub image_dtype: PixelType,
    #[serde(default)]
    pub no_data_value: f64,
    #[serde(default)]
    pub fill: BoundlessFill,
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            folder: default_folder(),
            image_dtype: PixelType::default(),
            no_data_value: 0.0,
            fill: BoundlessFill::default(),
        }
    }
}

fn default_folder() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Operation {
    Export {
        tile: PathBuf,
        feature: Feature,
        filename: PathBuf,
        #[serde(default)]
        band_indices: BandSelection,
        #[serde(default)]
        date_indices: DateSelection,
        folder: Option<PathBuf>,
        image_dtype: Option<PixelType>,
        no_data_value: Option<f64>,
    },
    Import {
        tile: PathBuf,
        path: PathBuf,
        mask_name: String,
        /// Where to save the updated tile; defaults to `tile`.
        output: Option<PathBuf>,
        width: Option<usize>,
        height: Option<usize>,
        fill: Option<BoundlessFill>,
    },
}

impl BatchConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Loads the tile at `tile_path` and exports it.
pub fn export_tile(tile_path: &Path, exporter: &ExportToTiff, filename: &Path) -> Result<()> {
    let tile = Tile::load(tile_path)?;
    exporter.execute(tile, filename)?;
    Ok(())
}

/// Loads the tile at `tile_path`, imports into it and saves it to `output`.
pub fn import_tile(
    tile_path: &Path,
    importer: &ImportFromTiff,
    width: Option<usize>,
    height: Option<usize>,
    output: &Path,
) -> Result<()> {
    let tile = Tile::load(tile_path)?;
    let tile = importer.execute(tile, width, height)?;
    tile.save(output)
}

pub fn run_operation(op: &Operation, global: &GlobalParams) -> Result<()> {
    match op {
        Operation::Export {
            tile,
            feature,
            filename,
            band_indices,
            date_indices,
            folder,
            image_dtype,
            no_data_value,
        } => {
            let exporter = ExportToTiff::new(feature.clone())
                .folder(folder.as_ref().unwrap_or(&global.folder))
                .band_indices(band_indices.clone())
                .date_indices(date_indices.clone())
                .image_dtype(image_dtype.unwrap_or(global.image_dtype))
                .no_data_value(no_data_value.unwrap_or(global.no_data_value));
            export_tile(tile, &exporter, filename)
        }
        Operation::Import {
            tile,
            path,
            mask_name,
            output,
            width,
            height,
            fill,
        } => {
            let importer =
                ImportFromTiff::new(path, mask_name.as_str()).fill(fill.unwrap_or(global.fill));
            import_tile(tile, &importer, *width, *height, output.as_ref().unwrap_or(tile))
        }
    }
}

/// Runs every operation of the config in order, stopping at the first failure.
pub fn process_batch(config_path: &Path) -> Result<()> {
    let config = BatchConfig::load(config_path)?;

    info!("Starting batch processing with {} operations", config.operations.len());

    for (i, op) in config.operations.iter().enumerate() {
        let kind = match op {
            Operation::Export { .. } => "export",
            Operation::Import { .. } => "import",
        };
        info!("[{}/{}] Running {}", i + 1, config.operations.len(), kind);
        run_operation(op, &config.global)?;
    }

    info!("Batch processing complete");
    Ok(())
}
