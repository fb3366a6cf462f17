// src/io/reader.rs
use gdal::raster::GdalType;
use gdal::Dataset;
use ndarray::{s, Array3, ArrayView2, Axis};
use num_traits::{AsPrimitive, Zero};
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

use super::window::{project_corners, PixelWindow};
use crate::error::{Error, Result};
use crate::task::TileTask;
use crate::tile::{BBox, Feature, FeatureType, PixelType, RasterArray, Tile};
use crate::utils::cast::cast_pixel;

/// Value written to output pixels that fall outside the source raster.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundlessFill {
    /// The band's no-data value, or zero when the band has none.
    #[default]
    NoData,
    Zero,
    Value(f64),
}

/// Parses `nodata`, `zero` or a number.
impl FromStr for BoundlessFill {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "nodata" | "no_data" | "no-data" => Ok(BoundlessFill::NoData),
            "zero" => Ok(BoundlessFill::Zero),
            other => other.parse::<f64>().map(BoundlessFill::Value).map_err(|_| {
                Error::invalid_config(format!(
                    "invalid fill '{}', expected 'nodata', 'zero' or a number",
                    s
                ))
            }),
        }
    }
}

/// Reads the part of a GeoTIFF covered by a tile's bounding box into a
/// `mask_timeless` feature of the tile.
#[derive(Debug, Clone)]
pub struct ImportFromTiff {
    path: PathBuf,
    mask_name: String,
    fill: BoundlessFill,
}

impl ImportFromTiff {
    pub fn new(path: impl Into<PathBuf>, mask_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mask_name: mask_name.into(),
            fill: BoundlessFill::default(),
        }
    }

    pub fn fill(mut self, fill: BoundlessFill) -> Self {
        self.fill = fill;
        self
    }

    pub fn feature(&self) -> Feature {
        Feature::new(FeatureType::MaskTimeless, self.mask_name.clone())
    }

    /// Adds the source raster's pixels under the tile as a new mask.
    ///
    /// `width` and `height` resample the window to an explicit size; unless
    /// both are given, the size of the window itself is used.
    pub fn execute(&self, mut tile: Tile, width: Option<usize>, height: Option<usize>) -> Result<Tile> {
        let array = {
            let dataset = Dataset::open(&self.path)?;
            let window = self.window(&dataset, &tile.bbox)?;
            let size = match (width, height) {
                (Some(width), Some(height)) if width > 0 && height > 0 => (width, height),
                _ => window.size()?,
            };
            debug!(path = %self.path.display(), ?window, ?size, "Reading window");
            self.read_window(&dataset, &window, size)?
        };

        let feature = self.feature();
        info!(
            path = %self.path.display(),
            shape = ?array.shape(),
            "Imported into {}",
            feature
        );
        tile.insert(feature, array)?;
        Ok(tile)
    }

    /// Pixel window of the source raster covered by `bbox`.
    pub fn window(&self, dataset: &Dataset, bbox: &BBox) -> Result<PixelWindow> {
        let geo_transform = dataset.geo_transform()?;
        let srs = dataset
            .spatial_ref()
            .map_err(|e| Error::Projection(format!("{}: {}", self.path.display(), e)))?;
        let (upper_left, lower_right) = project_corners(bbox, &srs)?;
        Ok(PixelWindow::from_corners(upper_left, lower_right, &geo_transform))
    }

    fn read_window(
        &self,
        dataset: &Dataset,
        window: &PixelWindow,
        size: (usize, usize),
    ) -> Result<RasterArray> {
        if dataset.raster_count() == 0 {
            return Err(Error::invalid_config(format!(
                "{} has no raster bands",
                self.path.display()
            )));
        }

        // Bands are read with the data type of the first band
        let band_type = dataset.rasterband(1)?.band_type();
        let array: RasterArray = match PixelType::from_gdal(band_type).unwrap_or(PixelType::F64) {
            PixelType::U8 => self.read_bands::<u8>(dataset, window, size)?.into_dyn().into(),
            PixelType::U16 => self.read_bands::<u16>(dataset, window, size)?.into_dyn().into(),
            PixelType::I16 => self.read_bands::<i16>(dataset, window, size)?.into_dyn().into(),
            PixelType::U32 => self.read_bands::<u32>(dataset, window, size)?.into_dyn().into(),
            PixelType::I32 => self.read_bands::<i32>(dataset, window, size)?.into_dyn().into(),
            PixelType::F32 => self.read_bands::<f32>(dataset, window, size)?.into_dyn().into(),
            PixelType::F64 => self.read_bands::<f64>(dataset, window, size)?.into_dyn().into(),
        };
        Ok(array)
    }

    /// Boundless read of every band into a (height, width, band) array.
    fn read_bands<T>(
        &self,
        dataset: &Dataset,
        window: &PixelWindow,
        size: (usize, usize),
    ) -> Result<Array3<T>>
    where
        T: GdalType + Copy + Zero + 'static,
        f64: AsPrimitive<T>,
    {
        let (width, height) = size;
        let band_count = dataset.raster_count();
        let clipped = window.clip(dataset.raster_size(), size);

        let mut data = Array3::<T>::zeros((height, width, band_count));
        for band_index in 0..band_count {
            let band = dataset.rasterband(band_index + 1)?;
            let fill = match self.fill {
                BoundlessFill::NoData => band.no_data_value().unwrap_or(0.0),
                BoundlessFill::Zero => 0.0,
                BoundlessFill::Value(value) => value,
            };

            let mut slot = data.index_axis_mut(Axis(2), band_index);
            slot.fill(cast_pixel(fill));

            let Some(read) = clipped else {
                continue;
            };
            let buffer = band.read_as::<T>(read.source_offset, read.source_size, read.target_size, None)?;
            let (cols, rows) = read.target_size;
            let (col, row) = read.target_offset;
            let pixels = ArrayView2::from_shape((rows, cols), buffer.data())?;
            slot.slice_mut(s![row..row + rows, col..col + cols]).assign(&pixels);
        }

        Ok(data)
    }
}

/// Arguments of one import call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportArgs {
    pub width: Option<usize>,
    pub height: Option<usize>,
}

impl TileTask for ImportFromTiff {
    type Args = ImportArgs;

    fn execute(&self, tile: Tile, args: ImportArgs) -> Result<Tile> {
        ImportFromTiff::execute(self, tile, args.width, args.height)
    }

    fn name(&self) -> &str {
        "ImportFromTiff"
    }
}
