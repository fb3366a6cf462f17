// src/io/writer.rs
use gdal::raster::{Buffer, GdalType, RasterCreationOptions};
use gdal::spatial_ref::SpatialRef;
use gdal::DriverManager;
use itertools::iproduct;
use ndarray::{s, Array4, Axis, Ix4};
use num_traits::AsPrimitive;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::window::{transform_from_bounds, GeoTransform};
use crate::error::Result;
use crate::selection::{BandSelection, DateSelection};
use crate::task::TileTask;
use crate::tile::{Feature, PixelType, Tile};
use crate::utils::cast::cast_pixels;

/// Exports one feature of a tile to a GeoTIFF.
///
/// With several time steps and bands, GeoTIFF bands are written time-major:
///
/// T(1)B(1), T(1)B(2), ..., T(1)B(N), T(2)B(1), ..., T(M)B(N)
#[derive(Debug, Clone)]
pub struct ExportToTiff {
    feature: Feature,
    folder: PathBuf,
    band_indices: BandSelection,
    date_indices: DateSelection,
    image_dtype: PixelType,
    no_data_value: f64,
}

impl ExportToTiff {
    pub fn new(feature: Feature) -> Self {
        Self {
            feature,
            folder: PathBuf::from("."),
            band_indices: BandSelection::default(),
            date_indices: DateSelection::default(),
            image_dtype: PixelType::default(),
            no_data_value: 0.0,
        }
    }

    pub fn folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.folder = folder.into();
        self
    }

    pub fn band_indices(mut self, band_indices: BandSelection) -> Self {
        self.band_indices = band_indices;
        self
    }

    pub fn date_indices(mut self, date_indices: DateSelection) -> Self {
        self.date_indices = date_indices;
        self
    }

    pub fn image_dtype(mut self, image_dtype: PixelType) -> Self {
        self.image_dtype = image_dtype;
        self
    }

    pub fn no_data_value(mut self, no_data_value: f64) -> Self {
        self.no_data_value = no_data_value;
        self
    }

    pub fn feature(&self) -> &Feature {
        &self.feature
    }

    /// Selects bands and dates of the feature and reshapes the result to
    /// (time, height, width, band).
    pub fn select(&self, tile: &Tile) -> Result<Array4<f64>> {
        let feature_type = self.feature.feature_type;
        let array = tile.require(&self.feature)?.to_f64();

        let band_axis = Axis(array.ndim() - 1);
        let bands = self.band_indices.resolve(array.len_of(band_axis))?;
        let mut array = array.select(band_axis, &bands);

        if feature_type.is_temporal() {
            let dates = self
                .date_indices
                .resolve(&tile.timestamp, array.len_of(Axis(0)))?;
            debug!(feature = %self.feature, ?bands, ?dates, "Selected bands and dates");
            array = array.select(Axis(0), &dates);
        } else {
            debug!(feature = %self.feature, ?bands, "Selected bands");
            array.insert_axis_inplace(Axis(0));
        }

        // Scalars gain height and width of 1
        if !feature_type.is_spatial() {
            array.insert_axis_inplace(Axis(1));
            array.insert_axis_inplace(Axis(1));
        }

        Ok(array.into_dimensionality::<Ix4>()?)
    }

    /// Writes the selected feature to `<folder>/<filename>` and returns the tile unchanged.
    ///
    /// The folder must already exist; GDAL's create error is returned otherwise.
    pub fn execute(&self, tile: Tile, filename: impl AsRef<Path>) -> Result<Tile> {
        let stack = self.select(&tile)?;
        let (time_dim, height, width, band_dim) = stack.dim();

        let geo_transform = transform_from_bounds(&tile.bbox, width, height);
        let srs = tile.bbox.crs().to_spatial_ref()?;

        let path = self.folder.join(filename);

        let target = StackTarget {
            path: &path,
            geo_transform,
            srs: &srs,
            no_data_value: self.no_data_value,
        };
        match self.image_dtype {
            PixelType::U8 => write_stack::<u8>(&stack, &target)?,
            PixelType::U16 => write_stack::<u16>(&stack, &target)?,
            PixelType::I16 => write_stack::<i16>(&stack, &target)?,
            PixelType::U32 => write_stack::<u32>(&stack, &target)?,
            PixelType::I32 => write_stack::<i32>(&stack, &target)?,
            PixelType::F32 => write_stack::<f32>(&stack, &target)?,
            PixelType::F64 => write_stack::<f64>(&stack, &target)?,
        }

        info!(
            path = %path.display(),
            bands = time_dim * band_dim,
            width,
            height,
            dtype = %self.image_dtype,
            "Exported {}",
            self.feature
        );
        Ok(tile)
    }
}

/// Arguments of one export call.
#[derive(Debug, Clone)]
pub struct ExportArgs {
    pub filename: PathBuf,
}

impl TileTask for ExportToTiff {
    type Args = ExportArgs;

    fn execute(&self, tile: Tile, args: ExportArgs) -> Result<Tile> {
        ExportToTiff::execute(self, tile, args.filename)
    }

    fn name(&self) -> &str {
        "ExportToTiff"
    }
}

struct StackTarget<'a> {
    path: &'a Path,
    geo_transform: GeoTransform,
    srs: &'a SpatialRef,
    no_data_value: f64,
}

fn write_stack<T>(stack: &Array4<f64>, target: &StackTarget<'_>) -> Result<()>
where
    T: GdalType + Copy + 'static,
    f64: AsPrimitive<T>,
{
    let (time_dim, height, width, band_dim) = stack.dim();
    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let creation_options = RasterCreationOptions::from_iter(["COMPRESS=DEFLATE"]);

    let mut dataset = driver.create_with_band_type_with_options::<T, _>(
        target.path,
        width,
        height,
        time_dim * band_dim,
        &creation_options,
    )?;
    dataset.set_geo_transform(&target.geo_transform)?;
    dataset.set_spatial_ref(target.srs)?;

    for (index, (time, band)) in iproduct!(0..time_dim, 0..band_dim).enumerate() {
        let plane = stack.slice(s![time, .., .., band]);
        let mut buffer = Buffer::new((width, height), cast_pixels::<T, _>(plane.iter().copied()));

        let mut raster_band = dataset.rasterband(index + 1)?;
        raster_band.set_no_data_value(Some(target.no_data_value))?;
        raster_band.write((0, 0), (width, height), &mut buffer)?;
    }

    dataset.flush_cache()?;
    Ok(())
}
