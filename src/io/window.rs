// src/io/window.rs
use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};

use crate::error::{Error, Result};
use crate::tile::BBox;

/// GDAL affine geotransform:
/// `[origin_x, pixel_width, row_rotation, origin_y, column_rotation, pixel_height]`.
pub type GeoTransform = [f64; 6];

/// Affine transform mapping pixel (0, 0)..(width, height) onto
/// (min_x, max_y)..(max_x, min_y) of `bbox`.
pub fn transform_from_bounds(bbox: &BBox, width: usize, height: usize) -> GeoTransform {
    [
        bbox.min_x,
        bbox.width() / width as f64,
        0.0,
        bbox.max_y,
        0.0,
        -bbox.height() / height as f64,
    ]
}

/// Projects the upper-left and lower-right corners of `bbox` into `target`.
pub fn project_corners(bbox: &BBox, target: &SpatialRef) -> Result<((f64, f64), (f64, f64))> {
    let source = bbox.crs().to_spatial_ref()?;
    let mut target = target.clone();
    target.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);

    let transform = CoordTransform::new(&source, &target)
        .map_err(|e| Error::Projection(format!("{} to target CRS: {}", bbox.crs(), e)))?;

    let (ul_x, ul_y) = bbox.upper_left();
    let (lr_x, lr_y) = bbox.lower_right();
    let mut xs = [ul_x, lr_x];
    let mut ys = [ul_y, lr_y];
    transform
        .transform_coords(&mut xs, &mut ys, &mut [])
        .map_err(|e| Error::Projection(format!("transforming {:?}: {}", bbox, e)))?;

    Ok(((xs[0], ys[0]), (xs[1], ys[1])))
}

/// Pixel-space rectangle in a source raster; `bottom` and `right` are exclusive.
///
/// Edges may lie outside the raster, or be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub top: i64,
    pub bottom: i64,
    pub left: i64,
    pub right: i64,
}

/// Part of a window that overlaps the source raster, and where it lands in
/// the output buffer. Sizes and offsets are (columns, rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClippedRead {
    pub source_offset: (isize, isize),
    pub source_size: (usize, usize),
    pub target_offset: (usize, usize),
    pub target_size: (usize, usize),
}

impl PixelWindow {
    /// Window covering the projected corners of a tile in a raster with the
    /// given geotransform. Offsets are truncated toward zero.
    pub fn from_corners(
        upper_left: (f64, f64),
        lower_right: (f64, f64),
        geo_transform: &GeoTransform,
    ) -> Self {
        let (origin_x, x_res) = (geo_transform[0], geo_transform[1]);
        let (origin_y, y_res) = (geo_transform[3], geo_transform[5]);

        Self {
            top: ((upper_left.1 - origin_y) / y_res) as i64,
            bottom: ((lower_right.1 - origin_y) / y_res) as i64,
            left: ((upper_left.0 - origin_x) / x_res) as i64,
            right: ((lower_right.0 - origin_x) / x_res) as i64,
        }
    }

    pub fn width(&self) -> i64 {
        self.right - self.left
    }

    pub fn height(&self) -> i64 {
        self.bottom - self.top
    }

    /// Window size as (width, height), or an error when either side is empty.
    pub fn size(&self) -> Result<(usize, usize)> {
        match (usize::try_from(self.width()), usize::try_from(self.height())) {
            (Ok(width), Ok(height)) if width > 0 && height > 0 => Ok((width, height)),
            _ => Err(Error::EmptyWindow {
                width: self.width(),
                height: self.height(),
            }),
        }
    }

    /// Intersects the window with a raster of `raster_size` (columns, rows),
    /// scaling the overlap onto an output buffer of `out_size`.
    ///
    /// Returns `None` when nothing of the source falls inside the output.
    pub fn clip(&self, raster_size: (usize, usize), out_size: (usize, usize)) -> Option<ClippedRead> {
        let (width, height) = self.size().ok()?;
        let (cols, target_cols) = clip_axis(
            self.left,
            self.right,
            raster_size.0 as i64,
            out_size.0 as f64 / width as f64,
            out_size.0,
        )?;
        let (rows, target_rows) = clip_axis(
            self.top,
            self.bottom,
            raster_size.1 as i64,
            out_size.1 as f64 / height as f64,
            out_size.1,
        )?;

        Some(ClippedRead {
            source_offset: (cols.0 as isize, rows.0 as isize),
            source_size: ((cols.1 - cols.0) as usize, (rows.1 - rows.0) as usize),
            target_offset: (target_cols.0, target_rows.0),
            target_size: (target_cols.1 - target_cols.0, target_rows.1 - target_rows.0),
        })
    }
}

/// Clips `[start, end)` to `[0, extent)` and maps the result onto `[0, out_len)`.
fn clip_axis(
    start: i64,
    end: i64,
    extent: i64,
    scale: f64,
    out_len: usize,
) -> Option<((i64, i64), (usize, usize))> {
    let (lo, hi) = (start.max(0), end.min(extent));
    if lo >= hi {
        return None;
    }
    let target_lo = (((lo - start) as f64 * scale).round() as usize).min(out_len);
    let target_hi = (((hi - start) as f64 * scale).round() as usize).min(out_len);
    if target_lo >= target_hi {
        return None;
    }
    Some(((lo, hi), (target_lo, target_hi)))
}
