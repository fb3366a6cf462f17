// src/tile/bbox.rs
use gdal::spatial_ref::{AxisMappingStrategy, SpatialRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Coordinate reference system identified by its EPSG code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Crs(u32);

impl Crs {
    pub const WGS84: Crs = Crs(4326);
    pub const WEB_MERCATOR: Crs = Crs(3857);

    pub fn from_epsg(code: u32) -> Self {
        Crs(code)
    }

    pub fn epsg(&self) -> u32 {
        self.0
    }

    /// OGC string form, e.g. `EPSG:32633`.
    pub fn ogc_string(&self) -> String {
        format!("EPSG:{}", self.0)
    }

    /// GDAL spatial reference with x/y (easting/northing, lon/lat) axis order.
    pub fn to_spatial_ref(&self) -> Result<SpatialRef> {
        let mut srs = SpatialRef::from_epsg(self.0)
            .map_err(|e| Error::Projection(format!("{}: {}", self.ogc_string(), e)))?;
        srs.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
        Ok(srs)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ogc_string())
    }
}

/// Accepts `EPSG:<code>` (any case) or a bare `<code>`.
impl FromStr for Crs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let code = match trimmed.split_once(':') {
            Some((authority, code)) if authority.eq_ignore_ascii_case("epsg") => code,
            Some(_) => return Err(Error::Projection(format!("unsupported CRS authority in '{}'", s))),
            None => trimmed,
        };
        code.parse::<u32>()
            .map(Crs)
            .map_err(|_| Error::Projection(format!("invalid EPSG code in '{}'", s)))
    }
}

impl TryFrom<String> for Crs {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Crs> for String {
    fn from(crs: Crs) -> Self {
        crs.ogc_string()
    }
}

/// Rectangular extent of a tile in its own CRS.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub crs: Crs,
}

impl BBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64, crs: Crs) -> Result<Self> {
        let bbox = Self {
            min_x,
            min_y,
            max_x,
            max_y,
            crs,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let finite = [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.min_x >= self.max_x || self.min_y >= self.max_y {
            return Err(Error::InvalidBbox(format!(
                "({}, {}, {}, {}) in {}",
                self.min_x, self.min_y, self.max_x, self.max_y, self.crs
            )));
        }
        Ok(())
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn upper_left(&self) -> (f64, f64) {
        (self.min_x, self.max_y)
    }

    pub fn lower_right(&self) -> (f64, f64) {
        (self.max_x, self.min_y)
    }
}
