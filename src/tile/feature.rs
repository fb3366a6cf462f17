// src/tile/feature.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Category of an array attribute stored in a tile.
///
/// The category fixes the rank of the array:
/// - `Data`, `Mask`: (time, height, width, band)
/// - `Scalar`: (time, band)
/// - `DataTimeless`, `MaskTimeless`: (height, width, band)
/// - `ScalarTimeless`: (band)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureType {
    Data,
    Mask,
    Scalar,
    DataTimeless,
    MaskTimeless,
    ScalarTimeless,
}

impl FeatureType {
    pub const ALL: [FeatureType; 6] = [
        FeatureType::Data,
        FeatureType::Mask,
        FeatureType::Scalar,
        FeatureType::DataTimeless,
        FeatureType::MaskTimeless,
        FeatureType::ScalarTimeless,
    ];

    /// Whether the first axis of the array runs over the tile's timestamps.
    pub fn is_temporal(&self) -> bool {
        matches!(self, FeatureType::Data | FeatureType::Mask | FeatureType::Scalar)
    }

    /// Whether the array carries height and width axes.
    pub fn is_spatial(&self) -> bool {
        !matches!(self, FeatureType::Scalar | FeatureType::ScalarTimeless)
    }

    pub fn ndim(&self) -> usize {
        match (self.is_temporal(), self.is_spatial()) {
            (true, true) => 4,
            (false, true) => 3,
            (true, false) => 2,
            (false, false) => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::Data => "data",
            FeatureType::Mask => "mask",
            FeatureType::Scalar => "scalar",
            FeatureType::DataTimeless => "data_timeless",
            FeatureType::MaskTimeless => "mask_timeless",
            FeatureType::ScalarTimeless => "scalar_timeless",
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        FeatureType::ALL
            .into_iter()
            .find(|ft| ft.as_str() == normalized)
            .ok_or_else(|| Error::invalid_config(format!("unknown feature type '{}'", s)))
    }
}

/// (category, name) key of one attribute within a tile.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub feature_type: FeatureType,
    pub name: String,
}

impl Feature {
    pub fn new(feature_type: FeatureType, name: impl Into<String>) -> Self {
        Self {
            feature_type,
            name: name.into(),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.feature_type, self.name)
    }
}

/// Parses `"<type>/<name>"`, e.g. `data/BANDS`.
impl FromStr for Feature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (feature_type, name) = s
            .split_once('/')
            .ok_or_else(|| Error::invalid_config(format!("expected '<type>/<name>', got '{}'", s)))?;
        if name.is_empty() {
            return Err(Error::invalid_config(format!("feature '{}' has an empty name", s)));
        }
        Ok(Feature::new(feature_type.parse()?, name))
    }
}
