// src/tile/mod.rs
pub mod array;
pub mod bbox;
pub mod feature;

pub use array::{PixelType, RasterArray};
pub use bbox::{BBox, Crs};
pub use feature::{Feature, FeatureType};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Spatially and temporally bounded container of named array attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub bbox: BBox,
    #[serde(default)]
    pub timestamp: Vec<NaiveDateTime>,
    #[serde(default)]
    features: BTreeMap<FeatureType, BTreeMap<String, RasterArray>>,
}

impl Tile {
    pub fn new(bbox: BBox, timestamp: Vec<NaiveDateTime>) -> Self {
        Self {
            bbox,
            timestamp,
            features: BTreeMap::new(),
        }
    }

    pub fn get(&self, feature: &Feature) -> Option<&RasterArray> {
        self.features
            .get(&feature.feature_type)
            .and_then(|named| named.get(&feature.name))
    }

    /// Like [`Tile::get`], but a missing feature is an error.
    pub fn require(&self, feature: &Feature) -> Result<&RasterArray> {
        self.get(feature)
            .ok_or_else(|| Error::FeatureNotFound(feature.clone()))
    }

    /// Stores `array` under `feature`, replacing any previous value.
    ///
    /// The array rank must match the rank implied by the feature type.
    pub fn insert(&mut self, feature: Feature, array: RasterArray) -> Result<Option<RasterArray>> {
        check_rank(&feature, &array)?;
        Ok(self
            .features
            .entry(feature.feature_type)
            .or_default()
            .insert(feature.name, array))
    }

    pub fn remove(&mut self, feature: &Feature) -> Option<RasterArray> {
        let named = self.features.get_mut(&feature.feature_type)?;
        let removed = named.remove(&feature.name);
        if named.is_empty() {
            self.features.remove(&feature.feature_type);
        }
        removed
    }

    pub fn contains(&self, feature: &Feature) -> bool {
        self.get(feature).is_some()
    }

    /// All stored feature keys, ordered by type and name.
    pub fn features(&self) -> impl Iterator<Item = Feature> + '_ {
        self.features.iter().flat_map(|(feature_type, named)| {
            named
                .keys()
                .map(move |name| Feature::new(*feature_type, name.clone()))
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let tile: Tile = serde_json::from_str(&content)?;
        tile.bbox.validate()?;
        for (feature_type, named) in &tile.features {
            for (name, array) in named {
                check_rank(&Feature::new(*feature_type, name.clone()), array)?;
            }
        }
        Ok(tile)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }
}

fn check_rank(feature: &Feature, array: &RasterArray) -> Result<()> {
    let expected = feature.feature_type.ndim();
    if array.ndim() != expected {
        return Err(Error::ShapeMismatch {
            feature: feature.clone(),
            expected,
            shape: array.shape().to_vec(),
        });
    }
    Ok(())
}
