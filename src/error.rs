// src/error.rs
use gdal::errors::GdalError;
use thiserror::Error;

use crate::tile::Feature;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the tile and GeoTIFF adapters.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed band/date selector or other construction-time setting.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Feature {0} not found in tile")]
    FeatureNotFound(Feature),

    #[error("Feature {feature} expects {expected} dimensions, got shape {shape:?}")]
    ShapeMismatch {
        feature: Feature,
        expected: usize,
        shape: Vec<usize>,
    },

    #[error("Index {index} out of bounds for {axis} axis of length {len}")]
    IndexOutOfBounds {
        axis: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invalid bounding box: {0}")]
    InvalidBbox(String),

    #[error("Pixel window has no extent: {width}x{height}")]
    EmptyWindow { width: i64, height: i64 },

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Projection error: {0}")]
    Projection(String),

    #[error("GDAL error: {0}")]
    Gdal(#[from] GdalError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration(message.into())
    }
}
