// src/lib.rs
//! GeoTIFF adapters for spatio-temporal raster tiles.
//!
//! [`ExportToTiff`] writes a selected feature of a [`Tile`] to a multi-band
//! GeoTIFF; [`ImportFromTiff`] reads the window of a GeoTIFF lying under a
//! tile's bounding box back into the tile.

pub mod batch;
pub mod cli;
pub mod error;
pub mod io;
pub mod selection;
pub mod task;
pub mod tile;
pub mod utils;

pub use error::{Error, Result};
pub use io::{BoundlessFill, ExportToTiff, ImportFromTiff};
pub use selection::{BandSelection, DateRange, DateSelection};
pub use task::TileTask;
pub use tile::{BBox, Crs, Feature, FeatureType, PixelType, RasterArray, Tile};

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
