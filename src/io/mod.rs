// src/io/mod.rs
pub mod reader;
pub mod window;
pub mod writer;

pub use reader::{BoundlessFill, ImportArgs, ImportFromTiff};
pub use window::{transform_from_bounds, GeoTransform, PixelWindow};
pub use writer::{ExportArgs, ExportToTiff};
