// src/tile/array.rs
use clap::ValueEnum;
use gdal::raster::GdalDataType;
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixel data types supported for tile arrays and GeoTIFF bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PixelType {
    #[default]
    U8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl PixelType {
    pub fn from_gdal(data_type: GdalDataType) -> Option<Self> {
        match data_type {
            GdalDataType::UInt8 => Some(PixelType::U8),
            GdalDataType::UInt16 => Some(PixelType::U16),
            GdalDataType::Int16 => Some(PixelType::I16),
            GdalDataType::UInt32 => Some(PixelType::U32),
            GdalDataType::Int32 => Some(PixelType::I32),
            GdalDataType::Float32 => Some(PixelType::F32),
            GdalDataType::Float64 => Some(PixelType::F64),
            _ => None,
        }
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelType::U8 => "u8",
            PixelType::U16 => "u16",
            PixelType::I16 => "i16",
            PixelType::U32 => "u32",
            PixelType::I32 => "i32",
            PixelType::F32 => "f32",
            PixelType::F64 => "f64",
        };
        f.write_str(name)
    }
}

/// N-dimensional array attribute of a tile, tagged with its element type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dtype", content = "array", rename_all = "lowercase")]
pub enum RasterArray {
    U8(ArrayD<u8>),
    U16(ArrayD<u16>),
    I16(ArrayD<i16>),
    U32(ArrayD<u32>),
    I32(ArrayD<i32>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

macro_rules! with_array {
    ($value:expr, $array:ident => $body:expr) => {
        match $value {
            RasterArray::U8($array) => $body,
            RasterArray::U16($array) => $body,
            RasterArray::I16($array) => $body,
            RasterArray::U32($array) => $body,
            RasterArray::I32($array) => $body,
            RasterArray::F32($array) => $body,
            RasterArray::F64($array) => $body,
        }
    };
}

impl RasterArray {
    pub fn shape(&self) -> &[usize] {
        with_array!(self, a => a.shape())
    }

    pub fn ndim(&self) -> usize {
        with_array!(self, a => a.ndim())
    }

    pub fn pixel_type(&self) -> PixelType {
        match self {
            RasterArray::U8(_) => PixelType::U8,
            RasterArray::U16(_) => PixelType::U16,
            RasterArray::I16(_) => PixelType::I16,
            RasterArray::U32(_) => PixelType::U32,
            RasterArray::I32(_) => PixelType::I32,
            RasterArray::F32(_) => PixelType::F32,
            RasterArray::F64(_) => PixelType::F64,
        }
    }

    /// Widened copy of the array; every supported type is exactly representable in `f64`.
    pub fn to_f64(&self) -> ArrayD<f64> {
        with_array!(self, a => a.mapv(|v| v as f64))
    }
}

macro_rules! impl_from_array {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<ArrayD<$t>> for RasterArray {
                fn from(array: ArrayD<$t>) -> Self {
                    RasterArray::$variant(array)
                }
            }
        )*
    };
}

impl_from_array!(
    u8 => U8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    f32 => F32,
    f64 => F64,
);
