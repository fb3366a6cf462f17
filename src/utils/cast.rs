// src/utils/cast.rs
use num_traits::AsPrimitive;

/// Casts `f64` pixels into the output pixel type.
///
/// Integer targets saturate at their range, truncate fractions toward zero
/// and map NaN to zero.
pub fn cast_pixels<T, I>(values: I) -> Vec<T>
where
    T: Copy + 'static,
    f64: AsPrimitive<T>,
    I: IntoIterator<Item = f64>,
{
    values.into_iter().map(|value| value.as_()).collect()
}

pub fn cast_pixel<T>(value: f64) -> T
where
    T: Copy + 'static,
    f64: AsPrimitive<T>,
{
    value.as_()
}
