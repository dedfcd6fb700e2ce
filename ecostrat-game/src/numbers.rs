//! Numeric conversion helpers centralizing lossy casts.

use num_traits::cast::cast;

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// Convert usize to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Arithmetic mean of integer samples, 0.0 when there are none.
#[must_use]
pub fn mean_i32<I>(values: I) -> f64
where
    I: IntoIterator<Item = i32>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0_i64, 0_usize), |(sum, count), v| {
            (sum + i64::from(v), count + 1)
        });
    if count == 0 {
        return 0.0;
    }
    i64_to_f64(sum) / usize_to_f64(count)
}
