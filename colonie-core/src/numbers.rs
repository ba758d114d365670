//! Numeric conversion helpers centralizing safe numeric casts and rates.

use num_traits::cast::cast;

/// Convert a row count to `i64`, saturating at `i64::MAX`.
#[must_use]
pub fn count_to_i64(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

/// Convert a row count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn count_to_f64(count: usize) -> f64 {
    cast::<usize, f64>(count).unwrap_or(0.0)
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// Round half away from zero to `precision` decimal places.
#[must_use]
pub fn round_to(value: f64, precision: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let exponent = i32::try_from(precision).unwrap_or(i32::MAX);
    let factor = 10_f64.powi(exponent);
    (value * factor).round() / factor
}

/// `round(100 * numerator / denominator, precision)` with halves rounded up,
/// or `None` when the denominator is zero.
///
/// The quotient is rounded in integer arithmetic so exact half-points such as
/// 23/80 = 28.75 land on 28.8.
#[must_use]
pub fn percentage(numerator: usize, denominator: usize, precision: u32) -> Option<f64> {
    if denominator == 0 {
        return None;
    }
    exact_percentage(numerator, denominator, precision).or_else(|| {
        let ratio = count_to_f64(numerator) / count_to_f64(denominator);
        Some(round_to(100.0 * ratio, precision))
    })
}

/// `None` only when the scaled quotient overflows `u128`.
fn exact_percentage(numerator: usize, denominator: usize, precision: u32) -> Option<f64> {
    let factor = 10_u128.checked_pow(precision)?;
    let scale = factor.checked_mul(100)?;
    let numerator = cast::<usize, u128>(numerator)?;
    let denominator = cast::<usize, u128>(denominator)?;
    let doubled = numerator.checked_mul(scale)?.checked_mul(2)?;
    let quotient = doubled.checked_add(denominator)? / (2 * denominator);
    Some(cast::<u128, f64>(quotient)? / cast::<u128, f64>(factor)?)
}
