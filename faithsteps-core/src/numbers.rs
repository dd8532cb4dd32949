//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Convert a u64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn u64_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(0.0)
}

/// Ratio of `part` to `whole`, returning 0.0 when `whole` is zero.
#[must_use]
pub fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    usize_to_f64(part) / usize_to_f64(whole)
}

/// Apply a signed delta to an unsigned counter, clamping at zero and saturating at the top.
#[must_use]
pub fn apply_signed_delta(current: u64, delta: i64) -> u64 {
    if delta >= 0 {
        current.saturating_add(delta.unsigned_abs())
    } else {
        current.saturating_sub(delta.unsigned_abs())
    }
}

/// Round to two decimals for path data output; non-finite values render as zero.
#[must_use]
pub fn round_to_hundredths(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_guards_zero_denominator() {
        assert!(ratio(3, 0).abs() < f64::EPSILON);
        assert!((ratio(1, 4) - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn signed_delta_clamps_at_zero() {
        assert_eq!(apply_signed_delta(10, -25), 0);
        assert_eq!(apply_signed_delta(10, 5), 15);
        assert_eq!(apply_signed_delta(u64::MAX, 1), u64::MAX);
        assert_eq!(apply_signed_delta(5, i64::MIN), 0);
    }

    #[test]
    fn rounding_handles_non_finite() {
        assert!(round_to_hundredths(f64::NAN).abs() < f64::EPSILON);
        assert!((round_to_hundredths(1.236) - 1.24).abs() < 1e-9);
    }
}
