//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    target_range.0
        + ((value - source_range.0) * (target_range.1 - target_range.0)
            / (source_range.1 - source_range.0))
}

pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float,
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Wrap a value into the half-open range `[min, min + width)`.
///
/// Values already inside the range are returned untouched so that wrapping is
/// exactly idempotent. Values outside are wrapped with a single Euclidean
/// remainder of the raw input, never by repeated addition or subtraction of
/// `width`.
pub fn wrap<T>(value: T, min: T, width: T) -> T
where
    T: Float,
{
    let max = min + width;

    if value >= min && value < max {
        return value;
    }

    // The remainder is exact and lands in [0, width]. Shifting it into the
    // target range takes a whole number of widths, and for ranges straddling
    // zero that is a single exact subtraction.
    let mut r = rem_euclid(value, width);
    while r >= max {
        r = r - width;
    }
    while r < min {
        r = r + width;
    }

    r
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 5f64), (0f64, 360f64), 2.5), 180f64);
        assert_eq!(lin_map((-1f64, 1f64), (1f64, -1f64), 0.5), -0.5);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&1.5f64, &-1.0, &1.0), 1.0);
        assert_eq!(clamp(&-1.5f64, &-1.0, &1.0), -1.0);
        assert_eq!(clamp(&0.25f64, &-1.0, &1.0), 0.25);
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap(190f64, -180.0, 360.0), -170.0);
        assert_eq!(wrap(-190f64, -180.0, 360.0), 170.0);
        assert_eq!(wrap(180f64, -180.0, 360.0), -180.0);
        assert_eq!(wrap(-180f64, -180.0, 360.0), -180.0);
        assert_eq!(wrap(720f64, -180.0, 360.0), 0.0);
        assert_eq!(wrap(-1080.5f64, -180.0, 360.0), -0.5);
        assert_eq!(wrap(370f64, 0.0, 360.0), 10.0);

        // Inside the range the value must come back bit for bit
        let x = 1e-20f64;
        assert_eq!(wrap(x, -180.0, 360.0), x);
    }

    #[test]
    fn test_rem_euclid() {
        assert_eq!(rem_euclid(-10f64, 360.0), 350.0);
        assert_eq!(rem_euclid(370f64, 360.0), 10.0);
    }
}
