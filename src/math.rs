use na::Matrix3xX;

use crate::constants::TRIANGULAR_TOLERANCE;

pub trait ApproxEqual {
    type Epsilon: Copy;
    fn approx_eq(&self, other: Self, eps: Self::Epsilon) -> bool;
    fn default_epsilon() -> Self::Epsilon;
}

impl ApproxEqual for f64 {
    type Epsilon = f64;

    fn approx_eq(&self, other: Self, eps: Self::Epsilon) -> bool {
        (self - other).abs() < eps
    }

    fn default_epsilon() -> Self::Epsilon {
        TRIANGULAR_TOLERANCE
    }
}

pub fn is_negligible<T: ApproxEqual + Copy + Default>(value: T) -> bool {
    value.approx_eq(T::default(), T::default_epsilon())
}

/// Maps a fractional coordinate onto `[0, 1)`.
pub fn wrap_unit(s: f64) -> f64 {
    let wrapped = s.rem_euclid(1.0);
    // rem_euclid rounds tiny negative inputs up to exactly 1.0
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

pub fn wrap_fractional(scaled: &mut Matrix3xX<f64>) {
    scaled.apply(|s| *s = wrap_unit(*s));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_negligible() {
        assert!(is_negligible(0.0));
        assert!(is_negligible(-9e-13));
        assert!(!is_negligible(1e-6));
        assert!(!is_negligible(-1e-12));
    }

    #[test]
    fn test_wrap_unit() {
        assert_eq!(wrap_unit(0.25), 0.25);
        assert!((wrap_unit(1.25) - 0.25).abs() < 1e-15);
        assert!((wrap_unit(-0.25) - 0.75).abs() < 1e-15);
        assert_eq!(wrap_unit(1.0), 0.0);
        assert_eq!(wrap_unit(-1e-18), 0.0);
    }

    #[test]
    fn test_wrap_fractional_stays_in_unit_interval() {
        let mut scaled = Matrix3xX::from_column_slice(&[-0.5, 1.5, 0.999, 2.0, -3.25, 0.0]);
        wrap_fractional(&mut scaled);
        for s in scaled.iter() {
            assert!((0.0..1.0).contains(s), "{} not in [0, 1)", s);
        }
    }
}
