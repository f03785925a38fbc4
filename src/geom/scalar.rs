use num_traits::{Num, Signed};
use std::fmt::{Debug, Display};

/// Coordinate type of the geometry primitives and of both trees.
///
/// Implemented for the signed integers and the floats. Unsigned types are excluded because
/// segment deltas and normals need negative values.
pub trait Scalar:
    Copy + PartialOrd + Debug + Display + Num + Signed + Send + Sync + 'static
{
    /// `true` if the value is close enough to zero to be treated as zero.
    /// Exact for integers, machine epsilon for floats.
    fn is_small(self) -> bool;

    /// [`is_small`](Self::is_small) for a value computed in `f64` from this type.
    fn negligible(v: f64) -> bool;

    fn as_f64(self) -> f64;

    /// Convert back from `f64`. Integers round towards negative infinity.
    fn floor_from_f64(v: f64) -> Self;

    fn two() -> Self {
        Self::one() + Self::one()
    }

    fn half(self) -> Self {
        self / Self::two()
    }
}

macro_rules! impl_scalar_int {
    ($($t: ty),*) => {
        $(
            impl Scalar for $t {
                #[inline]
                fn is_small(self) -> bool {
                    self == 0
                }

                #[inline]
                fn negligible(v: f64) -> bool {
                    v == 0.0
                }

                #[inline]
                fn as_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn floor_from_f64(v: f64) -> Self {
                    v.floor() as $t
                }
            }
        )*
    };
}

macro_rules! impl_scalar_float {
    ($($t: ty),*) => {
        $(
            impl Scalar for $t {
                #[inline]
                fn is_small(self) -> bool {
                    self.abs() < <$t>::EPSILON
                }

                #[inline]
                fn negligible(v: f64) -> bool {
                    v.abs() < f64::from(<$t>::EPSILON)
                }

                #[inline]
                fn as_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn floor_from_f64(v: f64) -> Self {
                    v as $t
                }
            }
        )*
    };
}

impl_scalar_int!(i32, i64);
impl_scalar_float!(f32, f64);

/// `PartialOrd` min, picks `a` on ties and on incomparable values.
#[inline]
pub(crate) fn min<S: PartialOrd>(a: S, b: S) -> S {
    if b < a {
        b
    } else {
        a
    }
}

#[inline]
pub(crate) fn max<S: PartialOrd>(a: S, b: S) -> S {
    if b > a {
        b
    } else {
        a
    }
}
