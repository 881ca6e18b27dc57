use core::fmt::Debug;

use num_traits::Float;

use crate::Kbn;

/// Numeric capability required of a sample value
///
/// A value is either a single real number or a fixed-width tuple of reals. Every operation
/// acts componentwise on tuples, so each channel of a vector series is fitted exactly as if
/// it were an independent scalar series.
///
/// Implemented for `f32`, `f64` and `[F; N]` for either of them.
///
/// # Examples
///
/// ```
/// use online_bezier_fit::FitValue;
///
/// let v = [1.0_f64, -4.0, 9.0];
/// assert_eq!(v.mul(v), [1.0, 16.0, 81.0]);
/// assert_eq!(v.max_zero().sqrt(), [1.0, 0.0, 3.0]);
/// assert_eq!(v.scale(0.5), [0.5, -2.0, 4.5]);
/// ```
pub trait FitValue: Copy + Debug + Send + Sync {
    /// Real type of sample times, grid sums and of every component of the value
    type Scalar: Float + Default + Debug + Send + Sync;

    /// Compensated running sum of values
    type Sum: Clone + Debug + Send + Sync;

    /// Returns the all-zero value
    fn zero() -> Self;

    /// Componentwise addition
    fn add(self, rhs: Self) -> Self;

    /// Componentwise subtraction
    fn sub(self, rhs: Self) -> Self;

    /// Componentwise multiplication
    fn mul(self, rhs: Self) -> Self;

    /// Multiplies every component by `factor`
    fn scale(self, factor: Self::Scalar) -> Self;

    /// Componentwise square root
    fn sqrt(self) -> Self;

    /// Componentwise `max(self, 0)`
    fn max_zero(self) -> Self;

    /// Returns an empty running sum
    fn new_sum() -> Self::Sum;

    /// Adds `value` into `sum`
    fn accumulate(sum: &mut Self::Sum, value: Self);

    /// Returns the current total of `sum`
    fn total(sum: &Self::Sum) -> Self;
}

macro_rules! impl_fit_value_scalar {
    ($($t:ty),*) => {
        $(
            impl FitValue for $t {
                type Scalar = $t;
                type Sum = Kbn<$t>;

                #[inline]
                fn zero() -> Self {
                    0.0
                }

                #[inline]
                fn add(self, rhs: Self) -> Self {
                    self + rhs
                }

                #[inline]
                fn sub(self, rhs: Self) -> Self {
                    self - rhs
                }

                #[inline]
                fn mul(self, rhs: Self) -> Self {
                    self * rhs
                }

                #[inline]
                fn scale(self, factor: Self::Scalar) -> Self {
                    self * factor
                }

                #[inline]
                fn sqrt(self) -> Self {
                    Float::sqrt(self)
                }

                #[inline]
                fn max_zero(self) -> Self {
                    Float::max(self, 0.0)
                }

                #[inline]
                fn new_sum() -> Self::Sum {
                    Kbn::default()
                }

                #[inline]
                fn accumulate(sum: &mut Self::Sum, value: Self) {
                    *sum += value;
                }

                #[inline]
                fn total(sum: &Self::Sum) -> Self {
                    sum.total()
                }
            }
        )*
    };
}

impl_fit_value_scalar!(f32, f64);

impl<F, const N: usize> FitValue for [F; N]
where
    F: FitValue<Scalar = F> + Float + Default,
{
    type Scalar = F;
    type Sum = [F::Sum; N];

    #[inline]
    fn zero() -> Self {
        [<F as FitValue>::zero(); N]
    }

    #[inline]
    fn add(self, rhs: Self) -> Self {
        core::array::from_fn(|i| FitValue::add(self[i], rhs[i]))
    }

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        core::array::from_fn(|i| FitValue::sub(self[i], rhs[i]))
    }

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        core::array::from_fn(|i| FitValue::mul(self[i], rhs[i]))
    }

    #[inline]
    fn scale(self, factor: F) -> Self {
        self.map(|v| FitValue::scale(v, factor))
    }

    #[inline]
    fn sqrt(self) -> Self {
        self.map(FitValue::sqrt)
    }

    #[inline]
    fn max_zero(self) -> Self {
        self.map(FitValue::max_zero)
    }

    #[inline]
    fn new_sum() -> Self::Sum {
        core::array::from_fn(|_| F::new_sum())
    }

    #[inline]
    fn accumulate(sum: &mut Self::Sum, value: Self) {
        sum.iter_mut()
            .zip(value)
            .for_each(|(s, v)| F::accumulate(s, v));
    }

    #[inline]
    fn total(sum: &Self::Sum) -> Self {
        core::array::from_fn(|i| F::total(&sum[i]))
    }
}
