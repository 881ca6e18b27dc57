use num_traits::{One, Zero};

use crate::FitValue;

/// Online summary of one time series for a later quadratic Bezier fit.
///
/// `Accumulator<T>` consumes samples one at a time and keeps only four running sums and the
/// two endpoint values, so its size does not depend on the length of the sequence. Once every
/// step of the time grid has been added, the accumulator is handed to a
/// [`BatchFitter`](crate::BatchFitter) together with the grid size.
///
/// The running sums use Kahan-Babuska-Neumaier compensated summation, which keeps long
/// sequences free of accumulated rounding drift.
///
/// Endpoints are captured only by samples whose time is exactly `0` or `1`. Pass the grid
/// times verbatim (e.g. `i as f64 / (n - 1) as f64`) rather than accumulating `t += dt`.
#[derive(Debug, Clone)]
pub struct Accumulator<T: FitValue> {
    /// Sum of values
    sum_y: T::Sum,
    /// Sum of `y * t`
    sum_yt: T::Sum,
    /// Sum of `y * t^2`
    sum_yt2: T::Sum,
    /// Sum of componentwise squares `y * y`
    sum_y2: T::Sum,
    /// Value captured at `t == 0`
    y0: T,
    /// Value captured at `t == 1`
    y1: T,
    /// Whether a sample at `t == 0` was captured
    has_y0: bool,
    /// Whether a sample at `t == 1` was captured
    has_y1: bool,
    /// Number of samples added
    len: usize,
}

impl<T: FitValue> Default for Accumulator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FitValue> Accumulator<T> {
    /// Creates an empty accumulator
    ///
    /// # Returns
    ///
    /// * `Self` - The accumulator with all sums and endpoints set to zero
    pub fn new() -> Self {
        Self {
            sum_y: T::new_sum(),
            sum_yt: T::new_sum(),
            sum_yt2: T::new_sum(),
            sum_y2: T::new_sum(),
            y0: T::zero(),
            y1: T::zero(),
            has_y0: false,
            has_y1: false,
            len: 0,
        }
    }

    /// Resets the accumulator so it can summarize a new series
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The accumulator
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::new();
        self
    }

    /// Adds the sample `value` observed at normalized time `t`
    ///
    /// `t` must lie in `[0, 1]`. Samples may arrive in any order; adding the same time twice
    /// counts it twice. A sample at exactly `t == 0` becomes the start point of the curve and
    /// one at exactly `t == 1` becomes its end point, later samples overriding earlier ones.
    ///
    /// # Arguments
    ///
    /// * `value` - The sample value
    /// * `t` - The normalized sample time
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The accumulator
    ///
    /// # Examples
    ///
    /// ```
    /// use online_bezier_fit::Accumulator;
    ///
    /// let mut acc = Accumulator::<f64>::new();
    /// acc.add_data(0.0, 0.0).add_data(1.0, 0.5).add_data(0.0, 1.0);
    ///
    /// assert_eq!(acc.len(), 3);
    /// assert_eq!(acc.sum_y(), 1.0);
    /// assert_eq!(acc.sum_yt(), 0.5);
    /// assert_eq!(acc.sum_yt2(), 0.25);
    /// assert!(acc.has_y0() && acc.has_y1());
    /// ```
    pub fn add_data(&mut self, value: T, t: T::Scalar) -> &mut Self {
        debug_assert!(
            t >= T::Scalar::zero() && t <= T::Scalar::one(),
            "sample time {t:?} outside [0, 1]"
        );

        let yt = value.scale(t);
        T::accumulate(&mut self.sum_y, value);
        T::accumulate(&mut self.sum_yt, yt);
        T::accumulate(&mut self.sum_yt2, yt.scale(t));
        T::accumulate(&mut self.sum_y2, value.mul(value));

        if t == T::Scalar::zero() {
            self.y0 = value;
            self.has_y0 = true;
        }
        if t == T::Scalar::one() {
            self.y1 = value;
            self.has_y1 = true;
        }

        self.len += 1;
        self
    }

    /// Returns the number of samples added since creation or the last reset
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the sum of all sample values
    pub fn sum_y(&self) -> T {
        T::total(&self.sum_y)
    }

    /// Returns the sum of `y * t` over all samples
    pub fn sum_yt(&self) -> T {
        T::total(&self.sum_yt)
    }

    /// Returns the sum of `y * t^2` over all samples
    pub fn sum_yt2(&self) -> T {
        T::total(&self.sum_yt2)
    }

    /// Returns the sum of componentwise squares `y * y` over all samples
    pub fn sum_y2(&self) -> T {
        T::total(&self.sum_y2)
    }

    /// Returns the value captured at `t == 0`, or zero if none was added
    pub fn y0(&self) -> T {
        self.y0
    }

    /// Returns the value captured at `t == 1`, or zero if none was added
    pub fn y1(&self) -> T {
        self.y1
    }

    /// Returns `true` once a sample at exactly `t == 0` has been added
    pub const fn has_y0(&self) -> bool {
        self.has_y0
    }

    /// Returns `true` once a sample at exactly `t == 1` has been added
    pub const fn has_y1(&self) -> bool {
        self.has_y1
    }
}
