use alloc::vec::Vec;

use num_traits::Float;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::{
    Accumulator, BasisSums, Endpoint, FitError, FitValue,
    helper::{four, half, two},
};

/// Least-squares quadratic Bezier fit of one series.
///
/// The start and end points are the samples observed at `t = 0` and `t = 1`; only the
/// middle control value is solved for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierFit<T> {
    /// Curve value at `t = 0`
    pub start: T,
    /// Middle control value minimizing the squared residuals
    pub control: T,
    /// Curve value at `t = 1`
    pub end: T,
    /// Root-mean-square residual with `n - 1` degrees of freedom, never negative
    pub std_error: T,
}

impl<T: Copy> BezierFit<T> {
    /// Returns the three control points `[start, control, end]` of the curve
    pub fn control_points(&self) -> [T; 3] {
        [self.start, self.control, self.end]
    }
}

/// Fits accumulated series to quadratic Bezier curves on a shared time grid.
///
/// The basis sums of the grid are computed once in [`BatchFitter::new`] and reused for
/// every series of every batch. Series are independent of each other; with the `rayon`
/// feature enabled they are solved in parallel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchFitter<S> {
    basis: BasisSums<S>,
}

impl<S> BatchFitter<S>
where
    S: Float + Default + Send + Sync,
{
    /// Creates a fitter for series sampled on an `n`-point grid
    ///
    /// # Arguments
    ///
    /// * `n` - The number of time steps of every series
    ///
    /// # Returns
    ///
    /// * `Result<Self, FitError>` - The fitter, or `FitError::InvalidGridSize` if the grid is
    ///   too small to determine a control value
    pub fn new(n: usize) -> Result<Self, FitError> {
        Ok(Self {
            basis: BasisSums::new(n)?,
        })
    }

    /// Returns the number of grid points every series must hold
    pub const fn len(&self) -> usize {
        self.basis.len()
    }

    /// Returns the basis sums of the grid
    pub const fn basis(&self) -> &BasisSums<S> {
        &self.basis
    }

    /// Fits a single series
    ///
    /// # Arguments
    ///
    /// * `accumulator` - The series, fed with every step of the grid
    ///
    /// # Returns
    ///
    /// * `Result<BezierFit<T>, FitError>` - The fitted curve and its standard error
    ///
    /// # Examples
    ///
    /// ```
    /// use online_bezier_fit::{Accumulator, BatchFitter};
    /// use assert_approx_eq::assert_approx_eq;
    ///
    /// let mut acc = Accumulator::<f64>::new();
    /// acc.add_data(0.0, 0.0).add_data(1.0, 0.5).add_data(0.0, 1.0);
    ///
    /// let fit = BatchFitter::new(3)?.fit_series(&acc)?;
    /// assert_eq!(fit.start, 0.0);
    /// assert_eq!(fit.end, 0.0);
    /// assert_approx_eq!(fit.control, 2.0);
    /// assert_approx_eq!(fit.std_error, 0.0);
    /// # Ok::<(), online_bezier_fit::FitError>(())
    /// ```
    pub fn fit_series<T>(&self, accumulator: &Accumulator<T>) -> Result<BezierFit<T>, FitError>
    where
        T: FitValue<Scalar = S>,
    {
        self.solve(0, accumulator)
    }

    /// Fits every series of a batch
    ///
    /// # Arguments
    ///
    /// * `accumulators` - One accumulator per series, each fed with every step of the grid
    ///
    /// # Returns
    ///
    /// * `Result<(Vec<T>, Vec<T>), FitError>` - The control values and standard errors,
    ///   index-aligned with `accumulators`
    ///
    /// # Examples
    ///
    /// ```
    /// use online_bezier_fit::{Accumulator, BatchFitter};
    /// use assert_approx_eq::assert_approx_eq;
    ///
    /// let n = 3;
    /// let series = [[0.0, 1.0, 0.0], [0.0, 1.0, 2.0]];
    /// let mut accumulators = vec![Accumulator::<f64>::new(); series.len()];
    /// for (acc, values) in accumulators.iter_mut().zip(&series) {
    ///     for (i, y) in values.iter().enumerate() {
    ///         acc.add_data(*y, i as f64 / (n - 1) as f64);
    ///     }
    /// }
    ///
    /// let (controls, errors) = BatchFitter::new(n)?.fit(&accumulators)?;
    /// assert_approx_eq!(controls[0], 2.0);
    /// assert_approx_eq!(controls[1], 1.0);
    /// assert!(errors.iter().all(|e| *e < 1e-6));
    /// # Ok::<(), online_bezier_fit::FitError>(())
    /// ```
    pub fn fit<T>(&self, accumulators: &[Accumulator<T>]) -> Result<(Vec<T>, Vec<T>), FitError>
    where
        T: FitValue<Scalar = S>,
    {
        let mut controls = alloc::vec![T::zero(); accumulators.len()];
        let mut errors = alloc::vec![T::zero(); accumulators.len()];
        self.fit_into(accumulators, &mut controls, &mut errors)?;
        Ok((controls, errors))
    }

    /// Fits every series of a batch into caller-provided buffers
    ///
    /// Each series writes only its own slot of `controls` and `errors`. When an error is
    /// returned the buffers may hold results for some of the series.
    ///
    /// # Arguments
    ///
    /// * `accumulators` - One accumulator per series, each fed with every step of the grid
    /// * `controls` - Receives the control value of each series
    /// * `errors` - Receives the standard error of each series
    ///
    /// # Returns
    ///
    /// * `Result<(), FitError>` - `FitError::OutputLengthMismatch` if a buffer length differs
    ///   from the number of series, or the first precondition violation found
    pub fn fit_into<T>(
        &self,
        accumulators: &[Accumulator<T>],
        controls: &mut [T],
        errors: &mut [T],
    ) -> Result<(), FitError>
    where
        T: FitValue<Scalar = S>,
    {
        let series = accumulators.len();
        if controls.len() != series || errors.len() != series {
            return Err(FitError::OutputLengthMismatch {
                series,
                controls: controls.len(),
                errors: errors.len(),
            });
        }

        log::debug!("fitting {series} series on a {}-point grid", self.len());

        let store = |index: usize,
                     accumulator: &Accumulator<T>,
                     control: &mut T,
                     error: &mut T|
         -> Result<(), FitError> {
            let fit = self.solve(index, accumulator)?;
            *control = fit.control;
            *error = fit.std_error;
            Ok(())
        };

        #[cfg(feature = "rayon")]
        let result = accumulators
            .par_iter()
            .zip(controls.par_iter_mut())
            .zip(errors.par_iter_mut())
            .enumerate()
            .try_for_each(|(index, ((accumulator, control), error))| {
                store(index, accumulator, control, error)
            });

        #[cfg(not(feature = "rayon"))]
        let result = accumulators
            .iter()
            .zip(controls.iter_mut())
            .zip(errors.iter_mut())
            .enumerate()
            .try_for_each(|(index, ((accumulator, control), error))| {
                store(index, accumulator, control, error)
            });

        if result.is_ok() {
            log::debug!("fitted {series} series");
        }
        result
    }

    /// Checks the preconditions of series `index`
    fn validate<T>(&self, index: usize, accumulator: &Accumulator<T>) -> Result<(), FitError>
    where
        T: FitValue<Scalar = S>,
    {
        let missing = |endpoint| FitError::MissingEndpoint {
            series: index,
            endpoint,
        };
        let err = if !accumulator.has_y0() {
            missing(Endpoint::Start)
        } else if !accumulator.has_y1() {
            missing(Endpoint::End)
        } else if accumulator.len() != self.len() {
            FitError::SampleCountMismatch {
                series: index,
                expected: self.len(),
                actual: accumulator.len(),
            }
        } else {
            return Ok(());
        };

        log::warn!("rejecting series: {err}");
        Err(err)
    }

    /// Solves the control value of series `index` and its standard error
    fn solve<T>(&self, index: usize, accumulator: &Accumulator<T>) -> Result<BezierFit<T>, FitError>
    where
        T: FitValue<Scalar = S>,
    {
        self.validate(index, accumulator)?;

        let b = &self.basis;
        let (_2, _4) = (two::<S>(), four::<S>());

        let p0 = accumulator.y0();
        let p2 = accumulator.y1();
        let sum_y = accumulator.sum_y();
        let sum_yt = accumulator.sum_yt();
        let sum_yt2 = accumulator.sum_yt2();

        // d/dc Σ (y - B(t))² = 0, with Σ u·t·y = Σ y·t - Σ y·t²
        let control = sum_yt
            .sub(sum_yt2)
            .sub(p0.scale(b.t1u3()))
            .sub(p2.scale(b.t3u1()))
            .scale(half::<S>() / b.t2u2());

        // Σ B(t)², expanded over the basis sums
        let sum_fitted_sq = p0
            .mul(p0)
            .scale(b.u4())
            .add(control.mul(control).scale(_4 * b.t2u2()))
            .add(p2.mul(p2).scale(b.t4()))
            .add(p0.mul(control).scale(_4 * b.t1u3()))
            .add(p0.mul(p2).scale(_2 * b.t2u2()))
            .add(control.mul(p2).scale(_4 * b.t3u1()));

        // Σ y·B(t), using u² = 1 - 2t + t²
        let cross = p0
            .mul(sum_y)
            .add(control.sub(p0).mul(sum_yt).scale(_2))
            .add(p0.sub(control.scale(_2)).add(p2).mul(sum_yt2));

        let dof = S::from(self.len() - 1).ok_or(FitError::InvalidGridSize {
            n: self.len(),
            min: BasisSums::<S>::MIN_GRID,
        })?;

        // Cancellation can leave a tiny negative variance
        let variance = accumulator
            .sum_y2()
            .sub(cross.scale(_2))
            .add(sum_fitted_sq)
            .scale(S::one() / dof);

        Ok(BezierFit {
            start: p0,
            control,
            end: p2,
            std_error: variance.max_zero().sqrt(),
        })
    }
}

/// Fits every series of a batch on an `n`-point grid
///
/// Shorthand for [`BatchFitter::new`] followed by [`BatchFitter::fit`].
///
/// # Arguments
///
/// * `accumulators` - One accumulator per series, each fed with every step of the grid
/// * `n` - The number of grid points
///
/// # Returns
///
/// * `Result<(Vec<T>, Vec<T>), FitError>` - The control values and standard errors,
///   index-aligned with `accumulators`
pub fn fit<T: FitValue>(
    accumulators: &[Accumulator<T>],
    n: usize,
) -> Result<(Vec<T>, Vec<T>), FitError> {
    BatchFitter::<T::Scalar>::new(n)?.fit(accumulators)
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use assert_approx_eq::assert_approx_eq;

    use super::*;

    fn accumulate<T: FitValue>(values: &[T]) -> Accumulator<T> {
        let n = values.len();
        let mut acc = Accumulator::new();
        for (i, y) in values.iter().enumerate() {
            let t = crate::helper::grid_time::<T::Scalar>(i, n).unwrap();
            acc.add_data(*y, t);
        }
        acc
    }

    fn bezier(p0: f64, c: f64, p2: f64, t: f64) -> f64 {
        let u = 1.0 - t;
        p0 * u * u + c * 2.0 * u * t + p2 * t * t
    }

    // Direct evaluation of the residual over the grid
    fn brute_force_std_error(values: &[f64], p0: f64, c: f64, p2: f64) -> f64 {
        let n = values.len();
        let ss: f64 = values
            .iter()
            .enumerate()
            .map(|(i, y)| {
                let t = i as f64 / (n - 1) as f64;
                let r = y - bezier(p0, c, p2, t);
                r * r
            })
            .sum();
        (ss / (n - 1) as f64).sqrt()
    }

    #[test]
    fn exact_interpolation_works() {
        let acc = accumulate(&[0.0_f64, 1.0, 0.0]);
        let (controls, errors) = fit(&[acc], 3).unwrap();

        assert_eq!(controls.len(), 1);
        assert_approx_eq!(controls[0], 2.0);
        assert_approx_eq!(errors[0], 0.0);
    }

    #[test]
    fn three_points_always_fit_exactly() {
        let acc = accumulate(&[0.0_f64, 1.0, 2.0]);
        let (controls, errors) = fit(&[acc], 3).unwrap();

        assert_approx_eq!(controls[0], 1.0);
        assert_approx_eq!(errors[0], 0.0);
    }

    #[test]
    fn curve_samples_are_recovered() {
        let n = 11;
        let values: Vec<f64> = (0..n)
            .map(|i| bezier(-1.5, 4.25, 3.0, i as f64 / (n - 1) as f64))
            .collect();

        let fit = BatchFitter::new(n)
            .unwrap()
            .fit_series(&accumulate(&values))
            .unwrap();
        assert_eq!(fit.control_points()[0], -1.5);
        assert_approx_eq!(fit.control, 4.25, 1e-9);
        assert_eq!(fit.end, 3.0);
        assert_approx_eq!(fit.std_error, 0.0, 1e-6);
    }

    #[test]
    fn overdetermined_residual_is_positive() {
        let values = [0.0_f64, 3.0, -1.0, 2.0, 0.5];
        let fit = BatchFitter::new(5)
            .unwrap()
            .fit_series(&accumulate(&values))
            .unwrap();

        assert!(fit.std_error > 0.0);
        let expected = brute_force_std_error(&values, fit.start, fit.control, fit.end);
        assert_approx_eq!(fit.std_error, expected, 1e-9);
    }

    #[test]
    fn control_minimizes_squared_residuals() {
        let values: [f64; 10] = [1.0, 2.0, 3.0, 100.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let fit = BatchFitter::new(values.len())
            .unwrap()
            .fit_series(&accumulate(&values))
            .unwrap();

        let at = |c: f64| brute_force_std_error(&values, fit.start, c, fit.end);
        let best = at(fit.control);
        assert_approx_eq!(fit.std_error, best, 1e-9);
        assert!(best < at(fit.control + 0.01));
        assert!(best < at(fit.control - 0.01));
    }

    #[test]
    fn matches_reference_sequences() {
        let sequences: [[f32; 10]; 3] = [
            [1.0, 2.0, 3.0, 100.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0],
            [1.0, 8.0, 27.0, 100.0, 125.0, 196.0, 343.0, 512.0, 729.0, 1111.0],
            [1.0, 4.0, 9.0, 16.0, 25.0, 36.0, 49.0, 64.0, 81.0, 100.0],
        ];
        let accumulators: Vec<_> = sequences.iter().map(|s| accumulate(s)).collect();
        let (controls, errors) = fit(&accumulators, 10).unwrap();

        for (s, values) in sequences.iter().enumerate() {
            let as_f64: Vec<f64> = values.iter().map(|v| *v as f64).collect();
            let reference = BatchFitter::new(10)
                .unwrap()
                .fit_series(&accumulate(&as_f64))
                .unwrap();
            assert_approx_eq!(controls[s] as f64, reference.control, 1e-3);
            assert_approx_eq!(errors[s] as f64, reference.std_error, 0.1);
        }
    }

    #[test]
    fn vector_series_match_scalar_fits() {
        let n = 10;
        let xs: [f64; 10] = [1.0, 2.0, 3.0, 100.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let ys: [f64; 10] = [1.0, 8.0, 27.0, 100.0, 125.0, 196.0, 343.0, 512.0, 729.0, 1111.0];
        let zs: [f64; 10] = [1.0, 4.0, 9.0, 16.0, 25.0, 36.0, 49.0, 64.0, 81.0, 100.0];
        let vectors: Vec<[f64; 3]> = (0..n).map(|i| [xs[i], ys[i], zs[i]]).collect();

        let fitter = BatchFitter::new(n).unwrap();
        let vector = fitter.fit_series(&accumulate(&vectors)).unwrap();
        for (channel, values) in [xs, ys, zs].iter().enumerate() {
            let scalar = fitter.fit_series(&accumulate(values)).unwrap();
            assert_approx_eq!(vector.control[channel], scalar.control, 1e-9);
            assert_approx_eq!(vector.std_error[channel], scalar.std_error, 1e-9);
        }
    }

    #[test]
    fn empty_batch_works() {
        let (controls, errors) = fit::<f64>(&[], 4).unwrap();
        assert!(controls.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn degenerate_grid_is_rejected() {
        let acc = accumulate(&[1.0_f64, 2.0]);
        for n in 0..3 {
            assert_eq!(
                fit(core::slice::from_ref(&acc), n),
                Err(FitError::InvalidGridSize { n, min: 3 })
            );
        }
    }

    #[test]
    fn missing_endpoints_are_rejected() {
        let mut no_start = Accumulator::<f64>::new();
        no_start.add_data(1.0, 0.5).add_data(2.0, 1.0).add_data(3.0, 0.25);
        let mut no_end = Accumulator::<f64>::new();
        no_end.add_data(1.0, 0.0).add_data(2.0, 0.5).add_data(3.0, 0.999_999);

        let fitter = BatchFitter::new(3).unwrap();
        assert_eq!(
            fitter.fit(&[accumulate(&[0.0, 0.0, 0.0]), no_start]),
            Err(FitError::MissingEndpoint {
                series: 1,
                endpoint: Endpoint::Start
            })
        );
        assert_eq!(
            fitter.fit_series(&no_end),
            Err(FitError::MissingEndpoint {
                series: 0,
                endpoint: Endpoint::End
            })
        );
    }

    #[test]
    fn sample_count_mismatch_is_rejected() {
        let acc = accumulate(&[1.0_f64, 2.0, 3.0, 4.0]);
        assert_eq!(
            fit(&[acc], 5),
            Err(FitError::SampleCountMismatch {
                series: 0,
                expected: 5,
                actual: 4
            })
        );
    }

    #[test]
    fn fit_into_checks_buffer_lengths() {
        let accumulators = [accumulate(&[0.0_f64, 1.0, 0.0]), accumulate(&[0.0, 1.0, 2.0])];
        let fitter = BatchFitter::new(3).unwrap();

        let mut controls = [0.0; 2];
        let mut errors = [0.0; 1];
        assert_eq!(
            fitter.fit_into(&accumulators, &mut controls, &mut errors),
            Err(FitError::OutputLengthMismatch {
                series: 2,
                controls: 2,
                errors: 1
            })
        );

        let mut errors = [f64::NAN; 2];
        fitter
            .fit_into(&accumulators, &mut controls, &mut errors)
            .unwrap();
        assert_approx_eq!(controls[0], 2.0);
        assert_approx_eq!(controls[1], 1.0);
        assert!(errors.iter().all(|e| *e >= 0.0));
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn parallel_batch_matches_series_fits() {
        let n = 17;
        let accumulators: Vec<Accumulator<f64>> = (0..4096)
            .map(|s| {
                let values: Vec<f64> = (0..n)
                    .map(|i| ((s * 31 + i * 7) % 23) as f64 - 11.0)
                    .collect();
                accumulate(&values)
            })
            .collect();

        let fitter = BatchFitter::new(n).unwrap();
        let (controls, errors) = fitter.fit(&accumulators).unwrap();

        assert_eq!(controls.len(), accumulators.len());
        assert_eq!(errors.len(), accumulators.len());
        for (i, acc) in accumulators.iter().enumerate() {
            let fit = fitter.fit_series(acc).unwrap();
            assert_eq!(controls[i], fit.control);
            assert_eq!(errors[i], fit.std_error);
        }
    }

    #[test]
    fn fitter_is_reusable_across_batches() {
        let fitter = BatchFitter::new(3).unwrap();
        let first = fitter.fit(&[accumulate(&[0.0_f64, 1.0, 0.0])]).unwrap();
        let second = fitter.fit(&[accumulate(&[0.0_f64, 1.0, 0.0])]).unwrap();
        assert_eq!(first, second);
    }
}
