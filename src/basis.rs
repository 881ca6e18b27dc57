use num_traits::Float;

use crate::{FitError, Kbn, helper::grid_time};

/// Grid-only sums of products of the quadratic Bernstein bases.
///
/// For an `n`-point grid with sample times `t = i / (n - 1)` and `u = 1 - t`, these are the
/// five sums `Σ t·u³`, `Σ t²·u²`, `Σ t³·u`, `Σ u⁴` and `Σ t⁴`. They depend on nothing but
/// `n`, so one set serves every series fitted on the same grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasisSums<S> {
    /// Number of grid points
    n: usize,
    t1u3: S,
    t2u2: S,
    t3u1: S,
    u4: S,
    t4: S,
}

impl<S: Float + Default> BasisSums<S> {
    /// Smallest grid that determines the free control value
    ///
    /// With two points `Σ t²·u²` vanishes and the control value is undefined.
    pub const MIN_GRID: usize = 3;

    /// Computes the basis sums of an `n`-point grid
    ///
    /// # Arguments
    ///
    /// * `n` - The number of grid points, i.e. the length of every series
    ///
    /// # Returns
    ///
    /// * `Result<Self, FitError>` - The sums, or `FitError::InvalidGridSize` if `n` is smaller
    ///   than [`Self::MIN_GRID`] or not representable in `S`
    ///
    /// # Examples
    ///
    /// ```
    /// use online_bezier_fit::BasisSums;
    ///
    /// let basis = BasisSums::<f64>::new(3).unwrap();
    /// assert_eq!(basis.t2u2(), 0.0625);
    /// assert_eq!(basis.u4(), 1.0625);
    ///
    /// assert!(BasisSums::<f64>::new(2).is_err());
    /// ```
    pub fn new(n: usize) -> Result<Self, FitError> {
        let invalid = FitError::InvalidGridSize {
            n,
            min: Self::MIN_GRID,
        };
        if n < Self::MIN_GRID {
            return Err(invalid);
        }

        let mut t1u3 = Kbn::<S>::default();
        let mut t2u2 = Kbn::<S>::default();
        let mut t3u1 = Kbn::<S>::default();
        let mut u4 = Kbn::<S>::default();
        let mut t4 = Kbn::<S>::default();

        for i in 0..n {
            let t: S = grid_time(i, n).ok_or_else(|| invalid.clone())?;
            let u = S::one() - t;
            let t2 = t * t;
            let u2 = u * u;

            t1u3 += t * u * u2;
            t2u2 += t2 * u2;
            t3u1 += t * t2 * u;
            u4 += u2 * u2;
            t4 += t2 * t2;
        }

        log::debug!("computed bezier basis sums for a {n}-point grid");

        Ok(Self {
            n,
            t1u3: t1u3.total(),
            t2u2: t2u2.total(),
            t3u1: t3u1.total(),
            u4: u4.total(),
            t4: t4.total(),
        })
    }

    /// Returns the number of grid points
    pub const fn len(&self) -> usize {
        self.n
    }

    /// Returns `Σ t·u³`
    pub fn t1u3(&self) -> S {
        self.t1u3
    }

    /// Returns `Σ t²·u²`
    pub fn t2u2(&self) -> S {
        self.t2u2
    }

    /// Returns `Σ t³·u`
    pub fn t3u1(&self) -> S {
        self.t3u1
    }

    /// Returns `Σ u⁴`
    pub fn u4(&self) -> S {
        self.u4
    }

    /// Returns `Σ t⁴`
    pub fn t4(&self) -> S {
        self.t4
    }
}
