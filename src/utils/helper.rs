use num_traits::Float;

/// Returns the constant `2` in the float type `T`
#[inline]
pub fn two<T: Float>() -> T {
    T::one() + T::one()
}

/// Returns the constant `4` in the float type `T`
#[inline]
pub fn four<T: Float>() -> T {
    two::<T>() + two::<T>()
}

/// Returns the constant `0.5` in the float type `T`
#[inline]
pub fn half<T: Float>() -> T {
    T::one() / two::<T>()
}

/// Returns the grid time `i / (n - 1)` of step `i` on an `n`-point grid
///
/// The last step lands exactly on `1`, the first exactly on `0`.
///
/// # Arguments
///
/// * `i` - The step index
/// * `n` - The number of grid points
///
/// # Returns
///
/// * `Option<T>` - The grid time, or `None` if `i` or `n - 1` is not representable in `T`
#[inline]
pub fn grid_time<T: Float>(i: usize, n: usize) -> Option<T> {
    let last = T::from(n.checked_sub(1)?)?;
    Some(T::from(i)? / last)
}
