#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]
#![deny(
    unsafe_code,
    unused_imports,
    unused_variables,
    unused_must_use,
    missing_docs,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented
)]
#![allow(clippy::just_underscores_and_digits, clippy::len_without_is_empty)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

extern crate alloc;

pub(crate) type Kbn<T> = compensated_summation::KahanBabuskaNeumaier<T>;

mod utils;
pub(crate) use utils::helper;

mod traits;
pub use traits::FitValue;

mod error;
pub use error::{Endpoint, FitError};

mod accumulator;
pub use accumulator::Accumulator;

mod basis;
pub use basis::BasisSums;

mod fitter;
pub use fitter::{BatchFitter, BezierFit, fit};
