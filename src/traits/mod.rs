mod fit_value;
pub use fit_value::FitValue;
