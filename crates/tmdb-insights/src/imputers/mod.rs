//! Imputation of invalid numeric values.
//!
//! Missing and zero cells are filled with the mean of the column's strictly
//! positive values (see [`PositiveMeanImputer`]).

mod positive_mean;

pub use positive_mean::PositiveMeanImputer;
