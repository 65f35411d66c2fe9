pub type ClassId = u32;
pub type DenseVec = ndarray::Array1<f64>;
pub type DenseVecView<'a> = ndarray::ArrayView1<'a, f64>;
pub type DenseMat = ndarray::Array2<f64>;
pub type DataSet = data::DataSet;

#[cfg(test)]
#[macro_use]
extern crate assert_approx_eq;

pub mod data;
pub mod error;
mod mat_util;
pub mod model;
mod util;

pub use error::{Error, Result};
pub use model::{Tree, TreeBuilder};
