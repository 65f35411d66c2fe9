//! Collaborator seams consumed by the tree builder.
//!
//! The binary classifier's internal optimization, the kernel math and the
//! multiclass reference model are all external concerns; the tree only
//! supplies labels, subset indices, a kernel and hyper-parameters through
//! these traits and retrieves trained model handles back.

use crate::error::Result;
use crate::{ClassId, DenseMat, DenseVecView};

/// Pairwise similarity between two feature vectors.
///
/// Implementations hold no per-subset state, so restricting training to a
/// sample subset never requires re-initializing the kernel.
pub trait Kernel: Send + Sync {
    fn compute(&self, x: DenseVecView, y: DenseVecView) -> f64;
}

/// A trained binary decision function.
///
/// The sign of the decision value routes samples down the tree: non-negative
/// goes to the positive child, negative to the negative child.
pub trait BinaryClassifier: Send {
    fn decision_value(&self, x: DenseVecView) -> f64;
}

/// Trains binary classifiers on an index-restricted view of a feature
/// matrix.
///
/// `samples` and `targets` have equal length; `samples[i]` is a row index
/// into `features` and `targets[i]` is its ±1 label. Implementations must
/// fail with an error rather than panic on empty or single-sided input.
pub trait TrainBinaryClassifier: Send + Sync {
    type Model: BinaryClassifier;

    fn train(
        &self,
        kernel: &dyn Kernel,
        features: &DenseMat,
        samples: &[usize],
        targets: &[f64],
        hyper_param: &TrainHyperParam,
    ) -> Result<Self::Model>;
}

/// A trained multiclass model, used only for confusion-matrix estimation.
pub trait ReferenceModel: Send + Sync {
    fn predict(&self, x: DenseVecView) -> ClassId;
}

/// Hyper-parameter settings passed to the per-node binary classifiers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrainHyperParam {
    /// Regularization constant.
    pub c: f64,
    /// Convergence tolerance.
    pub eps: f64,
}

impl Default for TrainHyperParam {
    fn default() -> Self {
        Self { c: 1., eps: 1e-3 }
    }
}
