pub mod classifier;
pub mod confusion;
mod optimize;
pub mod partition;
mod train;

pub use classifier::{
    BinaryClassifier, Kernel, ReferenceModel, TrainBinaryClassifier, TrainHyperParam,
};
pub use confusion::ConfusionMatrix;
pub use optimize::Mu;
pub use partition::PartitionCandidate;
pub use train::{HyperParam, TreeBuilder};

use crate::{ClassId, DataSet, DenseVecView};
use log::info;
use rayon::prelude::*;

/// A binary tree of trained classifiers routing samples down to
/// single-class leaves.
pub struct Tree<M> {
    pub(crate) root: TreeNode<M>,
}

pub(crate) enum TreeNode<M> {
    Branch {
        classifier: M,
        /// children[0] is the positive side of the split.
        children: [Box<TreeNode<M>>; 2],
    },
    Leaf {
        class: ClassId,
    },
}

impl<M: BinaryClassifier> Tree<M> {
    /// Route a feature vector from the root to its predicted class.
    pub fn predict(&self, x: DenseVecView) -> ClassId {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { class } => return *class,
                TreeNode::Branch {
                    classifier,
                    children,
                } => {
                    node = if classifier.decision_value(x) >= 0. {
                        &children[0]
                    } else {
                        &children[1]
                    };
                }
            }
        }
    }

    /// Multiclass accuracy of the tree over a dataset.
    pub fn evaluate(&self, dataset: &DataSet) -> f64
    where
        M: Sync,
    {
        let n_correct = (0..dataset.n_samples())
            .into_par_iter()
            .filter(|&i| self.predict(dataset.feature_row(i)) == dataset.labels()[i])
            .count();
        let accuracy = n_correct as f64 / dataset.n_samples() as f64;
        info!(
            "Accuracy over {} samples: {:.4}",
            dataset.n_samples(),
            accuracy
        );
        accuracy
    }
}
