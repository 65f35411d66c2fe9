use super::classifier::{Kernel, ReferenceModel, TrainBinaryClassifier, TrainHyperParam};
use super::confusion::ConfusionMatrix;
use super::optimize::{NodeOptimizer, NodeSplit};
use super::partition;
use super::{Tree, TreeNode};
use crate::error::{Error, Result};
use crate::mat_util::find_max;
use crate::util::{create_progress_bar, ProgressBar};
use crate::{ClassId, DataSet};
use itertools::Itertools;
use log::{debug, info};
use rayon::prelude::*;
use std::time::Instant;

/// Hyper-parameter settings for building a tree.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HyperParam {
    /// Cap on alternating-optimization iterations per partition candidate.
    pub max_iter: usize,
    /// Cap on partition candidates tried per node.
    pub max_candidates: usize,
    /// Settings for the per-node binary classifiers.
    pub svm: TrainHyperParam,
}

impl Default for HyperParam {
    fn default() -> Self {
        Self {
            max_iter: 3,
            max_candidates: 30,
            svm: TrainHyperParam::default(),
        }
    }
}

impl HyperParam {
    fn validate(&self) -> Result<()> {
        if self.max_iter == 0 {
            return Err(Error::config("max_iter must be at least 1"));
        }
        if self.max_candidates == 0 {
            return Err(Error::config("max_candidates must be at least 1"));
        }
        Ok(())
    }
}

/// Builds a tree of binary classifiers guided by a confusion matrix.
///
/// The confusion matrix is estimated once from the reference model, then
/// nodes are constructed recursively: partition candidates are generated
/// from the confusion between the node's classes, each candidate is refined
/// by alternating optimization, and the best split decides the children.
pub struct TreeBuilder<T, K, R> {
    trainer: T,
    kernel: Option<K>,
    reference_model: Option<R>,
    hyper_param: HyperParam,
}

impl<T, K, R> TreeBuilder<T, K, R>
where
    T: TrainBinaryClassifier,
    K: Kernel,
    R: ReferenceModel,
{
    pub fn new(trainer: T) -> Self {
        Self {
            trainer,
            kernel: None,
            reference_model: None,
            hyper_param: HyperParam::default(),
        }
    }

    pub fn kernel(mut self, kernel: K) -> Self {
        self.kernel = Some(kernel);
        self
    }

    pub fn reference_model(mut self, reference_model: R) -> Self {
        self.reference_model = Some(reference_model);
        self
    }

    pub fn hyper_param(mut self, hyper_param: HyperParam) -> Self {
        self.hyper_param = hyper_param;
        self
    }

    /// Build the tree for the given dataset.
    ///
    /// Fails with a configuration error before any estimation or training
    /// if the reference model or the kernel is missing.
    pub fn build(&self, dataset: &DataSet) -> Result<Tree<T::Model>> {
        let reference = self
            .reference_model
            .as_ref()
            .ok_or_else(|| Error::config("set a reference model before building"))?;
        let kernel = self
            .kernel
            .as_ref()
            .ok_or_else(|| Error::config("assign a kernel before building"))?;
        self.hyper_param.validate()?;

        let n_classes = dataset.n_classes();
        info!(
            "Building a tree over {} classes from {} samples",
            n_classes,
            dataset.n_samples()
        );
        let start_t = Instant::now();

        let confusion = ConfusionMatrix::estimate(reference, dataset, n_classes)?;
        let optimizer = NodeOptimizer::new(
            &self.trainer,
            kernel,
            dataset,
            self.hyper_param.svm,
            self.hyper_param.max_iter,
        );

        let class_set = (0..n_classes as ClassId).collect_vec();
        let mut progress = create_progress_bar(n_classes.saturating_sub(1) as u64);
        let root = self.build_subtree(&confusion, &optimizer, &class_set, &mut progress)?;
        progress.finish();

        info!("Built the tree in {:.2}s", start_t.elapsed().as_secs_f64());
        Ok(Tree { root })
    }

    fn build_subtree(
        &self,
        confusion: &ConfusionMatrix,
        optimizer: &NodeOptimizer<T>,
        class_set: &[ClassId],
        progress: &mut ProgressBar,
    ) -> Result<TreeNode<T::Model>> {
        assert!(!class_set.is_empty());
        if let &[class] = class_set {
            return Ok(TreeNode::Leaf { class });
        }

        let candidates = partition::generate(confusion, class_set, self.hyper_param.max_candidates);
        debug!(
            "Trying {} partition candidates for classes {:?}",
            candidates.len(),
            class_set
        );

        // Index-only subset views keep sibling candidates independent, so
        // they can be optimized in parallel.
        let mut splits = candidates
            .par_iter()
            .map(|candidate| optimizer.optimize(candidate, class_set))
            .collect::<Result<Vec<_>>>()?;

        let scores = splits.iter().map(|split| split.accuracy).collect_vec();
        let (accuracy, best) = find_max(&scores).ok_or_else(|| {
            Error::Training(format!("no viable partition for classes {:?}", class_set))
        })?;
        let NodeSplit { model, mu, .. } = splits.swap_remove(best);
        debug!(
            "Split classes {:?} on pair {:?} with training accuracy {:.3}",
            class_set, candidates[best].classes, accuracy
        );

        // The winning coloring is total over the class set; the seed pair
        // pins one class on each side, so neither child is empty
        let (positive, negative): (Vec<ClassId>, Vec<ClassId>) = class_set
            .iter()
            .partition(|&&class| mu.assignment(class) > 0);
        progress.inc();

        let children = [
            Box::new(self.build_subtree(confusion, optimizer, &positive, progress)?),
            Box::new(self.build_subtree(confusion, optimizer, &negative, progress)?),
        ];
        Ok(TreeNode::Branch {
            classifier: model,
            children,
        })
    }
}
