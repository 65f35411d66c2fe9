use super::classifier::ReferenceModel;
use crate::error::{Error, Result};
use crate::mat_util;
use crate::{ClassId, DataSet, DenseMat};
use log::info;

/// Symmetric K×K matrix of estimated inter-class confusion rates, used as a
/// heuristic for which classes are hardest to separate.
///
/// Built once per training run and read-only afterwards.
#[derive(Clone, Debug)]
pub struct ConfusionMatrix {
    mat: DenseMat,
}

impl ConfusionMatrix {
    /// Wrap an externally computed matrix, which must be square, symmetric
    /// and non-negative.
    pub fn new(mat: DenseMat) -> Result<Self> {
        if mat.nrows() != mat.ncols() {
            return Err(Error::mismatch(
                "a square matrix",
                format!("shape {}x{}", mat.nrows(), mat.ncols()),
            ));
        }
        for i in 0..mat.nrows() {
            for j in 0..mat.ncols() {
                if mat[[i, j]] < 0. {
                    return Err(Error::mismatch(
                        "non-negative entries",
                        format!("{} at ({}, {})", mat[[i, j]], i, j),
                    ));
                }
                if (mat[[i, j]] - mat[[j, i]]).abs() > 1e-9 {
                    return Err(Error::mismatch(
                        "a symmetric matrix",
                        format!("asymmetry at ({}, {})", i, j),
                    ));
                }
            }
        }
        Ok(Self { mat })
    }

    /// Estimate confusion between classes from a reference model's
    /// predictions against ground truth.
    ///
    /// Counts predictions at (predicted, true), divides each column by the
    /// true class's sample count and symmetrizes the result.
    pub fn estimate<R: ReferenceModel + ?Sized>(
        reference: &R,
        dataset: &DataSet,
        n_classes: usize,
    ) -> Result<Self> {
        if n_classes < dataset.n_classes() {
            return Err(Error::mismatch(
                format!("at least {} classes", dataset.n_classes()),
                format!("{} classes", n_classes),
            ));
        }

        let mut counts = DenseMat::zeros((n_classes, n_classes));
        let mut class_sizes = vec![0usize; n_classes];
        for (i, &label) in dataset.labels().iter().enumerate() {
            let predicted = reference.predict(dataset.feature_row(i));
            if predicted as usize >= n_classes {
                return Err(Error::mismatch(
                    format!("predictions below {}", n_classes),
                    format!("prediction {}", predicted),
                ));
            }
            counts[[predicted as usize, label as usize]] += 1.;
            class_sizes[label as usize] += 1;
        }

        for (j, &size) in class_sizes.iter().enumerate() {
            if size > 0 {
                counts.column_mut(j).mapv_inplace(|v| v / size as f64);
            }
        }
        mat_util::symmetrize(&mut counts);

        info!(
            "Estimated a {0}x{0} confusion matrix from {1} samples",
            n_classes,
            dataset.n_samples()
        );
        Ok(Self { mat: counts })
    }

    pub fn n_classes(&self) -> usize {
        self.mat.nrows()
    }

    pub fn get(&self, i: ClassId, j: ClassId) -> f64 {
        self.mat[[i as usize, j as usize]]
    }
}
