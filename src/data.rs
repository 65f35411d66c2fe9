use crate::error::{Error, Result};
use crate::{ClassId, DenseMat, DenseVecView};
use itertools::Itertools;
use log::info;
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use std::time::Instant;

/// A multiclass dataset held in memory: one dense feature row and one
/// integer class label per sample.
///
/// Shapes are validated at construction, so every sample index below
/// `n_samples` and every label below `n_classes` is in range afterwards.
#[derive(Clone, Debug)]
pub struct DataSet {
    features: DenseMat,
    labels: Vec<ClassId>,
    n_classes: usize,
}

/// Parse a single data line of the form `label v1 v2 ... vd`.
fn parse_dense_data_line(line: &str, n_features: usize) -> Result<(ClassId, Vec<f64>)> {
    let mut token_iter = line.split_whitespace();

    let label = token_iter
        .next()
        .ok_or_else(|| Error::InvalidData(format!("Failed to find label in line \"{}\"", line)))?
        .parse::<ClassId>()
        .map_err(|_| Error::InvalidData(format!("Failed to parse label in line \"{}\"", line)))?;

    let values = token_iter
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| Error::InvalidData(format!("Failed to parse feature value {}", token)))
        })
        .collect::<Result<Vec<_>>>()?;
    if values.len() != n_features {
        return Err(Error::InvalidData(format!(
            "Expected {} feature values, found {} in line \"{}\"",
            n_features,
            values.len(),
            line
        )));
    }

    Ok((label, values))
}

impl DataSet {
    /// Build a dataset, inferring the class count from the largest label.
    pub fn new(features: DenseMat, labels: Vec<ClassId>) -> Result<Self> {
        let n_classes = labels.iter().max().map_or(0, |&label| label as usize + 1);
        Self::with_num_classes(features, labels, n_classes)
    }

    /// Build a dataset over an explicit class count, which allows classes
    /// that have no samples.
    pub fn with_num_classes(
        features: DenseMat,
        labels: Vec<ClassId>,
        n_classes: usize,
    ) -> Result<Self> {
        if features.nrows() == 0 {
            return Err(Error::mismatch("a non-empty dataset", "0 samples"));
        }
        if features.nrows() != labels.len() {
            return Err(Error::mismatch(
                format!("{} labels", features.nrows()),
                format!("{} labels", labels.len()),
            ));
        }
        if let Some(&label) = labels.iter().find(|&&label| label as usize >= n_classes) {
            return Err(Error::mismatch(
                format!("labels below {}", n_classes),
                format!("label {}", label),
            ));
        }
        Ok(Self {
            features,
            labels,
            n_classes,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn features(&self) -> &DenseMat {
        &self.features
    }

    pub fn labels(&self) -> &[ClassId] {
        &self.labels
    }

    pub fn feature_row(&self, i: usize) -> DenseVecView {
        self.features.row(i)
    }

    /// Load a dataset from a whitespace-separated text file.
    ///
    /// The first line is a header of 3 tokens `n_examples n_features
    /// n_classes`; each following line is `label v1 v2 ... vd`.
    pub fn load_dense_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading data from {}", path.display());
        let start_t = Instant::now();

        let file_content = fs::read_to_string(path)?;
        let lines: Vec<&str> = file_content.par_lines().collect();
        if lines.is_empty() {
            return Err(Error::InvalidData("The data file is empty".to_owned()));
        }

        let (n_examples, n_features, n_classes) = {
            let tokens = lines[0].split_whitespace().collect_vec();
            if tokens.len() != 3 {
                return Err(Error::InvalidData(format!(
                    "Expect header line with 3 space-separated tokens, found {} instead",
                    tokens.len()
                )));
            }
            let n_examples = tokens[0]
                .parse::<usize>()
                .map_err(|_| Error::InvalidData("Failed to parse number of examples".to_owned()))?;
            let n_features = tokens[1]
                .parse::<usize>()
                .map_err(|_| Error::InvalidData("Failed to parse number of features".to_owned()))?;
            let n_classes = tokens[2]
                .parse::<usize>()
                .map_err(|_| Error::InvalidData("Failed to parse number of classes".to_owned()))?;
            (n_examples, n_features, n_classes)
        };

        let rows: Vec<(ClassId, Vec<f64>)> = lines
            .into_par_iter()
            .skip(1)
            .map(|line| parse_dense_data_line(line, n_features))
            .collect::<Result<_>>()?;
        if n_examples != rows.len() {
            return Err(Error::InvalidData(format!(
                "Expected {} examples, but read {}",
                n_examples,
                rows.len()
            )));
        }

        let (labels, value_rows): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
        let features = DenseMat::from_shape_vec(
            (n_examples, n_features),
            value_rows.into_iter().flatten().collect_vec(),
        )
        .map_err(|e| Error::InvalidData(format!("Failed to assemble feature matrix: {}", e)))?;

        info!(
            "Loaded {} examples; it took {:.2}s",
            n_examples,
            start_t.elapsed().as_secs_f64()
        );
        Self::with_num_classes(features, labels, n_classes)
    }
}
