use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;

/// Fixed-length TF-IDF encoding of one text, as consumed by a [`Model`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Array1<f32>);

impl FeatureVector {
    pub fn new(values: Array1<f32>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_array(&self) -> &Array1<f32> {
        &self.0
    }

    pub fn into_inner(self) -> Array1<f32> {
        self.0
    }
}

impl From<Vec<f32>> for FeatureVector {
    fn from(values: Vec<f32>) -> Self {
        Self(Array1::from(values))
    }
}

/// A class identifier produced by a [`Model`]. The default label is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for Label {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A pre-trained, immutable decision function mapping feature vectors to labels.
///
/// Implementors provide [`Model::decide`]; callers go through [`Model::predict`],
/// which rejects vectors of the wrong length instead of padding or truncating them.
pub trait Model: Send + Sync + fmt::Debug {
    /// Number of features the model was trained on
    fn n_features(&self) -> usize;

    /// Labels the model can produce
    fn classes(&self) -> &[Label];

    /// Runs the decision function. Implementations must not assume the length
    /// was checked: a wrong-length vector is an error here too, never a panic.
    fn decide(&self, features: &FeatureVector) -> Result<Label, ClassifierError>;

    fn predict(&self, features: &FeatureVector) -> Result<Label, ClassifierError> {
        let expected = self.n_features();
        if features.len() != expected {
            return Err(ClassifierError::DimensionMismatch {
                expected,
                actual: features.len(),
            });
        }
        self.decide(features)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LinearParameters {
    classes: Vec<Label>,
    coef: Vec<Vec<f32>>,
    intercept: Vec<f32>,
}

/// A linear decision function: one weight row per class, or a single row for
/// a two-class model where a positive score selects the second class.
#[derive(Debug, Clone)]
pub struct LinearModel {
    classes: Vec<Label>,
    coef: Array2<f32>,
    intercept: Array1<f32>,
}

impl LinearModel {
    /// Creates a linear model, validating that the weights agree with the classes.
    ///
    /// # Errors
    /// - `ModelLoadError` if fewer than two classes are given
    /// - `ModelLoadError` if the rows are ragged or empty
    /// - `ModelLoadError` if the row count fits neither the binary nor the multiclass form
    /// - `ModelLoadError` if `intercept` does not have one entry per row
    pub fn new(
        classes: Vec<Label>,
        coef: Vec<Vec<f32>>,
        intercept: Vec<f32>,
    ) -> Result<Self, ClassifierError> {
        if classes.len() < 2 {
            return Err(ClassifierError::ModelLoadError(
                format!("Linear model needs at least 2 classes, found {}", classes.len())
            ));
        }
        let rows = coef.len();
        let binary = rows == 1 && classes.len() == 2;
        if !binary && rows != classes.len() {
            return Err(ClassifierError::ModelLoadError(format!(
                "Linear model has {} weight rows for {} classes", rows, classes.len()
            )));
        }
        let n_features = coef.first().map(Vec::len).unwrap_or(0);
        if n_features == 0 {
            return Err(ClassifierError::ModelLoadError("Linear model has no features".into()));
        }
        if let Some(pos) = coef.iter().position(|row| row.len() != n_features) {
            return Err(ClassifierError::ModelLoadError(format!(
                "Weight row {} has {} features, expected {}", pos, coef[pos].len(), n_features
            )));
        }
        if intercept.len() != rows {
            return Err(ClassifierError::ModelLoadError(format!(
                "Linear model has {} intercepts for {} weight rows", intercept.len(), rows
            )));
        }

        let flat: Vec<f32> = coef.into_iter().flatten().collect();
        let coef = Array2::from_shape_vec((rows, n_features), flat)
            .map_err(|e| ClassifierError::load("Failed to shape weights", e))?;

        Ok(Self {
            classes,
            coef,
            intercept: Array1::from(intercept),
        })
    }

    /// Loads a model stored as JSON (`{ "classes", "coef", "intercept" }`).
    pub fn from_json_file(path: &Path) -> Result<Self, ClassifierError> {
        let file = File::open(path)
            .map_err(|e| ClassifierError::load(format!("Failed to open {}", path.display()), e))?;
        let params: LinearParameters = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ClassifierError::load(format!("Failed to parse {}", path.display()), e))?;
        Self::new(params.classes, params.coef, params.intercept)
    }

    /// Loads a model stored in the bincode binary format.
    pub fn from_bincode_file(path: &Path) -> Result<Self, ClassifierError> {
        let file = File::open(path)
            .map_err(|e| ClassifierError::load(format!("Failed to open {}", path.display()), e))?;
        let params: LinearParameters = bincode::deserialize_from(BufReader::new(file))
            .map_err(|e| ClassifierError::load(format!("Failed to decode {}", path.display()), e))?;
        Self::new(params.classes, params.coef, params.intercept)
    }

    /// Serializes the model in the bincode binary format.
    pub fn to_bincode(&self) -> Result<Vec<u8>, ClassifierError> {
        let params = LinearParameters {
            classes: self.classes.clone(),
            coef: self.coef.outer_iter().map(|row| row.to_vec()).collect(),
            intercept: self.intercept.to_vec(),
        };
        bincode::serialize(&params)
            .map_err(|e| ClassifierError::PredictionError(format!("Failed to encode model: {}", e)))
    }

    /// Raw per-row scores (`coef . x + intercept`).
    ///
    /// # Errors
    /// - `DimensionMismatch` if `features` does not have one entry per weight column
    pub fn decision_function(&self, features: &FeatureVector) -> Result<Array1<f32>, ClassifierError> {
        if features.len() != self.coef.ncols() {
            return Err(ClassifierError::DimensionMismatch {
                expected: self.coef.ncols(),
                actual: features.len(),
            });
        }
        Ok(self.coef.dot(features.as_array()) + &self.intercept)
    }
}

impl Model for LinearModel {
    fn n_features(&self) -> usize {
        self.coef.ncols()
    }

    fn classes(&self) -> &[Label] {
        &self.classes
    }

    fn decide(&self, features: &FeatureVector) -> Result<Label, ClassifierError> {
        let scores = self.decision_function(features)?;

        let index = if self.coef.nrows() == 1 {
            usize::from(scores[0] > 0.0)
        } else {
            let mut best = 0;
            for (i, &score) in scores.iter().enumerate() {
                if score > scores[best] {
                    best = i;
                }
            }
            best
        };

        self.classes.get(index).cloned().ok_or_else(|| {
            ClassifierError::PredictionError(format!("Class index {} out of range", index))
        })
    }
}
