use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::model::FeatureVector;
use super::utils::{normalize_vector, pad_to, tokenize};

/// Turns one raw text into a [`FeatureVector`] of exactly [`Vectorizer::dimension`] entries.
///
/// Implementations hold no state that a call can mutate, so one instance can
/// serve concurrent requests.
pub trait Vectorizer: Send + Sync + fmt::Debug {
    /// Number of entries in every vector this vectorizer emits
    fn dimension(&self) -> usize;

    /// Converts text into a feature vector of length `dimension()`.
    fn vectorize(&self, text: &str) -> Result<FeatureVector, ClassifierError>;

    /// Short name of the weighting mode, for logs and `ClassifierInfo`
    fn mode(&self) -> &'static str;
}

/// Normalization applied after TF-IDF weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    L2,
    None,
}

fn default_true() -> bool {
    true
}

/// TF-IDF weighting over a vocabulary and IDF table fixed at training time.
///
/// Deserializing runs the same checks as [`TfidfVectorizer::new`], so an
/// artifact with out-of-range or shared columns never becomes a value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TfidfArtifact")]
pub struct TfidfVectorizer {
    /// Term to column mapping
    vocabulary: HashMap<String, usize>,
    /// Inverse document frequency per column
    idf: Vec<f32>,
    /// Output dimensionality; columns past the vocabulary stay zero
    max_features: usize,
    #[serde(default = "default_true")]
    lowercase: bool,
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default)]
    norm: Norm,
}

/// Unchecked on-disk shape of a [`TfidfVectorizer`].
#[derive(Deserialize)]
struct TfidfArtifact {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    max_features: usize,
    #[serde(default = "default_true")]
    lowercase: bool,
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default)]
    norm: Norm,
}

impl TryFrom<TfidfArtifact> for TfidfVectorizer {
    type Error = ClassifierError;

    fn try_from(artifact: TfidfArtifact) -> Result<Self, Self::Error> {
        Ok(Self::new(artifact.vocabulary, artifact.idf, artifact.max_features)?
            .with_lowercase(artifact.lowercase)
            .with_sublinear_tf(artifact.sublinear_tf)
            .with_norm(artifact.norm))
    }
}

impl TfidfVectorizer {
    /// Creates a vectorizer from a trained vocabulary and IDF table.
    ///
    /// # Errors
    /// - `ModelLoadError` if `max_features` is zero
    /// - `ModelLoadError` if the vocabulary is larger than `max_features`
    /// - `ModelLoadError` if `idf` does not have one weight per vocabulary term
    /// - `ModelLoadError` if columns are out of range or shared by two terms
    pub fn new(
        vocabulary: HashMap<String, usize>,
        idf: Vec<f32>,
        max_features: usize,
    ) -> Result<Self, ClassifierError> {
        let vectorizer = Self {
            vocabulary,
            idf,
            max_features,
            lowercase: true,
            sublinear_tf: false,
            norm: Norm::L2,
        };
        vectorizer.validate()?;
        Ok(vectorizer)
    }

    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    pub fn with_sublinear_tf(mut self, sublinear_tf: bool) -> Self {
        self.sublinear_tf = sublinear_tf;
        self
    }

    pub fn with_norm(mut self, norm: Norm) -> Self {
        self.norm = norm;
        self
    }

    /// Loads a trained vectorizer from its JSON artifact.
    pub fn from_json_file(path: &Path) -> Result<Self, ClassifierError> {
        let file = File::open(path)
            .map_err(|e| ClassifierError::load(format!("Failed to open {}", path.display()), e))?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ClassifierError::load(format!("Failed to parse {}", path.display()), e))
    }

    pub fn vocabulary(&self) -> &HashMap<String, usize> {
        &self.vocabulary
    }

    fn validate(&self) -> Result<(), ClassifierError> {
        if self.max_features == 0 {
            return Err(ClassifierError::ModelLoadError("max_features must be positive".into()));
        }
        if self.vocabulary.len() > self.max_features {
            return Err(ClassifierError::ModelLoadError(format!(
                "Vocabulary has {} terms but max_features is {}",
                self.vocabulary.len(), self.max_features
            )));
        }
        if self.idf.len() != self.vocabulary.len() {
            return Err(ClassifierError::ModelLoadError(format!(
                "IDF table has {} weights for {} vocabulary terms",
                self.idf.len(), self.vocabulary.len()
            )));
        }
        let mut seen = vec![false; self.vocabulary.len()];
        for (term, &column) in &self.vocabulary {
            match seen.get_mut(column) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(ClassifierError::ModelLoadError(
                        format!("Column {} is assigned to more than one term", column)
                    ));
                }
                None => {
                    return Err(ClassifierError::ModelLoadError(
                        format!("Term '{}' maps to out-of-range column {}", term, column)
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Vectorizer for TfidfVectorizer {
    fn dimension(&self) -> usize {
        self.max_features
    }

    fn vectorize(&self, text: &str) -> Result<FeatureVector, ClassifierError> {
        let mut counts = vec![0.0f32; self.vocabulary.len()];
        for term in tokenize(text, self.lowercase) {
            if let Some(count) = self.vocabulary.get(&term).and_then(|&c| counts.get_mut(c)) {
                *count += 1.0;
            }
        }

        let weighted: Vec<f32> = counts.iter()
            .zip(self.idf.iter())
            .map(|(&tf, &idf)| {
                let tf = if self.sublinear_tf && tf > 0.0 { 1.0 + tf.ln() } else { tf };
                tf * idf
            })
            .collect();

        let mut vector = pad_to(&weighted, self.max_features);
        if self.norm == Norm::L2 {
            vector = normalize_vector(&vector);
        }
        Ok(FeatureVector::new(vector))
    }

    fn mode(&self) -> &'static str {
        "fixed-vocabulary"
    }
}

/// Legacy mode: refits a vocabulary of at most `max_features` terms on every
/// request text. The resulting columns follow the request's own terms, not the
/// feature space the model was trained on.
#[derive(Debug, Clone)]
pub struct RefitVectorizer {
    max_features: usize,
}

impl RefitVectorizer {
    pub fn new(max_features: usize) -> Result<Self, ClassifierError> {
        if max_features == 0 {
            return Err(ClassifierError::BuildError("max_features must be positive".into()));
        }
        Ok(Self { max_features })
    }
}

impl Vectorizer for RefitVectorizer {
    fn dimension(&self) -> usize {
        self.max_features
    }

    fn vectorize(&self, text: &str) -> Result<FeatureVector, ClassifierError> {
        // Request-scoped vocabulary, alphabetical by construction.
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for term in tokenize(text, true) {
            *counts.entry(term).or_insert(0) += 1;
        }

        let mut ranked: Vec<(&String, usize)> = counts.iter().map(|(t, &c)| (t, c)).collect();
        // Stable sort keeps alphabetical order among equal counts.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(self.max_features);
        ranked.sort_by(|a, b| a.0.cmp(b.0));

        // Single-document smoothed IDF is ln(2 / 2) + 1 = 1 for every term.
        let weighted: Vec<f32> = ranked.iter().map(|&(_, count)| count as f32).collect();
        let vector = normalize_vector(&Array1::from(weighted));
        Ok(FeatureVector::new(pad_to(&vector.to_vec(), self.max_features)))
    }

    fn mode(&self) -> &'static str {
        "legacy-refit"
    }
}
