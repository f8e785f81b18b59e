use std::path::PathBuf;

mod error;
mod utils;
mod vectorizer;
mod model;
mod bundle;
#[cfg(feature = "onnx")]
mod onnx;
pub mod builder;
#[allow(clippy::module_inception)]
mod classifier;

pub use error::ClassifierError;
pub use vectorizer::{Norm, RefitVectorizer, TfidfVectorizer, Vectorizer};
pub use model::{FeatureVector, Label, LinearModel, Model};
pub use bundle::{BundleManifest, ModelBundle, ModelEntry, ModelFormat, MANIFEST_FILE};
#[cfg(feature = "onnx")]
pub use onnx::OnnxModel;
pub use builder::ClassifierBuilder;
pub use classifier::{ClassificationView, Classifier, IDLE_COLOR, LABELED_COLOR};

/// Information about the current state and configuration of a classifier
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    /// Bundle directory the classifier was loaded from, if any
    pub bundle_path: Option<PathBuf>,
    /// Length of every feature vector
    pub dimension: usize,
    /// `fixed-vocabulary` or `legacy-refit`
    pub vectorizer_mode: &'static str,
    /// Labels the model can produce
    pub class_labels: Vec<Label>,
    /// Label returned for empty input
    pub default_label: Label,
}
