/// Represents the different types of errors that can occur in the text classifier.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// The request text could not be accepted (bad encoding, missing form field)
    #[error("Input error: {0}")]
    InputError(String),
    /// A feature vector does not match the dimensionality the model was trained on
    #[error("Dimension mismatch: model expects {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// The model bundle or one of its artifacts could not be loaded
    #[error("Model load error: {0}")]
    ModelLoadError(String),
    /// Error occurred during the build phase
    #[error("Build error: {0}")]
    BuildError(String),
    /// Error occurred while running the decision function
    #[error("Prediction error: {0}")]
    PredictionError(String),
}

impl ClassifierError {
    pub(crate) fn load(context: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        ClassifierError::ModelLoadError(format!("{}: {}", context, err))
    }
}

#[cfg(feature = "onnx")]
impl From<ort::Error> for ClassifierError {
    fn from(err: ort::Error) -> Self {
        ClassifierError::ModelLoadError(err.to_string())
    }
}
