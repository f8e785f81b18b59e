use std::path::PathBuf;
use std::sync::Arc;

use log::debug;
use serde::Serialize;

use super::error::ClassifierError;
use super::model::{FeatureVector, Label, Model};
use super::vectorizer::Vectorizer;

/// Color the page uses while no text has been submitted
pub const IDLE_COLOR: &str = "orange";
/// Color the page uses to show a produced label
pub const LABELED_COLOR: &str = "green";

/// The result of one classification, as handed to the response renderer.
///
/// Built fresh for every call and never reused.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationView {
    pub text: String,
    pub label: Label,
    pub render_color: String,
}

/// A thread-safe single-document classifier: vectorizes text, then runs the model.
///
/// # Thread Safety
///
/// The vectorizer and model are shared through `Arc` and never mutated after
/// build, so one `Classifier` can serve concurrent requests without locking.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use lexiclass::{Classifier, LinearModel, Label, TfidfVectorizer};
/// use std::collections::HashMap;
/// use std::sync::Arc;
///
/// let vocabulary: HashMap<String, usize> =
///     [("cheap".to_string(), 0), ("meeting".to_string(), 1)].into_iter().collect();
/// let classifier = Classifier::builder()
///     .with_vectorizer(TfidfVectorizer::new(vocabulary, vec![1.0, 1.0], 2)?)
///     .with_model(Arc::new(LinearModel::new(
///         vec![Label::new("ham"), Label::new("spam")],
///         vec![vec![1.0, -1.0]],
///         vec![0.0],
///     )?))
///     .build()?;
///
/// assert_eq!(classifier.classify("cheap cheap cheap")?, "spam");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Classifier {
    pub(crate) vectorizer: Arc<dyn Vectorizer>,
    pub(crate) model: Arc<dyn Model>,
    pub(crate) default_label: Label,
    pub(crate) bundle_path: Option<PathBuf>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    #[allow(dead_code)]
    fn verify_thread_safety() {
        assert_send_sync::<Classifier>();
    }
};

impl Classifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    /// Returns information about the classifier's current state
    pub fn info(&self) -> super::ClassifierInfo {
        super::ClassifierInfo {
            bundle_path: self.bundle_path.clone(),
            dimension: self.vectorizer.dimension(),
            vectorizer_mode: self.vectorizer.mode(),
            class_labels: self.model.classes().to_vec(),
            default_label: self.default_label.clone(),
        }
    }

    /// Predicts the label of the input text.
    ///
    /// Empty text returns the default label without running the vectorizer or
    /// the model. Any other failure is returned unchanged.
    ///
    /// # Errors
    /// - `DimensionMismatch` if the vectorizer output disagrees with the model
    /// - `PredictionError` if the model backend fails
    pub fn classify(&self, text: &str) -> Result<Label, ClassifierError> {
        if text.is_empty() {
            return Ok(self.default_label.clone());
        }

        let features = self.vectorizer.vectorize(text)?;
        let label = self.model.predict(&features)?;
        debug!("Classified {} chars as '{}'", text.len(), label);
        Ok(label)
    }

    /// Like [`Classifier::classify`], for raw request bytes.
    ///
    /// # Errors
    /// - `InputError` if the bytes are not valid UTF-8
    pub fn classify_bytes(&self, bytes: &[u8]) -> Result<Label, ClassifierError> {
        self.classify(decode(bytes)?)
    }

    /// Classifies `text` and packs the outcome into a fresh view record.
    pub fn render(&self, text: &str) -> Result<ClassificationView, ClassifierError> {
        let label = self.classify(text)?;
        let render_color = if text.is_empty() { IDLE_COLOR } else { LABELED_COLOR };
        Ok(ClassificationView {
            text: text.to_string(),
            label,
            render_color: render_color.to_string(),
        })
    }

    /// Like [`Classifier::render`], for raw request bytes.
    ///
    /// # Errors
    /// - `InputError` if the bytes are not valid UTF-8
    pub fn render_bytes(&self, bytes: &[u8]) -> Result<ClassificationView, ClassifierError> {
        self.render(decode(bytes)?)
    }

    /// Returns the feature vector the model would see for `text`.
    pub fn vectorize(&self, text: &str) -> Result<FeatureVector, ClassifierError> {
        self.vectorizer.vectorize(text)
    }

    /// Number of features every vector has
    pub fn dimension(&self) -> usize {
        self.vectorizer.dimension()
    }
}

fn decode(bytes: &[u8]) -> Result<&str, ClassifierError> {
    std::str::from_utf8(bytes)
        .map_err(|e| ClassifierError::InputError(format!("Text is not valid UTF-8: {}", e)))
}
