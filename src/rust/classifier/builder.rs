use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};

use super::bundle::ModelBundle;
use super::classifier::Classifier;
use super::error::ClassifierError;
use super::model::{Label, Model};
use super::vectorizer::{RefitVectorizer, Vectorizer};

/// A builder for constructing a Classifier with a fluent interface.
///
/// The model and vectorizer are injected here instead of living in process-wide
/// state, so tests can substitute their own implementations.
#[derive(Default, Debug)]
pub struct ClassifierBuilder {
    vectorizer: Option<Arc<dyn Vectorizer>>,
    model: Option<Arc<dyn Model>>,
    default_label: Option<Label>,
    bundle_path: Option<PathBuf>,
    legacy_refit: bool,
}

impl ClassifierBuilder {
    /// Creates a new empty ClassifierBuilder instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the vectorizer and model from a bundle directory.
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - The builder instance if successful, or an error if:
    ///   - A bundle was already set
    ///   - The bundle failed to load (`ModelLoadError`)
    ///
    /// # Example
    /// ```no_run
    /// use lexiclass::ClassifierBuilder;
    ///
    /// let builder = ClassifierBuilder::new()
    ///     .with_bundle("models/spam");
    /// ```
    pub fn with_bundle(mut self, dir: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        if self.bundle_path.is_some() {
            return Err(ClassifierError::BuildError("Bundle already set".to_string()));
        }

        let bundle = ModelBundle::load(dir)?;
        if self.default_label.is_none() {
            self.default_label = Some(bundle.manifest.default_label.clone());
        }
        self.vectorizer = Some(Arc::new(bundle.vectorizer));
        self.model = Some(bundle.model);
        self.bundle_path = Some(bundle.path);
        Ok(self)
    }

    /// Sets the vectorizer, replacing one loaded from a bundle
    pub fn with_vectorizer(mut self, vectorizer: impl Vectorizer + 'static) -> Self {
        self.vectorizer = Some(Arc::new(vectorizer));
        self
    }

    /// Sets the model, replacing one loaded from a bundle
    pub fn with_model(mut self, model: Arc<dyn Model>) -> Self {
        self.model = Some(model);
        self
    }

    /// Label returned for empty input (empty by default)
    pub fn with_default_label(mut self, label: impl Into<String>) -> Self {
        self.default_label = Some(Label::new(label));
        self
    }

    /// Refits the vocabulary on every request instead of using the trained one.
    ///
    /// The refit vocabulary has the model's feature count but not its feature
    /// space; keep this for reproducing legacy behavior only.
    pub fn with_legacy_refit(mut self, enabled: bool) -> Self {
        self.legacy_refit = enabled;
        self
    }

    /// Builds and returns the final Classifier instance
    ///
    /// # Returns
    /// * `Result<Classifier, ClassifierError>` - The constructed Classifier if successful, or an error if:
    ///   - No model has been set (`BuildError`)
    ///   - No vectorizer has been set and legacy refit is off (`BuildError`)
    ///   - The vectorizer dimension differs from the model's feature count (`DimensionMismatch`)
    pub fn build(self) -> Result<Classifier, ClassifierError> {
        let model = self.model
            .ok_or_else(|| ClassifierError::BuildError("A model must be set".to_string()))?;

        let vectorizer: Arc<dyn Vectorizer> = if self.legacy_refit {
            warn!("Legacy refit mode: the vocabulary is refitted on every request");
            Arc::new(RefitVectorizer::new(model.n_features())?)
        } else {
            self.vectorizer
                .ok_or_else(|| ClassifierError::BuildError("A vectorizer must be set".to_string()))?
        };

        if vectorizer.dimension() != model.n_features() {
            return Err(ClassifierError::DimensionMismatch {
                expected: model.n_features(),
                actual: vectorizer.dimension(),
            });
        }

        info!(
            "Classifier ready: {} features, {} classes, {} vectorizer",
            vectorizer.dimension(), model.classes().len(), vectorizer.mode()
        );

        Ok(Classifier {
            vectorizer,
            model,
            default_label: self.default_label.unwrap_or_default(),
            bundle_path: self.bundle_path,
        })
    }
}
