use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::model::{Label, LinearModel, Model};
use super::vectorizer::{TfidfVectorizer, Vectorizer};

/// File name of the manifest inside a bundle directory
pub const MANIFEST_FILE: &str = "bundle.json";

/// Serialization format of the model artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelFormat {
    LinearJson,
    LinearBincode,
    Onnx,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    pub format: ModelFormat,
    pub path: String,
}

/// The `bundle.json` manifest tying a vectorizer and a model together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleManifest {
    pub name: String,
    /// Feature count shared by the vectorizer and the model
    pub max_features: usize,
    /// Vectorizer artifact, relative to the bundle directory
    pub vectorizer: String,
    pub model: ModelEntry,
    /// Class labels for backends whose artifact only yields class indices
    #[serde(default)]
    pub classes: Vec<Label>,
    /// Label returned for empty input
    #[serde(default)]
    pub default_label: Label,
}

/// A loaded model bundle: the trained vectorizer and model, read once at startup.
#[derive(Debug)]
pub struct ModelBundle {
    pub path: PathBuf,
    pub manifest: BundleManifest,
    pub vectorizer: TfidfVectorizer,
    pub model: Arc<dyn Model>,
}

impl ModelBundle {
    /// Reads the manifest and every artifact it names from `dir`.
    ///
    /// # Errors
    /// - `ModelLoadError` if the manifest or an artifact is missing or malformed
    /// - `ModelLoadError` if the vectorizer or model disagree with `max_features`
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let dir = dir.as_ref();
        let manifest = Self::read_manifest(dir)?;
        info!("Loading bundle '{}' from {:?}", manifest.name, dir);

        let vectorizer = TfidfVectorizer::from_json_file(&dir.join(&manifest.vectorizer))?;
        if vectorizer.dimension() != manifest.max_features {
            return Err(ClassifierError::ModelLoadError(format!(
                "Vectorizer emits {} features but the manifest declares {}",
                vectorizer.dimension(), manifest.max_features
            )));
        }
        info!("Vectorizer loaded: {} terms", vectorizer.vocabulary().len());

        let model_path = dir.join(&manifest.model.path);
        let model: Arc<dyn Model> = match manifest.model.format {
            ModelFormat::LinearJson => Arc::new(LinearModel::from_json_file(&model_path)?),
            ModelFormat::LinearBincode => Arc::new(LinearModel::from_bincode_file(&model_path)?),
            ModelFormat::Onnx => Self::load_onnx(&model_path, &manifest)?,
        };
        if model.n_features() != manifest.max_features {
            return Err(ClassifierError::ModelLoadError(format!(
                "Model expects {} features but the manifest declares {}",
                model.n_features(), manifest.max_features
            )));
        }
        info!("Model loaded: {:?} with {} classes", manifest.model.format, model.classes().len());

        Ok(Self {
            path: dir.to_path_buf(),
            manifest,
            vectorizer,
            model,
        })
    }

    pub fn read_manifest(dir: &Path) -> Result<BundleManifest, ClassifierError> {
        let path = dir.join(MANIFEST_FILE);
        let file = File::open(&path)
            .map_err(|e| ClassifierError::load(format!("Failed to open {}", path.display()), e))?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ClassifierError::load(format!("Failed to parse {}", path.display()), e))
    }

    #[cfg(feature = "onnx")]
    fn load_onnx(path: &Path, manifest: &BundleManifest) -> Result<Arc<dyn Model>, ClassifierError> {
        let model = super::onnx::OnnxModel::from_file(
            path,
            manifest.max_features,
            manifest.classes.clone(),
            &crate::RuntimeConfig::default(),
        )?;
        Ok(Arc::new(model))
    }

    #[cfg(not(feature = "onnx"))]
    fn load_onnx(path: &Path, _manifest: &BundleManifest) -> Result<Arc<dyn Model>, ClassifierError> {
        Err(ClassifierError::ModelLoadError(format!(
            "{} is an ONNX model but lexiclass was built without the `onnx` feature",
            path.display()
        )))
    }
}
