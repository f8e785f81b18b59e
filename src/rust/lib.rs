//! A thread-safe single-document text classifier: TF-IDF features over a
//! vocabulary fixed at training time, fed to a pre-trained model.
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use lexiclass::Classifier;
//!
//! let classifier = Classifier::builder()
//!     .with_bundle("models/spam")?
//!     .build()?;
//!
//! let label = classifier.classify("buy now cheap pills")?;
//! println!("Predicted class: {}", label);
//! # Ok(())
//! # }
//! ```
//!
//! Empty text short-circuits to the bundle's default label without touching
//! the model.
//!
//! # Thread Safety
//!
//! The classifier is thread-safe and can be shared across threads using `Arc`:
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use lexiclass::Classifier;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let classifier = Arc::new(Classifier::builder()
//!     .with_bundle("models/spam")?
//!     .build()?);
//!
//! let mut handles = vec![];
//! for _ in 0..3 {
//!     let classifier = Arc::clone(&classifier);
//!     handles.push(thread::spawn(move || {
//!         classifier.classify("test text").unwrap();
//!     }));
//! }
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! # Ok(())
//! # }
//! ```

pub mod classifier;
#[cfg(feature = "onnx")]
mod runtime;
pub mod bundle_store;
pub mod frontend;

pub use classifier::{
    BundleManifest, ClassificationView, Classifier, ClassifierBuilder, ClassifierError,
    ClassifierInfo, FeatureVector, Label, LinearModel, Model, ModelBundle, ModelEntry,
    ModelFormat, Norm, RefitVectorizer, TfidfVectorizer, Vectorizer, IDLE_COLOR, LABELED_COLOR,
    MANIFEST_FILE,
};
#[cfg(feature = "onnx")]
pub use classifier::OnnxModel;
#[cfg(feature = "onnx")]
pub use runtime::{create_session_builder, OptimizationLevel, RuntimeConfig};
pub use bundle_store::{ArtifactFile, BundleSource, BundleStore, StoreError};
pub use frontend::{FormRequest, PageView};

pub fn init_logger() {
    env_logger::init();
}
