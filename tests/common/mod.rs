#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lexiclass::{
    ClassifierError, FeatureVector, Label, LinearModel, Model, Vectorizer, MANIFEST_FILE,
};

pub const N: usize = 10;

pub const VOCABULARY: [&str; N] = [
    "at", "buy", "cheap", "free", "meeting", "now", "pills", "see", "the", "you",
];

/// Spam terms weigh positive, everyday terms negative.
pub const WEIGHTS: [f32; N] = [-1.0, 1.0, 1.0, 1.0, -1.0, 1.0, 1.0, -1.0, -1.0, -1.0];

pub fn spam_model() -> LinearModel {
    LinearModel::new(
        vec![Label::new("ham"), Label::new("spam")],
        vec![WEIGHTS.to_vec()],
        vec![-0.1],
    )
    .unwrap()
}

fn vectorizer_json() -> String {
    let vocabulary: Vec<String> = VOCABULARY
        .iter()
        .enumerate()
        .map(|(i, term)| format!("\"{}\": {}", term, i))
        .collect();
    format!(
        r#"{{ "vocabulary": {{ {} }}, "idf": {:?}, "max_features": {} }}"#,
        vocabulary.join(", "),
        vec![1.0f32; N],
        N
    )
}

/// Writes a spam/ham bundle with a JSON linear model into `dir`.
pub fn write_spam_bundle(dir: &Path) {
    fs::write(
        dir.join(MANIFEST_FILE),
        format!(
            r#"{{
                "name": "spam",
                "max_features": {},
                "vectorizer": "vectorizer.json",
                "model": {{ "format": "linear-json", "path": "model.json" }}
            }}"#,
            N
        ),
    )
    .unwrap();
    fs::write(dir.join("vectorizer.json"), vectorizer_json()).unwrap();
    fs::write(
        dir.join("model.json"),
        format!(
            r#"{{ "classes": ["ham", "spam"], "coef": [{:?}], "intercept": [-0.1] }}"#,
            WEIGHTS.to_vec()
        ),
    )
    .unwrap();
}

/// Same bundle, with the model stored in the binary format.
pub fn write_spam_bundle_bincode(dir: &Path) {
    write_spam_bundle(dir);
    fs::write(
        dir.join(MANIFEST_FILE),
        format!(
            r#"{{
                "name": "spam-bin",
                "max_features": {},
                "vectorizer": "vectorizer.json",
                "model": {{ "format": "linear-bincode", "path": "model.bin" }},
                "default_label": "unclassified"
            }}"#,
            N
        ),
    )
    .unwrap();
    fs::write(dir.join("model.bin"), spam_model().to_bincode().unwrap()).unwrap();
}

/// Test double counting how often the decision function runs.
#[derive(Debug)]
pub struct CountingModel {
    pub calls: AtomicUsize,
    classes: Vec<Label>,
}

impl CountingModel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            classes: vec![Label::new("counted")],
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Model for CountingModel {
    fn n_features(&self) -> usize {
        N
    }

    fn classes(&self) -> &[Label] {
        &self.classes
    }

    fn decide(&self, _features: &FeatureVector) -> Result<Label, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.classes[0].clone())
    }
}

/// Test double counting how often text gets vectorized.
#[derive(Debug, Default)]
pub struct CountingVectorizer {
    pub calls: Arc<AtomicUsize>,
}

impl Vectorizer for CountingVectorizer {
    fn dimension(&self) -> usize {
        N
    }

    fn vectorize(&self, _text: &str) -> Result<FeatureVector, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(FeatureVector::from(vec![0.0; N]))
    }

    fn mode(&self) -> &'static str {
        "counting"
    }
}
