#![cfg(feature = "onnx")]

use std::fs;
use std::path::Path;

use lexiclass::{
    Classifier, ClassifierError, FeatureVector, Label, Model, OnnxModel, RuntimeConfig,
    MANIFEST_FILE,
};

/// ArgMax over a `[1, 4]` float input, emitting the winning column as int64.
const ARGMAX_MODEL: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/argmax_4.onnx");

fn labels(names: &[&str]) -> Vec<Label> {
    names.iter().map(|name| Label::new(*name)).collect()
}

fn write_onnx_bundle(dir: &Path, classes: &[&str]) {
    fs::copy(ARGMAX_MODEL, dir.join("model.onnx")).unwrap();
    fs::write(dir.join("vectorizer.json"), r#"{
        "vocabulary": { "buy": 0, "cheap": 1, "meeting": 2, "agenda": 3 },
        "idf": [1.0, 1.0, 1.0, 1.0],
        "max_features": 4
    }"#).unwrap();
    fs::write(dir.join(MANIFEST_FILE), format!(r#"{{
        "name": "argmax",
        "max_features": 4,
        "vectorizer": "vectorizer.json",
        "model": {{ "format": "onnx", "path": "model.onnx" }},
        "classes": {:?}
    }}"#, classes)).unwrap();
}

#[test]
fn test_class_index_maps_to_label() -> Result<(), ClassifierError> {
    let model = OnnxModel::from_file(
        Path::new(ARGMAX_MODEL),
        4,
        labels(&["buy", "cheap", "meeting", "agenda"]),
        &RuntimeConfig::single_threaded(),
    )?;
    assert_eq!(model.n_features(), 4);

    let label = model.predict(&FeatureVector::from(vec![0.1, 0.9, 0.0, 0.2]))?;
    assert_eq!(label, "cheap");
    let label = model.predict(&FeatureVector::from(vec![0.0, 0.0, 0.0, 1.0]))?;
    assert_eq!(label, "agenda");
    Ok(())
}

#[test]
fn test_class_index_beyond_classes() -> Result<(), ClassifierError> {
    let model = OnnxModel::from_file(
        Path::new(ARGMAX_MODEL),
        4,
        labels(&["ham", "spam"]),
        &RuntimeConfig::default(),
    )?;
    assert_eq!(model.predict(&FeatureVector::from(vec![0.0, 1.0, 0.0, 0.0]))?, "spam");

    let err = model.predict(&FeatureVector::from(vec![0.0, 0.0, 0.0, 1.0])).unwrap_err();
    assert!(matches!(err, ClassifierError::PredictionError(_)));
    Ok(())
}

#[test]
fn test_wrong_length_rejected_before_session_runs() -> Result<(), ClassifierError> {
    let model = OnnxModel::from_file(
        Path::new(ARGMAX_MODEL),
        4,
        labels(&["a", "b", "c", "d"]),
        &RuntimeConfig::default(),
    )?;
    let err = model.predict(&FeatureVector::from(vec![1.0, 0.0, 0.0])).unwrap_err();
    assert!(matches!(err, ClassifierError::DimensionMismatch { expected: 4, actual: 3 }));
    Ok(())
}

#[test]
fn test_missing_classes_rejected() {
    let err = OnnxModel::from_file(Path::new(ARGMAX_MODEL), 4, Vec::new(), &RuntimeConfig::default())
        .unwrap_err();
    assert!(matches!(err, ClassifierError::ModelLoadError(_)));
}

#[test]
fn test_onnx_bundle_end_to_end() -> Result<(), ClassifierError> {
    let dir = tempfile::tempdir().unwrap();
    write_onnx_bundle(dir.path(), &["buy", "cheap", "meeting", "agenda"]);

    let classifier = Classifier::builder().with_bundle(dir.path())?.build()?;
    assert_eq!(classifier.classify("meeting meeting about the agenda")?, "meeting");
    assert_eq!(classifier.classify("cheap")?, "cheap");
    assert_eq!(classifier.info().class_labels.len(), 4);
    Ok(())
}
