mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use lexiclass::{Classifier, ClassifierError, FeatureVector, Model, TfidfVectorizer, Vectorizer};

use common::{spam_model, CountingModel, CountingVectorizer, N};

#[test]
fn test_empty_text_skips_model() -> Result<(), ClassifierError> {
    let model = CountingModel::new();
    let vectorizer = CountingVectorizer::default();
    let vectorizer_calls = Arc::clone(&vectorizer.calls);

    let classifier = Classifier::builder()
        .with_vectorizer(vectorizer)
        .with_model(model.clone())
        .build()?;

    let label = classifier.classify("")?;
    assert!(label.is_empty());
    assert_eq!(model.calls(), 0);
    assert_eq!(vectorizer_calls.load(Ordering::SeqCst), 0);

    classifier.classify("anything")?;
    assert_eq!(model.calls(), 1);
    assert_eq!(vectorizer_calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_short_vector_is_dimension_mismatch() {
    let model = spam_model();
    let short = FeatureVector::from(vec![0.1; N - 1]);

    let err = model.predict(&short).unwrap_err();
    assert!(matches!(
        err,
        ClassifierError::DimensionMismatch { expected, actual } if expected == N && actual == N - 1
    ));
}

#[test]
fn test_long_vector_is_dimension_mismatch() {
    let model = CountingModel::new();
    let err = model.predict(&FeatureVector::from(vec![0.0; N + 1])).unwrap_err();
    assert!(matches!(err, ClassifierError::DimensionMismatch { .. }));
    // the decision function never saw the bad vector
    assert_eq!(model.calls(), 0);
}

#[test]
fn test_mismatched_vectorizer_rejected_at_build() {
    let vocabulary = [("cheap".to_string(), 0)].into_iter().collect();
    let vectorizer = TfidfVectorizer::new(vocabulary, vec![1.0], N - 1).unwrap();
    assert_eq!(vectorizer.dimension(), N - 1);

    let result = Classifier::builder()
        .with_vectorizer(vectorizer)
        .with_model(Arc::new(spam_model()))
        .build();
    assert!(matches!(result, Err(ClassifierError::DimensionMismatch { .. })));
}

#[test]
fn test_pipeline_errors_propagate_unchanged() {
    #[derive(Debug)]
    struct ShortVectorizer;

    impl Vectorizer for ShortVectorizer {
        fn dimension(&self) -> usize {
            N
        }

        // Lies about its dimension to exercise the model-side check
        fn vectorize(&self, _text: &str) -> Result<FeatureVector, ClassifierError> {
            Ok(FeatureVector::from(vec![1.0; N - 1]))
        }

        fn mode(&self) -> &'static str {
            "short"
        }
    }

    let model = CountingModel::new();
    let classifier = Classifier::builder()
        .with_vectorizer(ShortVectorizer)
        .with_model(model.clone())
        .with_default_label("default")
        .build()
        .unwrap();

    let err = classifier.classify("some text").unwrap_err();
    assert!(matches!(err, ClassifierError::DimensionMismatch { .. }));
    assert_eq!(model.calls(), 0);
}

#[test]
fn test_missing_components() {
    let result = Classifier::builder().build();
    assert!(matches!(result, Err(ClassifierError::BuildError(_))));

    let result = Classifier::builder().with_model(Arc::new(spam_model())).build();
    assert!(matches!(result, Err(ClassifierError::BuildError(_))));
}

#[test]
fn test_bundle_load_failure_is_fatal_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Classifier::builder().with_bundle(dir.path()).unwrap_err();
    assert!(matches!(err, ClassifierError::ModelLoadError(_)));
}
