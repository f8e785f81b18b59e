use lazy_static::lazy_static;
use ndarray::Array1;
use regex::Regex;

lazy_static! {
    // Words of two or more word characters, unicode aware.
    static ref WORD_PATTERN: Regex = Regex::new(r"\b\w\w+\b").unwrap();
}

/// Splits text into terms, optionally lowercasing first.
pub(crate) fn tokenize(text: &str, lowercase: bool) -> Vec<String> {
    if lowercase {
        let lowered = text.to_lowercase();
        WORD_PATTERN.find_iter(&lowered).map(|m| m.as_str().to_string()).collect()
    } else {
        WORD_PATTERN.find_iter(text).map(|m| m.as_str().to_string()).collect()
    }
}

pub(crate) fn normalize_vector(vec: &Array1<f32>) -> Array1<f32> {
    let norm: f32 = vec.iter().map(|&x| x * x).sum::<f32>().sqrt();
    if norm > 1e-10 {
        vec / norm
    } else {
        Array1::zeros(vec.len())
    }
}

/// Copies `values` into a zero vector of exactly `dimension` entries.
pub(crate) fn pad_to(values: &[f32], dimension: usize) -> Array1<f32> {
    let mut padded = Array1::zeros(dimension);
    for (slot, &value) in padded.iter_mut().zip(values.iter()) {
        *slot = value;
    }
    padded
}
