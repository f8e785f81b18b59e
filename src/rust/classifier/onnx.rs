use std::collections::HashMap;
use std::path::Path;

use ndarray::Array2;
use ort::session::Session;
use ort::value::Tensor;
use log::info;

use super::error::ClassifierError;
use super::model::{FeatureVector, Label, Model};
use crate::runtime::{create_session_builder, RuntimeConfig};

/// A classifier exported to ONNX (e.g. a linear model converted with skl2onnx).
///
/// The graph takes one float tensor `[1, n_features]` and its first output is
/// the predicted class index as int64, mapped through `classes`.
#[derive(Debug)]
pub struct OnnxModel {
    session: Session,
    input_name: String,
    n_features: usize,
    classes: Vec<Label>,
}

impl OnnxModel {
    pub fn from_file(
        path: &Path,
        n_features: usize,
        classes: Vec<Label>,
        config: &RuntimeConfig,
    ) -> Result<Self, ClassifierError> {
        if classes.is_empty() {
            return Err(ClassifierError::ModelLoadError(
                "ONNX bundles must list their classes in the manifest".into()
            ));
        }
        let session = create_session_builder(config)?.commit_from_file(path)?;
        Self::validate_model(&session)?;
        info!("ONNX model structure validated: {:?}", path);

        let input_name = session.inputs[0].name.clone();
        Ok(Self {
            session,
            input_name,
            n_features,
            classes,
        })
    }

    fn validate_model(session: &Session) -> Result<(), ClassifierError> {
        if session.inputs.len() != 1 {
            return Err(ClassifierError::ModelLoadError(
                format!("Model must have exactly 1 feature input, found {}", session.inputs.len())
            ));
        }
        if session.outputs.is_empty() {
            return Err(ClassifierError::ModelLoadError(
                "Model must have at least 1 output for labels".to_string()
            ));
        }
        Ok(())
    }
}

impl Model for OnnxModel {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn classes(&self) -> &[Label] {
        &self.classes
    }

    fn decide(&self, features: &FeatureVector) -> Result<Label, ClassifierError> {
        let input_array = Array2::from_shape_vec((1, features.len()), features.as_array().to_vec())
            .map_err(|e| ClassifierError::PredictionError(format!("Failed to create input array: {}", e)))?;
        let input_dyn = input_array.into_dyn();
        let input = input_dyn.as_standard_layout();

        let mut input_tensors = HashMap::new();
        input_tensors.insert(self.input_name.clone(), Tensor::from_array(&input)
            .map_err(|e| ClassifierError::PredictionError(format!("Failed to create input tensor: {}", e)))?);

        let outputs = self.session.run(input_tensors)
            .map_err(|e| ClassifierError::PredictionError(format!("Failed to run model: {}", e)))?;
        let labels = outputs[0].try_extract_tensor::<i64>()
            .map_err(|e| ClassifierError::PredictionError(format!("Failed to extract label tensor: {}", e)))?;

        let index = labels.iter().next().copied()
            .ok_or_else(|| ClassifierError::PredictionError("Model produced no label".into()))?;
        usize::try_from(index)
            .ok()
            .and_then(|i| self.classes.get(i).cloned())
            .ok_or_else(|| ClassifierError::PredictionError(format!("Class index {} out of range", index)))
    }
}
