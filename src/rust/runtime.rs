use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;
use std::sync::OnceLock;

use crate::ClassifierError;

static INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// Graph optimisation applied when an ONNX model is committed to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizationLevel {
    Disable,
    Basic,
    Extended,
    #[default]
    All,
}

impl From<OptimizationLevel> for GraphOptimizationLevel {
    fn from(level: OptimizationLevel) -> Self {
        match level {
            OptimizationLevel::Disable => GraphOptimizationLevel::Disable,
            OptimizationLevel::Basic => GraphOptimizationLevel::Level1,
            OptimizationLevel::Extended => GraphOptimizationLevel::Level2,
            OptimizationLevel::All => GraphOptimizationLevel::Level3,
        }
    }
}

/// Execution settings for the ONNX model backend. A thread count of 0 leaves
/// the choice to ONNX Runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeConfig {
    pub inter_threads: usize,
    pub intra_threads: usize,
    pub optimization_level: OptimizationLevel,
}

impl RuntimeConfig {
    /// One thread per session; a linear decision over a few features gains
    /// nothing from a pool.
    pub fn single_threaded() -> Self {
        Self {
            inter_threads: 1,
            intra_threads: 1,
            ..Self::default()
        }
    }
}

/// Initializes the process-wide ONNX Runtime environment once. A failed
/// initialization is remembered and reported to every later caller.
pub fn ensure_initialized() -> Result<(), ClassifierError> {
    INIT.get_or_init(|| {
        ort::init()
            .with_name("lexiclass")
            .commit()
            .map(|_| ())
            .map_err(|e| e.to_string())
    })
    .clone()
    .map_err(|e| ClassifierError::ModelLoadError(format!("ONNX Runtime initialization failed: {}", e)))
}

pub fn create_session_builder(config: &RuntimeConfig) -> Result<SessionBuilder, ClassifierError> {
    ensure_initialized()?;
    let mut builder = Session::builder()?;

    if config.inter_threads > 0 {
        builder = builder.with_inter_threads(config.inter_threads)?;
    }
    if config.intra_threads > 0 {
        builder = builder.with_intra_threads(config.intra_threads)?;
    }
    Ok(builder.with_optimization_level(config.optimization_level.into())?)
}
