//! Model runtimes behind the inference engine

use std::path::{Path, PathBuf};
use tract_onnx::prelude::*;
use tracing::info;

use crate::error::{DetectorError, Result};
use crate::preprocessing::{ImageTensor, INPUT_SHAPE};

/// Raw two-way model output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassScores {
    /// Output index 0
    pub not_cat: f32,
    /// Output index 1
    pub cat: f32,
}

impl ClassScores {
    /// Read scores from a model output vector, which must hold exactly two values
    pub fn from_output(output: &[f32]) -> Result<Self> {
        match output {
            [not_cat, cat] => Ok(Self { not_cat: *not_cat, cat: *cat }),
            _ => Err(DetectorError::ShapeError {
                expected: "output vector of length 2".to_string(),
                actual: format!("length {}", output.len()),
            }),
        }
    }
}

/// A loaded model that scores one image tensor.
///
/// Implementations must be deterministic and callable from several threads.
pub trait Classifier: Send + Sync {
    fn classify(&self, tensor: &ImageTensor) -> Result<ClassScores>;

    /// Short description used in status output and logs
    fn describe(&self) -> String;
}

/// Classifier backed by an ONNX model run with tract
pub struct OnnxClassifier {
    plan: TypedRunnableModel<TypedModel>,
    path: PathBuf,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier").field("path", &self.path).finish()
    }
}

impl OnnxClassifier {
    /// Load and optimize the model at `path`.
    ///
    /// Any failure here is a [`DetectorError::StartupFailure`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DetectorError::StartupFailure(format!(
                "model artifact not found at {}",
                path.display()
            )));
        }

        let startup = |stage: &str, e: TractError| {
            DetectorError::StartupFailure(format!("{} {}: {}", stage, path.display(), e))
        };

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(|e| startup("failed to parse model", e))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(
                    INPUT_SHAPE[0],
                    INPUT_SHAPE[1],
                    INPUT_SHAPE[2],
                    INPUT_SHAPE[3]
                )),
            )
            .map_err(|e| startup("model does not accept a 1x224x224x3 input", e))?
            .into_optimized()
            .map_err(|e| startup("failed to optimize model", e))?
            .into_runnable()
            .map_err(|e| startup("failed to prepare model", e))?;

        info!(path = %path.display(), "ONNX model loaded");

        Ok(Self {
            plan,
            path: path.to_path_buf(),
        })
    }
}

impl Classifier for OnnxClassifier {
    fn classify(&self, tensor: &ImageTensor) -> Result<ClassScores> {
        let input: Tensor = tensor.clone().into();
        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| DetectorError::InferenceError(e.to_string()))?;

        let output = outputs.first().ok_or_else(|| {
            DetectorError::InferenceError("model produced no outputs".to_string())
        })?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| DetectorError::InferenceError(e.to_string()))?;
        let values: Vec<f32> = view.iter().copied().collect();

        ClassScores::from_output(&values)
    }

    fn describe(&self) -> String {
        format!("onnx:{}", self.path.display())
    }
}
