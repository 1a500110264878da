//! pI regressor exported to ONNX and run with ONNX Runtime.
//!
//! The graph must take one `f32` input of shape `[batch, max_length + 1, alphabet + 1]` and
//! produce `[batch, 1]` (or `[batch]`) as its first output.
use crate::PiModel;
use deepiep_core::{DeepIepError, ModelConfig, Result};
use ndarray::Array3;
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::debug;

pub struct OnnxRegressor {
    session: Session,
    input_name: String,
    output_name: String,
}

impl OnnxRegressor {
    pub fn load<P: AsRef<Path>>(graph: P, config: &ModelConfig) -> Result<Self> {
        let graph = graph.as_ref();
        if !graph.is_file() {
            return Err(DeepIepError::artifact_load(graph, "file not found"));
        }
        let session = create_session(graph).map_err(|e| DeepIepError::artifact_load(graph, e))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| DeepIepError::artifact_load(graph, "graph declares no inputs"))?;
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| DeepIepError::artifact_load(graph, "graph declares no outputs"))?;
        debug!(
            input = %input_name,
            output = %output_name,
            shape = ?config.input_shape(),
            "onnx session ready"
        );

        Ok(Self {
            session,
            input_name,
            output_name,
        })
    }
}

fn create_session(graph: &Path) -> ort::Result<Session> {
    Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level1)?
        .with_intra_threads(1)?
        .commit_from_file(graph)
}

impl PiModel for OnnxRegressor {
    fn predict(&self, batch: &Array3<f32>) -> Result<Vec<f32>> {
        let inference = |e: ort::Error| DeepIepError::Inference(e.to_string());
        let inputs =
            ort::inputs![self.input_name.as_str() => batch.as_standard_layout().into_owned()]
                .map_err(inference)?;
        let outputs = self.session.run(inputs).map_err(inference)?;
        let values = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(inference)?;
        Ok(values.iter().copied().collect())
    }
}
