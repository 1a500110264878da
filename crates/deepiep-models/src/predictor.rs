//! Loaded-model handle.
//!
//! A model is stored as `<base>.json` (metadata, see [`deepiep_core::config`]) next to either
//! `<base>.safetensors` (candle backend) or `<base>.onnx` (ONNX Runtime backend, feature `onnx`).
//! [`DeepIep::load`] returns an owned handle; predictions borrow it shared, so any number of threads
//! may predict at once, while [`DeepIep::reload`] needs it exclusively.
use crate::rnn::RnnRegressor;
use crate::{device, PiModel};
use candle_nn::VarMap;
use clap::ValueEnum;
use deepiep_core::{DeepIepError, ModelConfig, Result, SequenceEncoder};
use ndarray::Axis;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use strum::Display;
use tracing::{debug, info, warn};

pub const METADATA_EXTENSION: &str = "json";
pub const WEIGHTS_EXTENSION: &str = "safetensors";
pub const ONNX_EXTENSION: &str = "onnx";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Backend {
    #[default]
    Candle,
    Onnx,
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Treat every `C` as the alkylated cysteine `Z`.
    pub cyscam: bool,
    pub backend: Backend,
    /// Force CPU execution for the candle backend.
    pub cpu: bool,
}

/// `base` with `.{extension}` appended. Unlike `Path::with_extension` this keeps any dots already
/// in the base name.
pub fn artifact_path(base: &Path, extension: &str) -> PathBuf {
    let mut path = OsString::from(base.as_os_str());
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}

/// Write `<base>.json` and `<base>.safetensors` for a network built on `varmap`.
pub fn save_artifact(base: &Path, config: &ModelConfig, varmap: &VarMap) -> Result<()> {
    let metadata = artifact_path(base, METADATA_EXTENSION);
    std::fs::write(&metadata, config.to_json()?)
        .map_err(|e| DeepIepError::artifact_load(&metadata, e))?;
    varmap.save(artifact_path(base, WEIGHTS_EXTENSION))?;
    Ok(())
}

pub struct DeepIep {
    config: ModelConfig,
    model: Box<dyn PiModel>,
    cyscam: bool,
}

impl std::fmt::Debug for DeepIep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepIep")
            .field("config", &self.config)
            .field("cyscam", &self.cyscam)
            .finish_non_exhaustive()
    }
}

impl DeepIep {
    pub fn load<P: AsRef<Path>>(base: P, options: &LoadOptions) -> Result<Self> {
        let base = base.as_ref();
        let config = ModelConfig::from_file(artifact_path(base, METADATA_EXTENSION))?;
        for residue in config.char_index.missing_special() {
            warn!(
                "model {} has no column for '{}' ({residue:?})",
                base.display(),
                residue.code()
            );
        }
        let model = load_backend(base, &config, options)?;
        info!(
            model = %base.display(),
            backend = %options.backend,
            max_length = config.max_length,
            alphabet = %config.char_index.residues(),
            "loaded model"
        );
        Ok(Self::from_parts(config, model, options.cyscam))
    }

    /// Wrap an already constructed backend.
    pub fn from_parts(config: ModelConfig, model: Box<dyn PiModel>, cyscam: bool) -> Self {
        Self {
            config,
            model,
            cyscam,
        }
    }

    /// Replace model and metadata with the artifact at `base`. On failure the current model is kept.
    pub fn reload<P: AsRef<Path>>(&mut self, base: P, options: &LoadOptions) -> Result<()> {
        *self = Self::load(base, options)?;
        Ok(())
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn max_length(&self) -> usize {
        self.config.max_length
    }

    pub fn cyscam(&self) -> bool {
        self.cyscam
    }

    pub fn encoder(&self) -> SequenceEncoder<'_> {
        SequenceEncoder::from_config(&self.config, self.cyscam)
    }

    pub fn predict_one(&self, sequence: &str) -> Result<f32> {
        let batch = self.encoder().encode(sequence)?.insert_axis(Axis(0));
        let values = self.model.predict(&batch)?;
        match values.as_slice() {
            [value] => Ok(*value),
            other => Err(DeepIepError::Inference(format!(
                "expected a single prediction, model returned {}",
                other.len()
            ))),
        }
    }

    /// Predict every sequence in one model call. Results follow input order; any invalid
    /// sequence fails the whole batch.
    pub fn predict_batch<S: AsRef<str>>(&self, sequences: &[S]) -> Result<Vec<f32>> {
        if sequences.is_empty() {
            return Ok(Vec::new());
        }
        let batch = self.encoder().encode_batch(sequences)?;
        debug!(sequences = sequences.len(), shape = ?batch.dim(), "predicting batch");
        let values = self.model.predict(&batch)?;
        if values.len() != sequences.len() {
            return Err(DeepIepError::Inference(format!(
                "model returned {} predictions for {} sequences",
                values.len(),
                sequences.len()
            )));
        }
        Ok(values)
    }
}

fn load_backend(
    base: &Path,
    config: &ModelConfig,
    options: &LoadOptions,
) -> Result<Box<dyn PiModel>> {
    match options.backend {
        Backend::Candle => {
            let device = device(options.cpu)?;
            let weights = artifact_path(base, WEIGHTS_EXTENSION);
            Ok(Box::new(RnnRegressor::load(weights, config, &device)?))
        }
        #[cfg(feature = "onnx")]
        Backend::Onnx => {
            let graph = artifact_path(base, ONNX_EXTENSION);
            Ok(Box::new(crate::onnx::OnnxRegressor::load(graph, config)?))
        }
        #[cfg(not(feature = "onnx"))]
        Backend::Onnx => Err(DeepIepError::artifact_load(
            artifact_path(base, ONNX_EXTENSION),
            "built without the `onnx` feature",
        )),
    }
}
