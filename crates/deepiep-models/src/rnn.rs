//! Recurrent pI regressor evaluated with candle.
//!
//! Stacked LSTM or GRU layers read the reversed one-hot sequence; every layer but the last passes
//! its full output sequence on, the last contributes only its final hidden state. Optional dense
//! layers follow, then a single linear output unit.
//!
//! Tensor names in the weights file:
//!
//! * `rnn.{i}.weight_ih_l0`, `rnn.{i}.weight_hh_l0`, `rnn.{i}.bias_ih_l0`, `rnn.{i}.bias_hh_l0`
//! * `dense.{j}.weight`, `dense.{j}.bias`
//! * `output.weight`, `output.bias`
use crate::PiModel;
use candle_core::{DType, Device, Module, Tensor};
use candle_nn::rnn::{gru, lstm, GRUConfig, LSTMConfig, GRU, LSTM, RNN};
use candle_nn::{linear, Linear, VarBuilder};
use deepiep_core::{CellKind, DeepIepError, DenseActivation, ModelConfig, Result};
use ndarray::Array3;
use std::path::Path;
use tracing::debug;

enum RecurrentLayer {
    Lstm(LSTM),
    Gru(GRU),
}

impl RecurrentLayer {
    fn load(
        cell: CellKind,
        in_dim: usize,
        hidden: usize,
        vb: VarBuilder,
    ) -> candle_core::Result<Self> {
        match cell {
            CellKind::Lstm => Ok(Self::Lstm(lstm(in_dim, hidden, LSTMConfig::default(), vb)?)),
            CellKind::Gru => Ok(Self::Gru(gru(in_dim, hidden, GRUConfig::default(), vb)?)),
        }
    }

    /// (batch, seq, in) -> (batch, seq, hidden)
    fn sequence(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        match self {
            Self::Lstm(layer) => layer.states_to_tensor(&layer.seq(xs)?),
            // GRU::states_to_tensor concatenates along time, flattening the sequence axis
            Self::Gru(layer) => {
                let states = layer
                    .seq(xs)?
                    .iter()
                    .map(|state| state.h().clone())
                    .collect::<Vec<_>>();
                Tensor::stack(&states, 1)
            }
        }
    }

    /// (batch, seq, in) -> (batch, hidden)
    fn last_hidden(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let missing = || candle_core::Error::Msg("empty input sequence".to_string());
        match self {
            Self::Lstm(layer) => Ok(layer.seq(xs)?.last().ok_or_else(missing)?.h().clone()),
            Self::Gru(layer) => Ok(layer.seq(xs)?.last().ok_or_else(missing)?.h().clone()),
        }
    }
}

pub struct RnnRegressor {
    rnn: Vec<RecurrentLayer>,
    dense: Vec<Linear>,
    activation: DenseActivation,
    output: Linear,
    device: Device,
}

impl RnnRegressor {
    pub fn new(config: &ModelConfig, vb: VarBuilder) -> candle_core::Result<Self> {
        let arch = &config.architecture;
        let device = vb.device().clone();

        let mut in_dim = config.feature_width();
        let mut rnn = Vec::with_capacity(arch.units.len());
        for (i, &hidden) in arch.units.iter().enumerate() {
            rnn.push(RecurrentLayer::load(
                arch.cell,
                in_dim,
                hidden,
                vb.pp(format!("rnn.{i}")),
            )?);
            in_dim = hidden;
        }

        let mut dense = Vec::with_capacity(arch.dense.len());
        for (j, &width) in arch.dense.iter().enumerate() {
            dense.push(linear(in_dim, width, vb.pp(format!("dense.{j}")))?);
            in_dim = width;
        }
        let output = linear(in_dim, 1, vb.pp("output"))?;

        Ok(Self {
            rnn,
            dense,
            activation: arch.activation,
            output,
            device,
        })
    }

    /// Load weights from a safetensors file laid out as described in the module docs.
    pub fn load<P: AsRef<Path>>(weights: P, config: &ModelConfig, device: &Device) -> Result<Self> {
        let weights = weights.as_ref();
        if !weights.is_file() {
            return Err(DeepIepError::artifact_load(weights, "file not found"));
        }
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, device) }
            .map_err(|e| DeepIepError::artifact_load(weights, e))?;
        Self::new(config, vb).map_err(|e| DeepIepError::artifact_load(weights, e))
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// (batch, seq, features) -> (batch, 1)
    pub fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let mut xs = xs.clone();
        let mut hidden = None;
        for (i, layer) in self.rnn.iter().enumerate() {
            if i + 1 == self.rnn.len() {
                hidden = Some(layer.last_hidden(&xs)?);
            } else {
                xs = layer.sequence(&xs)?;
            }
        }
        let mut xs = hidden
            .ok_or_else(|| candle_core::Error::Msg("no recurrent layers".to_string()))?;
        for layer in &self.dense {
            xs = self.activate(&layer.forward(&xs)?)?;
        }
        self.output.forward(&xs)
    }

    fn activate(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        match self.activation {
            DenseActivation::Relu => xs.relu(),
            DenseActivation::Tanh => xs.tanh(),
            DenseActivation::Sigmoid => candle_nn::ops::sigmoid(xs),
            DenseActivation::Linear => Ok(xs.clone()),
        }
    }
}

impl PiModel for RnnRegressor {
    fn predict(&self, batch: &Array3<f32>) -> Result<Vec<f32>> {
        let data: Vec<f32> = batch.iter().copied().collect();
        let xs = Tensor::from_vec(data, batch.dim(), &self.device)?;
        debug!(shape = ?xs.shape(), "rnn forward");
        let out = self.forward(&xs)?;
        Ok(out.squeeze(1)?.to_vec1::<f32>()?)
    }
}
