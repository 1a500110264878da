//! deepiep-models
//!
//! Model backends for isoelectric point prediction and the [`DeepIep`] handle that ties a loaded
//! network to its sequence encoder.
//!
//! ```shell
//! cargo run -p deepiep-cli -- -m Models/default -s MKTAYIAKQR
//! cargo run -p deepiep-cli --features metal -- -m Models/default -s MKTAYIAKQR
//! ```
use candle_core::utils::{cuda_is_available, metal_is_available};
use candle_core::Device;
use deepiep_core::Result;
use ndarray::Array3;
use tracing::info;

pub mod predictor;
pub mod rnn;

#[cfg(feature = "onnx")]
pub mod onnx;

pub use predictor::{artifact_path, save_artifact, Backend, DeepIep, LoadOptions};
pub use rnn::RnnRegressor;

#[cfg(feature = "onnx")]
pub use onnx::OnnxRegressor;

/// A trained network mapping encoded sequences to pI values.
///
/// `batch` has shape `(n, max_length + 1, alphabet + 1)` with rows already reversed; the result
/// holds one value per sequence in batch order.
pub trait PiModel: Send + Sync {
    fn predict(&self, batch: &Array3<f32>) -> Result<Vec<f32>>;
}

pub fn device(cpu: bool) -> candle_core::Result<Device> {
    if cpu {
        Ok(Device::Cpu)
    } else if cuda_is_available() {
        Ok(Device::new_cuda(0)?)
    } else if metal_is_available() {
        Ok(Device::new_metal(0)?)
    } else {
        #[cfg(all(target_os = "macos", target_arch = "aarch64"))]
        {
            info!("Running on CPU, to run on GPU(metal), build with `--features metal`");
        }
        #[cfg(not(all(target_os = "macos", target_arch = "aarch64")))]
        {
            info!("Running on CPU, to run on GPU, build with `--features cuda`");
        }
        Ok(Device::Cpu)
    }
}
