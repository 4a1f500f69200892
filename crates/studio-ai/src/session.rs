//! ONNX Runtime session construction with execution-device selection.

use std::path::Path;

use ort::execution_providers::{CUDAExecutionProvider, ExecutionProvider};
use ort::session::Session;
use studio_core::Device;
use tracing::{debug, info};

/// Resolve `Auto` to the device that will actually run the model.
pub(crate) fn resolve_device(requested: Device) -> anyhow::Result<Device> {
    let cuda = CUDAExecutionProvider::default().is_available().unwrap_or(false);
    match requested {
        Device::Cpu => Ok(Device::Cpu),
        Device::Cuda => {
            anyhow::ensure!(cuda, "CUDA execution requested but no CUDA provider is available");
            Ok(Device::Cuda)
        }
        Device::Auto => Ok(if cuda { Device::Cuda } else { Device::Cpu }),
    }
}

/// Load `model.onnx` from `model_dir` onto the requested device.
///
/// Returns the session and the device it was placed on.
pub(crate) fn load_session(model_dir: &Path, requested: Device) -> anyhow::Result<(Session, Device)> {
    let model_path = model_dir.join("model.onnx");
    anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");

    let device = resolve_device(requested)?;
    debug!(requested = %requested, resolved = %device, "selected execution device");

    let mut builder = Session::builder()?;
    if device == Device::Cuda {
        builder = builder.with_execution_providers([CUDAExecutionProvider::default().build()])?;
    }
    let session = builder.commit_from_file(&model_path)?;

    info!(model = %model_path.display(), device = %device, "loaded onnx session");
    Ok((session, device))
}
