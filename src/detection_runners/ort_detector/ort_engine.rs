use std::path::Path;
use anyhow::Result;
use ort::{
    execution_providers::{CUDAExecutionProvider, TensorRTExecutionProvider},
    session::{builder::GraphOptimizationLevel, Session},
};
use crate::common::{InferenceDevice, ModelConfig};

/// Input/output tensor names of a committed session.
#[derive(Debug, Clone)]
pub struct OrtTensorNames {
    pub input: String,
    pub output: String,
}

/// Builds the ONNX Runtime session for `config`.
///
/// Fails when the weights file is missing or the session cannot be committed.
/// An accelerator that fails to register falls back to CPU inside ONNX Runtime.
pub fn build_session(config: &ModelConfig) -> Result<(Session, OrtTensorNames)> {
    if !Path::new(&config.weights_path).exists() {
        anyhow::bail!("Model file not found at {}", config.weights_path);
    }

    if let Some(lib_path) = &config.ort_lib_path {
        let committed = ort::init_from(lib_path).commit();
        log::debug!("ORT environment from {}: {:?}", lib_path, committed);
    }

    let mut builder = Session::builder()?;
    match config.inference_device {
        InferenceDevice::CUDA(device_id) => {
            builder = builder.with_execution_providers([
                CUDAExecutionProvider::default().with_device_id(device_id as i32).build(),
            ])?;
        }
        InferenceDevice::TensorRT(device_id) => {
            builder = builder.with_execution_providers([
                TensorRTExecutionProvider::default().with_device_id(device_id as i32).build(),
                CUDAExecutionProvider::default().with_device_id(device_id as i32).build(),
            ])?;
        }
        InferenceDevice::CPU => {}
    }

    let session = builder
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .commit_from_file(&config.weights_path)?;

    let input = session
        .inputs
        .first()
        .map(|i| i.name.clone())
        .unwrap_or_else(|| "images".to_string());
    let output = session
        .outputs
        .first()
        .map(|o| o.name.clone())
        .unwrap_or_else(|| "output0".to_string());

    log::info!(
        "Backend: ONNXRuntime | Device: {} | Input: {} | Output: {}",
        config.inference_device,
        input,
        output,
    );

    Ok((session, OrtTensorNames { input, output }))
}

/// Raw `names` entry of the ONNX metadata, if the exporter wrote one.
pub fn fetch_names_metadata(session: &Session) -> Option<String> {
    let metadata = session.metadata().ok()?;
    match metadata.custom("names") {
        Ok(Some(names)) => Some(names),
        _ => None,
    }
}
