//! Model orchestration layer: one capability contract for every modality,
//! ONNX Runtime pipelines, rule-based fallbacks, and the registry that picks
//! between them once at start-up.

mod capability;
mod error;
mod fallback;
mod input;
mod instrument;
pub mod labels;
pub mod preprocess;
mod registry;
pub mod scoring;

#[cfg(feature = "onnx")]
mod loader;
#[cfg(feature = "onnx")]
mod sentiment;
#[cfg(feature = "onnx")]
mod session;
#[cfg(feature = "onnx")]
mod vision;

pub use capability::{Capability, CapabilityLoader, Family};
pub use error::{ModelError, ValidationError};
pub use fallback::{ConstantImage, RuleSentiment};
pub use input::{InferenceRequest, InputKind, ModelInput};
pub use instrument::Instrumented;
pub use registry::{PROBE_TEXT, Registry};

#[cfg(feature = "onnx")]
pub use loader::OnnxLoader;
#[cfg(feature = "onnx")]
pub use sentiment::SentimentModel;
#[cfg(feature = "onnx")]
pub use vision::ImageModel;

pub use image::RgbImage;
