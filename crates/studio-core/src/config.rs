//! Session configuration shared by the inference layer and the front end.
//!
//! Nothing here is persisted: the binary builds a [`StudioConfig`] from its
//! arguments and environment at start-up and drops it on exit.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Execution device for real inference pipelines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Use a CUDA accelerator when one is present, else the CPU.
    #[default]
    Auto,
    Cpu,
    Cuda,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Cpu => "cpu",
            Self::Cuda => "cuda",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            "cuda" | "gpu" => Ok(Self::Cuda),
            other => Err(format!("unknown device '{other}' (expected auto, cpu or cuda)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Directory holding one sub-directory per model.
    pub models_dir: PathBuf,
    /// Sub-directory of `models_dir` with the sentiment model.
    pub sentiment_model: String,
    /// Sub-directory of `models_dir` with the image model.
    pub image_model: String,
    pub device: Device,
    /// Maximum number of predictions returned by real pipelines.
    pub top_k: usize,
    /// Square input size of the image model, in pixels.
    pub image_size: u32,
    /// Token budget for the sentiment model; longer inputs are truncated.
    pub max_text_len: usize,
    /// Interactive tick period for draining finished jobs.
    pub poll_interval_ms: u64,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models"),
            sentiment_model: "distilbert-base-uncased-finetuned-sst-2-english".into(),
            image_model: "vit-base-patch16-224".into(),
            device: Device::Auto,
            top_k: 5,
            image_size: 224,
            max_text_len: 512,
            poll_interval_ms: 100,
        }
    }
}

impl StudioConfig {
    pub fn sentiment_dir(&self) -> PathBuf {
        self.models_dir.join(&self.sentiment_model)
    }

    pub fn image_dir(&self) -> PathBuf {
        self.models_dir.join(&self.image_model)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn with_models_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.models_dir = dir.as_ref().to_path_buf();
        self
    }
}
