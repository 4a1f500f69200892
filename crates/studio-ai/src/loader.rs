use studio_core::{Modality, StudioConfig};

use crate::{Capability, CapabilityLoader, ImageModel, SentimentModel};

/// Loads the ONNX pipelines named in a [`StudioConfig`].
pub struct OnnxLoader {
    config: StudioConfig,
}

impl OnnxLoader {
    pub fn new(config: StudioConfig) -> Self {
        Self { config }
    }
}

impl CapabilityLoader for OnnxLoader {
    fn load(&self, modality: Modality) -> anyhow::Result<Box<dyn Capability>> {
        Ok(match modality {
            Modality::Sentiment => Box::new(SentimentModel::load(
                &self.config.sentiment_dir(),
                &self.config,
            )?),
            Modality::Image => Box::new(ImageModel::load(&self.config.image_dir(), &self.config)?),
        })
    }
}
