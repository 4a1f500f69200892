//! ONNX Runtime image classification pipeline (ViT-style exports).
//!
//! The model directory must contain `model.onnx` taking `pixel_values`
//! `[1, 3, size, size]` and `config.json` with the `id2label` map.

use std::path::Path;

use ort::session::Session;
use ort::value::Tensor;
use parking_lot::Mutex;
use studio_core::{Device, Modality, PredictionList, StudioConfig};
use tracing::info;

use crate::labels::LabelMap;
use crate::preprocess::normalized_chw;
use crate::scoring::{softmax, top_k};
use crate::session::load_session;
use crate::{Capability, Family, ModelError, ModelInput, RgbImage};

const MEAN: [f32; 3] = [0.5, 0.5, 0.5];
const STD: [f32; 3] = [0.5, 0.5, 0.5];

/// Real image classifier backed by an ONNX session.
pub struct ImageModel {
    model_id: String,
    session: Mutex<Session>,
    labels: LabelMap,
    image_size: u32,
    device: Device,
    top_k: usize,
}

impl ImageModel {
    pub fn load(model_dir: &Path, config: &StudioConfig) -> anyhow::Result<Self> {
        let (session, device) = load_session(model_dir, config.device)?;
        let labels = LabelMap::from_config_file(&model_dir.join("config.json"))?;

        let model_id = model_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| config.image_model.clone());

        info!(model = %model_id, labels = labels.len(), size = config.image_size, "loaded image model");
        Ok(Self {
            model_id,
            session: Mutex::new(session),
            labels,
            image_size: config.image_size,
            device,
            top_k: config.top_k,
        })
    }

    fn logits(&self, image: &RgbImage) -> anyhow::Result<Vec<f32>> {
        let size = self.image_size;
        let pixels = normalized_chw(image, size, MEAN, STD);
        let shape = [1i64, 3, size as i64, size as i64];
        let tensor = Tensor::from_array((shape, pixels.into_boxed_slice()))?;

        let mut session = self.session.lock();
        let outputs = session.run(ort::inputs!["pixel_values" => tensor])?;

        let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            dims.len() == 2 && dims[0] == 1,
            "unexpected output shape: {dims:?}, expected [1, num_labels]"
        );
        Ok(output_data[..dims[1] as usize].to_vec())
    }
}

impl Capability for ImageModel {
    fn modality(&self) -> Modality {
        Modality::Image
    }

    fn family(&self) -> Family {
        Family::Real
    }

    fn classify(&self, input: &ModelInput) -> Result<PredictionList, ModelError> {
        let Some(image) = input.as_image() else {
            return Err(ModelError::UnsupportedInput {
                modality: Modality::Image,
                got: input.kind(),
            });
        };
        let logits = self.logits(image).map_err(ModelError::Inference)?;
        Ok(top_k(&softmax(&logits), &self.labels, self.top_k)?)
    }

    fn describe(&self) -> String {
        format!(
            "Model: {} | Task: {}\nCategory: Vision | Input: RGB image | Output: top-k labels+scores\nDevice: {}",
            self.model_id,
            Modality::Image.task(),
            self.device
        )
    }
}
