//! ONNX Runtime sentiment pipeline for sequence-classification models.
//!
//! Default model: distilbert-base-uncased-finetuned-sst-2-english. The model
//! directory must contain `model.onnx`, `tokenizer.json`, and `config.json`
//! (for the `id2label` map).

use std::path::Path;

use ort::session::Session;
use ort::value::Tensor;
use parking_lot::Mutex;
use studio_core::{Device, Modality, PredictionList, StudioConfig};
use tokenizers::Tokenizer;
use tracing::info;

use crate::labels::LabelMap;
use crate::scoring::{softmax, top_k};
use crate::session::load_session;
use crate::{Capability, Family, ModelError, ModelInput};

/// Real sentiment classifier backed by an ONNX session.
pub struct SentimentModel {
    model_id: String,
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    labels: LabelMap,
    /// BERT-style exports take `token_type_ids`; DistilBERT does not.
    uses_token_types: bool,
    device: Device,
    top_k: usize,
}

impl SentimentModel {
    /// Load a model directory containing `model.onnx`, `tokenizer.json`
    /// and `config.json`.
    pub fn load(model_dir: &Path, config: &StudioConfig) -> anyhow::Result<Self> {
        let tokenizer_path = model_dir.join("tokenizer.json");
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {model_dir:?}"
        );

        let (session, device) = load_session(model_dir, config.device)?;
        let uses_token_types = session
            .inputs()
            .iter()
            .any(|input| input.name() == "token_type_ids");

        let labels = LabelMap::from_config_file(&model_dir.join("config.json"))?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: config.max_text_len,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;

        let model_id = model_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| config.sentiment_model.clone());

        info!(model = %model_id, labels = labels.len(), "loaded sentiment model");
        Ok(Self {
            model_id,
            session: Mutex::new(session),
            tokenizer,
            labels,
            uses_token_types,
            device,
            top_k: config.top_k,
        })
    }

    /// Raw logits for one text: `[num_labels]`.
    fn logits(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;

        let seq_len = encoding.get_ids().len();
        let shape = [1i64, seq_len as i64];
        let ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();

        let ids_tensor = Tensor::from_array((shape, ids.into_boxed_slice()))?;
        let mask_tensor = Tensor::from_array((shape, mask.into_boxed_slice()))?;

        let mut session = self.session.lock();
        let outputs = if self.uses_token_types {
            let types: Vec<i64> = encoding.get_type_ids().iter().map(|&t| t as i64).collect();
            let type_tensor = Tensor::from_array((shape, types.into_boxed_slice()))?;
            session.run(ort::inputs![
                "input_ids" => ids_tensor,
                "attention_mask" => mask_tensor,
                "token_type_ids" => type_tensor,
            ])?
        } else {
            session.run(ort::inputs![
                "input_ids" => ids_tensor,
                "attention_mask" => mask_tensor,
            ])?
        };

        // Logits: [1, num_labels].
        let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            dims.len() == 2 && dims[0] == 1,
            "unexpected output shape: {dims:?}, expected [1, num_labels]"
        );
        Ok(output_data[..dims[1] as usize].to_vec())
    }
}

impl Capability for SentimentModel {
    fn modality(&self) -> Modality {
        Modality::Sentiment
    }

    fn family(&self) -> Family {
        Family::Real
    }

    fn classify(&self, input: &ModelInput) -> Result<PredictionList, ModelError> {
        input.expect_kind(Modality::Sentiment)?;
        let text = input.as_text().unwrap_or_default();
        let logits = self.logits(text).map_err(ModelError::Inference)?;
        Ok(top_k(&softmax(&logits), &self.labels, self.top_k)?)
    }

    fn describe(&self) -> String {
        format!(
            "Model: {} | Task: {}\nCategory: Text | Input: UTF-8 text | Output: top-k labels+scores\nDevice: {}",
            self.model_id,
            Modality::Sentiment.task(),
            self.device
        )
    }
}
