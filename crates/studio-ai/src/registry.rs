//! The model registry: one active capability per modality, all from the
//! same family.
//!
//! Construction tries to load every real capability and probes the
//! sentiment one with [`PROBE_TEXT`]. Any failure drops whatever was built
//! and installs the rule-based fallbacks for *every* modality. The decision
//! is made once; later invocation failures never change it.

use anyhow::Context;
use studio_core::{Modality, PredictionList, StudioConfig};
use tracing::{info, warn};

use crate::{
    Capability, CapabilityLoader, ConstantImage, Family, Instrumented, ModelError, ModelInput,
    RuleSentiment,
};

/// Fixed input for the start-up liveness probe.
pub const PROBE_TEXT: &str = "ok";

type Slot = Instrumented<Box<dyn Capability>>;

pub struct Registry {
    family: Family,
    sentiment: Slot,
    image: Slot,
}

impl Registry {
    /// Build the registry for a session.
    ///
    /// Uses the ONNX pipelines from `config.models_dir`, falling back to the
    /// rule-based capabilities if they cannot be loaded or probed.
    #[cfg(feature = "onnx")]
    pub fn from_config(config: &StudioConfig) -> Self {
        Self::load(&crate::OnnxLoader::new(config.clone()))
    }

    /// Build the registry for a session.
    ///
    /// Built without the `onnx` feature: always the rule-based capabilities.
    #[cfg(not(feature = "onnx"))]
    pub fn from_config(config: &StudioConfig) -> Self {
        info!(
            models_dir = %config.models_dir.display(),
            "built without ONNX support; using rule-based fallbacks"
        );
        Self::fallback()
    }

    /// Load real capabilities through `loader`, or degrade to fallbacks.
    pub fn load(loader: &dyn CapabilityLoader) -> Self {
        match try_load_real(loader) {
            Ok((sentiment, image)) => {
                info!(family = %Family::Real, "model registry ready");
                Self {
                    family: Family::Real,
                    sentiment: Instrumented::new(sentiment),
                    image: Instrumented::new(image),
                }
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), "real models unavailable; using rule-based fallbacks");
                Self::fallback()
            }
        }
    }

    /// Registry with the rule-based capability for every modality.
    pub fn fallback() -> Self {
        Self {
            family: Family::Fallback,
            sentiment: Instrumented::new(Box::new(RuleSentiment)),
            image: Instrumented::new(Box::new(ConstantImage)),
        }
    }

    /// Family shared by every active capability.
    pub fn family(&self) -> Family {
        self.family
    }

    /// Active capability for a modality.
    pub fn get(&self, modality: Modality) -> &dyn Capability {
        match modality {
            Modality::Sentiment => &self.sentiment,
            Modality::Image => &self.image,
        }
    }

    /// Active capability for a modality key such as `"sentiment"`.
    pub fn lookup(&self, key: &str) -> Result<&dyn Capability, ModelError> {
        let modality: Modality = key.parse()?;
        Ok(self.get(modality))
    }

    /// Classify `input` with the active capability for `modality`.
    ///
    /// Failures are returned unchanged: no retry, no per-call fallback.
    pub fn run(&self, modality: Modality, input: &ModelInput) -> Result<PredictionList, ModelError> {
        self.get(modality).classify(input)
    }
}

fn try_load_real(
    loader: &dyn CapabilityLoader,
) -> anyhow::Result<(Box<dyn Capability>, Box<dyn Capability>)> {
    let sentiment = loader
        .load(Modality::Sentiment)
        .context("loading sentiment model")?;
    let image = loader.load(Modality::Image).context("loading image model")?;

    for (expected, cap) in [(Modality::Sentiment, &sentiment), (Modality::Image, &image)] {
        anyhow::ensure!(
            cap.modality() == expected,
            "loader returned a {} capability for {expected}",
            cap.modality()
        );
    }

    // Only the sentiment pipeline is probed; see DESIGN.md.
    sentiment
        .classify(&ModelInput::text(PROBE_TEXT))
        .context("sentiment liveness probe")?;

    Ok((sentiment, image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use image::RgbImage;

    /// How a scripted capability behaves.
    #[derive(Clone, Copy, PartialEq)]
    enum Script {
        Works,
        FailsToLoad,
        FailsToClassify,
    }

    struct Scripted {
        modality: Modality,
        script: Script,
        calls: Arc<AtomicUsize>,
    }

    impl Capability for Scripted {
        fn modality(&self) -> Modality {
            self.modality
        }

        fn family(&self) -> Family {
            Family::Real
        }

        fn classify(&self, input: &ModelInput) -> Result<PredictionList, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            input.expect_kind(self.modality)?;
            match self.script {
                Script::FailsToClassify => {
                    Err(ModelError::Inference(anyhow::anyhow!("pipeline exploded")))
                }
                _ => Ok(PredictionList::from_pairs([("REAL_TOP", 0.9), ("REAL_NEXT", 0.1)])?),
            }
        }

        fn describe(&self) -> String {
            format!("Scripted {}", self.modality)
        }
    }

    struct ScriptedLoader {
        sentiment: Script,
        image: Script,
        loads: Arc<AtomicUsize>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedLoader {
        fn new(sentiment: Script, image: Script) -> Self {
            Self {
                sentiment,
                image,
                loads: Arc::new(AtomicUsize::new(0)),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl CapabilityLoader for ScriptedLoader {
        fn load(&self, modality: Modality) -> anyhow::Result<Box<dyn Capability>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            let script = match modality {
                Modality::Sentiment => self.sentiment,
                Modality::Image => self.image,
            };
            anyhow::ensure!(script != Script::FailsToLoad, "no weights for {modality}");
            Ok(Box::new(Scripted {
                modality,
                script,
                calls: Arc::clone(&self.calls),
            }))
        }
    }

    fn assert_all_fallback(reg: &Registry) {
        assert_eq!(reg.family(), Family::Fallback);
        for m in Modality::ALL {
            assert_eq!(
                reg.get(m).family(),
                Family::Fallback,
                "{m} should be fallback when the registry degraded"
            );
        }
    }

    #[test]
    fn all_real_when_load_and_probe_succeed() {
        let loader = ScriptedLoader::new(Script::Works, Script::Works);
        let reg = Registry::load(&loader);

        assert_eq!(reg.family(), Family::Real);
        assert_eq!(reg.get(Modality::Sentiment).describe(), "Scripted sentiment");
        assert_eq!(reg.get(Modality::Image).describe(), "Scripted image");
        // Exactly one probe call.
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn sentiment_load_failure_deactivates_image() {
        let loader = ScriptedLoader::new(Script::FailsToLoad, Script::Works);
        let reg = Registry::load(&loader);

        assert_all_fallback(&reg);
        assert_eq!(
            reg.get(Modality::Image).describe(),
            "Fallback Image Classifier (constant)"
        );
    }

    #[test]
    fn probe_failure_deactivates_constructed_image() {
        let loader = ScriptedLoader::new(Script::FailsToClassify, Script::Works);
        let reg = Registry::load(&loader);

        // Both real capabilities were built before the probe failed.
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
        assert_all_fallback(&reg);
    }

    #[test]
    fn image_load_failure_degrades_everything() {
        let loader = ScriptedLoader::new(Script::Works, Script::FailsToLoad);
        let reg = Registry::load(&loader);
        assert_all_fallback(&reg);
    }

    #[test]
    fn broken_image_pipeline_is_not_probed() {
        // Only sentiment is probed, so an image pipeline that loads but
        // cannot classify leaves the registry in the real family.
        let loader = ScriptedLoader::new(Script::Works, Script::FailsToClassify);
        let reg = Registry::load(&loader);
        assert_eq!(reg.family(), Family::Real);

        let err = reg
            .run(Modality::Image, &ModelInput::Image(RgbImage::new(8, 8)))
            .unwrap_err();
        assert!(matches!(err, ModelError::Inference(_)));
        // Invocation failures never switch family.
        assert_eq!(reg.family(), Family::Real);
        assert_eq!(reg.get(Modality::Image).family(), Family::Real);
    }

    #[test]
    fn schema_holds_for_both_families() {
        let real = Registry::load(&ScriptedLoader::new(Script::Works, Script::Works));
        let fallback = Registry::fallback();

        for reg in [&real, &fallback] {
            let text = reg
                .run(Modality::Sentiment, &ModelInput::text("This subject is great!"))
                .unwrap();
            let image = reg
                .run(Modality::Image, &ModelInput::Image(RgbImage::new(224, 224)))
                .unwrap();

            for list in [text, image] {
                assert!(!list.as_slice().is_empty());
                for p in &list {
                    assert!(!p.label().is_empty());
                    assert!((0.0..=1.0).contains(&p.score()));
                }
            }
        }
    }

    #[test]
    fn offline_fallback_survives_tiny_inputs() {
        let reg = Registry::fallback();
        let text = reg.run(Modality::Sentiment, &ModelInput::text("bad")).unwrap();
        let image = reg
            .run(Modality::Image, &ModelInput::Image(RgbImage::new(32, 32)))
            .unwrap();
        assert_eq!(text.top().label(), "NEGATIVE");
        assert_eq!(image.top().label(), "object");
    }

    #[test]
    fn lookup_rejects_unknown_modality() {
        let reg = Registry::fallback();
        assert!(reg.lookup("image").is_ok());
        let err = reg.lookup("audio").err().unwrap();
        assert!(matches!(err, ModelError::InvalidModality(ref k) if k == "audio"));
    }

    #[test]
    fn run_propagates_unsupported_input() {
        let reg = Registry::fallback();
        let err = reg
            .run(Modality::Sentiment, &ModelInput::Image(RgbImage::new(2, 2)))
            .unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedInput { .. }));
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn from_config_without_onnx_is_fallback() {
        let reg = Registry::from_config(&StudioConfig::default());
        assert_eq!(reg.family(), Family::Fallback);
    }
}
