//! Rule-based stand-ins used when the real pipelines cannot be loaded.
//!
//! They exist to keep the output schema and the UI working offline, not to
//! be accurate.

use studio_core::{Modality, PredictionList};

use crate::{Capability, Family, ModelError, ModelInput};

/// Substrings that flip the sentiment fallback to `POSITIVE`.
pub const POSITIVE_KEYWORDS: &[&str] = &["good", "great", "love", "awesome", "fantastic", "happy"];

const FALLBACK_SCORE: f32 = 0.75;
const IMAGE_LABEL: &str = "object";
const IMAGE_SCORE: f32 = 0.50;

/// Keyword matcher: `POSITIVE` if any keyword occurs in the lower-cased
/// text, else `NEGATIVE`. Always one prediction scored 0.75.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleSentiment;

impl Capability for RuleSentiment {
    fn modality(&self) -> Modality {
        Modality::Sentiment
    }

    fn family(&self) -> Family {
        Family::Fallback
    }

    fn classify(&self, input: &ModelInput) -> Result<PredictionList, ModelError> {
        input.expect_kind(Modality::Sentiment)?;
        let text = input.as_text().unwrap_or_default().to_lowercase();
        let positive = POSITIVE_KEYWORDS.iter().any(|kw| text.contains(kw));
        let label = if positive { "POSITIVE" } else { "NEGATIVE" };
        Ok(PredictionList::single(label, FALLBACK_SCORE)?)
    }

    fn describe(&self) -> String {
        "Fallback Sentiment (rule-based)".to_string()
    }
}

/// Ignores the image entirely and answers `object` at 0.50.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConstantImage;

impl Capability for ConstantImage {
    fn modality(&self) -> Modality {
        Modality::Image
    }

    fn family(&self) -> Family {
        Family::Fallback
    }

    fn classify(&self, input: &ModelInput) -> Result<PredictionList, ModelError> {
        input.expect_kind(Modality::Image)?;
        Ok(PredictionList::single(IMAGE_LABEL, IMAGE_SCORE)?)
    }

    fn describe(&self) -> String {
        "Fallback Image Classifier (constant)".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn sentiment_positive_keyword() {
        let out = RuleSentiment
            .classify(&ModelInput::text("This subject is great!"))
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.top().label(), "POSITIVE");
        assert_eq!(out.top().score(), 0.75);
    }

    #[test]
    fn sentiment_negative_without_keyword() {
        let out = RuleSentiment.classify(&ModelInput::text("bad")).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.top().label(), "NEGATIVE");
        assert_eq!(out.top().score(), 0.75);
    }

    #[test]
    fn sentiment_is_case_insensitive_substring_match() {
        let out = RuleSentiment.classify(&ModelInput::text("UNHAPPY")).unwrap();
        // "happy" is a substring of "unhappy"; the rule does not know better.
        assert_eq!(out.top().label(), "POSITIVE");
    }

    #[test]
    fn sentiment_rejects_images() {
        let err = RuleSentiment
            .classify(&ModelInput::Image(RgbImage::new(4, 4)))
            .unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedInput { .. }));
    }

    #[test]
    fn image_is_constant_regardless_of_content() {
        let black = RgbImage::new(224, 224);
        let tiny = RgbImage::from_pixel(32, 32, Rgb([255, 10, 10]));

        for img in [black, tiny] {
            let out = ConstantImage.classify(&ModelInput::Image(img)).unwrap();
            assert_eq!(out.len(), 1);
            assert_eq!(out.top().label(), "object");
            assert_eq!(out.top().score(), 0.50);
        }
    }

    #[test]
    fn image_rejects_text() {
        let err = ConstantImage.classify(&ModelInput::text("cat")).unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedInput { .. }));
    }

    #[test]
    fn describe_names_the_fallback() {
        assert!(RuleSentiment.describe().contains("rule-based"));
        assert!(ConstantImage.describe().contains("constant"));
        assert_eq!(RuleSentiment.family(), Family::Fallback);
        assert_eq!(ConstantImage.modality(), Modality::Image);
    }
}
