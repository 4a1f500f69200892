//! Model inputs and the validation gate in front of the registry.

use std::fmt;

use image::RgbImage;
use studio_core::{Modality, PredictionList};

use crate::{ModelError, Registry, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Image,
}

impl InputKind {
    /// The input kind a modality consumes.
    pub fn for_modality(modality: Modality) -> Self {
        match modality {
            Modality::Sentiment => Self::Text,
            Modality::Image => Self::Image,
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Image => "image",
        })
    }
}

/// Raw input handed to a capability: UTF-8 text or a decoded RGB image.
#[derive(Debug, Clone)]
pub enum ModelInput {
    Text(String),
    Image(RgbImage),
}

impl ModelInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn kind(&self) -> InputKind {
        match self {
            Self::Text(_) => InputKind::Text,
            Self::Image(_) => InputKind::Image,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            Self::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&RgbImage> {
        match self {
            Self::Image(img) => Some(img),
            Self::Text(_) => None,
        }
    }

    /// Check the variant against the modality a capability serves.
    pub(crate) fn expect_kind(&self, modality: Modality) -> Result<(), ModelError> {
        let got = self.kind();
        if got == InputKind::for_modality(modality) {
            Ok(())
        } else {
            Err(ModelError::UnsupportedInput { modality, got })
        }
    }
}

/// A validated `(modality, input)` pair, ready to be submitted.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    modality: Modality,
    input: ModelInput,
}

impl InferenceRequest {
    /// Reject empty text, zero-sized images, and inputs that do not match
    /// the selected modality. Text is trimmed.
    pub fn new(modality: Modality, input: ModelInput) -> Result<Self, ValidationError> {
        let expected = InputKind::for_modality(modality);
        let got = input.kind();
        if expected != got {
            return Err(ValidationError::WrongInput {
                modality,
                expected,
                got,
            });
        }

        let input = match input {
            ModelInput::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError::EmptyText);
                }
                ModelInput::Text(trimmed.to_string())
            }
            ModelInput::Image(img) => {
                if img.width() == 0 || img.height() == 0 {
                    return Err(ValidationError::EmptyImage);
                }
                ModelInput::Image(img)
            }
        };

        Ok(Self { modality, input })
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    pub fn input(&self) -> &ModelInput {
        &self.input
    }

    pub fn run(&self, registry: &Registry) -> Result<PredictionList, ModelError> {
        registry.run(self.modality, &self.input)
    }
}
