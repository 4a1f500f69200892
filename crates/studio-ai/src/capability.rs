use std::fmt;

use studio_core::{Modality, PredictionList};

use crate::{ModelError, ModelInput};

/// Which family of implementation backs a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// A loaded pretrained pipeline.
    Real,
    /// A deterministic rule-based stand-in.
    Fallback,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Real => "real",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A model for one modality: real pipeline, fallback, or test double.
///
/// `classify` must either return a valid [`PredictionList`] or a
/// [`ModelError`]. It never substitutes a made-up value on failure.
/// `describe` is pure and infallible.
pub trait Capability: Send + Sync {
    fn modality(&self) -> Modality;

    fn family(&self) -> Family;

    fn classify(&self, input: &ModelInput) -> Result<PredictionList, ModelError>;

    /// Human-readable, multi-line description of the backing model.
    fn describe(&self) -> String;
}

impl<C: Capability + ?Sized> Capability for Box<C> {
    fn modality(&self) -> Modality {
        (**self).modality()
    }

    fn family(&self) -> Family {
        (**self).family()
    }

    fn classify(&self, input: &ModelInput) -> Result<PredictionList, ModelError> {
        (**self).classify(input)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Builds the real capability for a modality.
///
/// Loading may be slow and may touch the filesystem or an accelerator; the
/// registry calls it once per modality at construction.
pub trait CapabilityLoader {
    fn load(&self, modality: Modality) -> anyhow::Result<Box<dyn Capability>>;
}
