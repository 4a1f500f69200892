//! The closed set of input modalities the studio can run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Text sentiment classification.
    Sentiment,
    /// Image classification.
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown modality '{0}' (expected 'sentiment' or 'image')")]
pub struct UnknownModality(pub String);

impl Modality {
    pub const ALL: [Modality; 2] = [Modality::Sentiment, Modality::Image];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sentiment => "sentiment",
            Self::Image => "image",
        }
    }

    /// Pipeline task name, as used in model cards.
    pub fn task(&self) -> &'static str {
        match self {
            Self::Sentiment => "sentiment-analysis",
            Self::Image => "image-classification",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = UnknownModality;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sentiment" => Ok(Self::Sentiment),
            "image" => Ok(Self::Image),
            _ => Err(UnknownModality(s.to_string())),
        }
    }
}
