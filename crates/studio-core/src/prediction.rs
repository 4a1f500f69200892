//! The shared output contract of every model invocation.
//!
//! Real pipelines, rule-based fallbacks, and test doubles all return a
//! [`PredictionList`]: a non-empty, ordered list of `(label, score)` pairs
//! with scores in `[0.0, 1.0]`. Consumers rely on this unconditionally.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("prediction list must contain at least one prediction")]
    EmptyList,

    #[error("prediction label must not be empty")]
    EmptyLabel,

    #[error("score {score} for label '{label}' is outside [0.0, 1.0]")]
    ScoreOutOfRange { label: String, score: f32 },
}

/// One `(label, confidence)` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPrediction")]
pub struct Prediction {
    label: String,
    score: f32,
}

#[derive(Deserialize)]
struct RawPrediction {
    label: String,
    score: f32,
}

impl TryFrom<RawPrediction> for Prediction {
    type Error = SchemaError;

    fn try_from(raw: RawPrediction) -> Result<Self, Self::Error> {
        Prediction::new(raw.label, raw.score)
    }
}

impl Prediction {
    /// Build a prediction, rejecting empty labels and scores outside `[0, 1]`.
    /// NaN and infinities count as out of range.
    pub fn new(label: impl Into<String>, score: f32) -> Result<Self, SchemaError> {
        let label = label.into();
        if label.is_empty() {
            return Err(SchemaError::EmptyLabel);
        }
        if !(0.0..=1.0).contains(&score) {
            return Err(SchemaError::ScoreOutOfRange { label, score });
        }
        Ok(Self { label, score })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn score(&self) -> f32 {
        self.score
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2})", self.label, self.score)
    }
}

/// Non-empty ordered sequence of [`Prediction`]s.
///
/// Order is whatever the producer emitted (descending score for ranking
/// pipelines). The list is never re-sorted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Prediction>", into = "Vec<Prediction>")]
pub struct PredictionList(Vec<Prediction>);

impl PredictionList {
    pub fn new(predictions: Vec<Prediction>) -> Result<Self, SchemaError> {
        if predictions.is_empty() {
            return Err(SchemaError::EmptyList);
        }
        Ok(Self(predictions))
    }

    /// A list holding exactly one prediction.
    pub fn single(label: impl Into<String>, score: f32) -> Result<Self, SchemaError> {
        Ok(Self(vec![Prediction::new(label, score)?]))
    }

    /// Build from `(label, score)` pairs, validating each.
    pub fn from_pairs<I, L>(pairs: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (L, f32)>,
        L: Into<String>,
    {
        let predictions = pairs
            .into_iter()
            .map(|(label, score)| Prediction::new(label, score))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(predictions)
    }

    /// First prediction in producer order. Always present.
    pub fn top(&self) -> &Prediction {
        &self.0[0]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; provided for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Prediction> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Prediction] {
        &self.0
    }

    /// Raw JSON view: a top-level array of `{label, score}` objects with
    /// 2-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl TryFrom<Vec<Prediction>> for PredictionList {
    type Error = SchemaError;

    fn try_from(predictions: Vec<Prediction>) -> Result<Self, Self::Error> {
        Self::new(predictions)
    }
}

impl From<PredictionList> for Vec<Prediction> {
    fn from(list: PredictionList) -> Self {
        list.0
    }
}

impl<'a> IntoIterator for &'a PredictionList {
    type Item = &'a Prediction;
    type IntoIter = std::slice::Iter<'a, Prediction>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for PredictionList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for p in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
            first = false;
        }
        Ok(())
    }
}
