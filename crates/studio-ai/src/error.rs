use studio_core::{Modality, SchemaError, UnknownModality};
use thiserror::Error;

use crate::InputKind;

/// Failure of a single capability lookup or invocation.
///
/// Never triggers a switch to the fallback family; that decision is made
/// once, when the registry is built.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid modality '{0}'")]
    InvalidModality(String),

    #[error("{modality} model cannot classify {got} input")]
    UnsupportedInput { modality: Modality, got: InputKind },

    #[error("inference failed: {0:#}")]
    Inference(anyhow::Error),

    #[error("model produced an invalid prediction: {0}")]
    Schema(#[from] SchemaError),
}

impl From<UnknownModality> for ModelError {
    fn from(err: UnknownModality) -> Self {
        Self::InvalidModality(err.0)
    }
}

/// Input rejected before it is ever submitted to a model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter some text first.")]
    EmptyText,

    #[error("Please choose an image first.")]
    EmptyImage,

    #[error("Input type is {got}, but {modality} expects {expected} input.")]
    WrongInput {
        modality: Modality,
        expected: InputKind,
        got: InputKind,
    },
}
