pub mod config;
pub mod modality;
pub mod prediction;

pub use config::{Device, StudioConfig};
pub use modality::{Modality, UnknownModality};
pub use prediction::{Prediction, PredictionList, SchemaError};
