//! Result persistence: prediction lists as pretty-printed JSON artifacts.

mod error;
pub use error::StoreError;

mod json;
pub use json::{load_predictions, save_predictions, save_text};
