//! `studio run`: one classification through the background coordinator.

use std::cell::RefCell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Subcommand};
use studio_ai::preprocess::{self, PreprocessOptions};
use studio_ai::{InferenceRequest, ModelInput, Registry};
use studio_core::{Modality, PredictionList, StudioConfig};
use studio_exec::{Coordinator, Submission, submit_inference};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use crate::display;

#[derive(Subcommand, Debug)]
pub enum RunInput {
    /// Classify the sentiment of a piece of text
    Sentiment {
        /// Text to classify
        #[arg(long)]
        text: String,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Classify the contents of an image file
    Image {
        /// Image file (any format the `image` crate decodes)
        #[arg(long)]
        image: PathBuf,

        /// Resize to the model input size before classifying
        #[arg(long)]
        preprocess: bool,

        /// Convert to grayscale (with --preprocess)
        #[arg(long)]
        grayscale: bool,

        /// Apply a light Gaussian blur (with --preprocess)
        #[arg(long)]
        blur: bool,

        /// Replace the image with its edge map (with --preprocess)
        #[arg(long)]
        edges: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Write the predictions to this JSON file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Also print the predictions as JSON
    #[arg(long)]
    raw: bool,
}

pub async fn run(config: &StudioConfig, input: RunInput) -> anyhow::Result<ExitCode> {
    let registry = Arc::new(Registry::from_config(config));

    let (modality, model_input, output) = match input {
        RunInput::Sentiment { text, output } => (Modality::Sentiment, ModelInput::text(text), output),
        RunInput::Image {
            image,
            preprocess: resize,
            grayscale,
            blur,
            edges,
            output,
        } => {
            let options = PreprocessOptions {
                grayscale,
                blur,
                edge_detect: edges,
            };
            let img = preprocess::load_image(&image)?;
            let img = if resize {
                if options.any() && !preprocess::filters_available() {
                    warn!("built without image filters; only resizing");
                }
                let size = config.image_size;
                preprocess::preprocess(&img, (size, size), options)
            } else {
                if options.any() {
                    warn!("filter flags have no effect without --preprocess");
                }
                img
            };
            (Modality::Image, ModelInput::Image(img), output)
        }
    };

    let request = match InferenceRequest::new(modality, model_input) {
        Ok(request) => request,
        Err(err) => {
            eprintln!("{err}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let result: Rc<RefCell<Option<PredictionList>>> = Rc::new(RefCell::new(None));
    let delivered = Rc::clone(&result);
    let raw = output.raw;

    let mut coordinator = Coordinator::new(config.poll_interval()).with_error_sink(|_, err| {
        eprintln!("Error.");
        eprintln!("Error: {err}");
    });

    let submission = submit_inference(&mut coordinator, registry, request, move |list| {
        eprintln!("Done.");
        if let Err(err) = display::print_predictions(&list, raw) {
            warn!(error = %err, "could not render predictions");
        }
        *delivered.borrow_mut() = Some(list);
    });
    match submission {
        Submission::Started(_) => eprintln!("Running…"),
        Submission::Busy => {
            eprintln!("Busy…");
            return Ok(ExitCode::FAILURE);
        }
    }

    let mut ticker = time::interval(coordinator.poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    while coordinator.is_busy() {
        ticker.tick().await;
        for (job, status) in coordinator.poll().outcomes {
            debug!(%job, ?status, "delivered");
        }
    }

    let Some(list) = result.borrow_mut().take() else {
        return Ok(ExitCode::FAILURE);
    };
    if let Some(path) = output.save {
        let path = studio_store::save_predictions(&path, &list)
            .with_context(|| format!("saving results to {}", path.display()))?;
        eprintln!("Saved results to {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}
