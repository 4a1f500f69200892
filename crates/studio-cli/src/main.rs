mod display;
mod run;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};
use studio_ai::Registry;
use studio_core::{Device, StudioConfig};
use tracing::Level;

use run::RunInput;

#[derive(Parser, Debug)]
#[command(name = "studio", version, about = "Sentiment and image classification studio")]
struct Cli {
    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Log warnings and errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(flatten)]
    models: ModelArgs,

    #[command(subcommand)]
    command: Command,
}

/// Where the models live and how to run them. Unset values use the
/// [`StudioConfig`] defaults.
#[derive(Args, Debug)]
struct ModelArgs {
    /// Directory with one sub-directory per model
    #[arg(long, env = "STUDIO_MODELS_DIR")]
    models_dir: Option<PathBuf>,

    /// Sentiment model sub-directory
    #[arg(long, env = "STUDIO_SENTIMENT_MODEL")]
    sentiment_model: Option<String>,

    /// Image model sub-directory
    #[arg(long, env = "STUDIO_IMAGE_MODEL")]
    image_model: Option<String>,

    /// Execution device: auto, cpu or cuda
    #[arg(long, env = "STUDIO_DEVICE")]
    device: Option<Device>,

    /// Maximum predictions returned by the real models
    #[arg(long, env = "STUDIO_TOP_K")]
    top_k: Option<usize>,

    /// Square input size of the image model
    #[arg(long, env = "STUDIO_IMAGE_SIZE")]
    image_size: Option<u32>,

    /// Token budget for the sentiment model
    #[arg(long, env = "STUDIO_MAX_TEXT_LEN")]
    max_text_len: Option<usize>,

    /// How often to check for a finished job, in milliseconds
    #[arg(long, env = "STUDIO_POLL_INTERVAL_MS")]
    poll_interval_ms: Option<u64>,
}

impl ModelArgs {
    fn into_config(self) -> StudioConfig {
        let defaults = StudioConfig::default();
        StudioConfig {
            models_dir: self.models_dir.unwrap_or(defaults.models_dir),
            sentiment_model: self.sentiment_model.unwrap_or(defaults.sentiment_model),
            image_model: self.image_model.unwrap_or(defaults.image_model),
            device: self.device.unwrap_or(defaults.device),
            top_k: self.top_k.unwrap_or(defaults.top_k),
            image_size: self.image_size.unwrap_or(defaults.image_size),
            max_text_len: self.max_text_len.unwrap_or(defaults.max_text_len),
            poll_interval_ms: self.poll_interval_ms.unwrap_or(defaults.poll_interval_ms),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify one input and print the predictions
    Run {
        #[command(subcommand)]
        input: RunInput,
    },
    /// Describe the active model for a modality (sentiment or image)
    Describe {
        modality: String,

        /// Also write the description to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Render a saved predictions file
    Show {
        path: PathBuf,

        /// Also print the predictions as JSON
        #[arg(long)]
        raw: bool,
    },
}

fn log_level(verbose: u8, quiet: bool) -> Level {
    match (quiet, verbose) {
        (true, _) => Level::WARN,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(log_level(cli.verbose, cli.quiet))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("studio v{}", env!("CARGO_PKG_VERSION"));

    let config = cli.models.into_config();
    tracing::debug!(?config, "session config");

    match cli.command {
        Command::Run { input } => run::run(&config, input).await,
        Command::Describe { modality, save } => describe(&config, &modality, save.as_deref()),
        Command::Show { path, raw } => {
            let predictions = studio_store::load_predictions(&path)?;
            display::print_predictions(&predictions, raw)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn describe(config: &StudioConfig, modality: &str, save: Option<&Path>) -> anyhow::Result<ExitCode> {
    let registry = Registry::from_config(config);
    let capability = match registry.lookup(modality) {
        Ok(capability) => capability,
        Err(err) => {
            eprintln!("Error: {err}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let text = capability.describe();
    println!("{text}");
    if let Some(path) = save {
        studio_store::save_text(path, &text)?;
        eprintln!("Saved description to {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}
