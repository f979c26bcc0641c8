//! CLI command implementations

pub mod compress;
pub mod health;
pub mod input;
pub mod inspect;
pub mod theme;
pub mod upload;

use clap::Args;
use imghost_cli::output::accent;
use imghost_core::config::{Config, OUTPUT_FORMATS};
use imghost_core::settings::{SettingsStore, Theme};
use imghost_core::validation::Validator;
use imghost_core::Error;
use imghost_image::{ImageFormat, KeepReason, Outcome, PreprocessOptions, ProcessedImage};
use imghost_telemetry::{metrics, names};
use owo_colors::OwoColorize;

/// State shared by every command
pub struct Context {
    pub config: Config,
    pub settings: SettingsStore,
    pub verbose: bool,
}

/// Preprocessing overrides accepted by `compress` and `upload`
#[derive(Args, Debug, Clone, Default)]
pub struct TuningArgs {
    /// Longest side in pixels before downscaling
    #[arg(long)]
    pub max_dimension: Option<u32>,

    /// Encoder quality (1-100)
    #[arg(short, long)]
    pub quality: Option<u8>,

    /// Output format (webp, jpeg)
    #[arg(short, long)]
    pub format: Option<String>,
}

impl Context {
    /// Current accent theme
    pub fn theme(&self) -> Theme {
        self.settings.theme()
    }

    /// Preprocessing options from the config file with command-line overrides
    pub fn preprocess_options(&self, tuning: &TuningArgs) -> imghost_core::Result<PreprocessOptions> {
        let config = &self.config.schema.preprocess;
        let max_dimension = tuning.max_dimension.unwrap_or(config.max_dimension);
        let quality = tuning.quality.unwrap_or(config.quality);
        let format_name = tuning
            .format
            .as_deref()
            .unwrap_or(&config.format)
            .to_ascii_lowercase();

        Validator::new()
            .range("max_dimension", max_dimension, 1, 65_535)
            .range("quality", quality, 1, 100)
            .one_of("format", &format_name, &OUTPUT_FORMATS)
            .validate()
            .to_result()?;

        let format: ImageFormat = format_name
            .parse()
            .map_err(|e: imghost_image::ImageError| Error::validation(e.to_string()))?;

        Ok(PreprocessOptions {
            max_dimension,
            quality,
            format,
            preserve_gif: config.preserve_gif,
        })
    }

    /// Bold section title in the theme's accent colour
    pub fn header(&self, title: &str) {
        let theme = self.theme();
        println!();
        println!("{}", accent(title, theme).bold());
        println!("{}", accent(&"─".repeat(title.chars().count()), theme));
    }
}

/// Count preprocessing outcomes into the metrics registry
pub fn record_outcomes(images: &[ProcessedImage]) {
    let registry = metrics();
    for image in images {
        if image.is_compressed() {
            registry.increment(names::FILES_COMPRESSED);
            registry.increment_by(names::BYTES_SAVED, image.saved_bytes() as u64);
        } else {
            registry.increment(names::FILES_KEPT);
        }
    }
}

/// One-line summary of how an image was produced
pub fn describe_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Compressed { source, target, .. } if source == target => {
            format!("re-encoded at {}", target)
        }
        Outcome::Compressed { source, target, .. } => format!("resized {} → {}", source, target),
        Outcome::Original(KeepReason::NotSmaller { .. }) => "kept original (not smaller)".to_string(),
        Outcome::Original(KeepReason::Passthrough) => "kept original (passthrough)".to_string(),
        Outcome::Original(KeepReason::Failed { stage, .. }) => {
            format!("kept original ({:?} failed)", stage).to_lowercase()
        }
    }
}
