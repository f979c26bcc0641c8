//! imghost CLI
//!
//! Compresses images in the background and shares them as expiring links.

use clap::{Parser, Subcommand};
use imghost_api_client::ApiError;
use imghost_core::config::Config;
use imghost_core::error::exit_codes;
use imghost_core::settings::SettingsStore;
use imghost_telemetry::{LogFormat, TelemetryConfig};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

use commands::{compress, health, inspect, theme, upload, Context, TuningArgs};

/// Compress images and share them as expiring links
#[derive(Parser)]
#[command(name = "imghost")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file (default: ./imghost.toml, then the user config directory)
    #[arg(long, global = true, env = "IMGHOST_CONFIG")]
    config: Option<PathBuf>,

    /// Settings file holding the selected theme
    #[arg(long, global = true, env = "IMGHOST_SETTINGS")]
    settings: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace) and print metrics on exit
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress images into a directory without uploading
    Compress {
        /// Image files or directories (`-` reads one image from stdin)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Directory for the results
        #[arg(short, long, default_value = "compressed")]
        out_dir: PathBuf,

        #[command(flatten)]
        tuning: TuningArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show format, dimensions and the planned target raster of an image
    Inspect {
        /// Image file
        path: PathBuf,

        /// Longest side in pixels before downscaling
        #[arg(long)]
        max_dimension: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compress and upload images, printing shareable links
    Upload {
        /// Image files or directories (`-` reads one image from stdin)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Link lifetime in minutes (default from config)
        #[arg(short, long)]
        expiry: Option<u32>,

        /// Upload the original bytes
        #[arg(long)]
        no_compress: bool,

        #[command(flatten)]
        tuning: TuningArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check backend health
    Health {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change the colour theme
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
}

#[derive(Subcommand)]
enum ThemeAction {
    /// List available themes
    List,
    /// Print the active theme
    Get,
    /// Select a theme
    Set {
        /// Theme name, e.g. nordic
        name: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return report(&e.into()),
    };

    let _guard = match imghost_telemetry::init_with_config(telemetry_config(&cli, &config)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{} {}", "Warning:".yellow().bold(), e);
            None
        }
    };

    let settings = match &cli.settings {
        Some(path) => SettingsStore::open(path),
        None => SettingsStore::open_default(),
    };

    let ctx = Context {
        config,
        settings,
        verbose: cli.verbose > 0,
    };

    let result = match cli.command {
        Commands::Compress { paths, out_dir, tuning, json } => {
            compress::run(&ctx, &paths, &out_dir, &tuning, json).await
        }

        Commands::Inspect { path, max_dimension, json } => {
            inspect::run(&ctx, &path, max_dimension, json)
        }

        Commands::Upload { paths, expiry, no_compress, tuning, json } => {
            upload::run(&ctx, &paths, expiry, no_compress, &tuning, json).await
        }

        Commands::Health { json } => health::run(&ctx, json).await,

        Commands::Theme { action } => match action {
            ThemeAction::List => theme::list(&ctx),
            ThemeAction::Get => theme::get(&ctx),
            ThemeAction::Set { name } => theme::set(&ctx, &name),
        },
    };

    if ctx.verbose {
        let snapshot = imghost_telemetry::metrics().export_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&snapshot).unwrap_or_else(|_| snapshot.to_string())
        );
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

fn telemetry_config(cli: &Cli, config: &Config) -> TelemetryConfig {
    let logging = &config.schema.logging;
    let log_level = match cli.verbose {
        0 => logging.level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let format = cli
        .log_format
        .or_else(|| logging.format.parse().ok())
        .unwrap_or_default();

    TelemetryConfig {
        log_level,
        format,
        log_file: logging.file.as_ref().map(PathBuf::from),
        show_target: cli.verbose > 1,
        ..Default::default()
    }
}

fn report(error: &anyhow::Error) -> ExitCode {
    eprintln!("{} {:#}", "Error:".red().bold(), error);
    ExitCode::from(exit_code(error) as u8)
}

fn exit_code(error: &anyhow::Error) -> i32 {
    if let Some(e) = error.downcast_ref::<imghost_core::Error>() {
        e.code.exit_code()
    } else if let Some(e) = error.downcast_ref::<ApiError>() {
        match e {
            ApiError::Config(_) => exit_codes::CONFIG_ERROR,
            _ => exit_codes::NETWORK_ERROR,
        }
    } else {
        exit_codes::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imghost_core::{Error, ErrorCode};

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_exit_codes() {
        let validation: anyhow::Error = Error::new(ErrorCode::TooManyFiles, "too many").into();
        assert_eq!(exit_code(&validation), exit_codes::VALIDATION_ERROR);

        let theme: anyhow::Error = Error::unknown_theme("neon").into();
        assert_eq!(exit_code(&theme), exit_codes::SETTINGS_ERROR);

        let network: anyhow::Error = ApiError::api_response(502, "bad gateway").into();
        assert_eq!(exit_code(&network), exit_codes::NETWORK_ERROR);

        let exhausted: anyhow::Error = ApiError::RetriesExhausted {
            attempts: 3,
            last_error: "timed out".into(),
        }
        .into();
        assert_eq!(exit_code(&exhausted), exit_codes::NETWORK_ERROR);

        let config: anyhow::Error = ApiError::config("bad url").into();
        assert_eq!(exit_code(&config), exit_codes::CONFIG_ERROR);

        assert_eq!(exit_code(&anyhow::anyhow!("boom")), exit_codes::FAILURE);
    }

    #[test]
    fn test_verbosity_overrides_log_level() {
        let config = Config::default();

        let cli = Cli::parse_from(["imghost", "theme", "get"]);
        assert_eq!(telemetry_config(&cli, &config).log_level, "warn");

        let cli = Cli::parse_from(["imghost", "-vv", "--log-format", "json", "theme", "get"]);
        let telemetry = telemetry_config(&cli, &config);
        assert_eq!(telemetry.log_level, "trace");
        assert_eq!(telemetry.format, LogFormat::Json);
    }
}
