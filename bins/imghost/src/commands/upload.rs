//! Validate, compress and upload images as expiring links

use super::{input, record_outcomes, Context, TuningArgs};
use anyhow::Result;
use imghost_api_client::{
    ApiResult, ClientConfig, ImghostClient, ProgressCallback, UploadFile, UploadProgress,
};
use imghost_cli::output::{accent, format_count, format_duration, format_expiry, Status};
use imghost_cli::progress;
use imghost_core::config::UploadConfig;
use imghost_core::validation::{partition_images, validate_selection, FileCandidate, SelectionLimits};
use imghost_image::preprocess_all;
use imghost_telemetry::{metrics, names, Timer};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Upload `paths`, compressing them first unless `no_compress` is set
///
/// The selection is validated against the configured limits before any
/// image is decoded or any request is made.
pub async fn run(
    ctx: &Context,
    paths: &[PathBuf],
    expiry: Option<u32>,
    no_compress: bool,
    tuning: &TuningArgs,
    json: bool,
) -> Result<()> {
    let upload_config = &ctx.config.schema.upload;
    let limits = SelectionLimits::from(upload_config);
    let expiry = expiry.unwrap_or(upload_config.default_expiry_minutes);
    let options = (!no_compress)
        .then(|| ctx.preprocess_options(tuning))
        .transpose()?;

    let files = input::collect_paths(paths)?;
    let sources = input::load_sources(&files)?;
    let (images, skipped) = partition_images(sources, |s| s.media_type());
    for source in &skipped {
        Status::warning(&format!("Skipping {} (not an image)", source.name()));
    }

    let candidates: Vec<FileCandidate> = images
        .iter()
        .map(|s| FileCandidate::new(s.name(), s.media_type(), s.len() as u64))
        .collect();
    validate_selection(&candidates, Some(expiry), &limits).to_result()?;

    let upload_files: Vec<UploadFile> = match options {
        Some(options) => {
            let spinner = progress::spinner(&format!(
                "Compressing {}",
                format_count(images.len(), "image", "images")
            ));
            let timer = Timer::start(names::PREPROCESS_MS);
            let processed = preprocess_all(images, &options).await;
            let elapsed = timer.stop();
            progress::finish_success(&spinner, &format!("Processed in {}", format_duration(elapsed)));
            record_outcomes(&processed);
            processed.into_iter().map(UploadFile::from).collect()
        }
        None => images.into_iter().map(UploadFile::from).collect(),
    };

    let client = ImghostClient::with_config(client_config(ctx)?)?;
    let total: u64 = upload_files.iter().map(|f| f.bytes.len() as u64).sum();

    let bar = progress::upload_progress(total);
    let sink = bar.clone();
    let on_progress: ProgressCallback = Arc::new(move |p: UploadProgress| sink.set_position(p.sent));

    let timer = Timer::start(names::UPLOAD_MS);
    let result = client
        .upload()
        .send_with_progress(upload_files, Some(expiry), on_progress)
        .await;
    let elapsed = timer.stop();

    let uploaded = match result {
        Ok(uploaded) => {
            progress::finish_success(&bar, &format!("Uploaded in {}", format_duration(elapsed)));
            uploaded
        }
        Err(e) => {
            progress::finish_error(&bar, "Upload failed");
            return Err(e.into());
        }
    };
    metrics().increment_by(names::BYTES_UPLOADED, total);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "expiry_minutes": expiry,
                "images": uploaded,
            }))?
        );
        return Ok(());
    }

    ctx.header("Shareable links");
    for image in &uploaded {
        println!("  {}", accent(&image.url, ctx.theme()));
    }
    println!();
    Status::info(&format!("Links will expire in {}", format_expiry(expiry)));

    Ok(())
}

/// API client settings: environment first, then the config file
pub(crate) fn client_config(ctx: &Context) -> ApiResult<ClientConfig> {
    let config = ClientConfig::from_env()?;
    Ok(apply_file_config(config, &ctx.config.schema.upload, |key| {
        std::env::var(key).ok()
    }))
}

fn apply_file_config<F>(mut config: ClientConfig, upload: &UploadConfig, var: F) -> ClientConfig
where
    F: Fn(&str) -> Option<String>,
{
    let is_set = |key: &str| var(key).is_some_and(|v| !v.trim().is_empty());

    if !is_set("IMGHOST_API_URL") {
        if let Some(url) = &upload.api_url {
            config = config.with_base_url(url.as_str());
        }
    }
    if !is_set("IMGHOST_TIMEOUT_SECS") {
        config = config.with_timeout(Duration::from_secs(upload.timeout_secs));
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload_config() -> UploadConfig {
        UploadConfig {
            api_url: Some("https://files.example.org/".to_string()),
            timeout_secs: 15,
            ..Default::default()
        }
    }

    #[test]
    fn test_file_config_fills_gaps() {
        let config = apply_file_config(ClientConfig::production(), &upload_config(), |_| None);

        assert_eq!(config.base_url, "https://files.example.org");
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_environment_wins() {
        let env = ClientConfig::production()
            .with_base_url("http://127.0.0.1:9000")
            .with_timeout(Duration::from_secs(3));
        let config = apply_file_config(env, &upload_config(), |key| match key {
            "IMGHOST_API_URL" => Some("http://127.0.0.1:9000".to_string()),
            "IMGHOST_TIMEOUT_SECS" => Some("3".to_string()),
            _ => None,
        });

        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_no_api_url_keeps_default() {
        let upload = UploadConfig {
            api_url: None,
            ..Default::default()
        };
        let config = apply_file_config(ClientConfig::production(), &upload, |_| None);
        assert_eq!(config.base_url, imghost_api_client::config::DEFAULT_API_URL);
    }
}
