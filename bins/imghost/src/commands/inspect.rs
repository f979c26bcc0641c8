//! Show what the preprocessor would do with a file

use super::Context;
use anyhow::{Context as _, Result};
use imghost_cli::output::format_size;
use imghost_core::{Error, ErrorCode};
use imghost_image::{detect_format, extract_metadata, Dimensions, ImageFormat};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct Inspection<'a> {
    path: &'a Path,
    format: ImageFormat,
    media_type: &'static str,
    size_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<Dimensions>,
    needs_resize: bool,
}

/// Print format, MIME type, dimensions and the planned target raster
pub fn run(ctx: &Context, path: &Path, max_dimension: Option<u32>, json: bool) -> Result<()> {
    if !path.is_file() {
        return Err(Error::file_not_found(path).into());
    }
    let data = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let format = detect_format(&data)
        .map_err(|e| Error::new(ErrorCode::UnsupportedMediaType, e.to_string()))?;

    let max_dimension = max_dimension.unwrap_or(ctx.config.schema.preprocess.max_dimension);
    let metadata = extract_metadata(&data);
    let inspection = Inspection {
        path,
        format,
        media_type: format.mime_type(),
        size_bytes: data.len(),
        dimensions: metadata.as_ref().map(|m| m.dimensions()),
        target: metadata.as_ref().map(|m| m.target_dimensions(max_dimension)),
        needs_resize: metadata.as_ref().is_some_and(|m| m.needs_resize(max_dimension)),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&inspection)?);
        return Ok(());
    }

    ctx.header(&path.display().to_string());
    println!("  {:<12} {}", "Format:", format);
    println!("  {:<12} {}", "MIME:", inspection.media_type);
    println!("  {:<12} {}", "Size:", format_size(data.len() as u64));
    match (inspection.dimensions, inspection.target) {
        (Some(dimensions), Some(target)) => {
            println!("  {:<12} {}", "Dimensions:", dimensions);
            if inspection.needs_resize {
                println!(
                    "  {:<12} {} {}",
                    "Target:",
                    target.to_string().yellow(),
                    format!("(longer side capped at {})", max_dimension).dimmed()
                );
            } else {
                println!("  {:<12} {}", "Target:", "unchanged".green());
            }
        }
        _ => println!("  {:<12} {}", "Dimensions:", "unknown".dimmed()),
    }

    Ok(())
}
