//! Compress images to disk without uploading

use super::{describe_outcome, input, record_outcomes, Context, TuningArgs};
use anyhow::{Context as _, Result};
use imghost_cli::output::{format_count, format_duration, format_reduction, format_size, Status};
use imghost_cli::progress;
use imghost_core::validation::partition_images;
use imghost_core::{Error, ErrorCode};
use imghost_image::{preprocess_all, Outcome, ProcessedImage};
use imghost_telemetry::{names, Timer};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct CompressedFile<'a> {
    name: &'a str,
    path: PathBuf,
    media_type: &'a str,
    original_bytes: usize,
    bytes: usize,
    result: &'a Outcome,
}

/// Preprocess `paths` and write the results into `out_dir`
pub async fn run(
    ctx: &Context,
    paths: &[PathBuf],
    out_dir: &Path,
    tuning: &TuningArgs,
    json: bool,
) -> Result<()> {
    let options = ctx.preprocess_options(tuning)?;
    let files = input::collect_paths(paths)?;
    let sources = input::load_sources(&files)?;

    let (images, skipped) = partition_images(sources, |s| s.media_type());
    for source in &skipped {
        Status::warning(&format!("Skipping {} (not an image)", source.name()));
    }
    if images.is_empty() {
        return Err(Error::new(ErrorCode::EmptySelection, "No images to compress").into());
    }

    let spinner = progress::spinner(&format!(
        "Compressing {}",
        format_count(images.len(), "image", "images")
    ));
    let timer = Timer::start(names::PREPROCESS_MS);
    let processed = preprocess_all(images, &options).await;
    let elapsed = timer.stop();
    progress::finish_success(&spinner, &format!("Processed in {}", format_duration(elapsed)));
    record_outcomes(&processed);

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let names = output_names(processed.iter().map(ProcessedImage::name));
    let mut written = Vec::with_capacity(processed.len());
    for (image, name) in processed.iter().zip(&names) {
        let path = out_dir.join(name);
        std::fs::write(&path, image.bytes())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = image.len(), "Wrote image");
        written.push(CompressedFile {
            name,
            path,
            media_type: image.media_type(),
            original_bytes: image.original_len(),
            bytes: image.len(),
            result: image.outcome(),
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&written)?);
        return Ok(());
    }

    ctx.header("Compressed images");
    for (file, image) in written.iter().zip(&processed) {
        print_row(file, image);
    }

    let original: u64 = processed.iter().map(|i| i.original_len() as u64).sum();
    let total: u64 = processed.iter().map(|i| i.len() as u64).sum();
    println!();
    Status::success(&format!(
        "{} written to {} ({} → {}, {})",
        format_count(processed.len(), "file", "files"),
        out_dir.display(),
        format_size(original),
        format_size(total),
        format_reduction(original, total)
    ));

    Ok(())
}

/// File names for the output directory, numbering repeats as `stem-1.ext`
fn output_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut taken = HashSet::new();

    names
        .into_iter()
        .map(|name| {
            let path = Path::new(name);
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
            let extension = path.extension().and_then(|e| e.to_str());

            let mut candidate = name.to_string();
            let mut n = 0;
            while !taken.insert(candidate.clone()) {
                n += 1;
                candidate = match extension {
                    Some(ext) => format!("{stem}-{n}.{ext}"),
                    None => format!("{stem}-{n}"),
                };
            }
            if n > 0 {
                tracing::debug!(name, renamed = %candidate, "Output name already taken");
            }
            candidate
        })
        .collect()
}

fn print_row(file: &CompressedFile<'_>, image: &ProcessedImage) {
    let sizes = format!(
        "{:>10} → {:>10}",
        format_size(file.original_bytes as u64),
        format_size(file.bytes as u64)
    );
    let reduction = format_reduction(file.original_bytes as u64, file.bytes as u64);

    if image.is_compressed() {
        println!(
            "  {:<32} {}  {}  {}",
            file.name,
            sizes,
            reduction.green(),
            describe_outcome(file.result).dimmed()
        );
    } else {
        println!(
            "  {:<32} {}  {}  {}",
            file.name,
            sizes,
            reduction.dimmed(),
            describe_outcome(file.result).yellow()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_names_are_unique() {
        let names = output_names(["photo.webp", "photo.webp", "scan.webp", "photo.webp"]);
        assert_eq!(names, ["photo.webp", "photo-1.webp", "scan.webp", "photo-2.webp"]);
    }

    #[test]
    fn test_output_names_skip_existing_suffixes() {
        let names = output_names(["photo-1.webp", "photo.webp", "photo.webp", "README"]);
        assert_eq!(names, ["photo-1.webp", "photo.webp", "photo-2.webp", "README"]);

        let names = output_names(["notes", "notes"]);
        assert_eq!(names, ["notes", "notes-1"]);
    }
}
