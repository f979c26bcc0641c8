//! Resolving command-line paths into source images

use imghost_core::Error;
use imghost_image::{detect_format, ImageFormat, SourceImage, FALLBACK_MEDIA_TYPE};
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Path argument that reads one image from standard input
pub const STDIN: &str = "-";

/// Name given to images read from standard input, before the extension
const PASTED_STEM: &str = "pasted";

/// Expand `paths` into files
///
/// Files are taken as given. Directories are walked recursively and only
/// files with an image extension are kept, sorted for stable output.
/// `-` is kept once and stands for standard input.
pub fn collect_paths(paths: &[PathBuf]) -> imghost_core::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stdin_seen = false;

    for path in paths {
        if is_stdin(path) {
            if !stdin_seen {
                stdin_seen = true;
                files.push(path.clone());
            }
            continue;
        }

        if !path.exists() {
            return Err(Error::file_not_found(path));
        }

        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| has_image_extension(p))
                .collect();
            found.sort();
            tracing::debug!(dir = %path.display(), files = found.len(), "Expanded directory");
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }

    Ok(files)
}

/// Read every file into memory
pub fn load_sources(paths: &[PathBuf]) -> imghost_core::Result<Vec<SourceImage>> {
    paths
        .iter()
        .map(|path| {
            if is_stdin(path) {
                return read_source(std::io::stdin().lock());
            }
            SourceImage::from_path(path).map_err(|e| {
                Error::io(format!("Failed to read {}", path.display())).with_source(e)
            })
        })
        .collect()
}

/// Read a piped image; its type comes from the content since there is no name
pub fn read_source(mut reader: impl Read) -> imghost_core::Result<SourceImage> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| Error::io("Failed to read standard input").with_source(e))?;

    let source = match detect_format(&bytes) {
        Ok(format) => SourceImage::new(
            format!("{PASTED_STEM}.{}", format.extension()),
            format.mime_type(),
            bytes,
        ),
        Err(_) => SourceImage::new(PASTED_STEM, FALLBACK_MEDIA_TYPE, bytes),
    };
    tracing::debug!(name = source.name(), bytes = source.len(), "Read standard input");

    Ok(source)
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == STDIN
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(ImageFormat::from_extension)
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use imghost_core::ErrorCode;
    use tempfile::TempDir;

    #[test]
    fn test_collect_walks_directories() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.png"), b"png").unwrap();
        std::fs::write(dir.path().join("a.JPG"), b"jpg").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"text").unwrap();
        std::fs::write(dir.path().join("nested/c.webp"), b"webp").unwrap();

        let files = collect_paths(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(names, ["a.JPG", "b.png", "nested/c.webp"]);
    }

    #[test]
    fn test_explicit_files_kept_as_given() {
        let dir = TempDir::new().unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, b"text").unwrap();

        let files = collect_paths(&[notes.clone()]).unwrap();
        assert_eq!(files, [notes]);
    }

    #[test]
    fn test_missing_path() {
        let err = collect_paths(&[PathBuf::from("/definitely/not/here.png")]).unwrap_err();
        assert_eq!(err.code, ErrorCode::FileNotFound);
    }

    #[test]
    fn test_stdin_marker_kept_once() {
        let files = collect_paths(&[PathBuf::from("-"), PathBuf::from("-")]).unwrap();
        assert_eq!(files, [PathBuf::from(STDIN)]);
    }

    #[test]
    fn test_read_source_names_by_content() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        let source = read_source(&png[..]).unwrap();
        assert_eq!(source.name(), "pasted.png");
        assert_eq!(source.media_type(), "image/png");

        let source = read_source(&b"just text"[..]).unwrap();
        assert_eq!(source.name(), "pasted");
        assert_eq!(source.media_type(), FALLBACK_MEDIA_TYPE);
        assert!(!source.is_image());
    }

    #[test]
    fn test_load_sources() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pixel.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]).unwrap();

        let sources = load_sources(&[path]).unwrap();
        assert_eq!(sources[0].name(), "pixel.png");
        assert_eq!(sources[0].media_type(), "image/png");
    }
}
