//! Preprocessing many images at once.
//!
//! Every file is processed independently; results come back in input order
//! no matter which file finishes first.

use crate::codec::{ImageCodec, RasterCodec};
use crate::preprocess::{preprocess_with, PreprocessOptions};
use crate::source::{KeepReason, ProcessedImage, SourceImage, Stage};
use std::sync::Arc;

/// Preprocess all sources concurrently on the tokio blocking pool.
///
/// Resolves once every file is done. A worker that panics yields the original
/// bytes for its file.
#[cfg(feature = "async")]
pub async fn preprocess_all(sources: Vec<SourceImage>, options: &PreprocessOptions) -> Vec<ProcessedImage> {
    preprocess_all_with(Arc::new(ImageCodec::default()), sources, options).await
}

/// Same as [`preprocess_all`] with a specific codec.
#[cfg(feature = "async")]
pub async fn preprocess_all_with<C>(
    codec: Arc<C>,
    sources: Vec<SourceImage>,
    options: &PreprocessOptions,
) -> Vec<ProcessedImage>
where
    C: RasterCodec + 'static,
{
    let tasks = sources.into_iter().map(|source| {
        let codec = Arc::clone(&codec);
        let options = options.clone();
        let fallback = source.clone();

        async move {
            let handle =
                tokio::task::spawn_blocking(move || preprocess_with(codec.as_ref(), source, &options));

            match handle.await {
                Ok(processed) => processed,
                Err(e) => {
                    tracing::warn!(name = %fallback.name(), error = %e, "Preprocessing worker failed");
                    ProcessedImage::original(
                        fallback,
                        KeepReason::Failed {
                            stage: Stage::Worker,
                            message: e.to_string(),
                        },
                    )
                }
            }
        }
    });

    futures::future::join_all(tasks).await
}

/// Preprocess all sources on the rayon thread pool.
///
/// A panicking worker yields the original bytes for its file, as with
/// [`preprocess_all`].
#[cfg(feature = "parallel")]
pub fn preprocess_batch(sources: Vec<SourceImage>, options: &PreprocessOptions) -> Vec<ProcessedImage> {
    preprocess_batch_with(&ImageCodec::default(), sources, options)
}

/// Same as [`preprocess_batch`] with a specific codec.
#[cfg(feature = "parallel")]
pub fn preprocess_batch_with<C>(codec: &C, sources: Vec<SourceImage>, options: &PreprocessOptions) -> Vec<ProcessedImage>
where
    C: RasterCodec,
{
    use rayon::prelude::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    sources
        .into_par_iter()
        .map(|source| {
            let fallback = source.clone();
            catch_unwind(AssertUnwindSafe(|| preprocess_with(codec, source, options))).unwrap_or_else(|payload| {
                let message = panic_message(payload.as_ref());
                tracing::warn!(name = %fallback.name(), error = %message, "Preprocessing worker failed");
                ProcessedImage::original(
                    fallback,
                    KeepReason::Failed {
                        stage: Stage::Worker,
                        message,
                    },
                )
            })
        })
        .collect()
}

#[cfg(feature = "parallel")]
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "worker panicked".to_string())
}

#[cfg(all(test, feature = "async"))]
mod tests {
    use super::*;
    use crate::dimensions::Dimensions;
    use crate::{ImageError, ImageFormat, Result};
    use image::DynamicImage;
    use std::time::Duration;

    /// Decodes after a delay encoded in the first byte; encodes to half the input size.
    struct SlowCodec;

    impl RasterCodec for SlowCodec {
        fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
            let delay = *bytes.first().ok_or_else(|| ImageError::Decode("empty".into()))?;
            if delay == u8::MAX {
                panic!("decoder crashed");
            }
            std::thread::sleep(Duration::from_millis(u64::from(delay)));
            Ok(DynamicImage::new_luma8(bytes.len() as u32, 1))
        }

        fn render(&self, raster: DynamicImage, _target: Dimensions) -> Result<DynamicImage> {
            Ok(raster)
        }

        fn encode(&self, raster: &DynamicImage, _format: ImageFormat, _quality: u8) -> Result<Vec<u8>> {
            Ok(vec![0; (raster.width() / 2) as usize])
        }
    }

    fn source(name: &str, delay_ms: u8, len: usize) -> SourceImage {
        let mut bytes = vec![0u8; len];
        bytes[0] = delay_ms;
        SourceImage::new(name, "image/png", bytes)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_outputs_follow_input_order() {
        let sources = vec![
            source("slow.png", 80, 100),
            source("fast.png", 1, 40),
            source("medium.png", 30, 60),
        ];

        let processed = preprocess_all_with(Arc::new(SlowCodec), sources, &PreprocessOptions::default()).await;

        let names: Vec<_> = processed.iter().map(ProcessedImage::name).collect();
        assert_eq!(names, ["slow.webp", "fast.webp", "medium.webp"]);
        let sizes: Vec<_> = processed.iter().map(ProcessedImage::len).collect();
        assert_eq!(sizes, [50, 20, 30]);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let processed = preprocess_all(Vec::new(), &PreprocessOptions::default()).await;
        assert!(processed.is_empty());
    }

    #[tokio::test]
    async fn test_panicking_worker_falls_back_to_original() {
        let crashing = source("crash.png", u8::MAX, 10);
        let sources = vec![crashing.clone(), source("ok.png", 0, 10)];

        let processed = preprocess_all_with(Arc::new(SlowCodec), sources, &PreprocessOptions::default()).await;

        assert_eq!(processed[0].bytes(), crashing.bytes());
        assert_eq!(processed[0].name(), "crash.png");
        assert!(processed[1].is_compressed());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_rayon_batch_keeps_order() {
        let sources = vec![
            SourceImage::new("a.txt", "text/plain", b"aaaa".to_vec()),
            SourceImage::new("b.txt", "text/plain", b"bbbb".to_vec()),
        ];
        let processed = preprocess_batch(sources, &PreprocessOptions::default());
        let names: Vec<_> = processed.iter().map(ProcessedImage::name).collect();
        assert_eq!(names, ["a.txt", "b.txt"]);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_rayon_panicking_worker_falls_back_to_original() {
        let crashing = source("crash.png", u8::MAX, 10);
        let sources = vec![source("ok.png", 0, 10), crashing.clone()];

        let processed = preprocess_batch_with(&SlowCodec, sources, &PreprocessOptions::default());

        assert!(processed[0].is_compressed());
        assert_eq!(processed[1].bytes(), crashing.bytes());
        match processed[1].outcome() {
            crate::Outcome::Original(KeepReason::Failed { stage, message }) => {
                assert_eq!(*stage, Stage::Worker);
                assert!(message.contains("decoder crashed"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}
