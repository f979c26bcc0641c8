//! Image upload endpoint

use crate::client::{new_request_id, ImghostClient};
use crate::error::{ApiError, ApiResult};
use crate::progress::{ProgressCallback, ProgressTracker, UploadProgress};
use bytes::Bytes;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures::StreamExt;
use imghost_image::{ProcessedImage, SourceImage};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Method};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Multipart field carrying each image
pub const FILES_FIELD: &str = "files";

/// Multipart field carrying the requested lifetime
pub const EXPIRY_FIELD: &str = "expiry_minutes";

/// Granularity of progress callbacks
const CHUNK_SIZE: usize = 64 * 1024;

/// One file part of an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// File name sent to the server
    pub name: String,
    /// MIME type of the part
    pub media_type: String,
    /// Payload
    pub bytes: Bytes,
}

impl UploadFile {
    /// Create an upload part
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }
}

impl From<ProcessedImage> for UploadFile {
    fn from(image: ProcessedImage) -> Self {
        let name = image.name().to_string();
        let media_type = image.media_type().to_string();
        Self::new(name, media_type, image.into_bytes())
    }
}

impl From<SourceImage> for UploadFile {
    fn from(image: SourceImage) -> Self {
        Self::new(image.name(), image.media_type(), image.bytes().clone())
    }
}

/// A stored image as returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    /// Public retrieval URL
    pub url: String,
    /// When the link stops working
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Upload API interface
#[derive(Clone)]
pub struct UploadApi {
    client: ImghostClient,
}

impl UploadApi {
    /// Create a new upload API interface
    pub(crate) fn new(client: ImghostClient) -> Self {
        Self { client }
    }

    /// Upload without progress reporting
    pub async fn send(&self, files: Vec<UploadFile>, expiry_minutes: Option<u32>) -> ApiResult<Vec<UploadedImage>> {
        self.send_with_progress(files, expiry_minutes, Arc::new(|_: UploadProgress| {}))
            .await
    }

    /// Upload all files in a single multipart `POST /upload`
    ///
    /// `on_progress` fires as each chunk of file data is handed to the
    /// transport. The request is never retried. When the backend does not
    /// return an expiry, one is derived from `expiry_minutes`.
    pub async fn send_with_progress(
        &self,
        files: Vec<UploadFile>,
        expiry_minutes: Option<u32>,
        on_progress: ProgressCallback,
    ) -> ApiResult<Vec<UploadedImage>> {
        if files.is_empty() {
            return Err(ApiError::EmptyUpload);
        }

        let request_id = new_request_id();
        let file_count = files.len();
        let total: u64 = files.iter().map(|f| f.bytes.len() as u64).sum();
        let tracker = ProgressTracker::new(total, on_progress);

        let mut form = Form::new();
        for file in files {
            form = form.part(FILES_FIELD, file_part(file, tracker.clone())?);
        }
        if let Some(minutes) = expiry_minutes {
            form = form.text(EXPIRY_FIELD, minutes.to_string());
        }

        debug!(
            request_id = %request_id,
            files = file_count,
            bytes = total,
            expiry_minutes = ?expiry_minutes,
            "Uploading"
        );

        let requested_at = Utc::now();
        let start = Instant::now();
        let response = self
            .client
            .request(Method::POST, "upload", &request_id)
            .multipart(form)
            .send()
            .await?;

        let mut uploaded: Vec<UploadedImage> = ImghostClient::handle_response(response).await?;

        if let Some(minutes) = expiry_minutes {
            let fallback = requested_at + ChronoDuration::minutes(i64::from(minutes));
            for image in uploaded.iter_mut().filter(|i| i.expires_at.is_none()) {
                image.expires_at = Some(fallback);
            }
        }

        info!(
            request_id = %request_id,
            files = uploaded.len(),
            bytes = tracker.snapshot().sent,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Upload complete"
        );

        Ok(uploaded)
    }
}

/// Build a streamed file part that reports progress as it is read
fn file_part(file: UploadFile, tracker: ProgressTracker) -> ApiResult<Part> {
    let len = file.bytes.len();
    let chunks: Vec<Bytes> = (0..len)
        .step_by(CHUNK_SIZE)
        .map(|start| file.bytes.slice(start..(start + CHUNK_SIZE).min(len)))
        .collect();

    let stream = futures::stream::iter(chunks).map(move |chunk| {
        tracker.advance(chunk.len() as u64);
        Ok::<Bytes, std::io::Error>(chunk)
    });

    Part::stream_with_length(Body::wrap_stream(stream), len as u64)
        .file_name(file.name)
        .mime_str(&file.media_type)
        .map_err(ApiError::Request)
}

/// Final progress value for a finished upload of `files`
pub fn completed(files: &[UploadFile]) -> UploadProgress {
    let total = files.iter().map(|f| f.bytes.len() as u64).sum();
    UploadProgress { sent: total, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use serde_json::json;
    use std::sync::Mutex;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ImghostClient {
        ImghostClient::with_config(ClientConfig::development().with_base_url(server.uri())).unwrap()
    }

    fn files() -> Vec<UploadFile> {
        vec![
            UploadFile::new("cat.webp", "image/webp", vec![7u8; 150_000]),
            UploadFile::new("dog.png", "image/png", vec![9u8; 10]),
        ]
    }

    #[tokio::test]
    async fn test_upload_returns_urls_and_reports_progress() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .and(header_exists("x-request-id"))
            .and(body_string_contains("name=\"files\"; filename=\"cat.webp\""))
            .and(body_string_contains("name=\"files\"; filename=\"dog.png\""))
            .and(body_string_contains("name=\"expiry_minutes\""))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([
                {"url": "https://img.example.com/i/1"},
                {"url": "https://img.example.com/i/2", "expires_at": "2026-01-02T03:04:05Z"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let uploaded = client_for(&server)
            .upload()
            .send_with_progress(
                files(),
                Some(60),
                Arc::new(move |p: UploadProgress| sink.lock().unwrap().push(p)),
            )
            .await
            .unwrap();

        assert_eq!(uploaded.len(), 2);
        assert_eq!(uploaded[0].url, "https://img.example.com/i/1");
        assert!(uploaded[0].expires_at.is_some());
        assert_eq!(
            uploaded[1].expires_at.unwrap().to_rfc3339(),
            "2026-01-02T03:04:05+00:00"
        );

        let seen = seen.lock().unwrap();
        assert!(seen.len() >= 3);
        assert!(seen.windows(2).all(|w| w[0].sent <= w[1].sent));
        assert_eq!(seen.last().copied(), Some(completed(&files())));
    }

    #[tokio::test]
    async fn test_part_metadata_on_the_wire() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{"url": "u"}])))
            .mount(&server)
            .await;

        client_for(&server)
            .upload()
            .send(vec![UploadFile::new("a.webp", "image/webp", b"RIFFdata".to_vec())], None)
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body).to_string();
        assert!(body.contains("Content-Type: image/webp"));
        assert!(body.contains("RIFFdata"));
        assert!(!body.contains(EXPIRY_FIELD));
    }

    #[tokio::test]
    async fn test_error_detail_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(
                ResponseTemplate::new(413)
                    .set_body_json(json!({"detail": "File 'cat.webp' is too large (Max 5MB)"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).upload().send(files(), None).await.unwrap_err();

        match err {
            ApiError::ApiResponse { status, message } => {
                assert_eq!(status, 413);
                assert!(message.contains("too large"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_upload_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server).upload().send(files(), None).await.unwrap_err();
        assert!(err.is_server_error());
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let server = MockServer::start().await;
        let err = client_for(&server).upload().send(Vec::new(), None).await.unwrap_err();
        assert!(matches!(err, ApiError::EmptyUpload));
    }

    #[test]
    fn test_from_source_image() {
        let source = SourceImage::new("notes", "image/png", vec![1u8, 2, 3]);
        let file = UploadFile::from(source);
        assert_eq!(file.name, "notes");
        assert_eq!(file.media_type, "image/png");
        assert_eq!(file.bytes.len(), 3);
    }
}
