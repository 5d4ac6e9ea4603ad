use crate::config::AppConfig;
use crate::upload::error::{server_error_message, UploadError};
use crate::upload::progress::ProgressTracker;
use crate::upload::types::{FilePair, SelectedFile, ServerHealth};
use futures_util::stream::{self, StreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use std::sync::Arc;
use std::time::Duration;

/// Multipart field carrying the document.
pub const DOCUMENT_FIELD: &str = "docx_file";
/// Multipart field carrying the tabular data.
pub const DATA_FIELD: &str = "csv_file";

const CHUNK_SIZE: usize = 16 * 1024;

/// Talks to the report-generation service.
#[derive(Debug, Clone)]
pub struct ReportClient {
    http: reqwest::Client,
    base_url: String,
    upload_path: String,
    health_timeout: Duration,
}

impl ReportClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.clone(),
            upload_path: config.upload_path.clone(),
            health_timeout: config.health_timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn upload_url(&self) -> String {
        format!("{}{}", self.base_url, self.upload_path)
    }

    /// Sends both files and returns the generated spreadsheet bytes.
    ///
    /// `on_progress` receives non-decreasing percentages of the file bytes
    /// written so far. It stays at 100 while the service builds the report.
    pub async fn upload_files<F>(
        &self,
        files: &FilePair,
        on_progress: F,
    ) -> Result<Vec<u8>, UploadError>
    where
        F: Fn(u8) + Send + Sync + 'static,
    {
        let tracker = Arc::new(ProgressTracker::new(
            files.total_bytes(),
            Box::new(on_progress),
        ));

        let form = Form::new()
            .part(DOCUMENT_FIELD, tracked_part(&files.document, &tracker)?)
            .part(DATA_FIELD, tracked_part(&files.data, &tracker)?);

        let url = self.upload_url();
        tracing::info!(
            url = %url,
            document = %files.document.name,
            data = %files.data.name,
            total_bytes = files.total_bytes(),
            "Uploading files"
        );

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Failed to send upload request: {}", e);
                UploadError::from(e)
            })?;

        tracker.finish();

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = server_error_message(&body);
            tracing::warn!(status = %status, "Upload rejected: {}", message);
            return Err(UploadError::Server(message));
        }

        let payload = response.bytes().await?;
        tracing::info!(bytes = payload.len(), "Received generated report");
        Ok(payload.to_vec())
    }

    /// Checks the service root once. Every kind of failure reads as offline.
    pub async fn check_health(&self) -> ServerHealth {
        let url = format!("{}/", self.base_url);
        let result = self
            .http
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::info!(url = %url, "Report service is online");
                ServerHealth::Online
            }
            Ok(response) => {
                tracing::warn!(url = %url, status = %response.status(), "Report service unhealthy");
                ServerHealth::Offline
            }
            Err(e) => {
                tracing::warn!(url = %url, "Report service unreachable: {}", e);
                ServerHealth::Offline
            }
        }
    }
}

/// A multipart part whose body advances `tracker` chunk by chunk.
fn tracked_part(file: &SelectedFile, tracker: &Arc<ProgressTracker>) -> Result<Part, UploadError> {
    let chunks: Vec<Vec<u8>> = file.bytes.chunks(CHUNK_SIZE).map(<[u8]>::to_vec).collect();
    let tracker = Arc::clone(tracker);
    let body = stream::iter(chunks).map(move |chunk| {
        tracker.advance(chunk.len() as u64);
        Ok::<_, std::io::Error>(chunk)
    });

    let part = Part::stream_with_length(Body::wrap_stream(body), file.size_bytes)
        .file_name(file.name.clone())
        .mime_str(&file.mime_type)?;
    Ok(part)
}
