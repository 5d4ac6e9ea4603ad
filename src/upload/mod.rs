mod client;
mod error;
mod progress;
mod types;

pub use client::{ReportClient, DATA_FIELD, DOCUMENT_FIELD};
pub use error::{server_error_message, UploadError, FALLBACK_MESSAGE};
pub use progress::{percent_of, ProgressCallback, ProgressTracker};
pub use types::{FilePair, FileSlot, SelectedFile, ServerHealth};
