use crate::config::AppConfig;
use rfd::FileDialog;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub const REPORT_EXTENSION: &str = "xlsx";

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// `output_<unix_millis>.xlsx`
pub fn report_file_name(unix_millis: i64) -> String {
    format!("output_{}.{}", unix_millis, REPORT_EXTENSION)
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Where a generated report ends up.
pub trait DownloadSink {
    /// Returns the written path, or `None` when the user declined to save.
    fn save(&self, file_name: &str, payload: &[u8]) -> Result<Option<PathBuf>, DownloadError>;
}

/// Asks for a location with a native save dialog.
#[derive(Debug, Default)]
pub struct SaveDialogSink;

impl DownloadSink for SaveDialogSink {
    fn save(&self, file_name: &str, payload: &[u8]) -> Result<Option<PathBuf>, DownloadError> {
        let Some(path) = FileDialog::new()
            .set_file_name(file_name)
            .add_filter("Excel workbook", &[REPORT_EXTENSION])
            .save_file()
        else {
            tracing::info!("Save dialog dismissed for {}", file_name);
            return Ok(None);
        };

        fs::write(&path, payload)?;
        tracing::info!(path = %path.display(), bytes = payload.len(), "Report saved");
        Ok(Some(path))
    }
}

/// Writes straight into a fixed directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for DirectorySink {
    fn save(&self, file_name: &str, payload: &[u8]) -> Result<Option<PathBuf>, DownloadError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        fs::write(&path, payload)?;
        tracing::info!(path = %path.display(), bytes = payload.len(), "Report saved");
        Ok(Some(path))
    }
}

pub fn sink_for(config: &AppConfig) -> Box<dyn DownloadSink> {
    match &config.download_dir {
        Some(dir) => Box::new(DirectorySink::new(dir.clone())),
        None => Box::new(SaveDialogSink),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn report_name_uses_millis_and_xlsx() {
        assert_eq!(report_file_name(1_700_000_000_123), "output_1700000000123.xlsx");
    }

    #[test]
    fn directory_sink_creates_dir_and_writes_payload() {
        let root = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(root.path().join("reports"));

        let path = sink.save("output_1.xlsx", b"PK\x03\x04").unwrap().unwrap();

        assert_eq!(path, root.path().join("reports").join("output_1.xlsx"));
        assert_eq!(fs::read(&path).unwrap(), b"PK\x03\x04");
    }

    #[test]
    fn directory_sink_reports_io_failures() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("not-a-dir");
        fs::write(&blocker, b"").unwrap();

        let result = DirectorySink::new(&blocker).save("output_1.xlsx", b"x");
        assert!(matches!(result, Err(DownloadError::Io(_))));
    }
}
