use crate::download::{report_file_name, DownloadError, DownloadSink};
use crate::upload::{FilePair, FileSlot, SelectedFile, UploadError};
use std::path::PathBuf;
use thiserror::Error;

pub const MISSING_FILES_MESSAGE: &str = "Please select both DOCX and CSV files";

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("An upload is already in progress")]
    Busy,

    #[error("No upload is in progress")]
    NotSubmitting,

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Failed to save report: {0}")]
    Save(#[from] DownloadError),
}

/// Exactly one of the two slots is filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartialSelection {
    Document(SelectedFile),
    Data(SelectedFile),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedReport {
    pub file_name: String,
    /// `None` when the save dialog was dismissed.
    pub saved_to: Option<PathBuf>,
    pub size_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    Empty,
    Partial(PartialSelection),
    Ready(FilePair),
    Submitting { files: FilePair, progress: u8 },
    Done(CompletedReport),
    Errored {
        document: Option<SelectedFile>,
        data: Option<SelectedFile>,
        message: String,
    },
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::Empty
    }
}

impl WorkflowState {
    fn from_slots(document: Option<SelectedFile>, data: Option<SelectedFile>) -> Self {
        match (document, data) {
            (None, None) => Self::Empty,
            (Some(document), None) => Self::Partial(PartialSelection::Document(document)),
            (None, Some(data)) => Self::Partial(PartialSelection::Data(data)),
            (Some(document), Some(data)) => Self::Ready(FilePair { document, data }),
        }
    }

    fn into_slots(self) -> (Option<SelectedFile>, Option<SelectedFile>) {
        match self {
            Self::Empty | Self::Done(_) => (None, None),
            Self::Partial(PartialSelection::Document(document)) => (Some(document), None),
            Self::Partial(PartialSelection::Data(data)) => (None, Some(data)),
            Self::Ready(files) | Self::Submitting { files, .. } => {
                (Some(files.document), Some(files.data))
            }
            Self::Errored { document, data, .. } => (document, data),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Partial(_) => "partial",
            Self::Ready(_) => "ready",
            Self::Submitting { .. } => "submitting",
            Self::Done(_) => "done",
            Self::Errored { .. } => "errored",
        }
    }
}

/// The banner shown above the drop zones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Owns the two pending files and the lifecycle of one submission.
#[derive(Debug, Default)]
pub struct UploadWorkflow {
    state: WorkflowState,
}

impl UploadWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn document(&self) -> Option<&SelectedFile> {
        match &self.state {
            WorkflowState::Partial(PartialSelection::Document(document)) => Some(document),
            WorkflowState::Ready(files) | WorkflowState::Submitting { files, .. } => {
                Some(&files.document)
            }
            WorkflowState::Errored { document, .. } => document.as_ref(),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&SelectedFile> {
        match &self.state {
            WorkflowState::Partial(PartialSelection::Data(data)) => Some(data),
            WorkflowState::Ready(files) | WorkflowState::Submitting { files, .. } => {
                Some(&files.data)
            }
            WorkflowState::Errored { data, .. } => data.as_ref(),
            _ => None,
        }
    }

    pub fn file(&self, slot: FileSlot) -> Option<&SelectedFile> {
        match slot {
            FileSlot::Document => self.document(),
            FileSlot::Data => self.data(),
        }
    }

    pub fn progress(&self) -> u8 {
        match self.state {
            WorkflowState::Submitting { progress, .. } => progress,
            _ => 0,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, WorkflowState::Submitting { .. })
    }

    pub fn can_submit(&self) -> bool {
        !self.is_submitting() && self.document().is_some() && self.data().is_some()
    }

    pub fn notice(&self) -> Option<Notice> {
        match &self.state {
            WorkflowState::Done(report) => Some(Notice::Success(match &report.saved_to {
                Some(path) => format!(
                    "Files processed successfully! Report saved to {}",
                    path.display()
                ),
                None => "Files processed successfully! The report was not saved.".to_string(),
            })),
            WorkflowState::Errored { message, .. } => Some(Notice::Error(message.clone())),
            _ => None,
        }
    }

    fn take_state(&mut self) -> WorkflowState {
        std::mem::take(&mut self.state)
    }

    fn transition(&mut self, next: WorkflowState) {
        tracing::debug!(state = next.name(), "Workflow transition");
        self.state = next;
    }

    /// Fills a slot. Any previous notice is dropped.
    pub fn select(&mut self, slot: FileSlot, file: SelectedFile) -> Result<(), WorkflowError> {
        if self.is_submitting() {
            return Err(WorkflowError::Busy);
        }
        tracing::info!(slot = ?slot, name = %file.name, bytes = file.size_bytes, "File selected");

        let (document, data) = self.take_state().into_slots();
        let next = match slot {
            FileSlot::Document => WorkflowState::from_slots(Some(file), data),
            FileSlot::Data => WorkflowState::from_slots(document, Some(file)),
        };
        self.transition(next);
        Ok(())
    }

    /// Empties a slot. An error notice stays up with the remaining file.
    pub fn remove(&mut self, slot: FileSlot) -> Result<(), WorkflowError> {
        if self.is_submitting() {
            return Err(WorkflowError::Busy);
        }
        tracing::info!(slot = ?slot, "File removed");

        if let WorkflowState::Errored { document, data, .. } = &mut self.state {
            match slot {
                FileSlot::Document => *document = None,
                FileSlot::Data => *data = None,
            }
            return Ok(());
        }

        let (document, data) = self.take_state().into_slots();
        let next = match slot {
            FileSlot::Document => WorkflowState::from_slots(None, data),
            FileSlot::Data => WorkflowState::from_slots(document, None),
        };
        self.transition(next);
        Ok(())
    }

    /// Hands out the files to send, or records why nothing can be sent.
    pub fn begin_submit(&mut self) -> Result<FilePair, WorkflowError> {
        if self.is_submitting() {
            return Err(WorkflowError::Busy);
        }

        match self.take_state().into_slots() {
            (Some(document), Some(data)) => {
                let files = FilePair { document, data };
                tracing::info!(total_bytes = files.total_bytes(), "Submitting upload");
                self.transition(WorkflowState::Submitting {
                    files: files.clone(),
                    progress: 0,
                });
                Ok(files)
            }
            (document, data) => {
                tracing::info!("Upload rejected: {}", MISSING_FILES_MESSAGE);
                self.transition(WorkflowState::Errored {
                    document,
                    data,
                    message: MISSING_FILES_MESSAGE.to_string(),
                });
                Err(UploadError::Validation(MISSING_FILES_MESSAGE.to_string()).into())
            }
        }
    }

    pub fn record_progress(&mut self, percent: u8) {
        if let WorkflowState::Submitting { progress, .. } = &mut self.state {
            *progress = (*progress).max(percent.min(100));
        }
    }

    /// Saves the generated report and clears both slots.
    ///
    /// The returned report is the one completion notification for this
    /// submission.
    pub fn complete(
        &mut self,
        payload: &[u8],
        sink: &dyn DownloadSink,
        unix_millis: i64,
    ) -> Result<CompletedReport, WorkflowError> {
        if !self.is_submitting() {
            return Err(WorkflowError::NotSubmitting);
        }

        let file_name = report_file_name(unix_millis);
        match sink.save(&file_name, payload) {
            Ok(saved_to) => {
                let report = CompletedReport {
                    file_name,
                    saved_to,
                    size_bytes: payload.len(),
                };
                tracing::info!(file_name = %report.file_name, "Upload completed");
                self.transition(WorkflowState::Done(report.clone()));
                Ok(report)
            }
            Err(e) => {
                let error = WorkflowError::Save(e);
                tracing::error!("{}", error);
                let (document, data) = self.take_state().into_slots();
                self.transition(WorkflowState::Errored {
                    document,
                    data,
                    message: error.to_string(),
                });
                Err(error)
            }
        }
    }

    /// Records a failed upload. The selected files stay in place for a retry.
    pub fn fail(&mut self, error: &UploadError) -> Result<(), WorkflowError> {
        if !self.is_submitting() {
            return Err(WorkflowError::NotSubmitting);
        }
        tracing::warn!("Upload failed: {}", error);

        let (document, data) = self.take_state().into_slots();
        self.transition(WorkflowState::Errored {
            document,
            data,
            message: error.user_message(),
        });
        Ok(())
    }

    pub fn reset(&mut self) -> Result<(), WorkflowError> {
        if self.is_submitting() {
            return Err(WorkflowError::Busy);
        }
        tracing::info!("Resetting workflow");
        self.transition(WorkflowState::Empty);
        Ok(())
    }

    /// Closes the notice without touching the selected files.
    pub fn dismiss_notice(&mut self) {
        match self.state {
            WorkflowState::Done(_) => self.transition(WorkflowState::Empty),
            WorkflowState::Errored { .. } => {
                let (document, data) = self.take_state().into_slots();
                self.transition(WorkflowState::from_slots(document, data));
            }
            _ => {}
        }
    }
}
