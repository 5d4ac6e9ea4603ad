pub mod drop_zone;
mod state;
mod ui;

use crate::config::AppConfig;
use crate::download::{self, DownloadSink};
use crate::upload::{FilePair, FileSlot, ReportClient, SelectedFile, ServerHealth, UploadError};
use derivative::Derivative;
use drop_zone::DropZoneConfig;
use eframe::{egui, App};
pub use state::{
    CompletedReport, Notice, PartialSelection, UploadWorkflow, WorkflowError, WorkflowState,
    MISSING_FILES_MESSAGE,
};
use std::path::PathBuf;
use std::sync::mpsc::{self as std_mpsc, TryRecvError};

/// Messages from the upload worker thread.
#[derive(Debug)]
pub enum WorkerEvent {
    Progress(u8),
    Finished(Result<Vec<u8>, UploadError>),
}

#[derive(Derivative)]
#[derivative(Debug)]
pub struct ReportUploader {
    client: ReportClient,
    workflow: UploadWorkflow,
    health: ServerHealth,
    /// Successful uploads since launch.
    processed_count: u64,
    last_report: Option<PathBuf>,
    document_zone: DropZoneConfig,
    data_zone: DropZoneConfig,
    #[derivative(Debug = "ignore")]
    sink: Box<dyn DownloadSink>,
    #[derivative(Debug = "ignore")]
    upload_receiver: Option<std_mpsc::Receiver<WorkerEvent>>,
    #[derivative(Debug = "ignore")]
    health_receiver: Option<std_mpsc::Receiver<ServerHealth>>,
}

impl ReportUploader {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        tracing::info!(api = %config.api_base_url, "Initializing report uploader");
        let mut app = Self::with_sink(&config, download::sink_for(&config));
        app.start_health_check(cc.egui_ctx.clone());
        app
    }

    pub fn with_sink(config: &AppConfig, sink: Box<dyn DownloadSink>) -> Self {
        Self {
            client: ReportClient::new(config),
            workflow: UploadWorkflow::new(),
            health: ServerHealth::Checking,
            processed_count: 0,
            last_report: None,
            document_zone: DropZoneConfig::document(),
            data_zone: DropZoneConfig::data(),
            sink,
            upload_receiver: None,
            health_receiver: None,
        }
    }

    pub fn workflow(&self) -> &UploadWorkflow {
        &self.workflow
    }

    pub fn health(&self) -> ServerHealth {
        self.health
    }

    pub fn processed_count(&self) -> u64 {
        self.processed_count
    }

    /// One health check at startup, no retries.
    fn start_health_check(&mut self, ctx: egui::Context) {
        let (sender, receiver) = std_mpsc::channel();
        self.health_receiver = Some(receiver);
        self.health = ServerHealth::Checking;
        let client = self.client.clone();

        std::thread::spawn(move || {
            let health = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt.block_on(client.check_health()),
                Err(e) => {
                    tracing::error!("Failed to start runtime for health check: {}", e);
                    ServerHealth::Offline
                }
            };
            let _ = sender.send(health);
            ctx.request_repaint();
        });
    }

    pub fn select_file(&mut self, slot: FileSlot, file: SelectedFile) {
        if let Err(e) = self.workflow.select(slot, file) {
            tracing::warn!("Ignoring file selection: {}", e);
        }
    }

    pub fn remove_file(&mut self, slot: FileSlot) {
        if let Err(e) = self.workflow.remove(slot) {
            tracing::warn!("Ignoring file removal: {}", e);
        }
    }

    pub fn reset(&mut self) {
        if let Err(e) = self.workflow.reset() {
            tracing::warn!("Ignoring reset: {}", e);
        }
    }

    pub fn start_upload(&mut self, ctx: &egui::Context) {
        let files = match self.workflow.begin_submit() {
            Ok(files) => files,
            Err(e) => {
                tracing::info!("Upload not started: {}", e);
                return;
            }
        };

        let (sender, receiver) = std_mpsc::channel();
        self.upload_receiver = Some(receiver);
        spawn_upload(self.client.clone(), files, sender, ctx.clone());
    }

    /// Drains worker channels. Called once per frame.
    pub fn update_state(&mut self) {
        if let Some(receiver) = &self.health_receiver {
            match receiver.try_recv() {
                Ok(health) => {
                    self.health = health;
                    self.health_receiver = None;
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    tracing::warn!("Health check worker exited without a result");
                    self.health = ServerHealth::Offline;
                    self.health_receiver = None;
                }
            }
        }

        let mut events = Vec::new();
        let mut disconnected = false;
        if let Some(receiver) = &self.upload_receiver {
            loop {
                match receiver.try_recv() {
                    Ok(event) => events.push(event),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
        }
        for event in events {
            self.handle_worker_event(event);
        }

        // A worker that dies without sending `Finished` would leave the UI submitting forever.
        if disconnected && self.upload_receiver.is_some() {
            self.upload_receiver = None;
            let error = UploadError::Network(
                "Upload worker stopped before reporting a result".to_string(),
            );
            tracing::error!("{}", error);
            if let Err(e) = self.workflow.fail(&error) {
                tracing::warn!("Unexpected upload result: {}", e);
            }
        }
    }

    pub fn handle_worker_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Progress(percent) => self.workflow.record_progress(percent),
            WorkerEvent::Finished(Ok(payload)) => {
                self.upload_receiver = None;
                match self
                    .workflow
                    .complete(&payload, self.sink.as_ref(), download::now_millis())
                {
                    Ok(report) => {
                        self.processed_count += 1;
                        self.last_report = report.saved_to;
                    }
                    Err(e) => tracing::warn!("Report not delivered: {}", e),
                }
            }
            WorkerEvent::Finished(Err(error)) => {
                self.upload_receiver = None;
                if let Err(e) = self.workflow.fail(&error) {
                    tracing::warn!("Unexpected upload result: {}", e);
                }
            }
        }
    }
}

fn spawn_upload(
    client: ReportClient,
    files: FilePair,
    sender: std_mpsc::Sender<WorkerEvent>,
    ctx: egui::Context,
) {
    std::thread::spawn(move || {
        let result = match tokio::runtime::Runtime::new() {
            Ok(rt) => {
                let progress_sender = sender.clone();
                let progress_ctx = ctx.clone();
                rt.block_on(client.upload_files(&files, move |percent| {
                    let _ = progress_sender.send(WorkerEvent::Progress(percent));
                    progress_ctx.request_repaint();
                }))
            }
            Err(e) => Err(UploadError::Network(format!(
                "Failed to start upload runtime: {}",
                e
            ))),
        };

        tracing::debug!("Upload worker finished, success={}", result.is_ok());
        let _ = sender.send(WorkerEvent::Finished(result));
        ctx.request_repaint();
    });
}

impl App for ReportUploader {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state();
        self.render(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::DirectorySink;
    use crate::upload::FALLBACK_MESSAGE;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn uploader(dir: &std::path::Path) -> ReportUploader {
        ReportUploader::with_sink(&AppConfig::default(), Box::new(DirectorySink::new(dir)))
    }

    fn select_both(app: &mut ReportUploader) {
        app.select_file(
            FileSlot::Document,
            SelectedFile::new("roster.docx", drop_zone::DOCX_MIME, Arc::from(vec![0u8; 10 * 1024])),
        );
        app.select_file(
            FileSlot::Data,
            SelectedFile::new("grades.csv", drop_zone::CSV_MIME, Arc::from(vec![0u8; 2 * 1024])),
        );
    }

    #[test]
    fn starts_checking_with_nothing_processed() {
        let dir = tempfile::tempdir().unwrap();
        let app = uploader(dir.path());
        assert_eq!(app.health(), ServerHealth::Checking);
        assert_eq!(app.processed_count(), 0);
        assert_eq!(app.workflow().state(), &WorkflowState::Empty);
    }

    #[test]
    fn worker_events_drive_a_successful_upload() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = uploader(dir.path());
        select_both(&mut app);
        app.workflow.begin_submit().unwrap();

        for percent in [0, 50, 100] {
            app.handle_worker_event(WorkerEvent::Progress(percent));
        }
        assert_eq!(app.workflow().progress(), 100);

        app.handle_worker_event(WorkerEvent::Finished(Ok(b"sheet".to_vec())));

        assert!(matches!(app.workflow().state(), WorkflowState::Done(_)));
        assert_eq!(app.workflow().document(), None);
        assert_eq!(app.workflow().data(), None);
        assert_eq!(app.processed_count(), 1);
        let saved = app.last_report.clone().unwrap();
        let name = saved.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("output_") && name.ends_with(".xlsx"));
        assert_eq!(std::fs::read(saved).unwrap(), b"sheet");
    }

    #[test]
    fn counter_keeps_growing_across_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = uploader(dir.path());

        for _ in 0..3 {
            select_both(&mut app);
            app.workflow.begin_submit().unwrap();
            app.handle_worker_event(WorkerEvent::Finished(Ok(b"sheet".to_vec())));
        }

        assert_eq!(app.processed_count(), 3);
    }

    #[test]
    fn failed_upload_leaves_counter_and_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = uploader(dir.path());
        select_both(&mut app);
        app.workflow.begin_submit().unwrap();

        app.handle_worker_event(WorkerEvent::Finished(Err(UploadError::Network(
            "refused".to_string(),
        ))));

        assert_eq!(app.processed_count(), 0);
        assert_eq!(
            app.workflow().notice(),
            Some(Notice::Error(FALLBACK_MESSAGE.to_string()))
        );
        assert_eq!(app.workflow().document().unwrap().name, "roster.docx");
        assert_eq!(app.workflow().data().unwrap().name, "grades.csv");
    }

    #[test]
    fn vanished_upload_worker_becomes_a_network_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = uploader(dir.path());
        select_both(&mut app);
        app.workflow.begin_submit().unwrap();
        let (sender, receiver) = std_mpsc::channel();
        app.upload_receiver = Some(receiver);

        sender.send(WorkerEvent::Progress(40)).unwrap();
        drop(sender);
        app.update_state();

        assert!(!app.workflow().is_submitting());
        assert!(app.upload_receiver.is_none());
        assert_eq!(
            app.workflow().notice(),
            Some(Notice::Error(FALLBACK_MESSAGE.to_string()))
        );
        assert_eq!(app.workflow().document().unwrap().name, "roster.docx");
        assert_eq!(app.workflow().data().unwrap().name, "grades.csv");
        assert_eq!(app.processed_count(), 0);

        app.reset();
        assert_eq!(app.workflow().state(), &WorkflowState::Empty);
    }

    #[test]
    fn finished_event_before_disconnect_is_not_reported_twice() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = uploader(dir.path());
        select_both(&mut app);
        app.workflow.begin_submit().unwrap();
        let (sender, receiver) = std_mpsc::channel();
        app.upload_receiver = Some(receiver);

        sender
            .send(WorkerEvent::Finished(Ok(b"sheet".to_vec())))
            .unwrap();
        drop(sender);
        app.update_state();

        assert!(matches!(app.workflow().state(), WorkflowState::Done(_)));
        assert_eq!(app.processed_count(), 1);
    }

    #[test]
    fn vanished_health_worker_reports_offline() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = uploader(dir.path());
        let (sender, receiver) = std_mpsc::channel::<ServerHealth>();
        app.health_receiver = Some(receiver);

        drop(sender);
        app.update_state();

        assert_eq!(app.health(), ServerHealth::Offline);
        assert!(app.health_receiver.is_none());
    }

    #[test]
    fn health_result_is_picked_up_from_the_channel() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = uploader(dir.path());
        let (sender, receiver) = std_mpsc::channel();
        app.health_receiver = Some(receiver);

        sender.send(ServerHealth::Offline).unwrap();
        app.update_state();

        assert_eq!(app.health(), ServerHealth::Offline);
        assert!(app.health_receiver.is_none());
    }
}
