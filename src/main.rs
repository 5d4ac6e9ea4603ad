use eframe::CreationContext;
use report_uploader::{AppConfig, ReportUploader};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("report_uploader=info")),
        )
        .init();

    let config = AppConfig::from_env();
    tracing::info!(
        api = %config.api_base_url,
        upload_path = %config.upload_path,
        "Starting report uploader"
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([820.0, 720.0])
            .with_min_inner_size([520.0, 560.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "Document Report Builder",
        options,
        Box::new(move |cc: &CreationContext| Box::new(ReportUploader::new(cc, config))),
    ) {
        tracing::error!("Application exited with error: {}", e);
    }
}
