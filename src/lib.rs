//! Desktop client that sends a DOCX document and a CSV file to a report
//! service and saves the spreadsheet it returns.

pub mod app;
pub mod config;
pub mod download;
pub mod upload;
pub mod utils;

pub use app::ReportUploader;
pub use config::AppConfig;
