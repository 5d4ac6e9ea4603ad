use crate::upload::SelectedFile;
use crate::utils::color::Palette;
use crate::utils::file_size::FileSizeUtils;
use eframe::egui::{self, Color32, DroppedFile, RichText, Sense, Stroke};
use glob::{MatchOptions, Pattern};
use rfd::FileDialog;
use std::path::Path;

pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const CSV_MIME: &str = "text/csv";

/// One accepted MIME type and the extensions that map to it.
#[derive(Debug, Clone)]
pub struct AcceptedType {
    pub mime_type: String,
    pub extensions: Vec<String>,
    patterns: Vec<Pattern>,
}

/// Which files a drop zone takes, judged by file name only.
#[derive(Debug, Clone, Default)]
pub struct AcceptFilter {
    types: Vec<AcceptedType>,
}

impl AcceptFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extensions are given with their dot, e.g. `".docx"`.
    pub fn with_type(mut self, mime_type: &str, extensions: &[&str]) -> Self {
        let extensions: Vec<String> = extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .collect();
        let patterns = extensions
            .iter()
            .filter_map(|ext| Pattern::new(&format!("*.{}", Pattern::escape(ext))).ok())
            .collect();
        self.types.push(AcceptedType {
            mime_type: mime_type.to_string(),
            extensions,
            patterns,
        });
        self
    }

    /// The MIME type the file is accepted as, if any.
    pub fn mime_for(&self, file_name: &str) -> Option<&str> {
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        self.types
            .iter()
            .find(|t| t.patterns.iter().any(|p| p.matches_with(file_name, options)))
            .map(|t| t.mime_type.as_str())
    }

    pub fn accepts(&self, file_name: &str) -> bool {
        self.mime_for(file_name).is_some()
    }

    pub fn extensions(&self) -> Vec<&str> {
        self.types
            .iter()
            .flat_map(|t| t.extensions.iter().map(String::as_str))
            .collect()
    }
}

/// Everything that distinguishes one drop zone from another.
#[derive(Debug, Clone)]
pub struct DropZoneConfig {
    pub label: String,
    pub icon: &'static str,
    pub accept: AcceptFilter,
}

impl DropZoneConfig {
    pub fn document() -> Self {
        Self {
            label: "Upload DOCX File".to_string(),
            icon: "📄",
            accept: AcceptFilter::new().with_type(DOCX_MIME, &[".docx"]),
        }
    }

    pub fn data() -> Self {
        Self {
            label: "Upload CSV File".to_string(),
            icon: "📊",
            accept: AcceptFilter::new().with_type(CSV_MIME, &[".csv"]),
        }
    }

    /// The first dropped file this zone takes. Later files are ignored.
    pub fn pick_dropped(&self, dropped: &[DroppedFile]) -> Option<SelectedFile> {
        let (file, mime) = dropped.iter().find_map(|file| {
            let name = dropped_name(file)?;
            self.accept.mime_for(&name).map(|mime| (file, mime))
        })?;

        match load_dropped(file, mime) {
            Ok(selected) => Some(selected),
            Err(e) => {
                tracing::warn!("Failed to read dropped file {:?}: {}", file.path, e);
                None
            }
        }
    }

    /// Native picker limited to this zone's extensions.
    pub fn pick_with_dialog(&self) -> Option<SelectedFile> {
        let path = FileDialog::new()
            .add_filter(&self.label, &self.accept.extensions())
            .pick_file()?;
        self.load_path(&path)
    }

    fn load_path(&self, path: &Path) -> Option<SelectedFile> {
        let name = path.file_name()?.to_string_lossy().to_string();
        let mime = self.accept.mime_for(&name)?;
        match SelectedFile::from_path(path, mime) {
            Ok(file) => Some(file),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }
}

fn dropped_name(file: &DroppedFile) -> Option<String> {
    if !file.name.is_empty() {
        return Some(file.name.clone());
    }
    file.path
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
}

fn load_dropped(file: &DroppedFile, mime: &str) -> std::io::Result<SelectedFile> {
    match (&file.bytes, &file.path) {
        (Some(bytes), _) => {
            let name = dropped_name(file).unwrap_or_default();
            Ok(SelectedFile::new(name, mime, bytes.clone()))
        }
        (None, Some(path)) => SelectedFile::from_path(path, mime),
        (None, None) => Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "dropped file has neither bytes nor a path",
        )),
    }
}

/// What happened to a drop zone this frame.
#[derive(Debug, Default)]
pub struct DropZoneOutput {
    pub accepted: Option<SelectedFile>,
    pub remove_requested: bool,
    /// The pointer is over the zone, so a drop this frame belongs to it.
    pub owns_drop: bool,
}

/// Draws one zone. Holds no state between frames.
pub fn show(
    ui: &mut egui::Ui,
    config: &DropZoneConfig,
    current: Option<&SelectedFile>,
    dropped: &[DroppedFile],
    enabled: bool,
) -> DropZoneOutput {
    let mut output = DropZoneOutput::default();
    let dragging = ui.ctx().input(|i| !i.raw.hovered_files.is_empty());
    let pointer_over = ui.rect_contains_pointer(ui.available_rect_before_wrap());
    let drag_hover = enabled && dragging && pointer_over;

    let stroke_color = if drag_hover {
        Palette::primary()
    } else {
        Palette::muted()
    };
    let fill = if drag_hover {
        ui.visuals().faint_bg_color
    } else {
        ui.visuals().extreme_bg_color
    };

    let frame = egui::Frame::none()
        .fill(fill)
        .stroke(Stroke::new(2.0, stroke_color))
        .rounding(6.0)
        .inner_margin(16.0)
        .show(ui, |ui| {
            ui.set_min_height(140.0);
            ui.vertical_centered(|ui| match current {
                Some(file) => {
                    ui.label(RichText::new(config.icon).size(36.0));
                    ui.label(RichText::new(&file.name).strong());
                    ui.label(
                        RichText::new(FileSizeUtils::format_size(file.size_bytes))
                            .color(ui.visuals().weak_text_color()),
                    );
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new("Click to change")
                                .small()
                                .color(Color32::WHITE)
                                .background_color(Palette::primary()),
                        );
                        if ui
                            .add_enabled(enabled, egui::Button::new("✕").small())
                            .on_hover_text("Remove file")
                            .clicked()
                        {
                            output.remove_requested = true;
                        }
                    });
                }
                None => {
                    ui.label(RichText::new("⬆").size(40.0).color(Palette::primary()));
                    ui.heading(&config.label);
                    let hint = if drag_hover {
                        "Drop the file here"
                    } else {
                        "Drag & drop or click to select file"
                    };
                    ui.label(RichText::new(hint).color(ui.visuals().weak_text_color()));
                }
            });
        });

    let response = frame.response.interact(Sense::click());
    output.owns_drop = enabled && ui.rect_contains_pointer(response.rect);

    if enabled && response.clicked() && !output.remove_requested {
        output.accepted = config.pick_with_dialog();
    }

    if output.owns_drop && !dropped.is_empty() {
        output.accepted = config.pick_dropped(dropped);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn dropped_bytes(name: &str, bytes: &[u8]) -> DroppedFile {
        DroppedFile {
            name: name.to_string(),
            bytes: Some(Arc::from(bytes)),
            ..Default::default()
        }
    }

    #[test]
    fn filter_matches_extension_case_insensitively() {
        let filter = DropZoneConfig::document().accept;
        assert_eq!(filter.mime_for("roster.docx"), Some(DOCX_MIME));
        assert_eq!(filter.mime_for("ROSTER.DOCX"), Some(DOCX_MIME));
        assert_eq!(filter.mime_for("roster.doc"), None);
        assert_eq!(filter.mime_for("docx"), None);
        assert!(!filter.accepts("grades.csv"));
    }

    #[test]
    fn filter_only_looks_at_the_name() {
        let filter = DropZoneConfig::data().accept;
        assert!(filter.accepts("really-a-picture.csv"));
    }

    #[test]
    fn extensions_are_listed_without_dots() {
        let filter = AcceptFilter::new()
            .with_type("text/csv", &[".csv"])
            .with_type("text/tab-separated-values", &[".tsv", "TXT"]);
        assert_eq!(filter.extensions(), vec!["csv", "tsv", "txt"]);
        assert_eq!(filter.mime_for("a.tsv"), Some("text/tab-separated-values"));
        assert_eq!(filter.mime_for("a.txt"), Some("text/tab-separated-values"));
    }

    #[test]
    fn only_the_first_matching_drop_is_taken() {
        let config = DropZoneConfig::data();
        let dropped = vec![
            dropped_bytes("notes.txt", b"skip me"),
            dropped_bytes("grades.csv", b"id,grade\n"),
            dropped_bytes("more.csv", b"id\n"),
        ];

        let picked = config.pick_dropped(&dropped).unwrap();

        assert_eq!(picked.name, "grades.csv");
        assert_eq!(picked.mime_type, CSV_MIME);
        assert_eq!(picked.size_bytes, 9);
    }

    #[test]
    fn nothing_is_taken_when_no_drop_matches() {
        let config = DropZoneConfig::document();
        let dropped = vec![dropped_bytes("grades.csv", b"id\n")];
        assert!(config.pick_dropped(&dropped).is_none());
        assert!(config.pick_dropped(&[]).is_none());
    }

    #[test]
    fn dropped_path_is_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.docx");
        std::fs::write(&path, b"PK-docx").unwrap();
        let dropped = vec![DroppedFile {
            path: Some(path),
            ..Default::default()
        }];

        let picked = DropZoneConfig::document().pick_dropped(&dropped).unwrap();

        assert_eq!(picked.name, "roster.docx");
        assert_eq!(&picked.bytes[..], b"PK-docx");
    }

    #[test]
    fn unreadable_drop_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let dropped = vec![DroppedFile {
            path: Some(dir.path().join("missing.docx")),
            ..Default::default()
        }];
        assert!(DropZoneConfig::document().pick_dropped(&dropped).is_none());
    }
}
