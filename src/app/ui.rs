use super::drop_zone::{self, DropZoneOutput};
use super::{Notice, ReportUploader};
use crate::upload::{FileSlot, ServerHealth};
use crate::utils::color::Palette;
use chrono::Datelike;
use eframe::egui::{self, Align, Color32, DroppedFile, Layout, RichText};

impl ReportUploader {
    pub fn render(&mut self, ctx: &egui::Context) {
        let dropped: Vec<DroppedFile> = ctx.input(|i| i.raw.dropped_files.clone());

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.heading(RichText::new("📈 Document Report Builder").strong());
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    self.render_health_chip(ui);
                });
            });
            ui.add_space(6.0);
        });

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new(footer_text(chrono::Local::now().year()))
                        .small()
                        .color(ui.visuals().weak_text_color()),
                );
            });
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(10.0);
                banner(
                    ui,
                    Palette::info(),
                    "ℹ Upload your DOCX and CSV files to generate an XLSX report with the \
                     document content, the CSV data and a processing summary.",
                );

                if self.health == ServerHealth::Offline {
                    ui.add_space(8.0);
                    banner(
                        ui,
                        Palette::error(),
                        &format!(
                            "Cannot connect to the server. Please ensure the report service is running on {}",
                            self.client.base_url()
                        ),
                    );
                }

                ui.add_space(16.0);
                ui.group(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("Document Upload & Processing");
                        ui.label(
                            RichText::new(
                                "Upload your documents to process and generate comprehensive reports",
                            )
                            .color(ui.visuals().weak_text_color()),
                        );
                    });
                    ui.add_space(12.0);

                    self.render_notice(ui);
                    self.render_zones(ui, &dropped);
                    ui.add_space(12.0);
                    self.render_progress(ui);
                    self.render_actions(ui);
                });

                if self.processed_count > 0 {
                    ui.add_space(12.0);
                    banner(
                        ui,
                        Palette::success(),
                        &format!("Files Processed: {}", self.processed_count),
                    );
                }

                ui.add_space(16.0);
                render_instructions(ui);
                ui.add_space(20.0);
            });
        });
    }

    fn render_health_chip(&self, ui: &mut egui::Ui) {
        let color = match self.health {
            ServerHealth::Online => Palette::success(),
            ServerHealth::Offline => Palette::error(),
            ServerHealth::Checking => Palette::muted(),
        };
        ui.label(
            RichText::new(format!("● {}", self.health.label()))
                .color(Color32::WHITE)
                .background_color(color),
        )
        .on_hover_text(format!("Server status: {}", self.health.label()));
    }

    fn render_notice(&mut self, ui: &mut egui::Ui) {
        let Some(notice) = self.workflow.notice() else {
            return;
        };
        let (color, text) = match &notice {
            Notice::Success(text) => (Palette::success(), format!("✅ {}", text)),
            Notice::Error(text) => (Palette::error(), format!("❌ {}", text)),
        };

        let mut dismiss = false;
        ui.horizontal(|ui| {
            ui.colored_label(color, text);
            if matches!(notice, Notice::Success(_)) {
                if let Some(path) = &self.last_report {
                    if ui.small_button("Open report").clicked() {
                        if let Err(e) = open::that(path) {
                            tracing::warn!("Failed to open {}: {}", path.display(), e);
                        }
                    }
                }
            }
            if ui.small_button("✕").on_hover_text("Dismiss").clicked() {
                dismiss = true;
            }
        });
        ui.add_space(8.0);

        if dismiss {
            self.workflow.dismiss_notice();
        }
    }

    fn render_zones(&mut self, ui: &mut egui::Ui, dropped: &[DroppedFile]) {
        let enabled = !self.workflow.is_submitting();
        let mut outputs: [DropZoneOutput; 2] = Default::default();

        ui.columns(2, |columns| {
            outputs[0] = drop_zone::show(
                &mut columns[0],
                &self.document_zone,
                self.workflow.document(),
                dropped,
                enabled,
            );
            outputs[1] = drop_zone::show(
                &mut columns[1],
                &self.data_zone,
                self.workflow.data(),
                dropped,
                enabled,
            );
        });

        // Files released outside both zones go to whichever zone takes them.
        if enabled && !dropped.is_empty() && !outputs.iter().any(|o| o.owns_drop) {
            outputs[0].accepted = self.document_zone.pick_dropped(dropped);
            if outputs[0].accepted.is_none() {
                outputs[1].accepted = self.data_zone.pick_dropped(dropped);
            }
        }

        let [document, data] = outputs;
        for (slot, output) in [(FileSlot::Document, document), (FileSlot::Data, data)] {
            if output.remove_requested {
                self.remove_file(slot);
            } else if let Some(file) = output.accepted {
                self.select_file(slot, file);
            }
        }
    }

    fn render_progress(&self, ui: &mut egui::Ui) {
        if !self.workflow.is_submitting() {
            return;
        }
        let progress = self.workflow.progress();
        ui.horizontal(|ui| {
            ui.label(RichText::new("Upload Progress").color(ui.visuals().weak_text_color()));
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.label(RichText::new(format!("{}%", progress)).strong());
            });
        });
        ui.add(
            egui::ProgressBar::new(f32::from(progress) / 100.0)
                .animate(progress == 100)
                .fill(Palette::primary()),
        );
        ui.add_space(12.0);
    }

    fn render_actions(&mut self, ui: &mut egui::Ui) {
        let submitting = self.workflow.is_submitting();
        let ready = self.workflow.can_submit();

        ui.vertical_centered(|ui| {
            ui.horizontal(|ui| {
                let label = if submitting {
                    "⏳ Processing..."
                } else {
                    "📤 Upload & Process"
                };
                let upload = egui::Button::new(label).min_size(egui::vec2(200.0, 40.0));
                if ui.add_enabled(ready, upload).clicked() {
                    self.start_upload(ui.ctx());
                }

                let reset = egui::Button::new("Reset").min_size(egui::vec2(100.0, 40.0));
                if ui.add_enabled(!submitting, reset).clicked() {
                    self.reset();
                }
            });
        });
    }
}

fn banner(ui: &mut egui::Ui, color: Color32, text: &str) {
    egui::Frame::none()
        .fill(color.gamma_multiply(0.15))
        .stroke(egui::Stroke::new(1.0, color))
        .rounding(6.0)
        .inner_margin(10.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.colored_label(color, text);
        });
}

fn footer_text(year: i32) -> String {
    format!("© {} Document Report Builder. All rights reserved.", year)
}

fn render_instructions(ui: &mut egui::Ui) {
    ui.group(|ui| {
        ui.label(RichText::new("How to Use").strong());
        ui.add_space(4.0);
        for (step, text) in [
            "Select or drag & drop a DOCX file containing your document content",
            "Select or drag & drop a CSV file containing your data",
            "Click \"Upload & Process\" to generate the XLSX report",
            "Save the generated XLSX report to your device",
        ]
        .iter()
        .enumerate()
        {
            ui.label(format!("{}. {}", step + 1, text));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn footer_carries_the_given_year() {
        assert_eq!(
            footer_text(2026),
            "© 2026 Document Report Builder. All rights reserved."
        );
    }
}
