use eframe::egui::{self, RichText, Ui};

use plot_graph::interaction::PointerEvent;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        egui::ScrollArea::vertical()
            .id_salt("details_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                self.draw_relationship_summary(ui);
                ui.separator();
                self.draw_story(ui);
                self.draw_warnings(ui);
            });
    }

    fn draw_relationship_summary(&mut self, ui: &mut Ui) {
        ui.heading("Relationship");
        ui.add_space(6.0);

        let Some(summary) = self.scene.interaction().summary().cloned() else {
            ui.label("Hover a relation to pin its summary here.");
            return;
        };

        ui.label(RichText::new(summary.title()).strong());
        ui.add_space(4.0);
        if !summary.role_forward.is_empty() {
            ui.label(format!(
                "{} sees {} as: {}",
                summary.source_label, summary.target_label, summary.role_forward
            ));
        }
        if !summary.role_backward.is_empty() {
            ui.label(format!(
                "{} sees {} as: {}",
                summary.target_label, summary.source_label, summary.role_backward
            ));
        }

        if !summary.key_dialogs.is_empty() {
            ui.add_space(4.0);
            ui.label(RichText::new("Key dialogue").strong());
            for dialog in &summary.key_dialogs {
                ui.label(RichText::new(format!("\u{201c}{dialog}\u{201d}")).italics());
            }
        }

        ui.add_space(6.0);
        if ui.button("Clear").clicked() {
            self.scene.handle_pointer(PointerEvent::ClearSummary);
        }
    }

    fn draw_story(&self, ui: &mut Ui) {
        let graph = self.scene.graph();

        ui.heading("Story");
        ui.add_space(6.0);
        if graph.summary().is_empty() {
            ui.label("No story summary in this document.");
        } else {
            ui.label(graph.summary());
        }

        let Some(validation) = graph.validation() else {
            return;
        };

        ui.separator();
        ui.label(RichText::new("Validation").strong());
        let verdict = if validation.known_story {
            "Recognised as a known story"
        } else {
            "Not recognised as a known story"
        };
        ui.label(verdict);
        if let Some(score) = validation.score {
            ui.label(format!("Score: {score}"));
        }
        if !validation.notes.is_empty() {
            ui.label(validation.notes.as_str());
        }
        for issue in &validation.issues {
            ui.label(format!("- {issue}"));
        }
    }

    fn draw_warnings(&self, ui: &mut Ui) {
        if self.warnings.is_empty() {
            return;
        }

        ui.separator();
        egui::CollapsingHeader::new(format!("Document warnings ({})", self.warnings.len()))
            .id_salt("document_warnings")
            .show(ui, |ui| {
                for warning in &self.warnings {
                    ui.small(warning.to_string());
                }
            });
    }
}
