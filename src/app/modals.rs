//! Settings modal: backend URL, preview timing, cats folder, log folder

use super::App;
use crate::theme;
use eframe::egui;
use std::path::Path;
use tracing::{info, warn};

fn section_title(ui: &mut egui::Ui, text: &str) {
    ui.add(
        egui::Label::new(egui::RichText::new(text).size(13.0).color(theme::ACCENT)).selectable(false),
    );
    ui.add_space(2.0);
}

fn section_break(ui: &mut egui::Ui) {
    ui.add_space(theme::SPACING_MD);
    ui.separator();
    ui.add_space(theme::SPACING_SM);
}

impl App {
    pub fn render_settings_modal(&mut self, ctx: &egui::Context) {
        if !self.show_settings {
            return;
        }

        let modal_response = egui::Modal::new(egui::Id::new("settings_modal"))
            .backdrop_color(egui::Color32::from_black_alpha(120))
            .frame(theme::modal_frame())
            .show(ctx, |ui| {
                ui.set_width(340.0);

                ui.horizontal(|ui| {
                    ui.add(
                        egui::Label::new(egui::RichText::new("Settings").size(16.0).strong())
                            .selectable(false),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let close = egui::RichText::new(egui_phosphor::regular::X)
                            .size(16.0)
                            .color(theme::TEXT_DIM);
                        if ui.add(egui::Button::new(close).frame(false)).clicked() {
                            self.show_settings = false;
                        }
                    });
                });
                ui.add_space(4.0);
                ui.separator();
                ui.add_space(theme::SPACING_SM);

                // — Backend —
                section_title(ui, "Backend URL");
                let submitted = ui
                    .horizontal(|ui| {
                        let te = ui.add(
                            egui::TextEdit::singleline(&mut self.base_url_input)
                                .desired_width(240.0)
                                .font(egui::FontId::proportional(13.0)),
                        );
                        let apply = ui.add(theme::button("Apply")).clicked();
                        apply || (te.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)))
                    })
                    .inner;
                if submitted {
                    self.reconfigure_backend(ui.ctx());
                }

                section_break(ui);

                // — Timing —
                section_title(ui, "Timing");
                let poll = ui
                    .horizontal(|ui| {
                        ui.label(egui::RichText::new("Status poll (ms)").size(theme::FONT_SMALL));
                        ui.add(
                            egui::DragValue::new(&mut self.poll_ms_input)
                                .range(100..=10_000)
                                .speed(10),
                        )
                    })
                    .inner;
                let countdown = ui
                    .horizontal(|ui| {
                        ui.label(egui::RichText::new("Round countdown (s)").size(theme::FONT_SMALL));
                        ui.add(egui::DragValue::new(&mut self.countdown_input).range(0..=30))
                    })
                    .inner;
                if let Some(ms) =
                    finished_edit(edit_done(&poll), self.poll_ms_input, self.settings.preview_poll_ms)
                {
                    self.settings.preview_poll_ms = ms;
                    self.save_settings();
                    self.start_preview_polling(ui.ctx());
                }
                if let Some(secs) = finished_edit(
                    edit_done(&countdown),
                    self.countdown_input,
                    self.settings.countdown_secs,
                ) {
                    self.settings.countdown_secs = secs;
                    self.save_settings();
                }

                section_break(ui);

                // — Cats —
                section_title(ui, "Cat pictures folder");
                ui.label(
                    egui::RichText::new(self.cats_dir.to_string_lossy())
                        .size(theme::FONT_SMALL)
                        .color(theme::TEXT_MUTED),
                );
                ui.horizontal(|ui| {
                    let browse = format!("{}  Browse", egui_phosphor::regular::FOLDER_OPEN);
                    if ui.add(theme::button(browse)).clicked() {
                        std::fs::create_dir_all(&self.cats_dir).ok();
                        if let Some(path) = rfd::FileDialog::new()
                            .set_directory(&self.cats_dir)
                            .pick_folder()
                        {
                            info!(path = %path.display(), "Cats folder changed");
                            self.cats_dir = path;
                            self.cat_texture = None;
                            self.save_settings();
                        }
                    }
                    if ui.add(theme::button("Open")).clicked() {
                        open_folder(&self.cats_dir);
                    }
                });

                section_break(ui);

                // — Logs —
                section_title(ui, "Diagnostics");
                let logs = format!("{}  Open logs folder", egui_phosphor::regular::FILE_TEXT);
                if ui.add(theme::button(logs)).clicked() {
                    open_folder(&self.data_dir.join("logs"));
                }
            });

        if modal_response.should_close() {
            self.show_settings = false;
        }
    }
}

fn edit_done(response: &egui::Response) -> bool {
    response.drag_stopped() || response.lost_focus()
}

/// Value to store once an edit has finished and differs from the saved one
fn finished_edit<T: PartialEq + Copy>(done: bool, draft: T, saved: T) -> Option<T> {
    (done && draft != saved).then_some(draft)
}

fn open_folder(path: &Path) {
    std::fs::create_dir_all(path).ok();
    if let Err(e) = open::that(path) {
        warn!(path = %path.display(), error = %e, "Failed to open folder");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_apply_only_when_finished() {
        // Mid-drag ticks change the draft but are not stored yet
        assert_eq!(finished_edit(false, 950_u64, 900), None);
        assert_eq!(finished_edit(false, 1200_u64, 900), None);
        assert_eq!(finished_edit(true, 1200_u64, 900), Some(1200));
    }

    #[test]
    fn unchanged_edit_is_not_stored() {
        assert_eq!(finished_edit(true, 5_u32, 5), None);
    }
}
