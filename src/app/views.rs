//! Page rendering: header, controls, live preview, round tracker, history

use super::state::BackendHealth;
use super::App;
use crate::constants::{APP_VERSION, TOTAL_ROUNDS};
use crate::theme;
use crate::ui::components::{round_card, scoreboard_text, session_log, tag};
use eframe::egui;

impl App {
    pub fn render_page(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin::same(theme::SPACING_XL as i8)),
            )
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        self.render_header(ui);
                        ui.add_space(theme::SPACING_LG);
                        theme::card_frame().show(ui, |ui| {
                            ui.set_width(ui.available_width());
                            self.render_controls(ui, ctx);
                        });
                        ui.add_space(theme::SPACING_LG);
                        theme::card_frame().show(ui, |ui| {
                            ui.set_width(ui.available_width());
                            self.render_round_tracker(ui, ctx);
                        });
                        ui.add_space(theme::SPACING_LG);
                        theme::card_frame().show(ui, |ui| {
                            ui.set_width(ui.available_width());
                            if session_log(ui, &self.state.logs) {
                                self.refresh_logs(ctx);
                            }
                        });
                    });
            });
    }

    fn render_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new("Computer Vision Rock - Paper - Scissors")
                    .size(theme::FONT_TITLE)
                    .strong()
                    .color(theme::TEXT_PRIMARY),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let gear = egui::RichText::new(egui_phosphor::regular::GEAR).size(theme::FONT_HEADING);
                if ui.add(egui::Button::new(gear).frame(false)).on_hover_text("Settings").clicked() {
                    self.show_settings = true;
                }
                let (color, text) = match self.state.health {
                    BackendHealth::Online => (theme::STATUS_SUCCESS, "Backend online"),
                    BackendHealth::Offline => (theme::STATUS_ERROR, "Backend offline"),
                    BackendHealth::Unknown => (theme::TEXT_DIM, "Checking backend..."),
                };
                ui.label(
                    egui::RichText::new(format!("{}  {}", egui_phosphor::regular::CIRCLE, text))
                        .size(theme::FONT_SMALL)
                        .color(color),
                );
                ui.label(
                    egui::RichText::new(format!("v{APP_VERSION}"))
                        .size(theme::FONT_SMALL)
                        .color(theme::TEXT_DIM),
                );
            });
        });
        ui.label(
            egui::RichText::new(
                "This client drives the vision backend. Each action triggers live CV inference on the server.",
            )
            .size(theme::FONT_SMALL)
            .color(theme::TEXT_MUTED),
        );

        if self.state.camera_reminder {
            ui.add_space(theme::SPACING_MD);
            theme::banner_frame(theme::STATUS_SUCCESS).show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(
                    egui::RichText::new(
                        "Tip: allow the backend process to access the webcam so the preview works.",
                    )
                    .size(theme::FONT_SMALL)
                    .color(theme::TEXT_SECONDARY),
                );
            });
        }
    }

    fn render_controls(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal_wrapped(|ui| {
            ui.label(
                egui::RichText::new("Player name")
                    .size(theme::FONT_SMALL)
                    .color(theme::TEXT_MUTED),
            );
            ui.add(
                egui::TextEdit::singleline(&mut self.player_name)
                    .hint_text("Optional for logs")
                    .desired_width(220.0),
            );
            if ui
                .add_enabled(self.state.can_start(), theme::button_accent("Start session"))
                .clicked()
            {
                self.start_session(ctx);
            }
        });

        if self.state.session_id.is_some() {
            ui.add_space(theme::SPACING_MD);
            theme::banner_frame(theme::STATUS_INFO).show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(
                    egui::RichText::new(format!("Status: {}", self.state.phase))
                        .color(theme::TEXT_PRIMARY),
                );
            });
        }
        if !self.state.message.is_empty() {
            ui.label(
                egui::RichText::new(&self.state.message)
                    .size(theme::FONT_BODY)
                    .color(theme::TEXT_SECONDARY),
            );
        }
        if let Some(count) = self.state.countdown {
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new(count.to_string())
                        .size(theme::FONT_COUNTDOWN)
                        .strong()
                        .color(theme::ACCENT),
                );
            });
        }

        ui.add_space(theme::SPACING_MD);
        self.render_preview(ui, ctx);

        ui.add_space(theme::SPACING_LG);
        ui.horizontal_wrapped(|ui| {
            let play = format!("{}  Play next round", egui_phosphor::regular::HAND_FIST);
            if ui
                .add_enabled(self.state.can_play_round(), theme::button_accent(play))
                .clicked()
            {
                self.play_round(ctx);
            }
            let capture = format!("{}  Capture expression", egui_phosphor::regular::SMILEY);
            if ui
                .add_enabled(self.state.can_capture_expression(), theme::button(capture))
                .clicked()
            {
                self.capture_expression(ctx);
            }
        });
        ui.label(
            egui::RichText::new("Tip: ensure good lighting and keep your hand inside the webcam frame.")
                .size(theme::FONT_SMALL)
                .color(theme::TEXT_DIM),
        );
    }

    fn render_preview(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        theme::section_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(format!(
                        "{}  Live camera preview (overlays drawn on server)",
                        egui_phosphor::regular::CAMERA
                    ))
                    .size(theme::FONT_SMALL)
                    .color(theme::TEXT_MUTED),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.add(theme::button("Reconnect")).clicked() {
                        self.restart_preview_stream(ctx);
                    }
                });
            });
            ui.add_space(theme::SPACING_SM);

            let stream_error = self.preview_error();
            match &self.preview_texture {
                Some(texture) => {
                    let width = ui.available_width().min(theme::PREVIEW_MAX_WIDTH);
                    let [w, h] = texture.size();
                    let aspect = if w > 0 {
                        h as f32 / w as f32
                    } else {
                        1.0 / theme::PREVIEW_ASPECT_RATIO
                    };
                    ui.vertical_centered(|ui| {
                        ui.image(egui::load::SizedTexture::new(
                            texture.id(),
                            egui::vec2(width, width * aspect),
                        ));
                    });
                }
                None => {
                    ui.label(
                        egui::RichText::new("Camera preview unavailable.")
                            .size(theme::FONT_SMALL)
                            .color(theme::TEXT_MUTED),
                    );
                }
            }
            if let Some(err) = stream_error {
                ui.label(
                    egui::RichText::new(err)
                        .size(theme::FONT_SMALL)
                        .color(theme::STATUS_WARNING),
                );
            }

            ui.add_space(theme::SPACING_SM);
            ui.horizontal(|ui| {
                tag(ui, format!("Gesture: {}", self.state.gesture_label()));
                tag(ui, format!("Expression: {}", self.state.expression_label()));
            });
            if let Some(err) = &self.state.preview_error {
                ui.label(
                    egui::RichText::new(err)
                        .size(theme::FONT_SMALL)
                        .color(theme::STATUS_ERROR),
                );
            }
        });
    }

    fn render_round_tracker(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.label(
            egui::RichText::new("Round tracker")
                .size(theme::FONT_HEADING)
                .strong(),
        );
        ui.label(
            egui::RichText::new(
                "The backend records the majority vote across ~5 seconds of frames. Stats come directly from the API.",
            )
            .size(theme::FONT_SMALL)
            .color(theme::TEXT_DIM),
        );
        ui.add_space(theme::SPACING_SM);
        tag(ui, scoreboard_text(&self.state.scoreboard()));
        ui.add_space(theme::SPACING_MD);

        ui.horizontal_wrapped(|ui| {
            for idx in 0..TOTAL_ROUNDS {
                round_card(ui, idx + 1, self.state.rounds.get(idx));
            }
        });

        if self.state.expression.is_some() {
            ui.add_space(theme::SPACING_LG);
            self.render_expression(ui, ctx);
        }
    }

    fn render_expression(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let texture = self.cat_texture(ctx);
        let Some(expr) = &self.state.expression else {
            return;
        };
        theme::section_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            tag(ui, format!("Final expression: {}", expr.expression));

            if !expr.stats.is_empty() {
                ui.add_space(theme::SPACING_SM);
                let mut stats: Vec<(&String, &f64)> = expr.stats.iter().collect();
                stats.sort_by(|a, b| b.1.total_cmp(a.1));
                let text = stats
                    .iter()
                    .map(|(label, score)| format!("{label}: {score:.2}"))
                    .collect::<Vec<_>>()
                    .join(" | ");
                ui.label(
                    egui::RichText::new(text)
                        .size(theme::FONT_SMALL)
                        .color(theme::TEXT_MUTED),
                );
            }

            if let Some(texture) = &texture {
                ui.add_space(theme::SPACING_MD);
                let [w, h] = texture.size();
                let width = theme::CAT_MAX_WIDTH.min(w as f32);
                let height = if w > 0 { width * h as f32 / w as f32 } else { width };
                ui.image(egui::load::SizedTexture::new(texture.id(), egui::vec2(width, height)));
            }
            ui.label(
                egui::RichText::new(format!(
                    "Place cat photos in {} named {{emotion}}.jpg",
                    self.cats_dir.display()
                ))
                .size(theme::FONT_SMALL)
                .color(theme::TEXT_DIM),
            );
        });
    }
}
