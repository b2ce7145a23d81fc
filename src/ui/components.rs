//! Reusable UI components
//!
//! Display-only units: they read game data and draw it, nothing more.

use crate::constants::MOVES;
use crate::theme;
use crate::types::{Outcome, RoundResult, Scoreboard, SessionLogEntry};
use crate::utils::{format_duration, format_local_datetime, format_local_time};
use eframe::egui;
use egui_extras::{Column, TableBuilder};

pub fn outcome_label(outcome: Option<&Outcome>) -> &'static str {
    match outcome {
        Some(Outcome::Player) => "You won the round",
        Some(Outcome::Bot) => "Bot took this one",
        Some(Outcome::Draw) => "It's a draw",
        Some(Outcome::Retry) => "Gesture not detected",
        Some(Outcome::Unknown) => "Unknown outcome",
        None => "Awaiting play",
    }
}

fn outcome_icon(outcome: Option<&Outcome>) -> &'static str {
    match outcome {
        Some(Outcome::Player) => egui_phosphor::regular::TROPHY,
        Some(Outcome::Bot) => egui_phosphor::regular::ROBOT,
        Some(Outcome::Draw) => egui_phosphor::regular::EQUALS,
        Some(Outcome::Retry) => egui_phosphor::regular::WARNING,
        Some(Outcome::Unknown) => egui_phosphor::regular::QUESTION,
        None => egui_phosphor::regular::HOURGLASS,
    }
}

/// Player move, or `?` when the round has not been played
pub fn player_move_text(result: Option<&RoundResult>) -> &str {
    match result {
        Some(r) if !r.player_move.is_empty() => &r.player_move,
        _ => "?",
    }
}

/// Bot move, or `?` while unplayed or still `pending`
pub fn bot_move_text(result: Option<&RoundResult>) -> &str {
    match result {
        Some(r) if !r.bot_move.is_empty() && r.bot_move != "pending" => &r.bot_move,
        _ => "?",
    }
}

pub fn votes_text(result: &RoundResult) -> String {
    let parts: Vec<String> = MOVES
        .iter()
        .map(|mv| format!("{}: {}", mv, result.votes(mv)))
        .collect();
    format!("Frame votes - {}", parts.join(" | "))
}

pub fn scoreboard_text(board: &Scoreboard) -> String {
    format!(
        "Scoreboard -> You {} | Bot {} | Draws {}",
        board.player, board.bot, board.draws
    )
}

pub fn score_cell_text(board: &Scoreboard) -> String {
    format!("{}-{} (draws {})", board.player, board.bot, board.draws)
}

pub fn player_display_name(name: Option<&str>) -> &str {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => n,
        _ => "Anonymous",
    }
}

/// Pill-shaped label
pub fn tag(ui: &mut egui::Ui, text: impl Into<String>) -> egui::Response {
    egui::Frame::new()
        .fill(theme::BG_SURFACE)
        .stroke(egui::Stroke::new(theme::STROKE_DEFAULT, theme::BORDER_DEFAULT))
        .corner_radius(theme::RADIUS_PILL)
        .inner_margin(egui::Margin::symmetric(10, 4))
        .show(ui, |ui| {
            ui.label(
                egui::RichText::new(text.into())
                    .size(theme::FONT_SMALL)
                    .color(theme::TEXT_SECONDARY),
            );
        })
        .response
}

fn badge(ui: &mut egui::Ui, outcome: Option<&Outcome>) {
    egui::Frame::new()
        .fill(theme::outcome_color(outcome))
        .corner_radius(theme::RADIUS_PILL)
        .inner_margin(egui::Margin::symmetric(10, 4))
        .show(ui, |ui| {
            ui.label(
                egui::RichText::new(format!("{}  {}", outcome_icon(outcome), outcome_label(outcome)))
                    .size(theme::FONT_SMALL)
                    .color(theme::TEXT_PRIMARY),
            );
        });
}

fn move_block(ui: &mut egui::Ui, caption: &str, mv: &str) {
    ui.label(
        egui::RichText::new(caption)
            .size(theme::FONT_SMALL)
            .color(theme::TEXT_DIM),
    );
    ui.label(
        egui::RichText::new(mv)
            .size(theme::FONT_MOVE)
            .strong()
            .color(theme::TEXT_PRIMARY),
    );
}

/// Card for one round slot
pub fn round_card(ui: &mut egui::Ui, round_number: usize, result: Option<&RoundResult>) {
    let outcome = result.map(|r| &r.outcome);
    theme::section_frame().show(ui, |ui| {
        ui.set_width(theme::ROUND_CARD_WIDTH);
        ui.vertical(|ui| {
            ui.label(
                egui::RichText::new(format!("Round {round_number}"))
                    .size(theme::FONT_SMALL)
                    .color(theme::TEXT_DIM),
            );
            badge(ui, outcome);
            ui.add_space(theme::SPACING_MD);
            move_block(ui, "Your move", player_move_text(result));
            ui.add_space(theme::SPACING_SM);
            move_block(ui, "Bot move", bot_move_text(result));

            if let Some(r) = result {
                if !r.stats.is_empty() {
                    ui.add_space(theme::SPACING_MD);
                    ui.label(
                        egui::RichText::new(votes_text(r))
                            .size(theme::FONT_SMALL)
                            .color(theme::TEXT_MUTED),
                    );
                }
                if let Some(at) = &r.captured_at {
                    ui.label(
                        egui::RichText::new(format!("Captured at {}", format_local_time(at)))
                            .size(theme::FONT_SMALL)
                            .color(theme::TEXT_DIM),
                    );
                }
            }
        });
    });
}

/// Session-history table. Returns true when Refresh was clicked.
pub fn session_log(ui: &mut egui::Ui, sessions: &[SessionLogEntry]) -> bool {
    let mut refresh = false;
    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new("Game History")
                .size(theme::FONT_HEADING)
                .strong(),
        );
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let label = format!("{}  Refresh", egui_phosphor::regular::ARROWS_CLOCKWISE);
            if ui.add(theme::button(label)).clicked() {
                refresh = true;
            }
        });
    });
    ui.label(
        egui::RichText::new("Pulled from the backend log file.")
            .size(theme::FONT_SMALL)
            .color(theme::TEXT_DIM),
    );
    ui.add_space(theme::SPACING_MD);

    if sessions.is_empty() {
        ui.label(
            egui::RichText::new("No sessions recorded yet.")
                .size(theme::FONT_SMALL)
                .color(theme::TEXT_MUTED),
        );
        return refresh;
    }

    egui::ScrollArea::horizontal()
        .id_salt("session_log_scroll")
        .show(ui, |ui| {
            TableBuilder::new(ui)
                .id_salt("session_log_table")
                .striped(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .column(Column::auto().at_least(150.0))
                .column(Column::auto().at_least(110.0))
                .column(Column::auto().at_least(110.0))
                .column(Column::auto().at_least(90.0))
                .column(Column::auto().at_least(120.0))
                .column(Column::remainder().at_least(70.0))
                .header(theme::TABLE_ROW_HEIGHT, |mut header| {
                    for title in ["When", "Player", "Score", "Expression", "Cat", "Duration"] {
                        header.col(|ui| {
                            ui.label(
                                egui::RichText::new(title)
                                    .size(theme::FONT_SMALL)
                                    .color(theme::TEXT_DIM),
                            );
                        });
                    }
                })
                .body(|body| {
                    body.rows(theme::TABLE_ROW_HEIGHT, sessions.len(), |mut row| {
                        let session = &sessions[row.index()];
                        row.col(|ui| {
                            ui.label(format_local_datetime(&session.played_at));
                        });
                        row.col(|ui| {
                            ui.label(player_display_name(session.player_name.as_deref()));
                        });
                        row.col(|ui| {
                            ui.label(score_cell_text(&session.scoreboard));
                        });
                        row.col(|ui| {
                            ui.label(session.final_expression.as_deref().unwrap_or("-"));
                        });
                        row.col(|ui| {
                            ui.label(session.cat_image.as_deref().unwrap_or("-"));
                        });
                        row.col(|ui| {
                            let text = session
                                .duration_seconds
                                .map(format_duration)
                                .unwrap_or_else(|| "-".to_string());
                            ui.label(text);
                        });
                    });
                });
        });

    refresh
}
