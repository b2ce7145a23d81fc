//! Session actions: start, play a round, capture the final expression

use super::state::{AppEvent, Followup};
use super::App;
use crate::error::ApiError;
use crate::types::RoundResult;
use eframe::egui;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

impl App {
    pub fn start_session(&mut self, ctx: &egui::Context) {
        let Some(api) = self.require_api() else {
            return;
        };
        self.state.begin_start();
        let name = self.player_name.clone();
        info!(player = %name, "Starting session");
        self.spawn_event(ctx, async move {
            AppEvent::SessionStarted(api.start_session(&name).await)
        });
    }

    pub fn play_round(&mut self, ctx: &egui::Context) {
        let Some(api) = self.require_api() else {
            return;
        };
        let Some(session_id) = self.state.begin_round() else {
            return;
        };
        let countdown = self.settings.countdown_secs;
        let tx = self.events_tx.clone();
        let ctx = ctx.clone();

        debug!(session = %session_id, countdown, "Round countdown started");
        self.runtime.spawn(async move {
            let repaint = || ctx.request_repaint();
            countdown_then_play(&tx, countdown, repaint, api.play_round(&session_id)).await;
        });
    }

    pub fn capture_expression(&mut self, ctx: &egui::Context) {
        let Some(api) = self.require_api() else {
            return;
        };
        let Some(session_id) = self.state.begin_expression() else {
            return;
        };
        self.cat_texture = None;
        info!(session = %session_id, "Capturing expression");
        self.spawn_event(ctx, async move {
            AppEvent::ExpressionCaptured(api.capture_expression(&session_id).await)
        });
    }

    /// Drain background results and act on their followups
    pub fn poll_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.events_rx.try_recv() {
            for followup in self.state.apply(event) {
                match followup {
                    Followup::RefreshLogs => self.refresh_logs(ctx),
                    Followup::SyncPhase(session_id) => self.sync_phase(ctx, session_id),
                    Followup::RestartStream => self.restart_preview_stream(ctx),
                }
            }
        }
    }
}

/// Tick `countdown`..1 one second apart, clear it, announce the capture and
/// deliver the round result. Stops early once the UI side hangs up.
async fn countdown_then_play<F>(
    tx: &UnboundedSender<AppEvent>,
    countdown: u32,
    repaint: impl Fn(),
    round: F,
) where
    F: Future<Output = Result<RoundResult, ApiError>>,
{
    for remaining in (1..=countdown).rev() {
        if tx.send(AppEvent::Countdown(Some(remaining))).is_err() {
            return;
        }
        repaint();
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    if tx.send(AppEvent::Countdown(None)).is_err() || tx.send(AppEvent::Capturing).is_err() {
        return;
    }
    repaint();

    let result = round.await;
    if tx.send(AppEvent::RoundPlayed(result)).is_ok() {
        repaint();
    }
}
