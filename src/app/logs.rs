//! Session history, health check and phase resync

use super::state::AppEvent;
use super::App;
use eframe::egui;
use tracing::{debug, warn};

impl App {
    pub fn refresh_logs(&mut self, ctx: &egui::Context) {
        let Some(api) = super::client_or_hint(self.api.as_ref(), &mut self.state, false) else {
            return;
        };
        debug!("Refreshing session logs");
        self.spawn_event(ctx, async move { AppEvent::LogsLoaded(api.fetch_logs().await) });
    }

    pub fn check_health(&mut self, ctx: &egui::Context) {
        let Some(api) = self.api.clone() else {
            return;
        };
        self.spawn_event(ctx, async move { AppEvent::Health(api.health().await) });
    }

    /// Re-read the session phase after a failed round. Failures are only logged.
    pub fn sync_phase(&mut self, ctx: &egui::Context, session_id: String) {
        let Some(api) = self.api.clone() else {
            return;
        };
        let tx = self.events_tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            match api.fetch_session_status(&session_id).await {
                Ok(status) => {
                    if tx.send(AppEvent::PhaseSynced(status)).is_ok() {
                        ctx.request_repaint();
                    }
                }
                Err(e) => warn!(error = %e, session = %session_id, "Phase resync failed"),
            }
        });
    }
}
