//! App module - contains the main application state and logic

mod cats;
mod logs;
mod modals;
mod preview;
mod session;
pub mod state;
mod views;

use crate::api::ApiClient;
use crate::settings::Settings;
use crate::theme;
use eframe::egui;
use state::{AppEvent, GameState};
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use preview::PreviewFeed;

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    pub(crate) state: GameState,
    pub(crate) settings: Settings,
    pub(crate) player_name: String,
    pub(crate) api: Option<ApiClient>,
    pub(crate) runtime: tokio::runtime::Runtime,
    // Background task results
    pub(crate) events_tx: UnboundedSender<AppEvent>,
    pub(crate) events_rx: UnboundedReceiver<AppEvent>,
    // Preview stream
    pub(crate) preview_feed: Arc<Mutex<PreviewFeed>>,
    pub(crate) preview_texture: Option<egui::TextureHandle>,
    pub(crate) stream_token: Option<CancellationToken>,
    pub(crate) poll_token: Option<CancellationToken>,
    // Cat image for the final expression
    pub(crate) cat_texture: Option<(PathBuf, Option<egui::TextureHandle>)>,
    pub(crate) cats_dir: PathBuf,
    // Settings window
    pub(crate) show_settings: bool,
    pub(crate) base_url_input: String,
    pub(crate) poll_ms_input: u64,
    pub(crate) countdown_input: u32,
    // Window
    pub(crate) window_pos: Option<egui::Pos2>,
    pub(crate) window_size: Option<egui::Vec2>,
    pub(crate) needs_center: bool,
    pub(crate) data_dir: PathBuf,
    pub(crate) started: bool,
}

// ============================================================================
// APP INITIALIZATION & HELPERS
// ============================================================================

impl App {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: Settings,
        base_url: String,
        data_dir: PathBuf,
    ) -> std::io::Result<Self> {
        // Force dark theme
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        // Add Phosphor icons font
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        theme::apply_visuals(&cc.egui_ctx);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("rps-worker")
            .enable_all()
            .build()?;

        let (events_tx, events_rx) = unbounded_channel();

        let mut state = GameState::default();
        let api = match ApiClient::new(&base_url) {
            Ok(api) => Some(api),
            Err(e) => {
                warn!(error = %e, "Backend URL rejected");
                state.message = e.to_string();
                None
            }
        };

        let cats_dir = settings.cats_dir_or_default();
        std::fs::create_dir_all(&cats_dir).ok();

        Ok(Self {
            state,
            player_name: settings.player_name.clone(),
            base_url_input: base_url,
            poll_ms_input: settings.preview_poll_ms,
            countdown_input: settings.countdown_secs,
            settings,
            api,
            runtime,
            events_tx,
            events_rx,
            preview_feed: Arc::new(Mutex::new(PreviewFeed::default())),
            preview_texture: None,
            stream_token: None,
            poll_token: None,
            cat_texture: None,
            cats_dir,
            show_settings: false,
            window_pos: None,
            window_size: None,
            needs_center: false,
            data_dir,
            started: false,
        })
    }

    /// Kick off everything that talks to the backend on the first frame
    pub fn start_background(&mut self, ctx: &egui::Context) {
        self.check_health(ctx);
        self.refresh_logs(ctx);
        self.start_preview_polling(ctx);
        self.restart_preview_stream(ctx);
    }

    /// Rebuild the API client after the backend URL changed
    pub fn reconfigure_backend(&mut self, ctx: &egui::Context) {
        match ApiClient::new(&self.base_url_input) {
            Ok(api) => {
                info!(base = api.base_url(), "Backend reconfigured");
                self.settings.api_base_url = self.base_url_input.trim().to_string();
                self.api = Some(api);
                self.state.message.clear();
                self.save_settings();
                self.start_background(ctx);
            }
            Err(e) => {
                warn!(error = %e, "Backend URL rejected");
                self.state.message = e.to_string();
            }
        }
    }

    /// Client for a user action; without one the message line explains why
    pub(crate) fn require_api(&mut self) -> Option<ApiClient> {
        client_or_hint(self.api.as_ref(), &mut self.state, true)
    }

    /// Run a future on the runtime and deliver its event to the UI thread
    pub(crate) fn spawn_event<F>(&self, ctx: &egui::Context, fut: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let tx = self.events_tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let event = fut.await;
            if tx.send(event).is_ok() {
                ctx.request_repaint();
            }
        });
    }

    pub fn save_settings(&mut self) {
        self.settings.window_x = self.window_pos.map(|p| p.x);
        self.settings.window_y = self.window_pos.map(|p| p.y);
        self.settings.window_w = self.window_size.map(|s| s.x);
        self.settings.window_h = self.window_size.map(|s| s.y);
        self.settings.player_name = self.player_name.clone();
        self.settings.cats_dir = Some(self.cats_dir.to_string_lossy().to_string());
        self.settings.save(&self.data_dir);
    }

    pub fn shutdown(&mut self) {
        if let Some(token) = self.stream_token.take() {
            token.cancel();
        }
        if let Some(token) = self.poll_token.take() {
            token.cancel();
        }
        self.save_settings();
    }
}

const MISSING_BACKEND_HINT: &str = "Set a valid backend URL in settings first.";

/// Background work skips quietly so an earlier URL error stays visible.
fn client_or_hint(api: Option<&ApiClient>, state: &mut GameState, announce: bool) -> Option<ApiClient> {
    if api.is_none() && announce {
        state.message = MISSING_BACKEND_HINT.into();
    }
    api.cloned()
}
