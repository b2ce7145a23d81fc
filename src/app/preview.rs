//! Live preview: status label polling and the MJPEG camera stream

use super::state::AppEvent;
use super::App;
use crate::api::ApiClient;
use crate::mjpeg::{boundary_from_content_type, MjpegDecoder, DEFAULT_BOUNDARY};
use eframe::egui;
use futures::StreamExt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Latest decoded frame handed from the stream task to the UI thread
#[derive(Default)]
pub struct PreviewFeed {
    pub frame: Option<egui::ColorImage>,
    pub error: Option<String>,
    pub frames_received: u64,
}

/// What the preview texture should do on this UI frame
pub enum TextureUpdate {
    Keep,
    Replace(egui::ColorImage),
    /// The stream failed or ended; the last frame is stale
    Clear,
}

impl PreviewFeed {
    pub fn take_update(&mut self) -> TextureUpdate {
        if let Some(frame) = self.frame.take() {
            TextureUpdate::Replace(frame)
        } else if self.error.is_some() {
            TextureUpdate::Clear
        } else {
            TextureUpdate::Keep
        }
    }

    fn reset(&mut self) {
        self.frame = None;
        self.error = None;
        self.frames_received = 0;
    }
}

impl App {
    /// Poll `/api/preview/status` immediately and then on a fixed interval
    pub fn start_preview_polling(&mut self, ctx: &egui::Context) {
        if let Some(token) = self.poll_token.take() {
            token.cancel();
        }
        let Some(api) = self.api.clone() else {
            return;
        };

        let token = CancellationToken::new();
        self.poll_token = Some(token.clone());
        let tx = self.events_tx.clone();
        let ctx = ctx.clone();
        let period = Duration::from_millis(self.settings.poll_interval_ms());

        debug!(period_ms = period.as_millis() as u64, "Starting preview status polling");
        self.runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        let result = api.fetch_preview_status().await;
                        if tx.send(AppEvent::PreviewPolled(result)).is_err() {
                            break;
                        }
                        ctx.request_repaint();
                    }
                }
            }
            debug!("Preview status polling stopped");
        });
    }

    /// (Re)connect the camera stream with a fresh cache-busting nonce
    pub fn restart_preview_stream(&mut self, ctx: &egui::Context) {
        if let Some(token) = self.stream_token.take() {
            token.cancel();
        }
        let Some(api) = self.api.clone() else {
            return;
        };

        self.preview_texture = None;
        if let Ok(mut feed) = self.preview_feed.lock() {
            feed.reset();
        }

        let token = CancellationToken::new();
        self.stream_token = Some(token.clone());
        let nonce = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let feed = self.preview_feed.clone();
        let ctx = ctx.clone();

        self.runtime.spawn(async move {
            read_preview_stream(api, nonce, feed, ctx, token).await;
        });
    }

    /// Upload a freshly decoded frame, if any, to the preview texture
    pub fn sync_preview_texture(&mut self, ctx: &egui::Context) {
        let update = match self.preview_feed.lock() {
            Ok(mut feed) => feed.take_update(),
            Err(_) => TextureUpdate::Keep,
        };
        match update {
            TextureUpdate::Keep => {}
            TextureUpdate::Clear => self.preview_texture = None,
            TextureUpdate::Replace(image) => match &mut self.preview_texture {
                Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
                None => {
                    self.preview_texture = Some(ctx.load_texture(
                        "preview_stream",
                        image,
                        egui::TextureOptions::LINEAR,
                    ));
                }
            },
        }
    }

    pub fn preview_error(&self) -> Option<String> {
        self.preview_feed.lock().ok().and_then(|feed| feed.error.clone())
    }
}

async fn read_preview_stream(
    api: ApiClient,
    nonce: u64,
    feed: Arc<Mutex<PreviewFeed>>,
    ctx: egui::Context,
    token: CancellationToken,
) {
    let set_error = |message: String| {
        if token.is_cancelled() {
            return;
        }
        if let Ok(mut f) = feed.lock() {
            f.error = Some(message);
        }
        ctx.request_repaint();
    };

    let response = tokio::select! {
        _ = token.cancelled() => return,
        response = api.open_preview_stream(nonce) => response,
    };
    let response = match response {
        Ok(response) => response,
        Err(e) => {
            warn!(error = ?e, "Preview stream unavailable");
            set_error(e.to_string());
            return;
        }
    };

    let boundary = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(boundary_from_content_type)
        .unwrap_or_else(|| DEFAULT_BOUNDARY.to_string());
    info!(boundary = %boundary, nonce, "Preview stream connected");

    let mut decoder = MjpegDecoder::new(&boundary);
    let mut stream = response.bytes_stream();

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                debug!(nonce, "Preview stream cancelled");
                return;
            }
            chunk = stream.next() => {
                match chunk {
                    Some(Ok(data)) => {
                        decoder.push(&data);
                        // Only the newest complete frame is worth decoding
                        let mut latest = None;
                        while let Some(jpeg) = decoder.next_frame() {
                            latest = Some(jpeg);
                        }
                        let Some(jpeg) = latest else { continue };
                        match decode_jpeg(&jpeg) {
                            Ok(image) => {
                                if token.is_cancelled() {
                                    return;
                                }
                                if let Ok(mut f) = feed.lock() {
                                    f.frame = Some(image);
                                    f.error = None;
                                    f.frames_received += 1;
                                    if f.frames_received == 1 {
                                        debug!(nonce, "First preview frame decoded");
                                    }
                                }
                                ctx.request_repaint();
                            }
                            Err(e) => debug!(error = %e, bytes = jpeg.len(), "Skipping undecodable frame"),
                        }
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "Preview stream interrupted");
                        set_error("Preview stream interrupted.".to_string());
                        return;
                    }
                    None => {
                        info!("Preview stream ended");
                        set_error("Preview stream ended.".to_string());
                        return;
                    }
                }
            }
        }
    }
}

fn decode_jpeg(bytes: &[u8]) -> Result<egui::ColorImage, image::ImageError> {
    let rgba = image::load_from_memory_with_format(bytes, image::ImageFormat::Jpeg)?.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}
