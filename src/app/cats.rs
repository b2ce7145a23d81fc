//! Cat picture for the captured expression, loaded from the local cats folder

use super::App;
use crate::utils::cat_image_path;
use eframe::egui;
use tracing::debug;

impl App {
    /// Texture for the current expression's cat. Missing or unreadable images
    /// are cached as `None` so the panel hides them without retrying each frame.
    pub fn cat_texture(&mut self, ctx: &egui::Context) -> Option<egui::TextureHandle> {
        let url = self.state.expression.as_ref()?.cat_image_url.clone();
        let path = cat_image_path(&self.cats_dir, &url)?;

        if let Some((cached_path, texture)) = &self.cat_texture {
            if *cached_path == path {
                return texture.clone();
            }
        }

        let texture = match image::open(&path) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                let size = [rgba.width() as usize, rgba.height() as usize];
                Some(ctx.load_texture(
                    "cat",
                    egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()),
                    egui::TextureOptions::LINEAR,
                ))
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Cat image not available");
                None
            }
        };
        self.cat_texture = Some((path, texture.clone()));
        texture
    }
}
