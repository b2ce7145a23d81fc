//! Utility functions

use crate::constants::APP_NAME;
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use std::path::{Path, PathBuf};

// Square viewBox; three "hands" around a center point
pub const ICON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 256 256"><rect width="256" height="256" rx="48" fill="#09090b"/><circle cx="128" cy="76" r="44" fill="#2dd4bf"/><rect x="40" y="136" width="80" height="80" rx="14" fill="#fff"/><path d="M148 216l40-84 40 84z" fill="#fbbf24"/></svg>"##;

/// Rasterize the icon SVG to a square RGBA image (window/taskbar icon).
pub fn rasterize_icon(size: u32) -> Option<(Vec<u8>, u32, u32)> {
    let tree = resvg::usvg::Tree::from_str(ICON_SVG, &resvg::usvg::Options::default()).ok()?;
    let scale = size as f32 / tree.size().width();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size, size)?;
    resvg::render(
        &tree,
        resvg::usvg::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Some((premul_to_straight(&pixmap), size, size))
}

fn premul_to_straight(pixmap: &resvg::tiny_skia::Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let a = p.alpha();
            if a == 0 {
                [0, 0, 0, 0]
            } else {
                let r = (p.red() as u16 * 255 / a as u16) as u8;
                let g = (p.green() as u16 * 255 / a as u16) as u8;
                let b = (p.blue() as u16 * 255 / a as u16) as u8;
                [r, g, b, a]
            }
        })
        .collect()
}

/// Get the app data directory (settings, logs, default cats folder)
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Parse a backend timestamp. Naive ISO times are UTC (the backend uses utcnow).
pub fn parse_backend_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Local wall-clock time, or the raw string when unparsable
pub fn format_local_time(s: &str) -> String {
    parse_backend_timestamp(s)
        .map(|dt| dt.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| s.to_string())
}

pub fn format_local_datetime(s: &str) -> String {
    parse_backend_timestamp(s)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| s.to_string())
}

/// Format seconds as "42s" or "3m 07s"
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    if total >= 60 {
        format!("{}m {:02}s", total / 60, total % 60)
    } else {
        format!("{}s", total)
    }
}

/// Local file for a backend cat image URL such as `/cats/happy.jpg`
pub fn cat_image_path(cats_dir: &Path, cat_image_url: &str) -> Option<PathBuf> {
    let name = cat_image_url.rsplit('/').next()?.trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(cats_dir.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_naive_backend_timestamps_as_utc() {
        let dt = parse_backend_timestamp("2024-05-01T10:20:30.123456").unwrap();
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (10, 20, 30));

        let dt = parse_backend_timestamp("2024-05-01T10:20:30").unwrap();
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let dt = parse_backend_timestamp("2024-05-01T12:00:00+02:00").unwrap();
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn unparsable_timestamps_pass_through() {
        assert_eq!(format_local_datetime("yesterday"), "yesterday");
        assert_eq!(format_local_time(""), "");
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(42.4), "42s");
        assert_eq!(format_duration(187.0), "3m 07s");
        assert_eq!(format_duration(-5.0), "0s");
    }

    #[test]
    fn cat_path_uses_file_name_only() {
        let dir = Path::new("/data/cats");
        assert_eq!(
            cat_image_path(dir, "/cats/happy.jpg"),
            Some(PathBuf::from("/data/cats/happy.jpg"))
        );
        assert_eq!(cat_image_path(dir, "/cats/"), None);
        assert_eq!(cat_image_path(dir, "/cats/.."), None);
    }

    #[test]
    fn icon_rasterizes_to_requested_size() {
        let (pixels, w, h) = rasterize_icon(32).unwrap();
        assert_eq!((w, h), (32, 32));
        assert_eq!(pixels.len(), 32 * 32 * 4);
    }
}
