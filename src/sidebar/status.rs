//! Status bar along the bottom of the window

use crate::ui::*;
use crate::ui::Rect;
use macroquad::prelude::*;

/// Values shown in the status bar
#[derive(Debug, Clone, Default)]
pub struct StatusInfo {
    pub fps: i32,
    pub model: String,
    pub tier: u8,
    pub distance: f32,
    pub phase: &'static str,
    pub triangles: usize,
    /// Last user-facing message and whether it was an error
    pub message: Option<(String, bool)>,
}

/// Resident memory of this process in MiB, where the platform reports it
pub fn resident_mib() -> Option<f32> {
    memory_stats::memory_stats().map(|stats| stats.physical_mem as f32 / (1024.0 * 1024.0))
}

pub fn format_status(info: &StatusInfo, memory_mib: Option<f32>) -> String {
    let mut status = format!(
        "{} fps | {} LOD{} | {:.1}m | {} | {} tris",
        info.fps, info.model, info.tier, info.distance, info.phase, info.triangles
    );
    if let Some(mib) = memory_mib {
        status.push_str(&format!(" | {:.0} MiB", mib));
    }
    status
}

pub fn draw_status_bar(rect: Rect, info: &StatusInfo) {
    draw_rectangle(rect.x, rect.y, rect.w, rect.h, HEADER_COLOR);
    let text_y = rect.y + (rect.h + FONT_SIZE_CONTENT) * 0.5 - 2.0;
    draw_text(&format_status(info, resident_mib()), rect.x + 8.0, text_y, FONT_SIZE_CONTENT + 2.0, TEXT_COLOR);

    if let Some((message, is_error)) = &info.message {
        let dims = measure_text(message, None, FONT_SIZE_CONTENT as u16 + 2, 1.0);
        let color = if *is_error { ERROR_COLOR } else { ACCENT_COLOR };
        draw_text(message, rect.right() - dims.width - 10.0, text_y, FONT_SIZE_CONTENT + 2.0, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_status() {
        let info = StatusInfo {
            fps: 60,
            model: "Hoodie".into(),
            tier: 2,
            distance: 21.04,
            phase: "Loading",
            triangles: 1200,
            message: None,
        };
        assert_eq!(format_status(&info, None), "60 fps | Hoodie LOD2 | 21.0m | Loading | 1200 tris");
        assert!(format_status(&info, Some(128.4)).ends_with("| 128 MiB"));
    }
}
