//! Basic UI widgets
//!
//! Every widget draws itself and reports interaction in its return value.
//! Widgets outside the context's clip rect are skipped entirely.

use super::theme::*;
use super::{Rect, UiContext};
use macroquad::prelude::*;

/// Vertical layout cursor for a scrolling panel
pub struct Column {
    rect: Rect,
    cursor_y: f32,
    spacing: f32,
}

impl Column {
    /// Lay rows out from the top of `rect`, shifted up by `scroll`
    pub fn new(rect: Rect, scroll: f32) -> Self {
        Self {
            rect,
            cursor_y: rect.y - scroll,
            spacing: ROW_GAP,
        }
    }

    /// Next full-width row of height `h`
    pub fn row(&mut self, h: f32) -> Rect {
        let row = Rect::new(self.rect.x, self.cursor_y, self.rect.w, h);
        self.cursor_y += h + self.spacing;
        row
    }

    pub fn space(&mut self, h: f32) {
        self.cursor_y += h;
    }

    /// Height consumed so far, scroll included
    pub fn content_height(&self, scroll: f32) -> f32 {
        self.cursor_y + scroll - self.rect.y
    }
}

/// Draw a rounded rectangle (simple approximation using overlapping rects)
pub fn draw_rounded_rect(x: f32, y: f32, w: f32, h: f32, r: f32, color: Color) {
    let r = r.min(w / 2.0).min(h / 2.0);
    draw_rectangle(x + r, y, w - r * 2.0, h, color);
    draw_rectangle(x, y + r, w, h - r * 2.0, color);
    draw_circle(x + r, y + r, r, color);
    draw_circle(x + w - r, y + r, r, color);
    draw_circle(x + r, y + h - r, r, color);
    draw_circle(x + w - r, y + h - r, r, color);
}

/// Text vertically centered in `rect`, left aligned with a small inset
pub fn label(ctx: &UiContext, rect: Rect, text: &str, color: Color) {
    if !ctx.visible(&rect) {
        return;
    }
    let dims = measure_text(text, None, FONT_SIZE_CONTENT as u16, 1.0);
    let text_y = (rect.y + (rect.h + dims.height) * 0.5).round();
    draw_text(text, (rect.x + 4.0).round(), text_y, FONT_SIZE_CONTENT, color);
}

fn centered_text(rect: &Rect, text: &str, color: Color) {
    let dims = measure_text(text, None, FONT_SIZE_CONTENT as u16, 1.0);
    let x = (rect.x + (rect.w - dims.width) * 0.5).round();
    let y = (rect.y + (rect.h + dims.height) * 0.5).round();
    draw_text(text, x, y, FONT_SIZE_CONTENT, color);
}

/// Text button, returns true if clicked
pub fn button(ctx: &mut UiContext, rect: Rect, text: &str) -> bool {
    button_active(ctx, rect, text, false)
}

/// Text button drawn in the accent color while `is_active`
pub fn button_active(ctx: &mut UiContext, rect: Rect, text: &str, is_active: bool) -> bool {
    if !ctx.visible(&rect) {
        return false;
    }
    let id = ctx.next_id();
    let hovered = ctx.hovering(&rect);
    if hovered {
        ctx.set_hot(id);
    }

    let bg = if is_active {
        ACCENT_COLOR
    } else if hovered && ctx.mouse.left_down {
        BUTTON_PRESSED
    } else if hovered {
        BUTTON_HOVER
    } else {
        BUTTON_BG
    };
    draw_rounded_rect(rect.x, rect.y, rect.w, rect.h, 3.0, bg);
    centered_text(&rect, text, if is_active { WHITE } else { TEXT_COLOR });

    hovered && ctx.mouse.left_pressed
}

/// Checkbox row; returns the new value when clicked
pub fn toggle(ctx: &mut UiContext, rect: Rect, text: &str, value: bool) -> Option<bool> {
    if !ctx.visible(&rect) {
        return None;
    }
    let id = ctx.next_id();
    let hovered = ctx.hovering(&rect);
    if hovered {
        ctx.set_hot(id);
    }

    let size = (rect.h - 6.0).max(6.0);
    let bx = rect.x + 4.0;
    let by = rect.y + (rect.h - size) * 0.5;
    draw_rectangle(bx, by, size, size, if hovered { BUTTON_HOVER } else { BUTTON_BG });
    if value {
        draw_rectangle(bx + 3.0, by + 3.0, size - 6.0, size - 6.0, ACCENT_COLOR);
    }
    label(ctx, Rect::new(bx + size + 4.0, rect.y, rect.w - size - 8.0, rect.h), text, TEXT_COLOR);

    (hovered && ctx.mouse.left_pressed).then_some(!value)
}

/// Value under `mouse_x` on a slider track
pub fn slider_value(mouse_x: f32, track: &Rect, min: f32, max: f32) -> f32 {
    if track.w <= 0.0 {
        return min;
    }
    let t = ((mouse_x - track.x) / track.w).clamp(0.0, 1.0);
    min + t * (max - min)
}

/// Labelled horizontal slider; returns the new value while being dragged
pub fn slider(ctx: &mut UiContext, rect: Rect, text: &str, value: f32, min: f32, max: f32) -> Option<f32> {
    if !ctx.visible(&rect) {
        return None;
    }
    let id = ctx.next_id();
    let (label_rect, rest) = rect.split_h_px(rect.w * 0.36);
    let (track_area, value_rect) = rest.split_h_px(rest.w - 44.0);
    let track = Rect::new(track_area.x, track_area.center_y() - 5.0, track_area.w, 10.0);

    label(ctx, label_rect, text, TEXT_DIM);

    draw_rectangle(track.x, track.y, track.w, track.h, TRACK_COLOR);
    let ratio = if max > min {
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let fill = ratio * track.w;
    draw_rectangle(track.x, track.y, fill, track.h, ACCENT_COLOR);
    let handle_x = (track.x + fill - 2.0).max(track.x);
    draw_rectangle(handle_x, track.y - 2.0, 4.0, track.h + 4.0, WHITE);

    draw_text(
        &format!("{:.2}", value),
        value_rect.x + 4.0,
        value_rect.y + (value_rect.h + FONT_SIZE_SMALL) * 0.5,
        FONT_SIZE_SMALL + 1.0,
        TEXT_DIM,
    );

    let grab = Rect::new(track.x, rect.y, track.w, rect.h);
    if ctx.hovering(&grab) {
        ctx.set_hot(id);
        if ctx.mouse.left_pressed && ctx.dragging.is_none() {
            ctx.start_drag(id);
        }
    }

    if ctx.is_dragging(id) && ctx.mouse.left_down {
        let new_value = slider_value(ctx.mouse.x, &track, min, max);
        return ((new_value - value).abs() > f32::EPSILON).then_some(new_value);
    }
    None
}

/// Selectable list row, returns true if clicked
pub fn list_item(ctx: &mut UiContext, rect: Rect, text: &str, selected: bool) -> bool {
    if !ctx.visible(&rect) {
        return false;
    }
    let id = ctx.next_id();
    let hovered = ctx.hovering(&rect);
    if hovered {
        ctx.set_hot(id);
    }
    if selected {
        draw_rectangle(rect.x, rect.y, rect.w, rect.h, ROW_HIGHLIGHT);
        draw_rectangle(rect.x, rect.y, 2.0, rect.h, ACCENT_COLOR);
    } else if hovered {
        draw_rectangle(rect.x, rect.y, rect.w, rect.h, BUTTON_BG);
    }
    label(ctx, rect, text, if selected { WHITE } else { TEXT_COLOR });

    hovered && ctx.mouse.left_pressed
}

/// Solid color chip, returns true if clicked
pub fn swatch(ctx: &mut UiContext, rect: Rect, color: Color, selected: bool) -> bool {
    if !ctx.visible(&rect) {
        return false;
    }
    let id = ctx.next_id();
    let hovered = ctx.hovering(&rect);
    if hovered {
        ctx.set_hot(id);
    }
    draw_rectangle(rect.x, rect.y, rect.w, rect.h, color);
    if selected || hovered {
        draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 2.0, if selected { ACCENT_COLOR } else { WHITE });
    }
    hovered && ctx.mouse.left_pressed
}

/// Collapsible section title; returns true when clicked (toggle `open`)
pub fn section_header(ctx: &mut UiContext, rect: Rect, title: &str, open: bool) -> bool {
    if !ctx.visible(&rect) {
        return false;
    }
    let id = ctx.next_id();
    let hovered = ctx.hovering(&rect);
    if hovered {
        ctx.set_hot(id);
    }
    draw_rectangle(rect.x, rect.y, rect.w, rect.h, if hovered { BUTTON_BG } else { HEADER_COLOR });
    let marker = if open { "-" } else { "+" };
    draw_text(marker, rect.x + 6.0, rect.y + (rect.h + FONT_SIZE_HEADER) * 0.5 - 2.0, FONT_SIZE_HEADER, ACCENT_COLOR);
    let dims = measure_text(title, None, FONT_SIZE_HEADER as u16, 1.0);
    draw_text(
        title,
        rect.x + 20.0,
        (rect.y + (rect.h + dims.height) * 0.5).round(),
        FONT_SIZE_HEADER,
        TEXT_COLOR,
    );
    hovered && ctx.mouse.left_pressed
}

/// Draw the frame's tooltip (call last)
pub fn draw_tooltip(ctx: &UiContext) {
    let Some((text, x, y)) = ctx.tooltip() else {
        return;
    };
    let dims = measure_text(text, None, FONT_SIZE_SMALL as u16 + 1, 1.0);
    let w = dims.width + 10.0;
    let h = 18.0;
    let tx = (x + 12.0).min(screen_width() - w - 2.0).max(2.0);
    let ty = (y + 16.0).min(screen_height() - h - 2.0);
    draw_rectangle(tx, ty, w, h, HEADER_COLOR);
    draw_rectangle_lines(tx, ty, w, h, 1.0, TEXT_DIM);
    draw_text(text, tx + 5.0, ty + 13.0, FONT_SIZE_SMALL + 1.0, TEXT_COLOR);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slider_value_maps_track() {
        let track = Rect::new(100.0, 0.0, 200.0, 10.0);
        assert_eq!(slider_value(100.0, &track, 0.0, 1.0), 0.0);
        assert!((slider_value(200.0, &track, 0.0, 1.0) - 0.5).abs() < 1e-6);
        assert_eq!(slider_value(500.0, &track, -1.0, 1.0), 1.0);
        assert_eq!(slider_value(0.0, &track, -1.0, 1.0), -1.0);
        assert_eq!(slider_value(150.0, &Rect::new(0.0, 0.0, 0.0, 0.0), 2.0, 3.0), 2.0);
    }

    #[test]
    fn test_column_stacks_rows() {
        let mut col = Column::new(Rect::new(10.0, 50.0, 200.0, 400.0), 0.0);
        let a = col.row(20.0);
        let b = col.row(30.0);
        assert_eq!(a.y, 50.0);
        assert_eq!(b.y, 50.0 + 20.0 + ROW_GAP);
        assert_eq!(b.w, 200.0);
        assert_eq!(col.content_height(0.0), 50.0 + 2.0 * ROW_GAP);

        let mut scrolled = Column::new(Rect::new(10.0, 50.0, 200.0, 400.0), 15.0);
        assert_eq!(scrolled.row(20.0).y, 35.0);
        assert_eq!(scrolled.content_height(15.0), 20.0 + ROW_GAP);
    }
}
