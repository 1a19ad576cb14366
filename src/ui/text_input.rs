//! Single-line text field (preset names)

use super::theme::*;
use super::{Rect, UiContext};
use macroquad::prelude::*;

/// Longest name the field accepts, in characters
pub const MAX_NAME_CHARS: usize = 40;

/// State for a text input field
#[derive(Debug, Clone, Default)]
pub struct TextInputState {
    pub text: String,
    /// Cursor position (byte index)
    pub cursor: usize,
    pub focused: bool,
    blink_timer: f32,
}

impl TextInputState {
    #[cfg(test)]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Self {
            text,
            cursor,
            focused: false,
            blink_timer: 0.0,
        }
    }

    /// Take the text and reset the field
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    fn prev_boundary(&self) -> usize {
        self.text[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.text[self.cursor..]
            .char_indices()
            .nth(1)
            .map(|(i, _)| self.cursor + i)
            .unwrap_or(self.text.len())
    }

    pub fn move_left(&mut self) {
        self.cursor = self.prev_boundary();
    }

    pub fn move_right(&mut self) {
        self.cursor = self.next_boundary();
    }

    /// Insert at the cursor; control characters and overflow are dropped
    pub fn insert_char(&mut self, ch: char) {
        if ch.is_control() || self.text.chars().count() >= MAX_NAME_CHARS {
            return;
        }
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    /// Delete character before cursor (backspace)
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.prev_boundary();
            self.text.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    /// Delete character after cursor (delete key)
    pub fn delete(&mut self) {
        if self.cursor < self.text.len() {
            let next = self.next_boundary();
            self.text.drain(self.cursor..next);
        }
    }

    /// Apply this frame's keys; returns true when Enter was pressed
    fn handle_keys(&mut self) -> bool {
        self.blink_timer += get_frame_time();
        if is_key_pressed(KeyCode::Left) {
            self.move_left();
            self.blink_timer = 0.0;
        }
        if is_key_pressed(KeyCode::Right) {
            self.move_right();
            self.blink_timer = 0.0;
        }
        if is_key_pressed(KeyCode::Home) {
            self.cursor = 0;
        }
        if is_key_pressed(KeyCode::End) {
            self.cursor = self.text.len();
        }
        if is_key_pressed(KeyCode::Backspace) {
            self.backspace();
            self.blink_timer = 0.0;
        }
        if is_key_pressed(KeyCode::Delete) {
            self.delete();
            self.blink_timer = 0.0;
        }
        while let Some(ch) = get_char_pressed() {
            self.insert_char(ch);
            self.blink_timer = 0.0;
        }
        if is_key_pressed(KeyCode::Escape) {
            self.focused = false;
        }
        is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::KpEnter)
    }
}

/// Draw a text field; clicking focuses it, clicking elsewhere blurs it
///
/// Returns true when Enter is pressed while focused.
pub fn draw_text_input(ctx: &mut UiContext, rect: Rect, state: &mut TextInputState, placeholder: &str) -> bool {
    if !ctx.visible(&rect) {
        state.focused = false;
        return false;
    }
    if ctx.mouse.left_pressed {
        state.focused = ctx.hovering(&rect);
    }

    draw_rectangle(rect.x, rect.y, rect.w, rect.h, INPUT_BG);
    let border = if state.focused { ACCENT_COLOR } else { TEXT_DIM };
    draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 1.0, border);

    let submitted = state.focused && state.handle_keys();

    let text_x = rect.x + 6.0;
    let text_y = rect.y + (rect.h + FONT_SIZE_CONTENT * 0.7) / 2.0;
    if state.text.is_empty() && !state.focused {
        draw_text(placeholder, text_x, text_y, FONT_SIZE_CONTENT, TEXT_DIM);
    } else {
        draw_text(&state.text, text_x, text_y, FONT_SIZE_CONTENT, TEXT_COLOR);
    }

    if state.focused && (state.blink_timer % 1.0) < 0.5 {
        let offset = measure_text(&state.text[..state.cursor], None, FONT_SIZE_CONTENT as u16, 1.0).width;
        let cursor_x = text_x + offset;
        draw_line(cursor_x, rect.y + 4.0, cursor_x, rect.bottom() - 4.0, 1.5, WHITE);
    }

    submitted
}
