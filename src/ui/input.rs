//! Input state for UI interaction

use super::Rect;
use macroquad::prelude::*;

/// Mouse button state for one frame
#[derive(Debug, Clone, Copy, Default)]
pub struct MouseState {
    pub x: f32,
    pub y: f32,
    /// Movement since the previous frame
    pub dx: f32,
    pub dy: f32,
    pub left_down: bool,
    pub right_down: bool,
    pub left_pressed: bool,  // Just pressed this frame
    pub left_released: bool, // Just released this frame
    pub scroll: f32,         // Scroll wheel delta
}

impl MouseState {
    /// Sample macroquad's input, computing deltas against `previous`
    pub fn poll(previous: &MouseState) -> Self {
        let (x, y) = mouse_position();
        Self {
            x,
            y,
            dx: x - previous.x,
            dy: y - previous.y,
            left_down: is_mouse_button_down(MouseButton::Left),
            right_down: is_mouse_button_down(MouseButton::Right),
            left_pressed: is_mouse_button_pressed(MouseButton::Left),
            left_released: is_mouse_button_released(MouseButton::Left),
            scroll: mouse_wheel().1,
        }
    }

    /// Check if mouse is inside a rect
    pub fn inside(&self, rect: &Rect) -> bool {
        rect.contains(self.x, self.y)
    }

    /// Wheel notches this frame, platform scale removed
    pub fn scroll_notches(&self) -> f32 {
        if self.scroll == 0.0 {
            0.0
        } else {
            self.scroll.signum()
        }
    }
}

/// UI context passed through the frame
#[derive(Debug, Default)]
pub struct UiContext {
    pub mouse: MouseState,
    /// ID of the widget currently being dragged (if any)
    pub dragging: Option<u64>,
    /// ID of the widget that is "hot" (mouse hovering)
    pub hot: Option<u64>,
    /// Widgets outside this rect are neither drawn nor interactive
    clip: Option<Rect>,
    tooltip: Option<(String, f32, f32)>,
    /// Counter for generating unique IDs
    id_counter: u64,
}

impl UiContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a unique ID for a widget
    pub fn next_id(&mut self) -> u64 {
        self.id_counter += 1;
        self.id_counter
    }

    /// Reset at start of frame (call before UI code)
    pub fn begin_frame(&mut self, mouse: MouseState) {
        self.mouse = mouse;
        self.hot = None;
        self.tooltip = None;
        self.clip = None;
        self.id_counter = 0;

        // Clear dragging if mouse released
        if !self.mouse.left_down {
            self.dragging = None;
        }
    }

    pub fn is_dragging(&self, id: u64) -> bool {
        self.dragging == Some(id)
    }

    pub fn start_drag(&mut self, id: u64) {
        self.dragging = Some(id);
    }

    /// Set hot widget (hovering)
    pub fn set_hot(&mut self, id: u64) {
        // Only set hot if not dragging something else
        if self.dragging.is_none() || self.dragging == Some(id) {
            self.hot = Some(id);
        }
    }

    pub fn set_clip(&mut self, clip: Option<Rect>) {
        self.clip = clip;
    }

    /// Whether a widget at `rect` should draw at all
    pub fn visible(&self, rect: &Rect) -> bool {
        self.clip.map_or(true, |clip| clip.contains(rect.x, rect.y) && rect.bottom() <= clip.bottom() + 0.5)
    }

    /// Mouse is over `rect` and `rect` is visible
    pub fn hovering(&self, rect: &Rect) -> bool {
        self.visible(rect) && self.mouse.inside(rect)
    }

    pub fn set_tooltip(&mut self, text: &str, x: f32, y: f32) {
        self.tooltip = Some((text.to_string(), x, y));
    }

    pub fn tooltip(&self) -> Option<(&str, f32, f32)> {
        self.tooltip.as_ref().map(|(text, x, y)| (text.as_str(), *x, *y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mouse_at(x: f32, y: f32, left_down: bool) -> MouseState {
        MouseState {
            x,
            y,
            left_down,
            ..Default::default()
        }
    }

    #[test]
    fn test_release_clears_drag() {
        let mut ctx = UiContext::new();
        ctx.begin_frame(mouse_at(0.0, 0.0, true));
        let id = ctx.next_id();
        ctx.start_drag(id);
        ctx.begin_frame(mouse_at(5.0, 0.0, true));
        assert!(ctx.is_dragging(id));
        ctx.begin_frame(mouse_at(5.0, 0.0, false));
        assert!(!ctx.is_dragging(id));
    }

    #[test]
    fn test_hot_blocked_while_dragging_other() {
        let mut ctx = UiContext::new();
        ctx.begin_frame(mouse_at(0.0, 0.0, true));
        ctx.start_drag(7);
        ctx.set_hot(3);
        assert_eq!(ctx.hot, None);
        ctx.set_hot(7);
        assert_eq!(ctx.hot, Some(7));
    }

    #[test]
    fn test_clip_hides_rows() {
        let mut ctx = UiContext::new();
        ctx.begin_frame(mouse_at(15.0, 15.0, false));
        ctx.set_clip(Some(Rect::new(0.0, 0.0, 100.0, 50.0)));
        assert!(ctx.hovering(&Rect::new(10.0, 10.0, 20.0, 20.0)));
        assert!(!ctx.visible(&Rect::new(10.0, 40.0, 20.0, 20.0)));
        assert!(!ctx.visible(&Rect::new(10.0, -5.0, 20.0, 20.0)));
    }

    #[test]
    fn test_scroll_notches() {
        let mut m = MouseState::default();
        assert_eq!(m.scroll_notches(), 0.0);
        m.scroll = 120.0;
        assert_eq!(m.scroll_notches(), 1.0);
        m.scroll = -0.3;
        assert_eq!(m.scroll_notches(), -1.0);
    }
}
