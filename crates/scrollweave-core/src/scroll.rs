#![forbid(unsafe_code)]

//! Scroll state and input coalescing.
//!
//! Hosts deliver scroll and resize notifications at whatever rate the
//! platform fires them. [`InputCoalescer`] records them with a "latest wins"
//! strategy; the frame loop drains it once per tick and is the only writer of
//! [`ScrollState`].
//!
//! ```
//! use scrollweave_core::scroll::{InputCoalescer, ScrollState};
//!
//! let mut input = InputCoalescer::new();
//! input.push_scroll(120.0);
//! input.push_scroll(480.0);
//! input.push_resize(1440.0, 900.0);
//!
//! let mut state = ScrollState::new(0.0, 1200.0, 800.0);
//! let applied = input.drain_into(&mut state);
//! assert_eq!(state.scroll_y, 480.0);
//! assert!(applied.resized);
//! assert_eq!(applied.scroll_events, 2);
//! ```

/// The one cross-trigger shared value: document scroll and viewport size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    pub scroll_y: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl ScrollState {
    #[must_use]
    pub const fn new(scroll_y: f64, viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            scroll_y,
            viewport_width,
            viewport_height,
        }
    }
}

/// Summary of input applied by one [`InputCoalescer::drain_into`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppliedInput {
    /// Scroll notifications folded into this frame.
    pub scroll_events: u32,
    /// Resize notifications folded into this frame.
    pub resize_events: u32,
    /// Whether the viewport size actually changed.
    pub resized: bool,
    /// Whether `scroll_y` actually changed.
    pub scrolled: bool,
}

/// Pending host input, latest wins.
///
/// Not thread-safe; owned by the engine and fed from the host's event
/// handlers on the same thread.
#[derive(Debug, Clone, Default)]
pub struct InputCoalescer {
    pending_scroll: Option<f64>,
    pending_resize: Option<(f64, f64)>,
    scroll_events: u32,
    resize_events: u32,
}

impl InputCoalescer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a scroll notification. Non-finite offsets are ignored.
    pub fn push_scroll(&mut self, scroll_y: f64) {
        if scroll_y.is_finite() {
            self.pending_scroll = Some(scroll_y);
            self.scroll_events = self.scroll_events.saturating_add(1);
        }
    }

    /// Record a viewport resize. Non-finite or negative sizes are ignored.
    pub fn push_resize(&mut self, width: f64, height: f64) {
        if width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0 {
            self.pending_resize = Some((width, height));
            self.resize_events = self.resize_events.saturating_add(1);
        }
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending_scroll.is_some() || self.pending_resize.is_some()
    }

    /// Apply pending input to `state` and clear it.
    pub fn drain_into(&mut self, state: &mut ScrollState) -> AppliedInput {
        let mut applied = AppliedInput {
            scroll_events: std::mem::take(&mut self.scroll_events),
            resize_events: std::mem::take(&mut self.resize_events),
            ..AppliedInput::default()
        };
        if let Some((w, h)) = self.pending_resize.take() {
            applied.resized = w != state.viewport_width || h != state.viewport_height;
            state.viewport_width = w;
            state.viewport_height = h;
        }
        if let Some(y) = self.pending_scroll.take() {
            applied.scrolled = y != state.scroll_y;
            state.scroll_y = y;
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_scroll_wins() {
        let mut c = InputCoalescer::new();
        for y in [10.0, 20.0, 30.0] {
            c.push_scroll(y);
        }
        let mut s = ScrollState::new(0.0, 100.0, 100.0);
        let a = c.drain_into(&mut s);
        assert_eq!(s.scroll_y, 30.0);
        assert_eq!(a.scroll_events, 3);
        assert!(a.scrolled);
        assert!(!a.resized);
    }

    #[test]
    fn drain_clears_pending() {
        let mut c = InputCoalescer::new();
        c.push_scroll(5.0);
        let mut s = ScrollState::new(0.0, 100.0, 100.0);
        c.drain_into(&mut s);
        assert!(!c.has_pending());
        assert_eq!(c.drain_into(&mut s), AppliedInput::default());
    }

    #[test]
    fn same_size_resize_is_not_a_change() {
        let mut c = InputCoalescer::new();
        c.push_resize(100.0, 100.0);
        let mut s = ScrollState::new(0.0, 100.0, 100.0);
        let a = c.drain_into(&mut s);
        assert_eq!(a.resize_events, 1);
        assert!(!a.resized);
    }

    #[test]
    fn rejects_non_finite_input() {
        let mut c = InputCoalescer::new();
        c.push_scroll(f64::NAN);
        c.push_resize(f64::INFINITY, 10.0);
        c.push_resize(-1.0, 10.0);
        assert!(!c.has_pending());
    }
}
