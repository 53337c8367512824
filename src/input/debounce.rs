//! Time-based debouncing for one button line.
//!
//! A raw level is only accepted once it has stayed unchanged for the whole
//! debounce window. Every raw change restarts the window, so contact
//! bounce (and two presses closer together than the window) collapse
//! into a single edge.

use super::Edge;
use crate::config::BUTTON_DEBOUNCE_MS;

/// Debounce state of one button.
#[derive(Clone, Copy, Debug)]
pub struct ButtonChannel {
    raw_level: bool,
    debounced_level: bool,
    /// Time of the last raw change.
    last_change_ms: u64,
    /// Time the last confirmed edge was emitted.
    last_edge_ms: Option<u64>,
    window_ms: u64,
}

impl ButtonChannel {
    /// A released (high) line with the default 50 ms window.
    pub const fn new() -> Self {
        Self::with_window(BUTTON_DEBOUNCE_MS)
    }

    pub const fn with_window(window_ms: u64) -> Self {
        Self {
            raw_level: true,
            debounced_level: true,
            last_change_ms: 0,
            last_edge_ms: None,
            window_ms,
        }
    }

    /// Feed one raw sample (`true` = high). Returns an edge when the
    /// debounced level flips.
    pub fn sample(&mut self, level: bool, now_ms: u64) -> Option<Edge> {
        if level != self.raw_level {
            self.raw_level = level;
            self.last_change_ms = now_ms;
            return None;
        }

        if self.raw_level == self.debounced_level
            || now_ms.saturating_sub(self.last_change_ms) < self.window_ms
        {
            return None;
        }

        self.debounced_level = self.raw_level;
        self.last_edge_ms = Some(now_ms);
        Some(if self.debounced_level {
            Edge::Rising
        } else {
            Edge::Falling
        })
    }

    /// Current confirmed level.
    pub fn level(&self) -> bool {
        self.debounced_level
    }

    /// `true` while the confirmed level is low.
    pub fn is_pressed(&self) -> bool {
        !self.debounced_level
    }

    pub fn last_edge_ms(&self) -> Option<u64> {
        self.last_edge_ms
    }
}

impl Default for ButtonChannel {
    fn default() -> Self {
        Self::new()
    }
}
