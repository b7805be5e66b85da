#![forbid(unsafe_code)]

//! Cursor position and viewport scrolling.
//!
//! The viewport is recomputed every frame from the cursor and the screen
//! dimensions; it is never persisted. Scrolling is minimal: the offsets move
//! just far enough to keep the cursor visible, never centering and never
//! over-scrolling.

use crate::buffer::TextBuffer;

/// Logical cursor position.
///
/// `cy` is a row index in `[0, num_rows]`; equal to `num_rows` means the
/// virtual row past end-of-file where new content appends. `cx` is a byte
/// offset into that row's raw content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub cx: usize,
    pub cy: usize,
}

/// The visible window into the buffer.
#[derive(Debug, Clone)]
pub struct Viewport {
    /// First visible buffer row.
    pub rowoff: usize,
    /// First visible render column.
    pub coloff: usize,
    /// Content area height (terminal rows minus status and message lines).
    pub screenrows: usize,
    /// Content area width.
    pub screencols: usize,
}

impl Viewport {
    /// The content area is clamped to at least one cell in each dimension.
    /// A zero-height or zero-width window would let the scroll clamps push
    /// the offsets past the cursor.
    #[must_use]
    pub fn new(screenrows: usize, screencols: usize) -> Self {
        Self {
            rowoff: 0,
            coloff: 0,
            screenrows: screenrows.max(1),
            screencols: screencols.max(1),
        }
    }

    /// Recompute the render column for the cursor and clamp the offsets so
    /// the cursor stays on-screen. Returns `rx`.
    ///
    /// On the virtual past-end row there is nothing to tab-expand, so
    /// `rx == cx` there.
    pub fn scroll(&mut self, cursor: Cursor, buffer: &TextBuffer) -> usize {
        let rx = buffer
            .row(cursor.cy)
            .map_or(cursor.cx, |row| row.cx_to_rx(cursor.cx));

        if cursor.cy < self.rowoff {
            self.rowoff = cursor.cy;
        }
        if cursor.cy >= self.rowoff + self.screenrows {
            self.rowoff = cursor.cy + 1 - self.screenrows;
        }
        if rx < self.coloff {
            self.coloff = rx;
        }
        if rx >= self.coloff + self.screencols {
            self.coloff = rx + 1 - self.screencols;
        }
        rx
    }
}
