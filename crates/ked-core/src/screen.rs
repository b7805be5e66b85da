#![forbid(unsafe_code)]

//! Single-frame screen compositor.
//!
//! [`compose`] assembles one complete frame (content rows, status bar,
//! message line, cursor placement) into a single growable byte buffer. The
//! backend writes that buffer to the terminal in one call, so a partially
//! drawn frame can never reach the screen.
//!
//! ## Escape Sequence Reference
//!
//! | Directive          | Sequence        |
//! |--------------------|-----------------|
//! | Hide cursor        | `CSI ? 25 l`    |
//! | Show cursor        | `CSI ? 25 h`    |
//! | Cursor home        | `CSI H`         |
//! | Cursor position    | `CSI row;col H` |
//! | Erase to line end  | `CSI K`         |
//! | Clear screen       | `CSI 2 J`       |
//! | Inverted text      | `CSI 7 m`       |
//! | Reset attributes   | `CSI m`         |

use crate::buffer::TextBuffer;
use crate::viewport::{Cursor, Viewport};

pub const CURSOR_HIDE: &[u8] = b"\x1b[?25l";
pub const CURSOR_SHOW: &[u8] = b"\x1b[?25h";
pub const CURSOR_HOME: &[u8] = b"\x1b[H";
pub const ERASE_LINE: &[u8] = b"\x1b[K";
pub const CLEAR_SCREEN: &[u8] = b"\x1b[2J";
pub const INVERT_ON: &[u8] = b"\x1b[7m";
pub const ATTRS_OFF: &[u8] = b"\x1b[m";

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything the compositor needs to draw one frame.
#[derive(Debug)]
pub struct Frame<'a> {
    pub buffer: &'a TextBuffer,
    pub viewport: &'a Viewport,
    pub cursor: Cursor,
    /// Render column for the cursor, already computed by the viewport.
    pub rx: usize,
    /// Message line content, already filtered for staleness by the editor.
    pub message: Option<&'a str>,
}

/// Assemble one full frame into a fresh append buffer.
#[must_use]
pub fn compose(frame: &Frame<'_>) -> Vec<u8> {
    let viewport = frame.viewport;
    let mut out = Vec::with_capacity(viewport.screenrows * (viewport.screencols + 8) + 64);

    out.extend_from_slice(CURSOR_HIDE);
    out.extend_from_slice(CURSOR_HOME);

    draw_rows(frame, &mut out);
    draw_status_bar(frame, &mut out);
    draw_message_bar(frame, &mut out);

    // Place the cursor relative to the viewport (1-indexed on the wire).
    // Saturate so a cursor above or left of the window still yields a
    // valid directive.
    let row = frame.cursor.cy.saturating_sub(viewport.rowoff) + 1;
    let col = frame.rx.saturating_sub(viewport.coloff) + 1;
    out.extend_from_slice(format!("\x1b[{row};{col}H").as_bytes());

    out.extend_from_slice(CURSOR_SHOW);
    out
}

fn draw_rows(frame: &Frame<'_>, out: &mut Vec<u8>) {
    let viewport = frame.viewport;
    for y in 0..viewport.screenrows {
        let filerow = y + viewport.rowoff;
        if let Some(row) = frame.buffer.row(filerow) {
            let render = row.render();
            let start = viewport.coloff.min(render.len());
            let len = (render.len() - start).min(viewport.screencols);
            out.extend_from_slice(&render[start..start + len]);
        } else if frame.buffer.num_rows() == 0
            && frame.buffer.filename().is_none()
            && y == viewport.screenrows / 3
        {
            draw_welcome(viewport.screencols, out);
        } else {
            out.push(b'~');
        }

        out.extend_from_slice(ERASE_LINE);
        out.extend_from_slice(b"\r\n");
    }
}

/// Truncate to at most `max` bytes without splitting a character.
fn truncate_at_boundary(s: &mut String, max: usize) {
    if s.len() > max {
        let mut cut = max;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
    }
}

fn draw_welcome(screencols: usize, out: &mut Vec<u8>) {
    let mut welcome = format!("ked editor -- version {VERSION}");
    truncate_at_boundary(&mut welcome, screencols);

    let mut padding = (screencols - welcome.len()) / 2;
    if padding > 0 {
        out.push(b'~');
        padding -= 1;
    }
    out.extend(std::iter::repeat_n(b' ', padding));
    out.extend_from_slice(welcome.as_bytes());
}

fn draw_status_bar(frame: &Frame<'_>, out: &mut Vec<u8>) {
    let viewport = frame.viewport;
    let buffer = frame.buffer;

    let mut name = buffer
        .filename()
        .map_or_else(|| "[No Name]".to_string(), |p| p.display().to_string());
    truncate_at_boundary(&mut name, 20);

    let mut left = format!(
        "{name} - {} lines{}",
        buffer.num_rows(),
        if buffer.is_dirty() { " (modified)" } else { "" },
    );
    truncate_at_boundary(&mut left, viewport.screencols);
    let right = format!("{}/{}", frame.cursor.cy + 1, buffer.num_rows());

    out.extend_from_slice(INVERT_ON);
    out.extend_from_slice(left.as_bytes());

    let mut len = left.len();
    while len < viewport.screencols {
        if viewport.screencols - len == right.len() {
            out.extend_from_slice(right.as_bytes());
            break;
        }
        out.push(b' ');
        len += 1;
    }

    out.extend_from_slice(ATTRS_OFF);
    out.extend_from_slice(b"\r\n");
}

fn draw_message_bar(frame: &Frame<'_>, out: &mut Vec<u8>) {
    out.extend_from_slice(ERASE_LINE);
    if let Some(message) = frame.message {
        let end = message.len().min(frame.viewport.screencols);
        out.extend_from_slice(&message.as_bytes()[..end]);
    }
}
