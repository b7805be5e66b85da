#![forbid(unsafe_code)]

//! Logical key events.
//!
//! A [`Key`] is what the decoder in [`crate::input`] hands to the editor:
//! either a byte destined for the buffer, a normalized control chord, or one
//! of the named editing keys. Multi-byte escape sequences always collapse to
//! exactly one `Key`.

/// A decoded key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A byte to be inserted as-is (printable ASCII, tab, or a high byte).
    Char(u8),
    /// A control chord, normalized to its lowercase letter (`Ctrl(b'q')`).
    Ctrl(u8),
    /// Enter / carriage return.
    Enter,
    /// A lone escape byte, or any unrecognized escape sequence.
    Escape,
    /// Backspace (DEL, 0x7f).
    Backspace,
    /// Forward delete.
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
}

impl Key {
    /// Classify a single non-escape input byte.
    ///
    /// Tab and Enter are carved out of the C0 range before the generic
    /// control mapping: tab is buffer content (rows expand it on render) and
    /// Enter is its own editing key. Everything at or above 0x20, plus high
    /// bytes, passes through as [`Key::Char`].
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'\r' => Self::Enter,
            b'\t' => Self::Char(b'\t'),
            0x7f => Self::Backspace,
            // Ctrl+A through Ctrl+Z, minus the tab/enter carve-outs above.
            0x01..=0x1a => Self::Ctrl(byte | 0x60),
            _ => Self::Char(byte),
        }
    }
}
