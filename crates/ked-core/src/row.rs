#![forbid(unsafe_code)]

//! A single buffer row with its raw and rendered forms.
//!
//! `chars` is the authoritative content: the line's bytes with no trailing
//! newline. `render` is derived from it on every mutation, with tabs expanded
//! to spaces aligned to the next [`TAB_STOP`] boundary, and is never edited
//! directly. Everything that reads the screen-facing form goes through
//! [`Row::render`].

/// Fixed tab stop width, in render columns.
pub const TAB_STOP: usize = 8;

/// One logical line of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    chars: Vec<u8>,
    render: Vec<u8>,
}

impl Row {
    /// Build a row from raw bytes, deriving its rendered form.
    #[must_use]
    pub fn new(chars: Vec<u8>) -> Self {
        let mut row = Self {
            chars,
            render: Vec::new(),
        };
        row.update_render();
        row
    }

    /// Length of the raw content in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The raw content, without a trailing newline.
    #[must_use]
    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    /// The tab-expanded rendered form.
    #[must_use]
    pub fn render(&self) -> &[u8] {
        &self.render
    }

    /// Map a byte offset into `chars` to its render-space column.
    ///
    /// A tab at render column `r` advances to the next multiple of
    /// [`TAB_STOP`]; every other byte advances by one. The result is always
    /// at least `cx`.
    #[must_use]
    pub fn cx_to_rx(&self, cx: usize) -> usize {
        let mut rx = 0;
        for &byte in self.chars.iter().take(cx) {
            if byte == b'\t' {
                rx += (TAB_STOP - 1) - (rx % TAB_STOP);
            }
            rx += 1;
        }
        rx
    }

    /// Insert one byte at `at`, clamped to the row length.
    pub(crate) fn insert_char(&mut self, at: usize, byte: u8) {
        let at = at.min(self.chars.len());
        self.chars.insert(at, byte);
        self.update_render();
    }

    /// Remove the byte at `at`; out-of-range offsets are a no-op.
    pub(crate) fn delete_char(&mut self, at: usize) {
        if at < self.chars.len() {
            self.chars.remove(at);
            self.update_render();
        }
    }

    /// Concatenate `bytes` onto the end of the row.
    pub(crate) fn append(&mut self, bytes: &[u8]) {
        self.chars.extend_from_slice(bytes);
        self.update_render();
    }

    /// Truncate the row at `at`, returning the tail bytes.
    pub(crate) fn split_off(&mut self, at: usize) -> Vec<u8> {
        let at = at.min(self.chars.len());
        let tail = self.chars.split_off(at);
        self.update_render();
        tail
    }

    fn update_render(&mut self) {
        self.render.clear();
        for &byte in &self.chars {
            if byte == b'\t' {
                self.render.push(b' ');
                while self.render.len() % TAB_STOP != 0 {
                    self.render.push(b' ');
                }
            } else {
                self.render.push(byte);
            }
        }
    }
}
