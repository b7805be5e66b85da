#![forbid(unsafe_code)]

//! The row-based text buffer.
//!
//! [`TextBuffer`] owns an ordered sequence of [`Row`]s (index = line number)
//! plus the dirty counter and the optional backing filename. Every mutation
//! bumps `dirty`; zero means the buffer matches the on-disk state since the
//! last load or save.
//!
//! Low-level operations (`insert_row`, `row_insert_char`, ...) mutate one
//! row or the row sequence. The editing-level composites at the bottom
//! (`insert_char`, `insert_newline`, `delete_char`) take the cursor and are
//! what the editor controller dispatches to.

use std::path::{Path, PathBuf};

use crate::row::Row;
use crate::viewport::Cursor;

/// Ordered sequence of rows with dirty tracking.
#[derive(Debug, Default)]
pub struct TextBuffer {
    rows: Vec<Row>,
    dirty: u64,
    filename: Option<PathBuf>,
}

impl TextBuffer {
    /// An empty, unnamed, clean buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate a buffer from newline-stripped lines; `dirty` ends at zero.
    #[must_use]
    pub fn from_lines<I>(filename: PathBuf, lines: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let mut buffer = Self::new();
        for line in lines {
            let at = buffer.num_rows();
            buffer.insert_row(at, line);
        }
        buffer.dirty = 0;
        buffer.filename = Some(filename);
        buffer
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, filename: PathBuf) {
        self.filename = Some(filename);
    }

    /// Mutation count since the last load or save.
    #[must_use]
    pub fn dirty(&self) -> u64 {
        self.dirty
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty != 0
    }

    /// Reset the dirty counter after a successful save.
    pub fn mark_saved(&mut self) {
        self.dirty = 0;
    }

    /// Insert a new row at `at`, clamped to `[0, num_rows]`.
    pub fn insert_row(&mut self, at: usize, chars: Vec<u8>) {
        let at = at.min(self.rows.len());
        self.rows.insert(at, Row::new(chars));
        self.dirty += 1;
    }

    /// Remove row `at`; out of range is a no-op.
    pub fn delete_row(&mut self, at: usize) {
        if at < self.rows.len() {
            self.rows.remove(at);
            self.dirty += 1;
        }
    }

    /// Insert one byte into row `cy` at offset `cx` (both clamped).
    pub fn row_insert_char(&mut self, cy: usize, cx: usize, byte: u8) {
        if let Some(row) = self.rows.get_mut(cy) {
            row.insert_char(cx, byte);
            self.dirty += 1;
        }
    }

    /// Delete the byte at offset `cx` of row `cy`, if in range.
    pub fn row_delete_char(&mut self, cy: usize, cx: usize) {
        if let Some(row) = self.rows.get_mut(cy) {
            row.delete_char(cx);
            self.dirty += 1;
        }
    }

    /// Concatenate bytes onto the end of row `cy`.
    pub fn row_append(&mut self, cy: usize, bytes: &[u8]) {
        if let Some(row) = self.rows.get_mut(cy) {
            row.append(bytes);
            self.dirty += 1;
        }
    }

    /// Serialize every row with a trailing newline (including the last),
    /// suitable for a full-file overwrite.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let total: usize = self.rows.iter().map(|r| r.len() + 1).sum();
        let mut out = Vec::with_capacity(total);
        for row in &self.rows {
            out.extend_from_slice(row.chars());
            out.push(b'\n');
        }
        out
    }

    // ── Editing-level composites ─────────────────────────────────────────

    /// Insert a byte at the cursor, creating the virtual past-end row on
    /// demand, and advance the cursor by one column.
    pub fn insert_char(&mut self, cursor: &mut Cursor, byte: u8) {
        if cursor.cy == self.rows.len() {
            self.insert_row(self.rows.len(), Vec::new());
        }
        self.row_insert_char(cursor.cy, cursor.cx, byte);
        cursor.cx += 1;
    }

    /// Insert a newline at the cursor.
    ///
    /// At column zero an empty row is inserted above; otherwise the current
    /// row splits at the cursor, the tail becoming a new row below. The
    /// cursor moves to the start of the following row either way.
    pub fn insert_newline(&mut self, cursor: &mut Cursor) {
        if cursor.cx == 0 {
            self.insert_row(cursor.cy, Vec::new());
        } else {
            // cx > 0 implies the cursor sits on a real row.
            let tail = self.rows[cursor.cy].split_off(cursor.cx);
            self.dirty += 1;
            self.insert_row(cursor.cy + 1, tail);
        }
        cursor.cy += 1;
        cursor.cx = 0;
    }

    /// Backward-delete relative to the cursor.
    ///
    /// No-op at the very start of the buffer or on the virtual past-end row.
    /// At column zero the current row merges onto the end of the previous
    /// one and the cursor lands at the seam.
    pub fn delete_char(&mut self, cursor: &mut Cursor) {
        if cursor.cy == self.rows.len() {
            return;
        }
        if cursor.cx == 0 && cursor.cy == 0 {
            return;
        }

        if cursor.cx > 0 {
            self.row_delete_char(cursor.cy, cursor.cx - 1);
            cursor.cx -= 1;
        } else {
            let prev_len = self.rows[cursor.cy - 1].len();
            let tail = self.rows[cursor.cy].chars().to_vec();
            self.row_append(cursor.cy - 1, &tail);
            self.delete_row(cursor.cy);
            cursor.cy -= 1;
            cursor.cx = prev_len;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_with(lines: &[&[u8]]) -> TextBuffer {
        let mut buffer = TextBuffer::new();
        for (i, line) in lines.iter().enumerate() {
            buffer.insert_row(i, line.to_vec());
        }
        buffer
    }

    fn contents(buffer: &TextBuffer) -> Vec<Vec<u8>> {
        buffer.rows().iter().map(|r| r.chars().to_vec()).collect()
    }

    #[test]
    fn insert_and_delete_rows_bump_dirty() {
        let mut buffer = TextBuffer::new();
        buffer.insert_row(0, b"one".to_vec());
        buffer.insert_row(1, b"two".to_vec());
        assert_eq!(buffer.dirty(), 2);

        buffer.delete_row(0);
        assert_eq!(buffer.num_rows(), 1);
        assert_eq!(buffer.dirty(), 3);

        // Out of range is a no-op, dirty included.
        buffer.delete_row(5);
        assert_eq!(buffer.dirty(), 3);
    }

    #[test]
    fn from_lines_is_clean() {
        let buffer = TextBuffer::from_lines(
            PathBuf::from("f.txt"),
            vec![b"abc".to_vec(), b"de".to_vec()],
        );
        assert_eq!(buffer.num_rows(), 2);
        assert!(!buffer.is_dirty());
        assert_eq!(buffer.filename(), Some(Path::new("f.txt")));
    }

    #[test]
    fn insert_then_delete_is_identity_on_row_content() {
        let mut buffer = buffer_with(&[b"hello"]);
        let original = buffer.row(0).unwrap().chars().to_vec();

        buffer.row_insert_char(0, 2, b'X');
        assert_eq!(buffer.row(0).unwrap().chars(), b"heXllo");
        buffer.row_delete_char(0, 2);
        assert_eq!(buffer.row(0).unwrap().chars(), original.as_slice());
        // Both edits counted.
        assert!(buffer.dirty() >= 3);
    }

    #[test]
    fn insert_char_on_virtual_row_creates_it() {
        let mut buffer = TextBuffer::new();
        let mut cursor = Cursor::default();
        buffer.insert_char(&mut cursor, b'a');
        assert_eq!(buffer.num_rows(), 1);
        assert_eq!(buffer.row(0).unwrap().chars(), b"a");
        assert_eq!(cursor, Cursor { cx: 1, cy: 0 });
    }

    #[test]
    fn newline_at_line_end_inserts_empty_row_below() {
        // Enter at (3,0) on ["abc","de"]: "abc" splits into "abc" and "".
        let mut buffer = buffer_with(&[b"abc", b"de"]);
        let mut cursor = Cursor { cx: 3, cy: 0 };
        buffer.insert_newline(&mut cursor);
        assert_eq!(contents(&buffer), vec![b"abc".to_vec(), b"".to_vec(), b"de".to_vec()]);
        assert_eq!(cursor, Cursor { cx: 0, cy: 1 });
    }

    #[test]
    fn newline_at_column_zero_inserts_empty_row_above() {
        let mut buffer = buffer_with(&[b"abc"]);
        let mut cursor = Cursor { cx: 0, cy: 0 };
        buffer.insert_newline(&mut cursor);
        assert_eq!(contents(&buffer), vec![b"".to_vec(), b"abc".to_vec()]);
        assert_eq!(cursor, Cursor { cx: 0, cy: 1 });
    }

    #[test]
    fn split_then_merge_restores_the_row() {
        let mut buffer = buffer_with(&[b"hello world"]);
        let mut cursor = Cursor { cx: 5, cy: 0 };

        buffer.insert_newline(&mut cursor);
        assert_eq!(contents(&buffer), vec![b"hello".to_vec(), b" world".to_vec()]);
        assert_eq!(cursor, Cursor { cx: 0, cy: 1 });

        buffer.delete_char(&mut cursor);
        assert_eq!(contents(&buffer), vec![b"hello world".to_vec()]);
        assert_eq!(cursor, Cursor { cx: 5, cy: 0 });
    }

    #[test]
    fn delete_char_is_a_no_op_at_buffer_start_and_past_end() {
        let mut buffer = buffer_with(&[b"ab"]);
        let mut cursor = Cursor { cx: 0, cy: 0 };
        buffer.delete_char(&mut cursor);
        assert_eq!(contents(&buffer), vec![b"ab".to_vec()]);

        // Virtual past-end row with no content below it.
        let mut empty = TextBuffer::new();
        let mut cursor = Cursor { cx: 0, cy: 0 };
        empty.delete_char(&mut cursor);
        assert_eq!(empty.num_rows(), 0);
    }

    #[test]
    fn delete_char_removes_byte_before_cursor() {
        let mut buffer = buffer_with(&[b"abc"]);
        let mut cursor = Cursor { cx: 2, cy: 0 };
        buffer.delete_char(&mut cursor);
        assert_eq!(contents(&buffer), vec![b"ac".to_vec()]);
        assert_eq!(cursor, Cursor { cx: 1, cy: 0 });
    }

    #[test]
    fn serialize_appends_newline_after_every_row() {
        let buffer = buffer_with(&[b"abc", b"", b"de"]);
        assert_eq!(buffer.serialize(), b"abc\n\nde\n");
    }

    #[test]
    fn serialize_then_reload_round_trips() {
        let buffer = buffer_with(&[b"one", b"", b"two\ttab", b"three"]);
        let bytes = buffer.serialize();

        let lines: Vec<Vec<u8>> = bytes
            .split(|&b| b == b'\n')
            .map(<[u8]>::to_vec)
            .collect();
        // A trailing newline yields one empty trailing split; drop it.
        let lines = &lines[..lines.len() - 1];

        let reloaded = TextBuffer::from_lines(PathBuf::from("x"), lines.to_vec());
        assert_eq!(contents(&reloaded), contents(&buffer));
    }
}
