#![forbid(unsafe_code)]

//! The editor controller.
//!
//! [`Editor`] owns the session state (buffer, cursor, viewport, status
//! message) and dispatches decoded keys to it. It is a state machine over
//! two modes (Normal and a modal line-input Prompt) plus a quit-confirmation
//! countdown, and it never touches the terminal or the filesystem itself:
//! the caller renders the frames it composes, and performs the save I/O it
//! requests via [`Transition::Save`], feeding the result back through
//! [`Editor::finish_save`].

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::buffer::TextBuffer;
use crate::event::Key;
use crate::row::Row;
use crate::screen::{self, Frame};
use crate::viewport::{Cursor, Viewport};

/// Quit-key presses required to discard unsaved changes.
pub const QUIT_CONFIRM_PRESSES: u8 = 3;

/// Lines reserved below the content area (status bar + message bar).
const RESERVED_ROWS: usize = 2;

/// Status messages older than this are suppressed from the message bar.
const MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// What the caller must do after a key has been dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Keep looping: render, read the next key.
    Continue,
    /// Terminate the session.
    Quit,
    /// Serialize the buffer and write it to its filename, then report the
    /// outcome through [`Editor::finish_save`]. The filename is always set
    /// when this is returned.
    Save,
}

#[derive(Debug)]
enum Mode {
    Normal,
    Prompt(Prompt),
}

/// Modal single-line text capture. The label and the captured input are
/// plain data end to end; neither is ever interpreted as a format string.
/// Input is collected byte by byte, like the buffer itself, so multi-byte
/// filenames survive the prompt.
#[derive(Debug)]
struct Prompt {
    label: &'static str,
    input: Vec<u8>,
}

impl Prompt {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            input: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct StatusMessage {
    text: String,
    set_at: Instant,
}

/// Top-level session state.
#[derive(Debug)]
pub struct Editor {
    buffer: TextBuffer,
    cursor: Cursor,
    viewport: Viewport,
    mode: Mode,
    status: Option<StatusMessage>,
    quit_presses: u8,
}

impl Editor {
    /// A fresh session over an empty buffer. `rows`/`cols` are the full
    /// terminal dimensions; two lines are reserved for status and message.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            buffer: TextBuffer::new(),
            cursor: Cursor::default(),
            viewport: Viewport::new(rows.saturating_sub(RESERVED_ROWS), cols),
            mode: Mode::Normal,
            status: None,
            quit_presses: QUIT_CONFIRM_PRESSES,
        }
    }

    /// Replace the buffer with file contents, resetting the cursor.
    pub fn load(&mut self, filename: PathBuf, lines: Vec<Vec<u8>>) {
        info!(file = %filename.display(), lines = lines.len(), "loaded buffer");
        self.buffer = TextBuffer::from_lines(filename, lines);
        self.cursor = Cursor::default();
    }

    #[must_use]
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Set the transient status message (shown until it goes stale).
    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            set_at: Instant::now(),
        });
    }

    /// Compose the next frame as one append buffer, ready for a single
    /// write. Scroll offsets are recomputed here, every frame.
    #[must_use]
    pub fn render_frame(&mut self) -> Vec<u8> {
        let rx = self.viewport.scroll(self.cursor, &self.buffer);
        let message = self.message_line();
        screen::compose(&Frame {
            buffer: &self.buffer,
            viewport: &self.viewport,
            cursor: self.cursor,
            rx,
            message: message.as_deref(),
        })
    }

    /// Dispatch one decoded key.
    pub fn process_key(&mut self, key: Key) -> Transition {
        match self.mode {
            Mode::Normal => self.process_normal_key(key),
            Mode::Prompt(_) => self.process_prompt_key(key),
        }
    }

    /// Feed back the result of the save I/O requested by
    /// [`Transition::Save`].
    pub fn finish_save(&mut self, result: std::io::Result<usize>) {
        match result {
            Ok(bytes) => {
                self.buffer.mark_saved();
                info!(bytes, "buffer saved");
                self.set_status(format!("{bytes} bytes written to disk"));
            }
            Err(err) => {
                warn!(error = %err, "save failed");
                self.set_status(format!("Can't save! I/O error: {err}"));
            }
        }
    }

    fn process_normal_key(&mut self, key: Key) -> Transition {
        // Any key other than the quit chord restarts the countdown.
        if key != Key::Ctrl(b'q') {
            self.quit_presses = QUIT_CONFIRM_PRESSES;
        }

        match key {
            Key::Ctrl(b'q') => {
                if self.buffer.is_dirty() {
                    self.quit_presses -= 1;
                    if self.quit_presses == 0 {
                        return Transition::Quit;
                    }
                    self.set_status(format!(
                        "WARNING! File has unsaved changes. \
                         Press Ctrl-Q {} more time{} to quit.",
                        self.quit_presses,
                        if self.quit_presses == 1 { "" } else { "s" },
                    ));
                    return Transition::Continue;
                }
                Transition::Quit
            }
            Key::Ctrl(b's') => {
                if self.buffer.filename().is_none() {
                    self.mode = Mode::Prompt(Prompt::new("Save as: "));
                    return Transition::Continue;
                }
                Transition::Save
            }
            Key::Enter => {
                self.buffer.insert_newline(&mut self.cursor);
                Transition::Continue
            }
            Key::Backspace | Key::Ctrl(b'h') => {
                self.buffer.delete_char(&mut self.cursor);
                Transition::Continue
            }
            Key::Delete => {
                // Forward delete = one step right, then a backward delete.
                self.move_cursor(Key::Right);
                self.buffer.delete_char(&mut self.cursor);
                Transition::Continue
            }
            Key::Up | Key::Down | Key::Left | Key::Right => {
                self.move_cursor(key);
                Transition::Continue
            }
            Key::Home => {
                self.cursor.cx = 0;
                Transition::Continue
            }
            Key::End => {
                self.cursor.cx = self.current_row_len();
                Transition::Continue
            }
            Key::PageUp | Key::PageDown => {
                self.page_move(key);
                Transition::Continue
            }
            // Ctrl-L traditionally forces a repaint; the next loop
            // iteration redraws everything anyway. A stray Escape is inert.
            Key::Escape | Key::Ctrl(_) => Transition::Continue,
            Key::Char(byte) => {
                self.buffer.insert_char(&mut self.cursor, byte);
                Transition::Continue
            }
        }
    }

    fn process_prompt_key(&mut self, key: Key) -> Transition {
        let Mode::Prompt(ref mut prompt) = self.mode else {
            return Transition::Continue;
        };

        match key {
            Key::Escape => {
                self.mode = Mode::Normal;
                self.set_status("Save aborted");
            }
            Key::Enter => {
                if !prompt.input.is_empty() {
                    let input = std::mem::take(&mut prompt.input);
                    let filename = PathBuf::from(String::from_utf8_lossy(&input).into_owned());
                    self.mode = Mode::Normal;
                    self.buffer.set_filename(filename);
                    return Transition::Save;
                }
            }
            Key::Backspace | Key::Delete | Key::Ctrl(b'h') => {
                prompt.input.pop();
            }
            Key::Char(byte) if !byte.is_ascii_control() => {
                prompt.input.push(byte);
            }
            _ => {}
        }
        Transition::Continue
    }

    fn current_row_len(&self) -> usize {
        self.buffer.row(self.cursor.cy).map_or(0, Row::len)
    }

    fn move_cursor(&mut self, key: Key) {
        match key {
            Key::Left => {
                if self.cursor.cx > 0 {
                    self.cursor.cx -= 1;
                } else if self.cursor.cy > 0 {
                    // Wrap to the end of the previous row.
                    self.cursor.cy -= 1;
                    self.cursor.cx = self.current_row_len();
                }
            }
            Key::Right => {
                if let Some(row) = self.buffer.row(self.cursor.cy) {
                    if self.cursor.cx < row.len() {
                        self.cursor.cx += 1;
                    } else {
                        // Wrap to the start of the next row.
                        self.cursor.cy += 1;
                        self.cursor.cx = 0;
                    }
                }
            }
            Key::Up => {
                self.cursor.cy = self.cursor.cy.saturating_sub(1);
            }
            Key::Down => {
                if self.cursor.cy < self.buffer.num_rows() {
                    self.cursor.cy += 1;
                }
            }
            _ => {}
        }

        // The destination row may be shorter than where we came from.
        let len = self.current_row_len();
        if self.cursor.cx > len {
            self.cursor.cx = len;
        }
    }

    fn page_move(&mut self, key: Key) {
        // Snap to the viewport edge first, then step one screenful.
        if key == Key::PageUp {
            self.cursor.cy = self.viewport.rowoff;
        } else {
            self.cursor.cy =
                (self.viewport.rowoff + self.viewport.screenrows - 1).min(self.buffer.num_rows());
        }

        let step = if key == Key::PageUp { Key::Up } else { Key::Down };
        for _ in 0..self.viewport.screenrows {
            self.move_cursor(step);
        }
    }

    fn message_line(&self) -> Option<String> {
        match &self.mode {
            Mode::Prompt(prompt) => Some(format!(
                "{}{} (ESC to cancel)",
                prompt.label,
                String::from_utf8_lossy(&prompt.input),
            )),
            Mode::Normal => self
                .status
                .as_ref()
                .filter(|m| m.set_at.elapsed() < MESSAGE_TIMEOUT)
                .map(|m| m.text.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn editor_with(lines: &[&[u8]]) -> Editor {
        let mut editor = Editor::new(12, 80);
        editor.load(
            PathBuf::from("test.txt"),
            lines.iter().map(|l| l.to_vec()).collect(),
        );
        editor
    }

    fn contents(editor: &Editor) -> Vec<Vec<u8>> {
        editor
            .buffer()
            .rows()
            .iter()
            .map(|r| r.chars().to_vec())
            .collect()
    }

    fn type_str(editor: &mut Editor, text: &str) {
        for byte in text.bytes() {
            assert_eq!(editor.process_key(Key::Char(byte)), Transition::Continue);
        }
    }

    #[test]
    fn typing_inserts_at_the_cursor() {
        let mut editor = Editor::new(12, 80);
        type_str(&mut editor, "hi");
        assert_eq!(contents(&editor), vec![b"hi".to_vec()]);
        assert_eq!(editor.cursor(), Cursor { cx: 2, cy: 0 });
        assert!(editor.buffer().is_dirty());
    }

    #[test]
    fn enter_at_end_of_line_splits_off_an_empty_row() {
        let mut editor = editor_with(&[b"abc", b"de"]);
        editor.process_key(Key::End);
        assert_eq!(editor.cursor(), Cursor { cx: 3, cy: 0 });

        editor.process_key(Key::Enter);
        assert_eq!(
            contents(&editor),
            vec![b"abc".to_vec(), b"".to_vec(), b"de".to_vec()]
        );
        assert_eq!(editor.cursor(), Cursor { cx: 0, cy: 1 });
    }

    #[test]
    fn clean_quit_on_first_press() {
        let mut editor = editor_with(&[b"abc"]);
        assert_eq!(editor.process_key(Key::Ctrl(b'q')), Transition::Quit);
    }

    #[test]
    fn dirty_quit_requires_exactly_three_presses() {
        let mut editor = editor_with(&[b"abc"]);
        type_str(&mut editor, "x");

        assert_eq!(editor.process_key(Key::Ctrl(b'q')), Transition::Continue);
        assert_eq!(editor.process_key(Key::Ctrl(b'q')), Transition::Continue);
        assert_eq!(editor.process_key(Key::Ctrl(b'q')), Transition::Quit);
    }

    #[test]
    fn any_other_key_resets_the_quit_countdown() {
        let mut editor = editor_with(&[b"abc"]);
        type_str(&mut editor, "x");

        assert_eq!(editor.process_key(Key::Ctrl(b'q')), Transition::Continue);
        assert_eq!(editor.process_key(Key::Ctrl(b'q')), Transition::Continue);
        editor.process_key(Key::Right);

        // Countdown starts over: three more presses needed.
        assert_eq!(editor.process_key(Key::Ctrl(b'q')), Transition::Continue);
        assert_eq!(editor.process_key(Key::Ctrl(b'q')), Transition::Continue);
        assert_eq!(editor.process_key(Key::Ctrl(b'q')), Transition::Quit);
    }

    #[test]
    fn horizontal_movement_wraps_across_rows() {
        let mut editor = editor_with(&[b"ab", b"cd"]);

        editor.process_key(Key::End);
        editor.process_key(Key::Right);
        assert_eq!(editor.cursor(), Cursor { cx: 0, cy: 1 });

        editor.process_key(Key::Left);
        assert_eq!(editor.cursor(), Cursor { cx: 2, cy: 0 });
    }

    #[test]
    fn vertical_movement_clamps_to_the_destination_row() {
        let mut editor = editor_with(&[b"long line", b"x"]);
        editor.process_key(Key::End);
        assert_eq!(editor.cursor().cx, 9);

        editor.process_key(Key::Down);
        assert_eq!(editor.cursor(), Cursor { cx: 1, cy: 1 });
    }

    #[test]
    fn delete_key_converts_to_backward_delete() {
        let mut editor = editor_with(&[b"abc"]);
        editor.process_key(Key::Delete);
        assert_eq!(contents(&editor), vec![b"bc".to_vec()]);
        assert_eq!(editor.cursor(), Cursor { cx: 0, cy: 0 });
    }

    #[test]
    fn backspace_at_column_zero_merges_rows() {
        let mut editor = editor_with(&[b"ab", b"cd"]);
        editor.process_key(Key::Down);
        editor.process_key(Key::Backspace);
        assert_eq!(contents(&editor), vec![b"abcd".to_vec()]);
        assert_eq!(editor.cursor(), Cursor { cx: 2, cy: 0 });
    }

    #[test]
    fn page_down_snaps_then_steps_a_screenful() {
        let lines: Vec<&[u8]> = std::iter::repeat_n(b"line".as_slice(), 50).collect();
        let mut editor = editor_with(&lines);
        // Content area is 12 - 2 reserved = 10 rows.
        editor.process_key(Key::PageDown);
        assert_eq!(editor.cursor().cy, 19);

        editor.process_key(Key::PageUp);
        // render_frame keeps rowoff in sync in the real loop; without it
        // rowoff is still 0, so PageUp snaps to the top and steps stop there.
        assert_eq!(editor.cursor().cy, 0);
    }

    #[test]
    fn save_with_filename_requests_io_and_clears_dirty_on_success() {
        let mut editor = editor_with(&[b"abc"]);
        type_str(&mut editor, "x");
        assert!(editor.buffer().is_dirty());

        assert_eq!(editor.process_key(Key::Ctrl(b's')), Transition::Save);
        let bytes = editor.buffer().serialize();
        editor.finish_save(Ok(bytes.len()));
        assert!(!editor.buffer().is_dirty());
    }

    #[test]
    fn failed_save_keeps_the_buffer_dirty() {
        let mut editor = editor_with(&[b"abc"]);
        type_str(&mut editor, "x");

        assert_eq!(editor.process_key(Key::Ctrl(b's')), Transition::Save);
        editor.finish_save(Err(std::io::Error::other("disk full")));
        assert!(editor.buffer().is_dirty());
    }

    #[test]
    fn save_without_filename_prompts_and_confirm_sets_it() {
        let mut editor = Editor::new(12, 80);
        type_str(&mut editor, "hello");

        assert_eq!(editor.process_key(Key::Ctrl(b's')), Transition::Continue);
        type_str(&mut editor, "out.txt");
        assert_eq!(editor.process_key(Key::Enter), Transition::Save);
        assert_eq!(editor.buffer().filename(), Some(Path::new("out.txt")));
    }

    #[test]
    fn prompt_backspace_edits_and_escape_cancels() {
        let mut editor = Editor::new(12, 80);
        type_str(&mut editor, "hello");

        editor.process_key(Key::Ctrl(b's'));
        type_str(&mut editor, "ab");
        editor.process_key(Key::Backspace);
        type_str(&mut editor, "c");

        // Prompt text is reflected in the message line.
        let frame = editor.render_frame();
        let needle = b"Save as: ac (ESC to cancel)";
        assert!(frame.windows(needle.len()).any(|w| w == needle));

        editor.process_key(Key::Escape);
        assert_eq!(editor.buffer().filename(), None);

        // Keys go back to the buffer after cancelling.
        type_str(&mut editor, "!");
        assert_eq!(contents(&editor), vec![b"hello!".to_vec()]);
    }

    #[test]
    fn prompt_enter_on_empty_input_does_nothing() {
        let mut editor = Editor::new(12, 80);
        type_str(&mut editor, "hi");
        editor.process_key(Key::Ctrl(b's'));
        assert_eq!(editor.process_key(Key::Enter), Transition::Continue);
        assert_eq!(editor.buffer().filename(), None);

        // Still in the prompt: typing extends the pending filename.
        type_str(&mut editor, "f");
        assert_eq!(editor.process_key(Key::Enter), Transition::Save);
    }

    #[test]
    fn prompt_keeps_multibyte_filename_bytes() {
        let mut editor = Editor::new(12, 80);
        type_str(&mut editor, "hi");
        editor.process_key(Key::Ctrl(b's'));

        // "é" arrives as two bytes; both must survive the prompt.
        type_str(&mut editor, "h\u{e9}llo.txt");
        assert_eq!(editor.process_key(Key::Enter), Transition::Save);
        assert_eq!(editor.buffer().filename(), Some(Path::new("h\u{e9}llo.txt")));
    }

    #[test]
    fn tiny_terminal_still_renders_and_pages() {
        // Two terminal rows leave nothing after the reserved lines; the
        // viewport floors the content area at one cell.
        let mut editor = Editor::new(2, 80);
        editor.load(
            PathBuf::from("t.txt"),
            std::iter::repeat_n(b"line".to_vec(), 10).collect(),
        );

        for _ in 0..5 {
            editor.process_key(Key::Down);
            assert!(!editor.render_frame().is_empty());
        }
        editor.process_key(Key::PageDown);
        assert!(!editor.render_frame().is_empty());
        editor.process_key(Key::PageUp);
        assert!(!editor.render_frame().is_empty());
    }

    #[test]
    fn typing_while_dirty_countdown_shows_in_frame() {
        let mut editor = editor_with(&[b"abc"]);
        type_str(&mut editor, "x");
        editor.process_key(Key::Ctrl(b'q'));

        let frame = editor.render_frame();
        let needle = b"Press Ctrl-Q 2 more times to quit.";
        assert!(frame.windows(needle.len()).any(|w| w == needle));
    }
}
