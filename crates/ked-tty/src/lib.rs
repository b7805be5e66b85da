#![forbid(unsafe_code)]
//! Native Unix terminal backend for ked.
//!
//! This crate owns everything that touches the terminal device: entering
//! and restoring raw mode, querying the window size, reading input bytes
//! under the raw-mode read timeout, and writing composed frames in a single
//! call.
//!
//! # Lifecycle guarantees
//!
//! [`TtySession`] is an RAII guard: the original termios attributes are
//! captured on open and restored on drop, so the terminal comes back on
//! every exit path: normal return, `?`, or panic unwind. The drop also
//! clears the screen and re-shows the cursor before the attribute restore.
//!
//! # Read timeout
//!
//! Raw mode is configured with `VMIN = 0` and `VTIME` of one decisecond:
//! a read returns empty after ~100ms rather than blocking indefinitely.
//! That timeout is what lets the key decoder tell a lone Escape keypress
//! from the start of an escape sequence.

use std::fs::File;
use std::io::{self, Read, Write};

use nix::sys::termios::{
    self, ControlFlags, InputFlags, LocalFlags, OutputFlags, SetArg, SpecialCharacterIndices,
    Termios,
};
use tracing::debug;

use ked_core::input::ByteSource;
use ked_core::screen::{CLEAR_SCREEN, CURSOR_HOME, CURSOR_SHOW};

// ── Raw Mode Configuration ───────────────────────────────────────────────

/// The terminal behaviors raw mode suppresses, spelled out one by one.
///
/// Each field disables one piece of cooked-mode processing. The default
/// turns all of them off, which is what an editor needs; tests or special
/// sessions can keep individual behaviors alive.
#[derive(Debug, Clone, Copy)]
pub struct RawModeConfig {
    /// Stop the terminal from echoing typed characters.
    pub suppress_echo: bool,
    /// Deliver bytes as they arrive instead of line by line.
    pub suppress_line_buffering: bool,
    /// Keep Ctrl-C / Ctrl-Z from raising SIGINT / SIGTSTP.
    pub suppress_signals: bool,
    /// Disable the Ctrl-V literal-next extension.
    pub suppress_extended_input: bool,
    /// Disable Ctrl-S / Ctrl-Q software flow control.
    pub suppress_flow_control: bool,
    /// Stop translating carriage returns to newlines on input.
    pub suppress_cr_translation: bool,
    /// Disable output post-processing (`\n` to `\r\n` expansion).
    pub suppress_output_processing: bool,
    /// Disable parity checking, high-bit stripping, and break-to-interrupt.
    pub suppress_parity_and_strip: bool,
    /// `VTIME` in deciseconds; `VMIN` is always zero, so reads return empty
    /// after this long rather than blocking.
    pub read_timeout_decisecs: u8,
}

impl Default for RawModeConfig {
    fn default() -> Self {
        Self {
            suppress_echo: true,
            suppress_line_buffering: true,
            suppress_signals: true,
            suppress_extended_input: true,
            suppress_flow_control: true,
            suppress_cr_translation: true,
            suppress_output_processing: true,
            suppress_parity_and_strip: true,
            read_timeout_decisecs: 1,
        }
    }
}

impl RawModeConfig {
    fn apply(&self, raw: &mut Termios) {
        if self.suppress_echo {
            raw.local_flags.remove(LocalFlags::ECHO);
        }
        if self.suppress_line_buffering {
            raw.local_flags.remove(LocalFlags::ICANON);
        }
        if self.suppress_signals {
            raw.local_flags.remove(LocalFlags::ISIG);
        }
        if self.suppress_extended_input {
            raw.local_flags.remove(LocalFlags::IEXTEN);
        }
        if self.suppress_flow_control {
            raw.input_flags.remove(InputFlags::IXON);
        }
        if self.suppress_cr_translation {
            raw.input_flags.remove(InputFlags::ICRNL);
        }
        if self.suppress_output_processing {
            raw.output_flags.remove(OutputFlags::OPOST);
        }
        if self.suppress_parity_and_strip {
            raw.input_flags
                .remove(InputFlags::BRKINT | InputFlags::INPCK | InputFlags::ISTRIP);
        }

        // 8-bit character frames and the bounded read.
        raw.control_flags.insert(ControlFlags::CS8);
        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 0;
        raw.control_chars[SpecialCharacterIndices::VTIME as usize] = self.read_timeout_decisecs;
    }
}

// ── Session ──────────────────────────────────────────────────────────────

/// RAII terminal session: raw mode on open, full restore on drop.
///
/// Input is read from `/dev/tty`; frames and control sequences are written
/// to stdout. A composed frame always goes out in one write so a partial
/// frame never reaches the screen.
pub struct TtySession {
    tty: File,
    original: Termios,
}

impl TtySession {
    /// Capture the current terminal attributes and enter raw mode.
    ///
    /// Attribute get/set failures are fatal to the caller; the error names
    /// the failing operation.
    pub fn open(config: &RawModeConfig) -> io::Result<Self> {
        let tty = File::open("/dev/tty")?;

        let original = termios::tcgetattr(&tty)
            .map_err(|err| io::Error::other(format!("tcgetattr: {err}")))?;

        let mut raw = original.clone();
        config.apply(&mut raw);
        termios::tcsetattr(&tty, SetArg::TCSAFLUSH, &raw)
            .map_err(|err| io::Error::other(format!("tcsetattr: {err}")))?;

        debug!("entered raw mode");
        Ok(Self { tty, original })
    }

    /// Content dimensions as `(rows, cols)`.
    ///
    /// Prefers the size ioctl; when that reports nothing useful, falls back
    /// to parking the cursor at the bottom-right corner and asking the
    /// terminal where it ended up.
    pub fn window_size(&mut self) -> io::Result<(u16, u16)> {
        if let Ok(ws) = rustix::termios::tcgetwinsize(&self.tty) {
            if ws.ws_row > 0 && ws.ws_col > 0 {
                return Ok((ws.ws_row, ws.ws_col));
            }
        }
        self.cursor_position_fallback()
    }

    fn cursor_position_fallback(&mut self) -> io::Result<(u16, u16)> {
        let mut out = io::stdout();
        // 999 exceeds any real terminal; the cursor stops at the edge.
        out.write_all(b"\x1b[999C\x1b[999B")?;
        out.write_all(b"\x1b[6n")?;
        out.flush()?;

        // Response: ESC [ rows ; cols R
        let mut report = Vec::with_capacity(16);
        while report.len() < 32 {
            let Some(byte) = self.next_byte()? else {
                break;
            };
            if byte == b'R' {
                break;
            }
            report.push(byte);
        }

        parse_cursor_report(&report)
            .ok_or_else(|| io::Error::other("window size: cursor position query failed"))
    }

    /// Write one composed frame to the terminal in a single call.
    pub fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(frame)?;
        out.flush()
    }
}

impl ByteSource for TtySession {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.tty.read(&mut byte) {
            // VTIME expired with nothing available.
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(err)
                if err.kind() == io::ErrorKind::WouldBlock
                    || err.kind() == io::ErrorKind::Interrupted =>
            {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

impl Drop for TtySession {
    fn drop(&mut self) {
        // Best-effort cleanup: leave a blank screen with a visible cursor,
        // flush, then restore the captured attributes last.
        let mut out = io::stdout();
        let _ = out.write_all(CLEAR_SCREEN);
        let _ = out.write_all(CURSOR_HOME);
        let _ = out.write_all(CURSOR_SHOW);
        let _ = out.flush();
        let _ = termios::tcsetattr(&self.tty, SetArg::TCSAFLUSH, &self.original);
        debug!("restored terminal attributes");
    }
}

/// Parse the body of a `CSI 6 n` cursor position report (`rows;cols`, with
/// the leading `ESC [` still attached and the trailing `R` stripped).
fn parse_cursor_report(report: &[u8]) -> Option<(u16, u16)> {
    let body = report.strip_prefix(b"\x1b[")?;
    let body = std::str::from_utf8(body).ok()?;
    let (rows, cols) = body.split_once(';')?;
    Some((rows.parse().ok()?, cols.parse().ok()?))
}
