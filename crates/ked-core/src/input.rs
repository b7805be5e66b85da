#![forbid(unsafe_code)]

//! Escape-sequence decoder.
//!
//! Turns raw terminal bytes into [`Key`] events. The backend supplies bytes
//! through [`ByteSource`], whose reads are bounded by the terminal's ~100ms
//! read timeout (`VMIN = 0`); a timed-out read yields `None`.
//!
//! # Disambiguation policy
//!
//! A lone escape byte is indistinguishable from the start of a sequence
//! except by time: after `ESC`, each follow-up byte gets exactly one read
//! attempt, and a timeout at any point decodes as a bare [`Key::Escape`].
//! The match order is fixed because real terminals emit either encoding for
//! the same physical key: the digit-tilde form is tried before the letter
//! form, and the `CSI` (`ESC [`) form before the `SS3` (`ESC O`) form.

use std::io;

use crate::event::Key;

/// The escape byte that introduces every multi-byte sequence.
pub const ESC: u8 = 0x1b;

/// A source of raw input bytes with a bounded read.
///
/// `Ok(None)` means the read timed out with nothing available; `Err` means
/// the device itself failed and the session cannot continue.
pub trait ByteSource {
    fn next_byte(&mut self) -> io::Result<Option<u8>>;
}

/// Block until one logical key is available and decode it.
///
/// Timeouts while waiting for the first byte loop transparently; timeouts
/// in the middle of an escape sequence resolve to [`Key::Escape`].
pub fn read_key(src: &mut impl ByteSource) -> io::Result<Key> {
    let byte = loop {
        if let Some(byte) = src.next_byte()? {
            break byte;
        }
    };

    if byte != ESC {
        return Ok(Key::from_byte(byte));
    }

    // Two follow-up bytes decide between a lone Escape and a sequence.
    let Some(first) = src.next_byte()? else {
        return Ok(Key::Escape);
    };
    let Some(second) = src.next_byte()? else {
        return Ok(Key::Escape);
    };

    let key = match (first, second) {
        (b'[', b'0'..=b'9') => {
            // ESC [ <digit> ~ : the trailing tilde may need one more read.
            if src.next_byte()? != Some(b'~') {
                return Ok(Key::Escape);
            }
            match second {
                b'1' | b'7' => Key::Home,
                b'3' => Key::Delete,
                b'4' | b'8' => Key::End,
                b'5' => Key::PageUp,
                b'6' => Key::PageDown,
                _ => Key::Escape,
            }
        }
        (b'[', b'A') => Key::Up,
        (b'[', b'B') => Key::Down,
        (b'[', b'C') => Key::Right,
        (b'[', b'D') => Key::Left,
        (b'[', b'H') => Key::Home,
        (b'[', b'F') => Key::End,
        (b'O', b'H') => Key::Home,
        (b'O', b'F') => Key::End,
        _ => Key::Escape,
    };
    Ok(key)
}
