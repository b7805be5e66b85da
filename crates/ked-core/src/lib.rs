#![forbid(unsafe_code)]
//! Engine for the ked text editor.
//!
//! This crate contains everything that does not touch the terminal device:
//! logical key events and the escape-sequence decoder, the row-based text
//! buffer with its raw/rendered dual representation, cursor-to-render-column
//! mapping and viewport scrolling, the single-frame screen compositor, and
//! the top-level editor state machine.
//!
//! Terminal I/O (raw mode, window size, the timeout-bounded byte reader and
//! the single-write frame sink) lives in `ked-tty`; file load/save and the
//! main loop live in the `ked` binary.
//!
//! # Design
//!
//! - All buffer content is byte-oriented: a [`row::Row`] owns its bytes and
//!   derives a tab-expanded rendered form from them. Multi-byte characters
//!   pass through untouched but are not given special width handling.
//! - One frame is always composed into a single growable buffer and handed
//!   to the backend as one write, so partial frames never reach the screen.
//! - The engine is single-threaded and synchronous: render, read one key,
//!   dispatch, repeat.

pub mod buffer;
pub mod editor;
pub mod event;
pub mod input;
pub mod row;
pub mod screen;
pub mod viewport;
