#![forbid(unsafe_code)]
//! ked: a small terminal text editor.
//!
//! The main loop is strict alternation: compose one frame and write it in a
//! single call, block for one decoded key, dispatch it, repeat. Everything
//! stateful lives in [`ked_core::editor::Editor`]; this binary only wires
//! the engine to the terminal session and the filesystem.

mod logging;
mod storage;

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ked_core::editor::{Editor, Transition};
use ked_core::input;
use ked_tty::{RawModeConfig, TtySession};

const HELP_BANNER: &str = "HELP: Ctrl-S = save | Ctrl-Q = quit";

fn main() -> ExitCode {
    logging::init();

    let path = env::args_os().nth(1).map(PathBuf::from);
    match run(path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // The session guard has already restored the terminal.
            eprintln!("ked: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(path: Option<PathBuf>) -> io::Result<()> {
    let mut session = TtySession::open(&RawModeConfig::default())?;
    let (rows, cols) = session.window_size()?;

    let mut editor = Editor::new(rows as usize, cols as usize);
    if let Some(path) = path {
        let lines = storage::load_lines(&path)?;
        editor.load(path, lines);
    }
    editor.set_status(HELP_BANNER);

    loop {
        let frame = editor.render_frame();
        session.write_frame(&frame)?;

        let key = input::read_key(&mut session)?;
        match editor.process_key(key) {
            Transition::Continue => {}
            Transition::Quit => break,
            Transition::Save => {
                // The controller guarantees a filename before requesting I/O.
                let Some(path) = editor.buffer().filename().map(Path::to_path_buf) else {
                    continue;
                };
                let bytes = editor.buffer().serialize();
                let result = storage::save(&path, &bytes);
                editor.finish_save(result);
            }
        }
    }

    Ok(())
}
