#![forbid(unsafe_code)]

//! File load/save collaborator.
//!
//! The engine only ever sees newline-stripped lines on the way in and one
//! serialized byte buffer on the way out; this module is the thin boundary
//! that moves them to and from disk.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use tracing::info;

/// Read a file as newline-stripped lines of raw bytes.
///
/// Both `\n` and `\r\n` endings are stripped; the bytes themselves are not
/// validated as UTF-8.
pub fn load_lines(path: &Path) -> io::Result<Vec<Vec<u8>>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut lines = Vec::new();

    loop {
        let mut line = Vec::new();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        lines.push(line);
    }

    info!(file = %path.display(), lines = lines.len(), "read file");
    Ok(lines)
}

/// Overwrite `path` with `bytes`: truncate to the new length, then write.
///
/// Returns the byte count on success. A failure after truncation is an
/// ordinary I/O error for the caller to report, not a crash.
pub fn save(path: &Path, bytes: &[u8]) -> io::Result<usize> {
    let mut file = OpenOptions::new().write(true).create(true).open(path)?;
    file.set_len(bytes.len() as u64)?;
    file.write_all(bytes)?;

    info!(file = %path.display(), bytes = bytes.len(), "wrote file");
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_strips_newlines_and_carriage_returns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.txt");
        std::fs::write(&path, b"unix\r\nwindows\r\nlast").unwrap();

        let lines = load_lines(&path).unwrap();
        assert_eq!(lines, vec![b"unix".to_vec(), b"windows".to_vec(), b"last".to_vec()]);
    }

    #[test]
    fn load_keeps_empty_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gaps.txt");
        std::fs::write(&path, b"a\n\nb\n").unwrap();

        let lines = load_lines(&path).unwrap();
        assert_eq!(lines, vec![b"a".to_vec(), b"".to_vec(), b"b".to_vec()]);
    }

    #[test]
    fn load_of_missing_file_fails() {
        assert!(load_lines(Path::new("/nonexistent/nope.txt")).is_err());
    }

    #[test]
    fn save_truncates_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, b"something much longer than the new content").unwrap();

        let written = save(&path, b"short\n").unwrap();
        assert_eq!(written, 6);
        assert_eq!(std::fs::read(&path).unwrap(), b"short\n");
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.txt");

        save(&path, b"one\ntwo\t tab\n\n").unwrap();
        let lines = load_lines(&path).unwrap();
        assert_eq!(
            lines,
            vec![b"one".to_vec(), b"two\t tab".to_vec(), b"".to_vec()]
        );
    }
}
