//! Backward block reader for log tails
//!
//! Run logs can be arbitrarily large while everything of interest sits in
//! the last few dozen lines. [`ReverseLineReader`] reads from the end of the
//! file in fixed-size blocks, prepending each block to an accumulated
//! buffer.
//!
//! ## Termination
//!
//! Reading stops as soon as either
//! 1. the buffer holds at least `max_lines` complete lines, or
//! 2. the start of the file has been read.
//!
//! The bytes before the first newline of the buffer are only a complete line
//! when the start of the file was reached, so they never count towards
//! `max_lines`. The result keeps only the last `max_lines` lines; anything
//! extra pulled in by the final block is discarded.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::trace;

/// Default block size for backward reads
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Last lines of a file, as returned by [`ReverseLineReader::tail`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TailWindow {
    lines: Vec<String>,
    reached_start: bool,
    bytes_read: u64,
}

impl TailWindow {
    /// Lines in file order
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines joined with `\n`
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Whether the whole file was read
    pub fn reached_start(&self) -> bool {
        self.reached_start
    }

    /// Bytes pulled from disk to build the window
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Take ownership of the lines
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// Reads a file backward in fixed-size blocks
#[derive(Debug)]
pub struct ReverseLineReader {
    path: PathBuf,
    reader: BufReader<File>,
    file_size: u64,
    block_size: usize,
}

impl ReverseLineReader {
    /// Open a file for backward reading
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let file_size = file.metadata()?.len();
        Ok(Self {
            path,
            reader: BufReader::new(file),
            file_size,
            block_size: DEFAULT_BLOCK_SIZE,
        })
    }

    /// Override the block size (minimum 1 byte)
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    /// Size of the file when it was opened
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Read the last `max_lines` lines
    pub fn tail(&mut self, max_lines: usize) -> io::Result<TailWindow> {
        if max_lines == 0 || self.file_size == 0 {
            return Ok(TailWindow {
                reached_start: self.file_size == 0,
                ..TailWindow::default()
            });
        }

        let mut buffer: Vec<u8> = Vec::new();
        let mut position = self.file_size;

        while position > 0 {
            let start = position.saturating_sub(self.block_size as u64);
            let len = (position - start) as usize;

            let mut block = vec![0u8; len];
            self.reader.seek(SeekFrom::Start(start))?;
            self.reader.read_exact(&mut block)?;
            block.extend_from_slice(&buffer);
            buffer = block;
            position = start;

            if position > 0 && complete_lines(&buffer) >= max_lines {
                break;
            }
        }

        let reached_start = position == 0;
        let bytes_read = self.file_size - position;
        let text = String::from_utf8_lossy(&buffer);
        let all: Vec<&str> = text.lines().collect();
        let skip = all.len().saturating_sub(max_lines);
        let lines = all[skip..].iter().map(|s| s.to_string()).collect();

        trace!(
            target: "simstat::scan",
            path = %self.path.display(),
            bytes_read,
            reached_start,
            "Read log tail"
        );

        Ok(TailWindow {
            lines,
            reached_start,
            bytes_read,
        })
    }
}

/// Lines in `buffer` that are known to be complete when the buffer does
/// not start at the beginning of the file
fn complete_lines(buffer: &[u8]) -> usize {
    let newlines = buffer.iter().filter(|&&b| b == b'\n').count();
    let unterminated_tail = usize::from(buffer.last().is_some_and(|&b| b != b'\n'));
    // The segment before the first newline may be cut by the block boundary
    (newlines + unterminated_tail).saturating_sub(1)
}
