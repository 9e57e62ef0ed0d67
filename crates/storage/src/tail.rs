// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tail-from-end reading primitives shared by the event log and the live
//! stream.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

const BLOCK_SIZE: u64 = 4096;

/// Cap on bytes consumed per [`FileCursor::read_new`] call so one busy tick
/// cannot starve the connection.
const MAX_CHUNK_BYTES: usize = 1024 * 1024;

/// Read the last `n` lines of a file without loading it whole.
///
/// Walks backwards in fixed-size blocks until enough newlines are seen.
/// Returns lines in file order (oldest first). Invalid UTF-8 is replaced,
/// never an error.
pub fn tail_lines(path: &Path, n: usize) -> io::Result<Vec<String>> {
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut file = File::open(path)?;
    let file_size = file.seek(SeekFrom::End(0))?;
    if file_size == 0 {
        return Ok(Vec::new());
    }

    let mut data: Vec<u8> = Vec::new();
    let mut pos = file_size;
    loop {
        let seek_pos = pos.saturating_sub(BLOCK_SIZE);
        let read_len = (pos - seek_pos) as usize;
        file.seek(SeekFrom::Start(seek_pos))?;
        let mut chunk = vec![0u8; read_len];
        file.read_exact(&mut chunk)?;
        chunk.extend_from_slice(&data);
        data = chunk;

        // n lines need n+1 newlines in the worst case (trailing newline).
        if bytecount(&data, b'\n') >= n + 1 || seek_pos == 0 {
            break;
        }
        pos = seek_pos;
    }

    let text = String::from_utf8_lossy(&data);
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    let skip = lines.len().saturating_sub(n);
    Ok(lines.into_iter().skip(skip).collect())
}

fn bytecount(haystack: &[u8], needle: u8) -> usize {
    haystack.iter().filter(|&&b| b == needle).count()
}

/// Position of a tailing reader inside one file.
///
/// Tracks `(path, inode, offset)`. When the inode under the path changes
/// (rotation) or the file shrinks below the offset (truncation), the offset
/// resets to zero so no byte is ever produced twice from the new file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCursor {
    path: PathBuf,
    inode: u64,
    offset: u64,
}

impl FileCursor {
    /// Cursor at the start of `path`.
    pub fn start_of(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), inode: 0, offset: 0 }
    }

    /// Cursor at the current end of `path`, for tail-only consumers that
    /// already replayed history.
    pub fn end_of(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let meta = std::fs::metadata(&path)?;
        Ok(Self { inode: meta.ino(), offset: meta.len(), path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Point the cursor at a different file, starting from byte 0.
    pub fn switch_to(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
        self.inode = 0;
        self.offset = 0;
    }

    /// Read newly appended bytes, advancing the offset.
    ///
    /// Detects rotation (inode change) and truncation (offset past EOF) and
    /// restarts from byte 0 in either case.
    pub fn read_new(&mut self) -> io::Result<String> {
        let mut file = File::open(&self.path)?;
        let meta = file.metadata()?;

        if meta.ino() != self.inode {
            self.inode = meta.ino();
            self.offset = 0;
        }
        if self.offset > meta.len() {
            self.offset = 0;
        }

        file.seek(SeekFrom::Start(self.offset))?;
        let mut buf = Vec::new();
        file.take(MAX_CHUNK_BYTES as u64).read_to_end(&mut buf)?;
        self.offset += buf.len() as u64;

        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

#[cfg(test)]
#[path = "tail_tests.rs"]
mod tests;
