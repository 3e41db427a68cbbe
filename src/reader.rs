//! Content reader: a file's bytes as a lazy sequence of decoded lines.
//!
//! Lines are split on `\n`, `\r\n` and `\r` with terminators removed. A text with
//! N terminators yields N+1 lines, so a trailing newline shows up as a final empty
//! line and the empty file is a single empty line. Joining the lines back with one
//! separator between each pair restores the line structure exactly.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::encoding::{Encoding, StrictDecoder};
use crate::errors::ReadError;
use crate::fs_ops::FileHandle;

const CHUNK: usize = 8 * 1024;

/// Streaming line iterator. Finite and not restartable; the underlying stream is
/// dropped once the last line is produced, on the first error, or with the iterator.
pub struct LineReader<'a> {
    path: PathBuf,
    source: Option<Box<dyn Read + 'a>>,
    decoder: StrictDecoder,
    raw: Vec<u8>,
    buf: String,
    pos: usize,
    eof: bool,
    done: bool,
    capture: bool,
    captured: String,
}

impl<'a> LineReader<'a> {
    fn new(path: PathBuf, source: Box<dyn Read + 'a>, encoding: Encoding) -> Self {
        Self {
            path,
            source: Some(source),
            decoder: encoding.new_decoder(),
            raw: vec![0; CHUNK],
            buf: String::new(),
            pos: 0,
            eof: false,
            done: false,
            capture: false,
            captured: String::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn fill(&mut self) -> Result<(), ReadError> {
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
        let start = self.buf.len();
        let Some(source) = self.source.as_mut() else {
            self.eof = true;
            return Ok(());
        };
        let n = loop {
            match source.read(&mut self.raw) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(ReadError::Io {
                        path: self.path.clone(),
                        source,
                    });
                }
            }
        };
        let last = n == 0;
        self.decoder
            .feed(&self.raw[..n], last, &mut self.buf)
            .map_err(|source| ReadError::Decode {
                path: self.path.clone(),
                source,
            })?;
        if self.capture {
            self.captured.push_str(&self.buf[start..]);
        }
        if last {
            self.eof = true;
            self.source = None;
        }
        Ok(())
    }

    fn fail(&mut self, e: ReadError) -> Option<Result<String, ReadError>> {
        self.done = true;
        self.source = None;
        Some(Err(e))
    }
}

impl Iterator for LineReader<'_> {
    type Item = Result<String, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if let Some(i) = self.buf[self.pos..].find(['\n', '\r']) {
                let at = self.pos + i;
                let bytes = self.buf.as_bytes();
                let is_cr = bytes[at] == b'\r';
                // A lone \r at the end of the buffer may be the first half of \r\n.
                if is_cr && at + 1 == bytes.len() && !self.eof {
                    if let Err(e) = self.fill() {
                        return self.fail(e);
                    }
                    continue;
                }
                let skip = if is_cr && bytes.get(at + 1) == Some(&b'\n') { 2 } else { 1 };
                let line = self.buf[self.pos..at].to_string();
                self.pos = at + skip;
                return Some(Ok(line));
            }
            if self.eof {
                let line = self.buf[self.pos..].to_string();
                self.buf.clear();
                self.pos = 0;
                self.done = true;
                self.source = None;
                return Some(Ok(line));
            }
            if let Err(e) = self.fill() {
                return self.fail(e);
            }
        }
    }
}

/// Open `file` and stream its lines decoded under `encoding`.
pub fn read_lines<'a>(file: &'a dyn FileHandle, encoding: Encoding) -> Result<LineReader<'a>, ReadError> {
    let source = file.open_read().map_err(|source| ReadError::Io {
        path: file.path().to_path_buf(),
        source,
    })?;
    Ok(LineReader::new(file.path().to_path_buf(), source, encoding))
}

/// Every line of `file` together with the exact decoded text they were split from.
/// The text is accumulated by the same decoder pass that produced the lines.
pub fn read_lines_with_text(file: &dyn FileHandle, encoding: Encoding) -> Result<(Vec<String>, String), ReadError> {
    let mut reader = read_lines(file, encoding)?;
    reader.capture = true;
    let lines = reader.by_ref().collect::<Result<Vec<String>, _>>()?;
    Ok((lines, reader.captured))
}

/// Whole decoded content of `file`.
pub fn read_whole(file: &dyn FileHandle, encoding: Encoding) -> Result<String, ReadError> {
    let path = file.path().to_path_buf();
    let mut bytes = Vec::new();
    file.open_read()
        .and_then(|mut r| r.read_to_end(&mut bytes))
        .map_err(|source| ReadError::Io { path: path.clone(), source })?;
    encoding.decode(&bytes).map_err(|source| ReadError::Decode { path, source })
}

/// Same splitting as [`LineReader`], over text already in memory.
pub fn split_lines(text: &str) -> SplitLines<'_> {
    SplitLines { rest: Some(text) }
}

#[derive(Debug, Clone)]
pub struct SplitLines<'a> {
    rest: Option<&'a str>,
}

impl<'a> Iterator for SplitLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = self.rest?;
        match rest.find(['\n', '\r']) {
            Some(at) => {
                let skip = if rest[at..].starts_with("\r\n") { 2 } else { 1 };
                self.rest = Some(&rest[at + skip..]);
                Some(&rest[..at])
            }
            None => {
                self.rest = None;
                Some(rest)
            }
        }
    }
}
