//! Encoding resolution.
//! Order: persisted `ENCODING` attribute, then an injected guess, then UTF-8.
//! A guess may instead conclude that the content is binary; such a file has no
//! encoding and must not be rewritten.
//!
//! The resolver is read-only. It never writes the attribute; that happens in the
//! writer after a successful content replace.

use std::fmt;
use std::io::Read;

use tracing::trace;

use super::Encoding;
use crate::events::{EventSink, TaskEvent};
use crate::fs_ops::{ENCODING_ATTRIBUTE, FileHandle};

/// What a guess concluded from a file's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guess {
    Text(Encoding),
    /// Not text in any supported encoding.
    Binary,
}

/// Fallback strategy consulted when a file carries no usable `ENCODING` attribute.
/// `None` means no opinion; the resolver falls back to its default.
pub trait EncodingGuess: Send + Sync {
    fn guess(&self, file: &dyn FileHandle) -> Option<Guess>;
}

impl<F> EncodingGuess for F
where
    F: Fn(&dyn FileHandle) -> Option<Encoding> + Send + Sync,
{
    fn guess(&self, file: &dyn FileHandle) -> Option<Guess> {
        self(file).map(Guess::Text)
    }
}

/// Where a resolved encoding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingSource {
    Attribute,
    Guess,
    Default,
}

impl fmt::Display for EncodingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EncodingSource::Attribute => "attribute",
            EncodingSource::Guess => "guess",
            EncodingSource::Default => "default",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedEncoding {
    pub encoding: Encoding,
    pub source: EncodingSource,
}

/// Resolves the encoding used to decode and re-encode one file.
pub struct EncodingResolver {
    guess: Box<dyn EncodingGuess>,
    default: Encoding,
}

impl EncodingResolver {
    /// Resolver backed by [`ContentSniffer`].
    pub fn new() -> Self {
        Self::with_guess(ContentSniffer::default())
    }

    pub fn with_guess(guess: impl EncodingGuess + 'static) -> Self {
        Self {
            guess: Box::new(guess),
            default: Encoding::utf_8(),
        }
    }

    /// Override the platform default (UTF-8).
    pub fn with_default(mut self, default: Encoding) -> Self {
        self.default = default;
        self
    }

    /// Never fails: unreadable or unknown attributes are reported and treated as absent.
    /// `None` when the guess found binary content.
    pub fn resolve(&self, file: &dyn FileHandle, sink: &dyn EventSink) -> Option<ResolvedEncoding> {
        let path = file.path();
        let resolved = match file.attribute(ENCODING_ATTRIBUTE) {
            Ok(Some(label)) => match Encoding::for_name(&label) {
                Some(encoding) => Some(ResolvedEncoding {
                    encoding,
                    source: EncodingSource::Attribute,
                }),
                None => {
                    sink.emit(&TaskEvent::UnknownEncodingLabel {
                        path: path.to_path_buf(),
                        label,
                    });
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                sink.emit(&TaskEvent::AttributeUnreadable {
                    path: path.to_path_buf(),
                    key: ENCODING_ATTRIBUTE.to_string(),
                    error: e.to_string(),
                });
                None
            }
        };

        let resolved = match resolved {
            Some(r) => r,
            None => match self.guess.guess(file) {
                Some(Guess::Text(encoding)) => ResolvedEncoding {
                    encoding,
                    source: EncodingSource::Guess,
                },
                Some(Guess::Binary) => {
                    trace!(path = %path.display(), "guess found binary content");
                    return None;
                }
                None => ResolvedEncoding {
                    encoding: self.default,
                    source: EncodingSource::Default,
                },
            },
        };

        sink.emit(&TaskEvent::EncodingResolved {
            path: path.to_path_buf(),
            encoding: resolved.encoding.name(),
            source: resolved.source,
        });
        Some(resolved)
    }
}

impl Default for EncodingResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EncodingResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodingResolver")
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

/// Default guess over a bounded prefix: BOM, then the NUL byte pattern (BOM-less
/// UTF-16 or binary), then UTF-8 validity, then `chardetng`.
#[derive(Debug, Clone, Copy)]
pub struct ContentSniffer {
    sample_len: usize,
}

impl ContentSniffer {
    pub const DEFAULT_SAMPLE_LEN: usize = 64 * 1024;

    pub fn with_sample_len(sample_len: usize) -> Self {
        Self { sample_len: sample_len.max(4) }
    }

    /// Guess from an in-memory sample. `complete` is true when the sample is the whole file.
    pub fn sniff(bytes: &[u8], complete: bool) -> Guess {
        if let Some((encoding, _bom_len)) = encoding_rs::Encoding::for_bom(bytes) {
            return Guess::Text(Encoding(encoding));
        }
        if let Some(guess) = nul_pattern(bytes, complete) {
            return guess;
        }
        match std::str::from_utf8(bytes) {
            Ok(_) => return Guess::Text(Encoding::utf_8()),
            // A multi-byte sequence cut by the sample boundary is still UTF-8.
            Err(e) if !complete && e.error_len().is_none() => return Guess::Text(Encoding::utf_8()),
            Err(_) => {}
        }
        let mut detector = chardetng::EncodingDetector::new();
        detector.feed(bytes, complete);
        Guess::Text(Encoding(detector.guess(None, false)))
    }
}

/// Classify a sample containing NUL bytes. No single-byte or UTF-8 text has them,
/// so they mean either BOM-less UTF-16 (mostly Latin text puts a zero in one half
/// of every code unit) or binary content. `None` when the sample has no NUL.
fn nul_pattern(bytes: &[u8], complete: bool) -> Option<Guess> {
    if !bytes.contains(&0) {
        return None;
    }
    let units = bytes.len() / 2;
    let even = bytes.iter().step_by(2).filter(|b| **b == 0).count();
    let odd = bytes.iter().skip(1).step_by(2).filter(|b| **b == 0).count();
    // A complete UTF-16 file has an even length.
    let aligned = !complete || bytes.len() % 2 == 0;
    let mostly = |hits: usize, strays: usize| units > 0 && hits * 2 >= units && strays * 10 <= hits;

    let guess = if aligned && mostly(odd, even) {
        Guess::Text(Encoding::utf_16le())
    } else if aligned && mostly(even, odd) {
        Guess::Text(Encoding::utf_16be())
    } else {
        Guess::Binary
    };
    Some(guess)
}

impl Default for ContentSniffer {
    fn default() -> Self {
        Self { sample_len: Self::DEFAULT_SAMPLE_LEN }
    }
}

impl EncodingGuess for ContentSniffer {
    fn guess(&self, file: &dyn FileHandle) -> Option<Guess> {
        let reader = match file.open_read() {
            Ok(r) => r,
            Err(e) => {
                trace!(path = %file.path().display(), error = %e, "sniffer could not open file");
                return None;
            }
        };
        // Read one byte past the sample to learn whether the sample is the whole file.
        let mut sample = Vec::with_capacity(self.sample_len + 1);
        if let Err(e) = reader.take(self.sample_len as u64 + 1).read_to_end(&mut sample) {
            trace!(path = %file.path().display(), error = %e, "sniffer read failed");
            return None;
        }
        let complete = sample.len() <= self.sample_len;
        sample.truncate(self.sample_len);
        Some(Self::sniff(&sample, complete))
    }
}
