//! Character encodings.
//! Wraps `encoding_rs` with strict (non-replacing) decode and encode so that a
//! formatting pass can never introduce mojibake or silently drop characters.
//!
//! Notes:
//! - Decoding never consumes a byte-order mark; a BOM survives as U+FEFF and is
//!   written back unchanged.
//! - UTF-16LE/BE are encoded here directly because `encoding_rs` only decodes them.

mod resolve;

pub use resolve::{ContentSniffer, EncodingGuess, EncodingResolver, EncodingSource, Guess, ResolvedEncoding};

use encoding_rs::{DecoderResult, EncoderResult};
use std::fmt;
use std::str::FromStr;

use crate::errors::{DecodeError, EncodeError};

/// A named character set, immutable once resolved for an operation.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Encoding(&'static encoding_rs::Encoding);

impl Encoding {
    /// Platform default used when neither attribute nor guess is available.
    pub fn utf_8() -> Self {
        Encoding(encoding_rs::UTF_8)
    }

    pub fn utf_16le() -> Self {
        Encoding(encoding_rs::UTF_16LE)
    }

    pub fn utf_16be() -> Self {
        Encoding(encoding_rs::UTF_16BE)
    }

    /// Look up an encoding by WHATWG label, case-insensitively ("utf-8", "latin1", "UTF-16LE").
    pub fn for_name(label: &str) -> Option<Self> {
        encoding_rs::Encoding::for_label(label.trim().as_bytes()).map(Encoding)
    }

    /// Canonical name persisted in the `ENCODING` attribute.
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// False for decode-only encodings such as `replacement`.
    pub fn can_encode(&self) -> bool {
        self.is_utf_16() || self.0.output_encoding() == self.0
    }

    fn is_utf_16(&self) -> bool {
        self.0 == encoding_rs::UTF_16LE || self.0 == encoding_rs::UTF_16BE
    }

    pub fn new_decoder(&self) -> StrictDecoder {
        StrictDecoder {
            encoding: self.name(),
            inner: self.0.new_decoder_without_bom_handling(),
            consumed: 0,
        }
    }

    /// Decode a complete byte buffer.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, DecodeError> {
        let mut out = String::new();
        self.new_decoder().feed(bytes, true, &mut out)?;
        Ok(out)
    }

    /// Encode `text` completely in memory. Fails on the first unmappable character.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, EncodeError> {
        if self.0 == encoding_rs::UTF_16LE {
            return Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect());
        }
        if self.0 == encoding_rs::UTF_16BE {
            return Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect());
        }
        if !self.can_encode() {
            return Err(EncodeError::Unsupported { encoding: self.name() });
        }
        if self.0 == encoding_rs::UTF_8 {
            return Ok(text.as_bytes().to_vec());
        }

        let mut encoder = self.0.new_encoder();
        let mut out = Vec::with_capacity(
            encoder
                .max_buffer_length_from_utf8_without_replacement(text.len())
                .unwrap_or(text.len()),
        );
        let mut rest = text;
        let mut offset = 0usize;
        loop {
            let (result, read) = encoder.encode_from_utf8_to_vec_without_replacement(rest, &mut out, true);
            offset += read;
            rest = &rest[read..];
            match result {
                EncoderResult::InputEmpty => return Ok(out),
                EncoderResult::OutputFull => {
                    let more = encoder
                        .max_buffer_length_from_utf8_without_replacement(rest.len())
                        .unwrap_or(rest.len())
                        .max(16);
                    out.reserve(more);
                }
                EncoderResult::Unmappable(ch) => {
                    return Err(EncodeError::Unmappable {
                        encoding: self.name(),
                        ch,
                        offset: offset - ch.len_utf8(),
                    });
                }
            }
        }
    }
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding::utf_8()
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Encoding({})", self.name())
    }
}

impl FromStr for Encoding {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::for_name(s).ok_or_else(|| format!("unknown encoding: '{s}'"))
    }
}

/// Incremental decoder that refuses malformed input instead of substituting U+FFFD.
pub struct StrictDecoder {
    encoding: &'static str,
    inner: encoding_rs::Decoder,
    consumed: u64,
}

impl StrictDecoder {
    /// Decode `input` and append to `out`. `last` must be true for the final chunk so
    /// an incomplete trailing sequence is reported as malformed.
    pub fn feed(&mut self, mut input: &[u8], last: bool, out: &mut String) -> Result<(), DecodeError> {
        loop {
            let needed = self
                .inner
                .max_utf8_buffer_length_without_replacement(input.len())
                .unwrap_or(input.len().saturating_mul(3))
                .max(4);
            out.reserve(needed);

            let (result, read) = self.inner.decode_to_string_without_replacement(input, out, last);
            self.consumed += read as u64;
            input = &input[read..];
            match result {
                DecoderResult::InputEmpty => return Ok(()),
                DecoderResult::OutputFull => continue,
                DecoderResult::Malformed(bad, after) => {
                    return Err(DecodeError {
                        encoding: self.encoding,
                        offset: self.consumed - u64::from(bad) - u64::from(after),
                    });
                }
            }
        }
    }
}

impl fmt::Debug for StrictDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrictDecoder")
            .field("encoding", &self.encoding)
            .field("consumed", &self.consumed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive_and_canonicalizes() {
        assert_eq!(Encoding::for_name("utf-8").unwrap().name(), "UTF-8");
        assert_eq!(Encoding::for_name(" UTF-16LE ").unwrap().name(), "UTF-16LE");
        assert_eq!(Encoding::for_name("latin1").unwrap().name(), "windows-1252");
        assert!(Encoding::for_name("no-such-charset").is_none());
    }

    #[test]
    fn strict_decode_reports_offset() {
        let err = Encoding::utf_8().decode(b"ab\xffcd").unwrap_err();
        assert_eq!(err.offset, 2);
        assert_eq!(err.encoding, "UTF-8");
    }

    #[test]
    fn truncated_utf8_at_end_is_malformed() {
        assert!(Encoding::utf_8().decode(b"ok\xe2\x82").is_err());
    }

    #[test]
    fn utf16le_roundtrip_keeps_bom() {
        let enc = Encoding::utf_16le();
        let bytes = [0xFF, 0xFE, b'h', 0, b'i', 0];
        let text = enc.decode(&bytes).unwrap();
        assert_eq!(text, "\u{FEFF}hi");
        assert_eq!(enc.encode(&text).unwrap(), bytes);
    }

    #[test]
    fn unmappable_character_is_rejected() {
        let enc = Encoding::for_name("windows-1252").unwrap();
        let err = enc.encode("ok \u{4E2D}").unwrap_err();
        assert_eq!(
            err,
            EncodeError::Unmappable { encoding: "windows-1252", ch: '\u{4E2D}', offset: 3 }
        );
        assert_eq!(enc.encode("caf\u{e9}").unwrap(), b"caf\xe9");
    }

    #[test]
    fn replacement_encoding_cannot_encode() {
        let enc = Encoding::for_name("iso-2022-kr").unwrap();
        assert!(!enc.can_encode());
        assert!(matches!(enc.encode("x"), Err(EncodeError::Unsupported { .. })));
    }
}
