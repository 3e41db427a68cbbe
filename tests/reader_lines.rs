use ecfmt::{Encoding, MemoryFile, ReadError, read_lines, read_whole};

fn collect(file: &MemoryFile, enc: Encoding) -> Result<Vec<String>, ReadError> {
    read_lines(file, enc)?.collect()
}

#[test]
fn crlf_split_across_chunk_boundary() {
    // 8 KiB read buffer: put the \r as the last byte of the first chunk.
    let mut text = "x".repeat(8 * 1024 - 1);
    text.push_str("\r\nsecond");
    let file = MemoryFile::new("big.txt", text.clone());
    let lines = collect(&file, Encoding::utf_8()).unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1], "second");
    assert_eq!(lines[0].len(), 8 * 1024 - 1);
}

#[test]
fn multibyte_char_split_across_reads() {
    let file = MemoryFile::new("u.txt", "caf\u{e9}\n\u{1F600}").with_read_chunk(1);
    assert_eq!(collect(&file, Encoding::utf_8()).unwrap(), ["caf\u{e9}", "\u{1F600}"]);
}

#[test]
fn empty_file_is_one_empty_line() {
    let file = MemoryFile::new("e.txt", Vec::new());
    assert_eq!(collect(&file, Encoding::utf_8()).unwrap(), [""]);
}

#[test]
fn utf16le_with_bom() {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "a\r\nb".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let file = MemoryFile::new("w.txt", bytes).with_read_chunk(3);
    assert_eq!(collect(&file, Encoding::utf_16le()).unwrap(), ["\u{feff}a", "b"]);
}

#[test]
fn legacy_encoding_decodes() {
    let file = MemoryFile::new("l.txt", b"K\xe4se\n".to_vec());
    let latin1 = Encoding::for_name("windows-1252").unwrap();
    assert_eq!(read_whole(&file, latin1).unwrap(), "K\u{e4}se\n");
}

#[test]
fn invalid_bytes_are_a_decode_error() {
    let file = MemoryFile::new("bad.txt", b"fine\n\xc3\x28".to_vec());
    let err = collect(&file, Encoding::utf_8()).unwrap_err();
    match err {
        ReadError::Decode { path, source } => {
            assert_eq!(path.to_str(), Some("bad.txt"));
            assert_eq!(source.offset, 5);
        }
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[test]
fn open_failure_is_io_error() {
    let file = MemoryFile::new("gone.txt", "x");
    file.fail_reads(std::io::ErrorKind::NotFound);
    assert!(matches!(read_lines(&file, Encoding::utf_8()), Err(ReadError::Io { .. })));
    assert!(matches!(read_whole(&file, Encoding::utf_8()), Err(ReadError::Io { .. })));
}
