use ecfmt::{
    ContentSniffer, ENCODING_ATTRIBUTE, Encoding, EncodingResolver, EncodingSource, FileHandle, MemoryFile,
    RecordingSink, TaskEvent,
};

fn never(_: &dyn FileHandle) -> Option<Encoding> {
    None
}

#[test]
fn attribute_wins_over_guess() {
    let file = MemoryFile::new("a.txt", "plain").with_attribute(ENCODING_ATTRIBUTE, "windows-1252");
    let sink = RecordingSink::new();
    let resolved = EncodingResolver::new().resolve(&file, &sink).unwrap();
    assert_eq!(resolved.encoding.name(), "windows-1252");
    assert_eq!(resolved.source, EncodingSource::Attribute);
    assert!(matches!(
        sink.events().last(),
        Some(TaskEvent::EncodingResolved { source: EncodingSource::Attribute, .. })
    ));
}

#[test]
fn guess_used_when_attribute_missing() {
    let file = MemoryFile::new("a.txt", vec![0xFE, 0xFF, 0, b'a']);
    let resolved = EncodingResolver::new().resolve(&file, &RecordingSink::new()).unwrap();
    assert_eq!(resolved.encoding, Encoding::utf_16be());
    assert_eq!(resolved.source, EncodingSource::Guess);
}

#[test]
fn default_when_guess_declines() {
    let file = MemoryFile::new("a.txt", "x");
    let resolver = EncodingResolver::with_guess(never).with_default(Encoding::utf_16le());
    let resolved = resolver.resolve(&file, &RecordingSink::new()).unwrap();
    assert_eq!(resolved.encoding, Encoding::utf_16le());
    assert_eq!(resolved.source, EncodingSource::Default);
}

#[test]
fn unknown_label_is_reported_and_ignored() {
    let file = MemoryFile::new("a.txt", "x").with_attribute(ENCODING_ATTRIBUTE, "klingon-8");
    let sink = RecordingSink::new();
    let resolved = EncodingResolver::with_guess(never).resolve(&file, &sink).unwrap();
    assert_eq!(resolved.encoding, Encoding::utf_8());
    assert_eq!(resolved.source, EncodingSource::Default);
    assert!(sink.events().iter().any(|e| matches!(
        e,
        TaskEvent::UnknownEncodingLabel { label, .. } if label == "klingon-8"
    )));
}

#[test]
fn unreadable_attribute_store_does_not_fail() {
    let file = MemoryFile::new("a.txt", "x");
    file.fail_attribute_reads();
    let sink = RecordingSink::new();
    let resolved = EncodingResolver::new().resolve(&file, &sink).unwrap();
    assert_eq!(resolved.encoding, Encoding::utf_8());
    assert!(sink.events().iter().any(|e| matches!(e, TaskEvent::AttributeUnreadable { .. })));
}

#[test]
fn resolver_never_writes_attribute() {
    let file = MemoryFile::new("a.txt", "x");
    EncodingResolver::new().resolve(&file, &RecordingSink::new()).unwrap();
    assert!(file.attributes().is_empty());
    assert_eq!(file.write_attempts(), 0);
}

#[test]
fn small_sample_still_sniffs_utf8_with_cut_sequence() {
    // 5-byte sample ends inside the 3-byte euro sign.
    let file = MemoryFile::new("a.txt", "abcd\u{20ac}");
    let resolver = EncodingResolver::with_guess(ContentSniffer::with_sample_len(5));
    assert_eq!(resolver.resolve(&file, &RecordingSink::new()).unwrap().encoding, Encoding::utf_8());
}

#[test]
fn bomless_utf16_is_guessed_from_nul_parity() {
    let bytes: Vec<u8> = "ab \r\ncd\r\n".encode_utf16().flat_map(u16::to_le_bytes).collect();
    let file = MemoryFile::new("w.txt", bytes);
    let resolved = EncodingResolver::new().resolve(&file, &RecordingSink::new()).unwrap();
    assert_eq!(resolved.encoding, Encoding::utf_16le());
    assert_eq!(resolved.source, EncodingSource::Guess);
}

#[test]
fn binary_content_resolves_to_nothing() {
    let file = MemoryFile::new("logo.png", b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00\x00\x10".to_vec());
    let sink = RecordingSink::new();
    assert!(EncodingResolver::new().resolve(&file, &sink).is_none());
    assert!(!sink.events().iter().any(|e| matches!(e, TaskEvent::EncodingResolved { .. })));
}

#[test]
fn attribute_skips_binary_sniffing() {
    let bytes: Vec<u8> = "hi".encode_utf16().flat_map(u16::to_be_bytes).collect();
    let file = MemoryFile::new("w.txt", bytes).with_attribute(ENCODING_ATTRIBUTE, "UTF-16BE");
    let resolved = EncodingResolver::new().resolve(&file, &RecordingSink::new()).unwrap();
    assert_eq!(resolved.source, EncodingSource::Attribute);
}
