use encoding_rs::WINDOWS_1252;

/// Bytes with no assignment in Windows-1252. Their presence means the data
/// cannot be genuine Windows-1252 text, so the decoder falls through to
/// Latin-1 for them.
const WINDOWS_1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

/// Decodes subtitle bytes of unknown provenance. Strict UTF-8 is tried
/// first, then Windows-1252 (it preserves typographic punctuation such as
/// curly quotes and en dashes), then Latin-1. Latin-1 must come last:
/// every byte sequence decodes under it, so trying it earlier would mask
/// genuine UTF-8 or Windows-1252 content. This function cannot fail.
pub fn decode_bytes(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.strip_prefix('\u{feff}').unwrap_or(text).to_string();
    }
    if !bytes
        .iter()
        .any(|byte| WINDOWS_1252_UNDEFINED.contains(byte))
    {
        let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
        return text.into_owned();
    }
    bytes.iter().map(|&byte| byte as char).collect()
}
