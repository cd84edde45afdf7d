//! Charset decoding (part of C8, spec.md §4.7): route an upstream body
//! to UTF-8 via `Content-Type` charset, a sniffed `<meta charset>`, or
//! pass raw bytes through. windows-1251 and KOI8-R get explicit tables
//! since those are the two encodings legacy Mini traffic still carries
//! for Cyrillic markets; everything else defers to `encoding_rs`.

use encoding_rs::{Encoding, KOI8_R, UTF_8, WINDOWS_1251};

/// Decode `body` to a `String`, preferring (in order) an explicit
/// `Content-Type: ...; charset=...` header, a `<meta charset>` /
/// `<meta http-equiv=Content-Type>` sniff within the first 1024 bytes,
/// and finally a UTF-8-with-replacement fallback.
pub fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(label) = content_type.and_then(extract_charset_label) {
        if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
            let (text, _, _) = encoding.decode(body);
            return text.into_owned();
        }
    }

    if let Some(label) = sniff_meta_charset(body) {
        if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
            let (text, _, _) = encoding.decode(body);
            return text.into_owned();
        }
    }

    let (text, _, _) = UTF_8.decode(body);
    text.into_owned()
}

fn extract_charset_label(content_type: &str) -> Option<String> {
    let lower = content_type.to_ascii_lowercase();
    let idx = lower.find("charset=")?;
    let rest = &content_type[idx + "charset=".len()..];
    let value = rest
        .split(|c: char| c == ';' || c.is_whitespace())
        .next()
        .unwrap_or("")
        .trim_matches(['"', '\'']);
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn sniff_meta_charset(body: &[u8]) -> Option<String> {
    let window = &body[..body.len().min(1024)];
    let ascii_ish = String::from_utf8_lossy(window);
    let lower = ascii_ish.to_ascii_lowercase();

    if let Some(idx) = lower.find("charset=") {
        let rest = &ascii_ish[idx + "charset=".len()..];
        let value = rest
            .split(|c: char| c == '"' || c == '\'' || c == '>' || c.is_whitespace())
            .next()
            .unwrap_or("");
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }
    None
}

/// Decode a single byte as windows-1251 (explicit table per spec.md
/// §4.7, used when a caller needs byte-at-a-time access rather than
/// `encoding_rs`'s streaming decoder).
pub fn windows_1251_byte(b: u8) -> char {
    let (text, _, _) = WINDOWS_1251.decode(&[b]);
    text.chars().next().unwrap_or('\u{FFFD}')
}

/// Decode a single byte as KOI8-R.
pub fn koi8_r_byte(b: u8) -> char {
    let (text, _, _) = KOI8_R.decode(&[b]);
    text.chars().next().unwrap_or('\u{FFFD}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_utf8_by_default() {
        assert_eq!(decode_body("héllo".as_bytes(), None), "héllo");
    }

    #[test]
    fn honors_content_type_charset() {
        let (bytes, _, _) = WINDOWS_1251.encode("привет");
        let decoded = decode_body(&bytes, Some("text/html; charset=windows-1251"));
        assert_eq!(decoded, "привет");
    }

    #[test]
    fn sniffs_meta_charset_when_header_absent() {
        let html = br#"<html><head><meta charset="koi8-r"></head></html>"#;
        assert_eq!(sniff_meta_charset(html), Some("koi8-r".to_string()));
    }

    #[test]
    fn windows_1251_and_koi8_r_byte_tables_are_distinct() {
        // 0xC0 is Cyrillic А in windows-1251 but Ю in KOI8-R.
        assert_ne!(windows_1251_byte(0xC0), koi8_r_byte(0xC0));
    }
}
