//! Normalizer (C4): re-pack a finalized OMS payload, ensuring a trailing
//! `Q` and fixing up `tag_count`/`stag_count` (spec.md §4.3).
//!
//! `normalize` must be idempotent for well-formed input and must never
//! lose tags (spec.md §8).

use super::scanner::scan;
use super::writer::{
    compress, decompress, ensure_trailing_q, read_swap16_at, ClientVersion, Compression,
};
use crate::config::TagCountMode;

fn version_from_byte(b: u8) -> Option<ClientVersion> {
    match b {
        0x0D => Some(ClientVersion::V1),
        0x18 => Some(ClientVersion::V2),
        0x1A => Some(ClientVersion::V3),
        _ => None,
    }
}

fn compression_from_byte(b: u8) -> Option<Compression> {
    match b {
        0x31 => Some(Compression::Gzip),
        0x32 => Some(Compression::Deflate),
        0x33 => Some(Compression::None),
        _ => None,
    }
}

/// Normalize a finalized OMS payload (framing header + preheader + tag
/// stream). `stag_variant` forces `stagCount` to the legacy `0x0400`
/// sentinel instead of the freshly scanned value (spec.md §4.3 step 4).
pub fn normalize(
    payload: &[u8],
    policy: TagCountMode,
    stag_variant: bool,
) -> Result<Vec<u8>, crate::error::BoxError> {
    use crate::error::ErrorContext;

    if payload.len() < 6 {
        return Err("payload shorter than the 6-byte framing header".into());
    }
    let version_word = u16::from_le_bytes([payload[0], payload[1]]);
    let version_byte = (version_word & 0xFF) as u8;
    let compression_byte = ((version_word >> 8) & 0xFF) as u8;
    let client_version = version_from_byte(version_byte).context("unknown OMS version byte")?;
    let compression =
        compression_from_byte(compression_byte).context("unknown OMS compression byte")?;

    let compressed_body = &payload[6..];
    let decompressed = decompress(compression, compressed_body).context("decompressing body")?;

    let header_len = client_version.header_len();
    if decompressed.len() < header_len {
        return Err("decompressed body shorter than the preheader".into());
    }
    let mut header = decompressed[..header_len].to_vec();
    let mut tag_stream = decompressed[header_len..].to_vec();

    let mut part_cur = read_swap16_at(&header, 20) as u32;
    let mut part_cnt = read_swap16_at(&header, 22) as u32;
    if part_cur == 0 {
        part_cur = 1;
    }
    if part_cnt == 0 {
        part_cnt = 1;
    }

    let mut dummy_tag_count = 0u32;
    ensure_trailing_q(&mut tag_stream, &mut dummy_tag_count);

    let scanned = scan(&tag_stream);
    let wire_tag_count = policy.adjust(scanned.tag_count, scanned.ended_with_q);
    let wire_str_count = if stag_variant {
        0x0400
    } else {
        scanned.str_count + 1
    };

    write_swap16_at(&mut header, 18, wire_tag_count as u16);
    write_swap16_at(&mut header, 20, part_cur as u16);
    write_swap16_at(&mut header, 22, part_cnt as u16);
    write_swap16_at(&mut header, 26, wire_str_count as u16);

    let mut rebuilt_payload = header;
    rebuilt_payload.extend_from_slice(&tag_stream);

    let recompressed = compress(compression, &rebuilt_payload);

    let mut framed = Vec::with_capacity(6 + recompressed.len());
    framed.extend_from_slice(&version_word.to_le_bytes());
    let total_size = (6 + recompressed.len()) as u32;
    framed.extend_from_slice(&total_size.to_be_bytes());
    framed.extend_from_slice(&recompressed);
    Ok(framed)
}

fn write_swap16_at(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}
