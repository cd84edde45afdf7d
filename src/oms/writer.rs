//! OMS writer (C2): an append-only tag-stream builder, plus the
//! finalization contract that frames a complete page for the wire
//! (spec.md §4.1).
//!
//! Modeled on the fluent `Add*`-method builder style of
//! `rama-http-types::response::ResponseBuilder` (push, never mutate
//! past elements).

use super::scanner::scan;
use super::tags::{auth_kind, byte, style_word};
use crate::config::TagCountMode;
use flate2::write::{DeflateEncoder, GzEncoder};
use flate2::Compression as Flate2Level;
use std::collections::HashMap;
use std::io::Write;

/// OMS client protocol version (spec.md §3, §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientVersion {
    V1,
    V2,
    V3,
}

impl ClientVersion {
    pub fn version_byte(self) -> u8 {
        match self {
            Self::V1 => 0x0D,
            Self::V2 => 0x18,
            Self::V3 => 0x1A,
        }
    }

    /// Pre-body header length: 33 bytes for v1, 35 for v2/v3.
    pub fn header_len(self) -> usize {
        match self {
            Self::V1 => 33,
            Self::V2 | Self::V3 => 35,
        }
    }
}

/// OMS body compression method (spec.md §6.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Deflate,
    None,
}

impl Compression {
    pub fn byte(self) -> u8 {
        match self {
            Self::Gzip => 0x31,
            Self::Deflate => 0x32,
            Self::None => 0x33,
        }
    }
}

/// Origin-vs-encoded transfer size bookkeeping for access logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stats {
    pub origin_bytes: u64,
    pub encoded_bytes: u64,
}

/// A page under construction (spec.md §3).
#[derive(Debug, Clone)]
pub struct Page {
    pub data: Vec<u8>,
    pub tag_count: u32,
    pub str_count: u32,
    pub set_cookies: Vec<String>,
    pub part_cur: u32,
    pub part_cnt: u32,
    pub client_version: ClientVersion,
    pub compression: Compression,
    pub form_hidden: HashMap<String, HashMap<String, String>>,
    pub cache_packed: Option<Vec<u8>>,
    pub no_cache: bool,
    pub stats: Stats,
}

pub(crate) fn write_be_string(buf: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    let len = bytes.len().min(u16::MAX as usize) as u16;
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(&bytes[..len as usize]);
}

/// Push a standalone `T` tag. Used outside `Page` to assemble fragments
/// (e.g. the paginator's injected navigation) that aren't built through
/// the builder's running counters.
pub(crate) fn raw_text(buf: &mut Vec<u8>, text: &str) {
    buf.push(byte::TEXT);
    write_be_string(buf, text);
}

pub(crate) fn raw_link_start(buf: &mut Vec<u8>, abs_url: &str) {
    buf.push(byte::LINK_START);
    write_be_string(buf, abs_url);
}

pub(crate) fn raw_link_end(buf: &mut Vec<u8>) {
    buf.push(byte::LINK_END);
}

pub(crate) fn raw_rule(buf: &mut Vec<u8>, rgb565: u16) {
    buf.push(byte::RULE);
    buf.extend_from_slice(&rgb565.to_be_bytes());
}

impl Page {
    /// Create a new page whose tag stream begins with the mandatory
    /// initial OMS string `"1/<pageURL>"`.
    pub fn new(page_url: &str, client_version: ClientVersion, compression: Compression) -> Self {
        let mut data = Vec::new();
        write_be_string(&mut data, &format!("1/{page_url}"));
        Self {
            data,
            tag_count: 0,
            str_count: 1,
            set_cookies: Vec::new(),
            part_cur: 1,
            part_cnt: 1,
            client_version,
            compression,
            form_hidden: HashMap::new(),
            cache_packed: None,
            no_cache: false,
            stats: Stats::default(),
        }
    }

    fn push_tag(&mut self, tag: u8) {
        self.data.push(tag);
        self.tag_count += 1;
    }

    fn push_string_field(&mut self, s: &str) {
        write_be_string(&mut self.data, s);
        self.str_count += 1;
    }

    // -- text / structure -------------------------------------------------

    pub fn add_text(&mut self, text: &str) {
        self.data.push(byte::TEXT);
        self.tag_count += 1;
        self.push_string_field(text);
    }

    pub fn begin_link(&mut self, abs_url: &str) {
        self.data.push(byte::LINK_START);
        self.tag_count += 1;
        self.push_string_field(abs_url);
    }

    pub fn end_link(&mut self) {
        self.push_tag(byte::LINK_END);
    }

    pub fn add_break(&mut self) {
        self.push_tag(byte::BREAK);
    }

    pub fn add_block(&mut self) {
        self.push_tag(byte::BLOCK);
    }

    pub fn add_para(&mut self) {
        self.push_tag(byte::PARA);
    }

    pub fn add_style(&mut self, style_bits: u32, rgb565: u16) {
        self.data.push(byte::STYLE);
        self.tag_count += 1;
        self.data
            .extend_from_slice(&style_word(style_bits, rgb565).to_be_bytes());
    }

    pub fn add_bgcolor(&mut self, rgb565: u16) {
        self.data.push(byte::BGCOLOR);
        self.tag_count += 1;
        self.data.extend_from_slice(&rgb565.to_be_bytes());
    }

    pub fn add_rule(&mut self, rgb565: u16) {
        self.data.push(byte::RULE);
        self.tag_count += 1;
        self.data.extend_from_slice(&rgb565.to_be_bytes());
    }

    // -- images -------------------------------------------------------------

    pub fn add_image_placeholder(&mut self, w: u16, h: u16) {
        self.data.push(byte::IMG_PLACEHOLDER);
        self.tag_count += 1;
        self.data.extend_from_slice(&w.to_be_bytes());
        self.data.extend_from_slice(&h.to_be_bytes());
    }

    pub fn add_image_inline(&mut self, w: u16, h: u16, data: &[u8]) {
        self.data.push(byte::IMG_INLINE);
        self.tag_count += 1;
        let len = data.len().min(u16::MAX as usize) as u16;
        self.data.extend_from_slice(&w.to_be_bytes());
        self.data.extend_from_slice(&h.to_be_bytes());
        self.data.extend_from_slice(&len.to_be_bytes());
        self.data.extend_from_slice(&0u16.to_be_bytes()); // reserved
        self.data.extend_from_slice(&data[..len as usize]);
    }

    // -- auth echo ------------------------------------------------------------

    pub fn add_auth_prefix(&mut self, prefix: &str) {
        self.data.push(byte::AUTH);
        self.tag_count += 1;
        self.data.push(auth_kind::PREFIX);
        self.push_string_field(prefix);
    }

    pub fn add_auth_code(&mut self, code: &str) {
        self.data.push(byte::AUTH);
        self.tag_count += 1;
        self.data.push(auth_kind::CODE);
        self.push_string_field(code);
    }

    // -- forms ----------------------------------------------------------------

    pub fn add_form_start(&mut self, action: &str) {
        self.data.push(byte::FORM_START);
        self.tag_count += 1;
        self.push_string_field(action);
        self.push_string_field("1");
    }

    pub fn add_input_text(&mut self, cfg: u8, name: &str, value: &str) {
        self.data.push(byte::INPUT_TEXT);
        self.tag_count += 1;
        self.data.push(cfg);
        self.push_string_field(name);
        self.push_string_field(value);
    }

    fn add_name_value_tag(&mut self, tag: u8, name: &str, value: &str) {
        self.data.push(tag);
        self.tag_count += 1;
        self.push_string_field(name);
        self.push_string_field(value);
    }

    pub fn add_input_password(&mut self, name: &str, value: &str) {
        self.add_name_value_tag(byte::INPUT_PASSWORD, name, value);
    }

    pub fn add_input_submit(&mut self, name: &str, value: &str) {
        self.add_name_value_tag(byte::INPUT_SUBMIT, name, value);
    }

    pub fn add_input_button(&mut self, name: &str, value: &str) {
        self.add_name_value_tag(byte::INPUT_BUTTON, name, value);
    }

    pub fn add_input_reset(&mut self, name: &str, value: &str) {
        self.add_name_value_tag(byte::INPUT_RESET, name, value);
    }

    pub fn add_input_hidden(&mut self, name: &str, value: &str) {
        self.add_name_value_tag(byte::INPUT_HIDDEN, name, value);
    }

    fn add_checked_tag(&mut self, tag: u8, name: &str, value: &str, checked: bool) {
        self.data.push(tag);
        self.tag_count += 1;
        self.push_string_field(name);
        self.push_string_field(value);
        self.data.push(u8::from(checked));
    }

    pub fn add_checkbox(&mut self, name: &str, value: &str, checked: bool) {
        self.add_checked_tag(byte::INPUT_CHECKBOX, name, value, checked);
    }

    pub fn add_radio(&mut self, name: &str, value: &str, checked: bool) {
        self.add_checked_tag(byte::INPUT_RADIO, name, value, checked);
    }

    pub fn begin_select(&mut self, name: &str, multiple: bool, count: u16) {
        self.data.push(byte::SELECT_START);
        self.tag_count += 1;
        self.push_string_field(name);
        self.data.push(u8::from(multiple));
        self.data.extend_from_slice(&count.to_be_bytes());
    }

    pub fn add_option(&mut self, value: &str, label: &str, selected: bool) {
        self.data.push(byte::SELECT_OPTION);
        self.tag_count += 1;
        self.push_string_field(value);
        self.push_string_field(label);
        self.data.push(u8::from(selected));
    }

    pub fn end_select(&mut self) {
        self.push_tag(byte::SELECT_END);
    }

    // -- finalization -----------------------------------------------------

    /// Append a trailing `Q` if the tag stream is not already
    /// well-terminated. Idempotent.
    pub fn finish_body(&mut self) {
        ensure_trailing_q(&mut self.data, &mut self.tag_count);
    }

    /// Run the finalization contract (spec.md §4.1) and return the
    /// fully framed wire payload. Also stashes the result in
    /// `cache_packed` unless one was preset by the caller.
    ///
    /// `tagcount_delta` is the `OMS_TAGCOUNT_DELTA` knob (spec.md §6.3):
    /// an additional signed adjustment layered on top of `policy`, for
    /// matching legacy client builds whose tag-count quirk isn't exactly
    /// one of the four named [`TagCountMode`] variants.
    pub fn finalize(&mut self, policy: TagCountMode, tagcount_delta: i32) -> Vec<u8> {
        self.finish_body();
        let framed = frame_body(
            &self.data,
            self.client_version,
            self.compression,
            self.part_cur,
            self.part_cnt,
            policy,
            tagcount_delta,
        );
        self.stats.encoded_bytes = framed.len() as u64;
        if self.cache_packed.is_none() {
            self.cache_packed = Some(framed.clone());
        }
        framed
    }
}

/// Frame an already tag-terminated body (initial URL string + tag
/// stream) into a complete wire payload: preheader, tag-count quirk,
/// compression, and the 6-byte outer header. Shared by `Page::finalize`
/// and the paginator, which must frame each split part identically.
pub fn frame_body(
    body: &[u8],
    client_version: ClientVersion,
    compression: Compression,
    part_cur: u32,
    part_cnt: u32,
    policy: TagCountMode,
    tagcount_delta: i32,
) -> Vec<u8> {
    let scanned = scan(body);
    let wire_tag_count =
        (policy.adjust(scanned.tag_count, scanned.ended_with_q) as i32 + tagcount_delta).max(0) as u32;
    let wire_str_count = scanned.str_count + 1;

    let header_len = client_version.header_len();
    let mut header = vec![0u8; header_len];
    write_swap16_at(&mut header, 18, wire_tag_count as u16);
    write_swap16_at(&mut header, 20, part_cur as u16);
    write_swap16_at(&mut header, 22, part_cnt as u16);
    write_swap16_at(&mut header, 26, wire_str_count as u16);
    write_swap16_at(&mut header, 31, 0xFFFF);

    let mut payload = header;
    payload.extend_from_slice(body);

    let compressed = compress(compression, &payload);

    let mut framed = Vec::with_capacity(6 + compressed.len());
    let version_word = u16::from(client_version.version_byte()) | (u16::from(compression.byte()) << 8);
    framed.extend_from_slice(&version_word.to_le_bytes());
    let total_size = (6 + compressed.len()) as u32;
    framed.extend_from_slice(&total_size.to_be_bytes());
    framed.extend_from_slice(&compressed);
    framed
}

/// Ensure `data`'s tag stream ends on a well-formed `Q`; append one
/// (and bump `tag_count`) if it does not. Shared by the writer and the
/// normalizer so both apply the identical definition of "terminated".
pub fn ensure_trailing_q(data: &mut Vec<u8>, tag_count: &mut u32) {
    if scan(data).ended_with_q {
        return;
    }
    data.push(byte::END);
    *tag_count += 1;
}

fn write_swap16_at(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}

/// Read a swap-16 field back out of a preheader (used by the normalizer).
pub fn read_swap16_at(buf: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([buf[offset], buf[offset + 1]])
}

pub(crate) fn compress(method: Compression, payload: &[u8]) -> Vec<u8> {
    match method {
        Compression::None => payload.to_vec(),
        Compression::Gzip => {
            let mut enc = GzEncoder::new(Vec::new(), Flate2Level::default());
            enc.write_all(payload).expect("in-memory writer");
            enc.finish().expect("in-memory writer")
        }
        Compression::Deflate => {
            let mut enc = DeflateEncoder::new(Vec::new(), Flate2Level::default());
            enc.write_all(payload).expect("in-memory writer");
            enc.finish().expect("in-memory writer")
        }
    }
}

/// Decompress a body given the framing header's compression byte.
pub fn decompress(method: Compression, body: &[u8]) -> Result<Vec<u8>, std::io::Error> {
    use flate2::read::{DeflateDecoder, GzDecoder};
    use std::io::Read;
    match method {
        Compression::None => Ok(body.to_vec()),
        Compression::Gzip => {
            let mut out = Vec::new();
            GzDecoder::new(body).read_to_end(&mut out)?;
            Ok(out)
        }
        Compression::Deflate => {
            let mut out = Vec::new();
            DeflateDecoder::new(body).read_to_end(&mut out)?;
            Ok(out)
        }
    }
}
