//! Tag-stream scanner (C3).
//!
//! Walks a body starting at the initial length-prefixed URL string and
//! counts tags/strings, matching each tag's exact wire payload shape so
//! the writer, paginator, and normalizer all agree on tag boundaries
//! (spec.md §4.2, §6.1).

use super::tags::byte;

/// Result of a scan pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Tags consumed (the initial URL string is not a tag).
    pub tag_count: u32,
    /// Length-prefixed strings consumed, including the initial URL string.
    pub str_count: u32,
    /// Bytes consumed from the start of `body`.
    pub consumed: usize,
    /// `true` if the walk ended on a well-formed trailing `Q` tag.
    pub ended_with_q: bool,
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn read_u8(&mut self) -> Option<u8> {
        let b = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    fn read_u16_be(&mut self) -> Option<u16> {
        let bytes = self.data.get(self.pos..self.pos + 2)?;
        self.pos += 2;
        Some(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn read_u32_be(&mut self) -> Option<u32> {
        let bytes = self.data.get(self.pos..self.pos + 4)?;
        self.pos += 4;
        Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn skip(&mut self, n: usize) -> Option<()> {
        if self.pos + n > self.data.len() {
            return None;
        }
        self.pos += n;
        Some(())
    }

    /// Consume a u16-BE length-prefixed string, returning only its length
    /// (the scanner does not need the bytes themselves).
    fn read_string_len(&mut self) -> Option<u16> {
        let len = self.read_u16_be()?;
        self.skip(usize::from(len))?;
        Some(len)
    }
}

/// Scan `body`, which must begin with the initial length-prefixed URL
/// string. Stops at the first unknown tag byte or truncated payload and
/// reports partial counts, per spec.md §4.2.
pub fn scan(body: &[u8]) -> ScanResult {
    let mut cur = Cursor::new(body);
    let mut result = ScanResult::default();

    if cur.read_string_len().is_none() {
        return result;
    }
    result.str_count = 1;
    result.consumed = cur.pos;

    loop {
        let before = cur.pos;
        let Some(tag) = cur.read_u8() else { break };
        let mut strings_here = 0u32;

        let ok = match tag {
            byte::TEXT => cur.read_string_len().map(|_| strings_here += 1).is_some(),
            byte::LINK_START => cur.read_string_len().map(|_| strings_here += 1).is_some(),
            byte::LINK_END
            | byte::BREAK
            | byte::BLOCK
            | byte::PARA
            | byte::SELECT_END
            | byte::END => true,
            byte::STYLE => cur.read_u32_be().is_some(),
            byte::BGCOLOR | byte::RULE => cur.read_u16_be().is_some(),
            byte::IMG_PLACEHOLDER => cur.read_u16_be().and(cur.read_u16_be()).is_some(),
            byte::IMG_INLINE => (|| -> Option<()> {
                cur.read_u16_be()?; // w
                cur.read_u16_be()?; // h
                let data_len = cur.read_u16_be()?;
                cur.read_u16_be()?; // rsvd
                cur.skip(usize::from(data_len))
            })()
            .is_some(),
            byte::AUTH => {
                cur.read_u8().is_some()
                    && cur.read_string_len().map(|_| strings_here += 1).is_some()
            }
            byte::FORM_START => {
                let a = cur.read_string_len().map(|_| strings_here += 1).is_some();
                let b = cur.read_string_len().map(|_| strings_here += 1).is_some();
                a && b
            }
            byte::INPUT_TEXT => {
                let has_cfg = cur.read_u8().is_some();
                let a = cur.read_string_len().map(|_| strings_here += 1).is_some();
                let b = cur.read_string_len().map(|_| strings_here += 1).is_some();
                has_cfg && a && b
            }
            byte::INPUT_PASSWORD
            | byte::INPUT_SUBMIT
            | byte::INPUT_BUTTON
            | byte::INPUT_RESET
            | byte::INPUT_HIDDEN => {
                let a = cur.read_string_len().map(|_| strings_here += 1).is_some();
                let b = cur.read_string_len().map(|_| strings_here += 1).is_some();
                a && b
            }
            byte::INPUT_CHECKBOX | byte::INPUT_RADIO => {
                let a = cur.read_string_len().map(|_| strings_here += 1).is_some();
                let b = cur.read_string_len().map(|_| strings_here += 1).is_some();
                let c = cur.read_u8().is_some();
                a && b && c
            }
            byte::SELECT_START => {
                let name = cur.read_string_len().map(|_| strings_here += 1).is_some();
                let multiple = cur.read_u8().is_some();
                let count = cur.read_u16_be().is_some();
                name && multiple && count
            }
            byte::SELECT_OPTION => {
                let a = cur.read_string_len().map(|_| strings_here += 1).is_some();
                let b = cur.read_string_len().map(|_| strings_here += 1).is_some();
                let c = cur.read_u8().is_some();
                a && b && c
            }
            _ => false,
        };

        if !ok {
            cur.pos = before;
            break;
        }

        result.tag_count += 1;
        result.str_count += strings_here;
        result.consumed = cur.pos;

        if tag == byte::END {
            result.ended_with_q = true;
            break;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oms::writer::Page;
    use crate::oms::{ClientVersion, Compression};

    #[test]
    fn scans_a_minimal_well_formed_page() {
        let mut page = Page::new("http://example.test/", ClientVersion::V1, Compression::None);
        page.add_block();
        page.add_text("hi");
        page.add_break();
        page.finish_body();
        let result = scan(&page.data);
        assert!(result.ended_with_q);
        assert_eq!(result.consumed, page.data.len());
        // block(1) + text(1) + break(1) + Q(1)
        assert_eq!(result.tag_count, 4);
        // initial url(1) + text string(1)
        assert_eq!(result.str_count, 2);
    }

    #[test]
    fn halts_on_unknown_tag_and_reports_partial() {
        let mut body = Vec::new();
        body.extend_from_slice(&6u16.to_be_bytes());
        body.extend_from_slice(b"1/http");
        body.push(b'+');
        body.push(b'?'); // unknown
        let result = scan(&body);
        assert_eq!(result.tag_count, 1);
        assert!(!result.ended_with_q);
        assert_eq!(result.consumed, 8 + 1);
    }
}
