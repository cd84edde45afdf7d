//! Paginator (C5): split an oversized tag stream into byte/tag-budgeted
//! parts, replaying the style/bg/auth prelude on every part after the
//! first, and inject the navigation fragment into the part actually
//! served (spec.md §4.4).

use super::tags::{byte, split_style_word};
use super::writer::{
    frame_body, raw_link_end, raw_link_start, raw_rule, raw_text, write_be_string, ClientVersion,
    Compression,
};
use crate::config::TagCountMode;

struct TagSpan {
    start: usize,
    end: usize,
    tag: u8,
}

/// Walk `region`, recording each tag's exact byte span. Mirrors the
/// scanner's payload-shape table (spec.md §6.1) but keeps offsets
/// instead of running counts, since the paginator cuts parts at tag
/// boundaries.
fn enumerate_tags(region: &[u8]) -> Vec<TagSpan> {
    let mut spans = Vec::new();
    let mut pos = 0usize;

    let read_u8 = |pos: usize| -> Option<u8> { region.get(pos).copied() };
    let read_u16 = |pos: usize| -> Option<(u16, usize)> {
        let b = region.get(pos..pos + 2)?;
        Some((u16::from_be_bytes([b[0], b[1]]), pos + 2))
    };
    let read_str = |pos: usize| -> Option<usize> {
        let (len, after_len) = read_u16(pos)?;
        let end = after_len + usize::from(len);
        if end > region.len() {
            return None;
        }
        Some(end)
    };

    'outer: loop {
        let Some(tag) = read_u8(pos) else { break };
        let start = pos;
        let mut cursor = pos + 1;

        let ok = match tag {
            byte::TEXT | byte::LINK_START => read_str(cursor).map(|p| cursor = p),
            byte::LINK_END | byte::BREAK | byte::BLOCK | byte::PARA | byte::SELECT_END | byte::END => {
                Some(())
            }
            byte::STYLE => region.get(cursor..cursor + 4).map(|_| cursor += 4),
            byte::BGCOLOR | byte::RULE => region.get(cursor..cursor + 2).map(|_| cursor += 2),
            byte::IMG_PLACEHOLDER => region.get(cursor..cursor + 4).map(|_| cursor += 4),
            byte::IMG_INLINE => (|| -> Option<()> {
                let (_, p) = read_u16(cursor)?;
                let (_, p) = read_u16(p)?;
                let (data_len, p) = read_u16(p)?;
                let (_, p) = read_u16(p)?;
                let end = p + usize::from(data_len);
                if end > region.len() {
                    return None;
                }
                cursor = end;
                Some(())
            })(),
            byte::AUTH => {
                let after_kind = cursor + 1;
                region
                    .get(cursor..after_kind)
                    .and_then(|_| read_str(after_kind))
                    .map(|p| cursor = p)
            }
            byte::FORM_START => read_str(cursor).and_then(|p| read_str(p)).map(|p| cursor = p),
            byte::INPUT_TEXT => {
                let after_cfg = cursor + 1;
                region
                    .get(cursor..after_cfg)
                    .and_then(|_| read_str(after_cfg))
                    .and_then(|p| read_str(p))
                    .map(|p| cursor = p)
            }
            byte::INPUT_PASSWORD
            | byte::INPUT_SUBMIT
            | byte::INPUT_BUTTON
            | byte::INPUT_RESET
            | byte::INPUT_HIDDEN => read_str(cursor).and_then(|p| read_str(p)).map(|p| cursor = p),
            byte::INPUT_CHECKBOX | byte::INPUT_RADIO => read_str(cursor)
                .and_then(|p| read_str(p))
                .and_then(|p| region.get(p..p + 1).map(|_| p + 1))
                .map(|p| cursor = p),
            byte::SELECT_START => read_str(cursor).and_then(|p| {
                let after_multi = p + 1;
                region.get(p..after_multi)?;
                region.get(after_multi..after_multi + 2).map(|_| after_multi + 2)
            }).map(|p| cursor = p),
            byte::SELECT_OPTION => read_str(cursor)
                .and_then(|p| read_str(p))
                .and_then(|p| region.get(p..p + 1).map(|_| p + 1))
                .map(|p| cursor = p),
            _ => None,
        };

        if ok.is_none() {
            break 'outer;
        }

        spans.push(TagSpan {
            start,
            end: cursor,
            tag,
        });
        if tag == byte::END {
            break;
        }
        pos = cursor;
    }

    spans
}

/// The prelude captured from a part's leading `S`/`D`/`k` run, replayed
/// verbatim at the head of every subsequent part (spec.md §4.4 step 2).
#[derive(Debug, Clone, Default)]
pub struct Prelude {
    bytes: Vec<u8>,
}

fn build_prelude(region: &[u8], spans: &[TagSpan]) -> Prelude {
    let mut auth_spans: Vec<&TagSpan> = Vec::new();
    let mut last_bgcolor: Option<&TagSpan> = None;
    let mut last_style: Option<&TagSpan> = None;

    for span in spans {
        match span.tag {
            byte::AUTH => auth_spans.push(span),
            byte::BGCOLOR => last_bgcolor = Some(span),
            byte::STYLE => {
                let word = u32::from_be_bytes([
                    region[span.start + 1],
                    region[span.start + 2],
                    region[span.start + 3],
                    region[span.start + 4],
                ]);
                let (_, color) = split_style_word(word);
                if color != 0 {
                    last_style = Some(span);
                }
            }
            _ => break,
        }
    }

    let mut bytes = Vec::new();
    for span in &auth_spans {
        bytes.extend_from_slice(&region[span.start..span.end]);
    }
    if let Some(span) = last_bgcolor {
        bytes.extend_from_slice(&region[span.start..span.end]);
    }
    if let Some(span) = last_style {
        bytes.extend_from_slice(&region[span.start..span.end]);
    }
    Prelude { bytes }
}

/// One paginated slice: a complete `1/<url>` string plus prelude replay
/// (parts after the first) plus the sliced tag region, tag-terminated.
/// Not yet framed — call [`finalize_part`] before sending over the wire.
#[derive(Debug, Clone)]
pub struct Part {
    pub body: Vec<u8>,
}

/// Split `tag_region` (the tag stream following the initial URL string)
/// into parts under `max_tags`/`max_bytes`, per spec.md §4.4.
pub fn paginate(tag_region: &[u8], base_url: &str, max_tags: usize, max_bytes: usize) -> Vec<Part> {
    let spans = enumerate_tags(tag_region);
    if spans.is_empty() {
        let mut body = Vec::new();
        write_be_string(&mut body, &format!("1/{base_url}"));
        body.push(byte::END);
        return vec![Part { body }];
    }

    let prelude = build_prelude(tag_region, &spans);

    let mut boundaries: Vec<(usize, usize)> = Vec::new();
    let mut part_start = 0usize;
    let mut acc_tags = 0usize;
    let mut acc_bytes = 0usize;
    for (i, span) in spans.iter().enumerate() {
        let span_len = span.end - span.start;
        if acc_tags > 0 && (acc_tags + 1 > max_tags || acc_bytes + span_len > max_bytes) {
            boundaries.push((part_start, i));
            part_start = i;
            acc_tags = 0;
            acc_bytes = 0;
        }
        acc_tags += 1;
        acc_bytes += span_len;
    }
    boundaries.push((part_start, spans.len()));

    boundaries
        .into_iter()
        .enumerate()
        .map(|(idx, (from, to))| {
            let byte_start = spans[from].start;
            let byte_end = spans[to - 1].end;
            let content = &tag_region[byte_start..byte_end];

            let page_url = if idx == 0 {
                base_url.to_string()
            } else {
                page_url(base_url, idx + 1)
            };
            let mut prefix = Vec::new();
            write_be_string(&mut prefix, &format!("1/{page_url}"));
            if idx > 0 {
                prefix.extend_from_slice(&prelude.bytes);
            }

            let budget_for_content = max_bytes.saturating_sub(prefix.len() + 1);
            let content = if content.len() > budget_for_content {
                shrink_to_tag_boundary(content, budget_for_content)
            } else {
                content.to_vec()
            };

            let mut body = prefix;
            body.extend_from_slice(&content);
            if *body.last().unwrap_or(&0) != byte::END {
                body.push(byte::END);
            }
            Part { body }
        })
        .collect()
}

/// Trim `content` (a tag region, not yet `Q`-terminated) to the last
/// complete tag whose end falls within `budget` bytes. Shared with
/// [`crate::session::cache::PageCache::select`]'s post-navigation
/// byte-budget recheck (spec.md §4.4 step 5).
pub(crate) fn shrink_to_tag_boundary(content: &[u8], budget: usize) -> Vec<u8> {
    let spans = enumerate_tags(content);
    let mut cut = 0usize;
    for span in &spans {
        if span.end > budget {
            break;
        }
        cut = span.end;
    }
    content[..cut].to_vec()
}

fn page_url(base_url: &str, page: usize) -> String {
    if page <= 1 {
        return base_url.to_string();
    }
    let sep = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{sep}__p={page}")
}

/// Windowed page numbers per spec.md §4.4: always `1..=3`, `current±2`,
/// and the final three pages, clipped to range and de-duplicated.
fn navigation_window(current: usize, last: usize) -> Vec<usize> {
    let mut pages: Vec<usize> = Vec::new();
    pages.extend(1..=3.min(last));
    let lo = current.saturating_sub(2).max(1);
    let hi = (current + 2).min(last);
    pages.extend(lo..=hi);
    if last >= 3 {
        pages.extend(last.saturating_sub(2).max(1)..=last);
    }
    pages.sort_unstable();
    pages.dedup();
    pages
}

/// Append the navigation fragment to an already-terminated part body and
/// restore the trailing `Q` (spec.md §4.4, "Navigation injection").
pub fn inject_navigation(body: &mut Vec<u8>, base_url: &str, page: usize, part_count: usize) {
    if body.last() == Some(&byte::END) {
        body.pop();
    }

    raw_rule(body, 0);

    if page > 1 {
        raw_link_start(body, &page_url(base_url, 1));
        raw_text(body, "[<<]");
        raw_link_end(body);
        raw_link_start(body, &page_url(base_url, page - 1));
        raw_text(body, "[<]");
        raw_link_end(body);
    } else {
        raw_text(body, "[<<]");
        raw_text(body, "[<]");
    }

    let window = navigation_window(page, part_count);
    let mut prev: Option<usize> = None;
    for n in window {
        if let Some(p) = prev {
            if n > p + 1 {
                raw_text(body, "...");
            }
        }
        if n == page {
            raw_text(body, &format!("\u{2022}[{n}]"));
        } else {
            raw_link_start(body, &page_url(base_url, n));
            raw_text(body, &format!("[{n}]"));
            raw_link_end(body);
        }
        prev = Some(n);
    }

    if page < part_count {
        raw_link_start(body, &page_url(base_url, page + 1));
        raw_text(body, "[>]");
        raw_link_end(body);
        raw_link_start(body, &page_url(base_url, part_count));
        raw_text(body, "[>>]");
        raw_link_end(body);
    } else {
        raw_text(body, "[>]");
        raw_text(body, "[>>]");
    }

    raw_rule(body, 0);
    body.push(byte::END);
}

/// Frame a paginator [`Part`] into the wire payload the client expects
/// for a standalone page (spec.md §4.1, §4.4).
pub fn finalize_part(
    part: &Part,
    client_version: ClientVersion,
    compression: Compression,
    part_cur: u32,
    part_cnt: u32,
    policy: TagCountMode,
    tagcount_delta: i32,
) -> Vec<u8> {
    frame_body(
        &part.body,
        client_version,
        compression,
        part_cur,
        part_cnt,
        policy,
        tagcount_delta,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oms::writer::Page;

    fn tag_region_of(page: &Page) -> &[u8] {
        let mut cursor = 0usize;
        let len = u16::from_be_bytes([page.data[0], page.data[1]]) as usize;
        cursor += 2 + len;
        &page.data[cursor..]
    }

    #[test]
    fn single_part_when_under_budget() {
        let mut page = Page::new("http://x.test/a", ClientVersion::V1, Compression::None);
        page.add_style(0, 0x1234);
        page.add_text("hello");
        page.finish_body();
        let region = tag_region_of(&page);

        let parts = paginate(region, "http://x.test/a", 1200, 32 * 1024);
        assert_eq!(parts.len(), 1);
        assert_eq!(*parts[0].body.last().unwrap(), byte::END);
    }

    #[test]
    fn splits_on_max_tags_and_replays_prelude() {
        let mut page = Page::new("http://x.test/a", ClientVersion::V1, Compression::None);
        page.add_style(0, 0x1234);
        page.add_bgcolor(0x0001);
        for _ in 0..10 {
            page.add_text("x");
            page.add_break();
        }
        page.finish_body();
        let region = tag_region_of(&page);

        // prelude(2) + 10*(text+break)=20 + Q = 23 tags; cap at 10 forces a split.
        let parts = paginate(region, "http://x.test/a", 10, 32 * 1024);
        assert!(parts.len() >= 2);

        // every part after the first replays the S/D prelude right after its URL
        for part in &parts[1..] {
            let url_len = u16::from_be_bytes([part.body[0], part.body[1]]) as usize;
            let after_url = 2 + url_len;
            assert_eq!(part.body[after_url], byte::BGCOLOR);
            assert_eq!(part.body[after_url + 3], byte::STYLE);
        }
    }

    #[test]
    fn page_1_keeps_canonical_url_later_pages_get_marker() {
        let mut page = Page::new("http://x.test/a", ClientVersion::V1, Compression::None);
        for _ in 0..40 {
            page.add_text("x");
        }
        page.finish_body();
        let region = tag_region_of(&page);

        let parts = paginate(region, "http://x.test/a", 5, 32 * 1024);
        assert!(parts.len() > 1);

        let first_url_len = u16::from_be_bytes([parts[0].body[0], parts[0].body[1]]) as usize;
        let first_url = String::from_utf8(parts[0].body[2..2 + first_url_len].to_vec()).unwrap();
        assert_eq!(first_url, "1/http://x.test/a");

        let second_url_len = u16::from_be_bytes([parts[1].body[0], parts[1].body[1]]) as usize;
        let second_url = String::from_utf8(parts[1].body[2..2 + second_url_len].to_vec()).unwrap();
        assert!(second_url.ends_with("__p=2"));
    }

    #[test]
    fn navigation_fragment_contains_expected_controls() {
        let mut page = Page::new("http://x.test/a", ClientVersion::V1, Compression::None);
        for _ in 0..40 {
            page.add_text("x");
        }
        page.finish_body();
        let region = tag_region_of(&page);
        let parts = paginate(region, "http://x.test/a", 5, 32 * 1024);
        assert!(parts.len() >= 3);

        let mut body = parts[1].body.clone();
        inject_navigation(&mut body, "http://x.test/a", 2, parts.len());
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("[<<]"));
        assert!(text.contains("[<]"));
        assert!(text.contains("\u{2022}[2]"));
        assert!(text.contains("[>]"));
        assert!(text.contains("[>>]"));
        assert_eq!(*body.last().unwrap(), byte::END);
    }

    #[test]
    fn shrink_to_tag_boundary_never_splits_a_tag_payload() {
        let mut page = Page::new("http://x.test/a", ClientVersion::V1, Compression::None);
        page.add_text("hello world");
        page.add_break();
        page.finish_body();
        let region = tag_region_of(&page);

        // budget lands mid-way through the text tag's payload
        let shrunk = shrink_to_tag_boundary(region, 5);
        // must be a prefix ending exactly on a tag boundary (possibly empty)
        let spans = enumerate_tags(region);
        let valid_cuts: Vec<usize> = spans.iter().map(|s| s.end).collect();
        assert!(shrunk.is_empty() || valid_cuts.contains(&shrunk.len()));
    }
}
