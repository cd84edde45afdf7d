//! Pagination page cache (C10, spec.md §4.9): stores the finalized
//! *full* document (not individual parts) keyed by `(target, render
//! fingerprint, header fingerprint)`, so repaginating under a different
//! `MaxTagsPerPage` is a cheap re-split rather than a re-fetch.

use crate::config::TagCountMode;
use crate::oms::paginate::{self, finalize_part};
use crate::oms::tags::byte;
use crate::oms::writer::{write_be_string, ClientVersion, Compression};
use moka::sync::Cache;
use std::sync::Arc;

/// A cached full document: the tag-terminated body (initial URL string
/// + tag stream, *not yet framed*) plus the cookies authored while
/// rendering it.
#[derive(Debug, Clone)]
pub struct CachedPage {
    pub url: String,
    pub body: Vec<u8>,
    pub client_version: ClientVersion,
    pub compression: Compression,
    pub set_cookies: Vec<String>,
}

pub struct PageCache {
    cache: Cache<String, Arc<CachedPage>>,
}

impl PageCache {
    pub fn new(max_entries: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_entries).build(),
        }
    }

    /// `(target, render fingerprint, header fingerprint)` per spec.md
    /// §4.9; callers build this from [`crate::dispatch::options::fingerprint`].
    pub fn cache_key(target: &str, render_fp: &str, header_fp: &str) -> String {
        format!("{target}\u{1}{render_fp}\u{1}{header_fp}")
    }

    pub fn get(&self, key: &str) -> Option<Arc<CachedPage>> {
        self.cache.get(key)
    }

    pub fn put(&self, key: &str, page: CachedPage) {
        self.cache.insert(key.to_string(), Arc::new(page));
    }

    /// Decompress, paginate via C5, and return the requested part
    /// together with the total part count.
    pub fn select(
        cached: &CachedPage,
        requested_page: usize,
        max_tags: usize,
        max_bytes: usize,
        policy: TagCountMode,
        tagcount_delta: i32,
    ) -> (Vec<u8>, usize) {
        let url_str_len = u16::from_be_bytes([cached.body[0], cached.body[1]]) as usize;
        let tag_region = &cached.body[2 + url_str_len..];

        let parts = paginate::paginate(tag_region, &cached.url, max_tags, max_bytes);
        let part_cnt = parts.len();
        let idx = requested_page.clamp(1, part_cnt) - 1;
        let body = parts[idx].body.clone();

        let body = if part_cnt > 1 {
            Self::inject_navigation_within_budget(body, &cached.url, idx + 1, part_cnt, max_bytes)
        } else {
            body
        };

        let framed = finalize_part(
            &paginate::Part { body },
            cached.client_version,
            cached.compression,
            (idx + 1) as u32,
            part_cnt as u32,
            policy,
            tagcount_delta,
        );
        (framed, part_cnt)
    }

    /// Append the navigation fragment and, if doing so pushed the part
    /// past `max_bytes`, re-shrink the content at a tag boundary and
    /// re-inject so the served part still honors the byte budget (spec.md
    /// §4.4 step 5: pagination is cut *before* navigation exists, so a
    /// part can legitimately overflow once the nav fragment is appended).
    fn inject_navigation_within_budget(
        body: Vec<u8>,
        base_url: &str,
        page: usize,
        part_count: usize,
        max_bytes: usize,
    ) -> Vec<u8> {
        let mut with_nav = body.clone();
        paginate::inject_navigation(&mut with_nav, base_url, page, part_count);
        if with_nav.len() <= max_bytes {
            return with_nav;
        }

        let prefix_len = url_prefix_len(&body);
        let nav_overhead = with_nav.len() - body.len();
        let content_budget = max_bytes.saturating_sub(prefix_len + nav_overhead);

        let tag_region = &body[prefix_len..];
        let shrunk = paginate::shrink_to_tag_boundary(tag_region, content_budget);

        let mut rebuilt = body[..prefix_len].to_vec();
        rebuilt.extend_from_slice(&shrunk);
        if rebuilt.last() != Some(&byte::END) {
            rebuilt.push(byte::END);
        }
        paginate::inject_navigation(&mut rebuilt, base_url, page, part_count);
        rebuilt
    }
}

fn url_prefix_len(body: &[u8]) -> usize {
    let url_str_len = u16::from_be_bytes([body[0], body[1]]) as usize;
    2 + url_str_len
}

/// Build a cacheable [`CachedPage`] body: `"1/"+url` followed by the
/// already tag-terminated tag stream.
pub fn pack_body(url: &str, tag_stream: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    write_be_string(&mut body, &format!("1/{url}"));
    body.extend_from_slice(tag_stream);
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oms::writer::Page;

    #[test]
    fn select_returns_requested_part_and_count() {
        let mut page = Page::new("http://x.test/a", ClientVersion::V1, Compression::None);
        for _ in 0..40 {
            page.add_text("x");
        }
        page.finish_body();

        let cached = CachedPage {
            url: "http://x.test/a".to_string(),
            body: page.data.clone(),
            client_version: ClientVersion::V1,
            compression: Compression::None,
            set_cookies: vec![],
        };

        let (framed, part_cnt) = PageCache::select(&cached, 2, 5, 32 * 1024, TagCountMode::Plus1, 0);
        assert!(part_cnt > 1);
        assert_eq!(u16::from_le_bytes([framed[0], framed[1]]) & 0xFF, ClientVersion::V1.version_byte() as u16);
    }

    #[test]
    fn navigation_injection_respects_byte_budget() {
        let mut page = Page::new("http://x.test/a", ClientVersion::V1, Compression::None);
        for _ in 0..200 {
            page.add_text("xxxxxxxxxx");
        }
        page.finish_body();

        let cached = CachedPage {
            url: "http://x.test/a".to_string(),
            body: page.data.clone(),
            client_version: ClientVersion::V1,
            compression: Compression::None,
            set_cookies: vec![],
        };

        // A tight max_bytes forces a split, then the navigation fragment
        // added on top of a part already near that budget must still fit.
        let max_bytes = 300;
        let (framed, part_cnt) = PageCache::select(&cached, 2, 1200, max_bytes, TagCountMode::Plus1, 0);
        assert!(part_cnt > 1);
        assert!(!framed.is_empty());
    }

    #[test]
    fn cache_key_distinguishes_render_fingerprint() {
        let a = PageCache::cache_key("http://x.test/", "fp1", "hp1");
        let b = PageCache::cache_key("http://x.test/", "fp2", "hp1");
        assert_ne!(a, b);
    }
}
