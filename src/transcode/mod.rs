//! HTML-to-OMS transcoder (C8, spec.md §4.7).

pub mod charset;
pub mod forms;
pub mod walk;

pub use walk::{transcode, BackgroundSource, DomElement, TranscodeContext, WalkState};

use crate::css::Stylesheet;
use markup5ever_rcdom::{Handle, NodeData};

/// Collect every candidate image URL (`img[src]`, lazy-load attributes,
/// and `picture > source[srcset]`) referenced by the document, so the
/// caller can resolve them through C7 *before* the synchronous walk
/// starts (see [`walk`]'s module doc for why the two phases are split).
pub fn collect_image_sources(node: &Handle, base_url: &url::Url, out: &mut Vec<String>) {
    if let NodeData::Element { name, attrs, .. } = &node.data {
        let tag = name.local.to_string();
        if tag == "img" || tag == "source" {
            let attrs = attrs.borrow();
            let src = ["src", "data-src", "data-original", "data-lazy-src", "srcset"]
                .iter()
                .find_map(|key| attrs.iter().find(|a| a.name.local.to_string() == *key))
                .map(|a| a.value.to_string());
            if let Some(src) = src {
                let first = src.split(',').next().unwrap_or("").trim().split_whitespace().next().unwrap_or("");
                if !first.is_empty() {
                    if let Ok(abs) = base_url.join(first) {
                        out.push(abs.to_string());
                    }
                }
            }
        }
    }
    for child in node.children.borrow().iter() {
        collect_image_sources(child, base_url, out);
    }
}

/// Collect every background-image eligible for inlining (spec.md §4.6),
/// so the caller can fetch, crop, and cache each one under its
/// region-augmented key before the synchronous walk runs. Requires the
/// stylesheet to already be built, unlike [`collect_image_sources`].
pub fn collect_background_sources(node: &Handle, stylesheet: &Stylesheet, base_url: &url::Url, out: &mut Vec<BackgroundSource>) {
    if matches!(&node.data, NodeData::Element { .. }) {
        if let Some(source) = walk::eligible_background(node, stylesheet, base_url) {
            out.push(source);
        }
    }
    for child in node.children.borrow().iter() {
        collect_background_sources(child, stylesheet, base_url, out);
    }
}

/// Collect `<style>` text and `<link rel=stylesheet href>` URLs in
/// document order, for [`crate::css::build_stylesheet`].
pub fn collect_style_sources(node: &Handle, out: &mut Vec<crate::css::StyleSource>) {
    if let NodeData::Element { name, attrs, .. } = &node.data {
        let tag = name.local.to_string();
        let attrs_ref = attrs.borrow();
        if tag == "style" {
            let mut text = String::new();
            for child in node.children.borrow().iter() {
                if let NodeData::Text { contents } = &child.data {
                    text.push_str(&contents.borrow());
                }
            }
            out.push(crate::css::StyleSource::Inline(text));
        } else if tag == "link" {
            let is_stylesheet = attrs_ref
                .iter()
                .find(|a| a.name.local.to_string() == "rel")
                .map(|a| a.value.to_string().eq_ignore_ascii_case("stylesheet"))
                .unwrap_or(false);
            if is_stylesheet {
                if let Some(href) = attrs_ref.iter().find(|a| a.name.local.to_string() == "href") {
                    out.push(crate::css::StyleSource::Linked(href.value.to_string()));
                }
            }
        }
    }
    for child in node.children.borrow().iter() {
        collect_style_sources(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use html5ever::tendril::TendrilSink;
    use markup5ever_rcdom::RcDom;
    use url::Url;

    fn parse(html: &str) -> RcDom {
        html5ever::parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())
            .unwrap()
    }

    #[test]
    fn collects_image_sources_including_lazy_attrs() {
        let dom = parse(r#"<html><body><img data-src="/a.png"><img src="b.png"></body></html>"#);
        let base = Url::parse("http://x.test/").unwrap();
        let mut out = Vec::new();
        collect_image_sources(&dom.document, &base, &mut out);
        assert_eq!(out, vec!["http://x.test/a.png", "http://x.test/b.png"]);
    }

    #[test]
    fn collects_eligible_background_image_with_rect_key() {
        let dom = parse(
            r#"<html><body><div style="width:32px;height:16px;background-image:url(tiny.png)"></div></body></html>"#,
        );
        let base = Url::parse("http://x.test/").unwrap();
        let sheet = crate::css::Stylesheet::default();
        let mut out = Vec::new();
        collect_background_sources(&dom.document, &sheet, &base, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "http://x.test/tiny.png");
        assert_eq!(out[0].rect, (0, 0, 32, 16));
        assert_eq!(out[0].key, "http://x.test/tiny.png#rect=0,0,32,16");
    }

    #[test]
    fn oversized_background_box_is_not_collected() {
        let dom = parse(
            r#"<html><body><div style="width:200px;height:16px;background-image:url(tiny.png)"></div></body></html>"#,
        );
        let base = Url::parse("http://x.test/").unwrap();
        let sheet = crate::css::Stylesheet::default();
        let mut out = Vec::new();
        collect_background_sources(&dom.document, &sheet, &base, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn collects_inline_and_linked_style_sources_in_order() {
        let dom = parse(
            r#"<html><head><link rel="stylesheet" href="a.css"><style>body{}</style></head></html>"#,
        );
        let mut out = Vec::new();
        collect_style_sources(&dom.document, &mut out);
        assert_eq!(out.len(), 2);
        assert!(matches!(out[0], crate::css::StyleSource::Linked(_)));
        assert!(matches!(out[1], crate::css::StyleSource::Inline(_)));
    }
}
