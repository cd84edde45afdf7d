//! HTML→OMS transcoder (C8, spec.md §4.7): a DFS over the parsed
//! document carrying `WalkState`, emitting tags through [`Page`] (C2).
//!
//! Image and external-stylesheet fetches happen in a pass *before* this
//! walk (see [`crate::transcode::collect_image_sources`]) so the DFS
//! itself stays synchronous — `markup5ever_rcdom`'s `Rc<RefCell<_>>`
//! tree isn't `Send`, and there's no reason to hold it across an
//! `.await` point when the walk never needs to block.

use crate::css::selector::ElementInfo;
use crate::css::{self, ScreenContext, Stylesheet};
use crate::image::CachedImage;
use crate::oms::color::{parse_color, Rgb};
use crate::oms::tags::style_bit;
use crate::oms::writer::Page;
use crate::transcode::forms::{self, FormContext};
use markup5ever_rcdom::{Handle, NodeData};
use std::collections::HashMap;
use url::Url;

const SKIP_TEXT_TAGS: &[&str] = &["style", "script", "noscript", "meta", "link", "head"];
const BLOCK_CONTAINERS: &[&str] = &[
    "div", "section", "article", "header", "footer", "main", "nav", "aside",
];

#[derive(Clone)]
pub struct DomElement(pub Handle);

impl ElementInfo for DomElement {
    fn tag_name(&self) -> String {
        match &self.0.data {
            NodeData::Element { name, .. } => name.local.to_string(),
            _ => String::new(),
        }
    }
    fn id(&self) -> Option<String> {
        self.attr("id")
    }
    fn classes(&self) -> Vec<String> {
        self.attr("class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }
    fn parent(&self) -> Option<Self> {
        let parent = self.0.parent.take();
        let result = parent.clone();
        self.0.parent.set(parent);
        result.and_then(|weak| weak.upgrade()).map(DomElement)
    }
    fn inline_style(&self) -> Option<String> {
        self.attr("style")
    }
}

impl DomElement {
    pub fn attr(&self, name: &str) -> Option<String> {
        match &self.0.data {
            NodeData::Element { attrs, .. } => attrs
                .borrow()
                .iter()
                .find(|a| a.name.local.to_string() == name)
                .map(|a| a.value.to_string()),
            _ => None,
        }
    }
}

fn tag_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

fn children(node: &Handle) -> Vec<Handle> {
    node.children.borrow().clone()
}

fn attr(node: &Handle, name: &str) -> Option<String> {
    DomElement(node.clone()).attr(name)
}

#[derive(Debug, Clone)]
enum ListKind {
    Ordered,
    Unordered,
    Definition,
}

#[derive(Debug, Clone)]
struct ListFrame {
    kind: ListKind,
    index: u32,
    style_type: String,
}

/// Carried down (and restored on the way back up) the DFS, per
/// spec.md §4.7.
#[derive(Debug, Clone, Default)]
pub struct WalkState {
    pre: bool,
    skip_text_depth: u32,
    lists: Vec<ListFrame>,
    cur_style: u32,
    cur_color: u16,
    cur_bg: Option<u16>,
    in_link: bool,
    form_stack: Vec<FormContext>,
}

/// Render knobs and pre-fetched side data the walk consults but never
/// mutates (images were already resolved by the async pre-pass).
pub struct TranscodeContext<'a> {
    pub base_url: Url,
    pub stylesheet: &'a Stylesheet,
    pub screen: ScreenContext,
    pub images_enabled: bool,
    pub max_inline_kb: u64,
    pub images: &'a HashMap<String, CachedImage>,
}

/// A background-image eligible for inlining per spec.md §4.6's gating
/// (no text, no-repeat, box ≤128px both axes, no form controls), keyed
/// by the region-augmented cache key the pre-fetch pass resolves it
/// under (`url#rect=x,y,w,h`).
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundSource {
    pub key: String,
    pub url: String,
    pub rect: (u32, u32, u32, u32),
}

/// Decide whether `node` carries an inlinable background image, and if
/// so compute the rect it should be fetched/cropped to. Shared by the
/// pre-walk collection pass ([`crate::transcode::collect_background_sources`])
/// and the walk itself, so the two can never disagree on the key.
pub(crate) fn eligible_background(node: &Handle, stylesheet: &Stylesheet, base_url: &Url) -> Option<BackgroundSource> {
    if !text_content(node).is_empty() {
        return None;
    }
    if subtree_has(node, &is_form_control) {
        return None;
    }
    let element = DomElement(node.clone());
    let computed = css::compute_style(&element, stylesheet, base_url);
    let repeat = computed.get("background-repeat").map(String::as_str).unwrap_or("no-repeat");
    if repeat != "no-repeat" {
        return None;
    }
    let image_value = computed.get("background-image")?;
    let raw_url = css::extract_url(image_value)?;
    let abs = base_url.join(&raw_url).map(|u| u.to_string()).unwrap_or(raw_url);

    let width = computed.get("width").and_then(|v| css::px_value(v))?;
    let height = computed.get("height").and_then(|v| css::px_value(v))?;
    if width <= 0.0 || height <= 0.0 || width > 128.0 || height > 128.0 {
        return None;
    }

    let (x, y) = computed
        .get("background-position")
        .map(|v| css::parse_position_px(v))
        .unwrap_or((0.0, 0.0));
    let rect = (x.max(0.0) as u32, y.max(0.0) as u32, width as u32, height as u32);
    let key = format!("{abs}#rect={},{},{},{}", rect.0, rect.1, rect.2, rect.3);
    Some(BackgroundSource { key, url: abs, rect })
}

fn apply_background_image(node: &Handle, ctx: &TranscodeContext, page: &mut Page) {
    if !ctx.images_enabled {
        return;
    }
    let Some(source) = eligible_background(node, ctx.stylesheet, &ctx.base_url) else {
        return;
    };
    if let Some(image) = ctx.images.get(&source.key) {
        page.add_image_inline(image.width, image.height, &image.bytes);
    }
}

pub fn transcode(root: &Handle, ctx: &TranscodeContext, page: &mut Page) {
    let mut state = WalkState::default();
    walk(root, &mut state, page, ctx);
}

fn condense_whitespace(text: &str, pre: bool) -> String {
    if pre {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    out
}

fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    condense_whitespace(out.trim(), false)
}

fn collect_text(node: &Handle, out: &mut String) {
    match &node.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Element { name, .. } if SKIP_TEXT_TAGS.contains(&name.local.to_string().as_str()) => {}
        _ => {
            for child in children(node) {
                collect_text(&child, out);
            }
        }
    }
}

fn subtree_has(node: &Handle, pred: &impl Fn(&str) -> bool) -> bool {
    if let Some(tag) = tag_name(node) {
        if pred(&tag) {
            return true;
        }
    }
    children(node).iter().any(|c| subtree_has(c, pred))
}

fn is_form_control(tag: &str) -> bool {
    matches!(tag, "input" | "select" | "textarea" | "button")
}

fn push_style_word(state: &WalkState, page: &mut Page) {
    page.add_style(state.cur_style, state.cur_color);
}

fn apply_css_color(node: &Handle, ctx: &TranscodeContext, state: &mut WalkState) -> Option<u16> {
    let element = DomElement(node.clone());
    let color = css::effective_property(&element, ctx.stylesheet, &ctx.base_url, "color")?;
    let rgb = parse_color(&color)?;
    let rgb565 = rgb.to_rgb565();
    if rgb565 != state.cur_color {
        let prev = state.cur_color;
        state.cur_color = rgb565;
        return Some(prev);
    }
    None
}

fn resolve(ctx: &TranscodeContext, url: &str) -> String {
    ctx.base_url.join(url).map(|u| u.to_string()).unwrap_or_else(|_| url.to_string())
}

fn walk(node: &Handle, state: &mut WalkState, page: &mut Page, ctx: &TranscodeContext) {
    match &node.data {
        NodeData::Document => {
            for child in children(node) {
                walk(&child, state, page, ctx);
            }
        }
        NodeData::Text { contents } => {
            if state.skip_text_depth == 0 {
                let text = condense_whitespace(&contents.borrow(), state.pre);
                if !text.trim().is_empty() || state.pre {
                    page.add_text(&text);
                }
            }
        }
        NodeData::Element { name, .. } => {
            let tag = name.local.to_string();
            walk_element(node, &tag, state, page, ctx);
        }
        _ => {}
    }
}

fn recurse_children(node: &Handle, state: &mut WalkState, page: &mut Page, ctx: &TranscodeContext) {
    for child in children(node) {
        walk(&child, state, page, ctx);
    }
}

#[allow(clippy::too_many_lines)]
fn walk_element(node: &Handle, tag: &str, state: &mut WalkState, page: &mut Page, ctx: &TranscodeContext) {
    if SKIP_TEXT_TAGS.contains(&tag) {
        state.skip_text_depth += 1;
        recurse_children(node, state, page, ctx);
        state.skip_text_depth -= 1;
        return;
    }

    let bg_pop = apply_structural_bgcolor(node, tag, state, page, ctx);
    let color_pop = apply_css_color(node, ctx, state);
    apply_background_image(node, ctx, page);

    match tag {
        "title" => {
            page.add_block();
            page.add_text(&text_content(node));
            page.add_break();
        }
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            page.add_block();
            let saved = state.cur_style;
            state.cur_style |= style_bit::BOLD;
            push_style_word(state, page);
            page.add_text(&text_content(node));
            state.cur_style = saved;
            push_style_word(state, page);
            page.add_break();
        }
        "br" => page.add_break(),
        "hr" => page.add_rule(Rgb::BLACK.to_rgb565()),
        _ if BLOCK_CONTAINERS.contains(&tag) => {
            page.add_para();
            recurse_children(node, state, page, ctx);
        }
        "p" => {
            recurse_children(node, state, page, ctx);
            page.add_para();
        }
        "b" | "strong" | "big" => with_style_bit(state, page, style_bit::BOLD, node, ctx),
        "i" | "em" | "small" => with_style_bit(state, page, style_bit::ITALIC, node, ctx),
        "u" | "ins" | "s" | "strike" | "del" => with_style_bit(state, page, style_bit::UNDERLINE, node, ctx),
        "center" => with_style_bit(state, page, style_bit::CENTER, node, ctx),
        "sup" => {
            page.add_text("^");
            recurse_children(node, state, page, ctx);
            page.add_text("^");
        }
        "sub" => {
            page.add_text("_");
            recurse_children(node, state, page, ctx);
            page.add_text("_");
        }
        "font" => walk_font(node, state, page, ctx),
        "a" => walk_anchor(node, state, page, ctx),
        "img" => walk_img(node, ctx, page),
        "ul" | "ol" | "dl" => {
            state.lists.push(ListFrame {
                kind: match tag {
                    "ul" => ListKind::Unordered,
                    "ol" => ListKind::Ordered,
                    _ => ListKind::Definition,
                },
                index: 0,
                style_type: attr(node, "style").unwrap_or_default(),
            });
            recurse_children(node, state, page, ctx);
            state.lists.pop();
        }
        "li" => walk_list_item(node, state, page, ctx),
        "dt" => {
            page.add_block();
            page.add_text(&text_content(node));
            page.add_break();
        }
        "dd" => {
            page.add_text(": ");
            recurse_children(node, state, page, ctx);
            page.add_break();
        }
        "table" => walk_table(node, state, page, ctx),
        "form" => walk_form(node, state, page, ctx),
        "input" | "textarea" | "select" | "button" => match state.form_stack.last().cloned() {
            Some(form) => walk_form_controls(node, page, &form),
            None => recurse_children(node, state, page, ctx),
        },
        "iframe" => media_stub(page, "[Frame]"),
        "video" => media_stub(page, "[Media]"),
        "audio" => media_stub(page, "[Media]"),
        "object" | "embed" => media_stub(page, "[Object]"),
        "picture" => walk_picture(node, ctx, page),
        _ => recurse_children(node, state, page, ctx),
    }

    if let Some(prev) = color_pop {
        state.cur_color = prev;
    }
    if let Some(prev_bg) = bg_pop {
        state.cur_bg = prev_bg;
    }
}

fn apply_structural_bgcolor(
    node: &Handle,
    tag: &str,
    state: &mut WalkState,
    page: &mut Page,
    ctx: &TranscodeContext,
) -> Option<Option<u16>> {
    if !BLOCK_CONTAINERS.contains(&tag) {
        return None;
    }
    if subtree_has(node, &is_form_control) {
        return None;
    }
    let element = DomElement(node.clone());
    let value = css::effective_property(&element, ctx.stylesheet, &ctx.base_url, "color")
        .or_else(|| None);
    let _ = value; // background-color is not an inherited property; look it up directly below
    let computed = css::compute_style(&element, ctx.stylesheet, &ctx.base_url);
    let Some(bg) = computed.get("background-color").and_then(|v| parse_color(v)) else {
        return None;
    };
    let rgb565 = bg.to_rgb565();
    let prev = state.cur_bg;
    state.cur_bg = Some(rgb565);
    page.add_bgcolor(rgb565);
    Some(prev)
}

fn with_style_bit(state: &mut WalkState, page: &mut Page, bit: u32, node: &Handle, ctx: &TranscodeContext) {
    let saved = state.cur_style;
    state.cur_style |= bit;
    push_style_word(state, page);
    recurse_children(node, state, page, ctx);
    state.cur_style = saved;
    push_style_word(state, page);
}

fn walk_font(node: &Handle, state: &mut WalkState, page: &mut Page, ctx: &TranscodeContext) {
    let saved_style = state.cur_style;
    let saved_color = state.cur_color;
    if let Some(color) = attr(node, "color").and_then(|c| parse_color(&c)) {
        state.cur_color = color.to_rgb565();
    }
    if let Some(size) = attr(node, "size") {
        let parsed: i32 = size.trim_start_matches('+').parse().unwrap_or(3);
        if size.starts_with('+') || parsed >= 5 {
            state.cur_style |= style_bit::BOLD;
        } else if size.starts_with('-') || parsed <= 2 {
            state.cur_style |= style_bit::ITALIC;
        }
    }
    push_style_word(state, page);
    recurse_children(node, state, page, ctx);
    state.cur_style = saved_style;
    state.cur_color = saved_color;
    push_style_word(state, page);
}

fn walk_anchor(node: &Handle, state: &mut WalkState, page: &mut Page, ctx: &TranscodeContext) {
    let Some(href) = attr(node, "href") else {
        recurse_children(node, state, page, ctx);
        return;
    };
    let abs = resolve(ctx, &href);
    page.begin_link(&format!("0/{abs}"));
    let was_in_link = state.in_link;
    state.in_link = true;
    recurse_children(node, state, page, ctx);
    state.in_link = was_in_link;
    page.end_link();
    page.add_break();
}

fn image_src(node: &Handle) -> Option<String> {
    attr(node, "src")
        .or_else(|| attr(node, "data-src"))
        .or_else(|| attr(node, "data-original"))
        .or_else(|| attr(node, "data-lazy-src"))
        .or_else(|| attr(node, "srcset").and_then(|s| s.split(',').next().map(|p| p.trim().split_whitespace().next().unwrap_or("").to_string())))
}

fn walk_img(node: &Handle, ctx: &TranscodeContext, page: &mut Page) {
    let alt = attr(node, "alt").unwrap_or_default();
    let Some(src) = image_src(node) else {
        if !alt.is_empty() {
            page.add_text(&format!("[{alt}]"));
        }
        return;
    };
    if !ctx.images_enabled {
        page.add_text(&format!("[{alt}]"));
        return;
    }
    let abs = resolve(ctx, &src);
    let Some(image) = ctx.images.get(&abs) else {
        page.add_text(&format!("[{alt}]"));
        return;
    };
    if (image.bytes.len() as u64) <= ctx.max_inline_kb * 1024 {
        page.add_image_inline(image.width, image.height, &image.bytes);
    } else {
        page.begin_link(&abs);
        page.add_image_placeholder(image.width, image.height);
        page.end_link();
    }
}

fn walk_picture(node: &Handle, ctx: &TranscodeContext, page: &mut Page) {
    for child in children(node) {
        if tag_name(&child).as_deref() == Some("source") {
            if attr(&child, "srcset").is_some() {
                walk_img(&child, ctx, page);
                return;
            }
        }
    }
    for child in children(node) {
        if tag_name(&child).as_deref() == Some("img") {
            walk_img(&child, ctx, page);
            return;
        }
    }
}

fn list_marker(frame: &mut ListFrame) -> String {
    frame.index += 1;
    match frame.kind {
        ListKind::Ordered => format!("{}.", frame.index),
        ListKind::Unordered => match frame.style_type.as_str() {
            "circle" => "○".to_string(),
            "square" => "■".to_string(),
            _ => "•".to_string(),
        },
        ListKind::Definition => String::new(),
    }
}

fn walk_list_item(node: &Handle, state: &mut WalkState, page: &mut Page, ctx: &TranscodeContext) {
    page.add_block();
    if let Some(frame) = state.lists.last_mut() {
        let marker = list_marker(frame);
        if !marker.is_empty() {
            page.add_text(&format!("{marker} "));
        }
    }
    recurse_children(node, state, page, ctx);
    page.add_break();
}

fn walk_table(node: &Handle, state: &mut WalkState, page: &mut Page, ctx: &TranscodeContext) {
    let has_interactive = subtree_has(node, &|t| is_form_control(t) || t == "a");
    if has_interactive {
        recurse_children(node, state, page, ctx);
        return;
    }
    for row in find_all(node, "tr") {
        let cells: Vec<String> = find_all(&row, "td")
            .into_iter()
            .chain(find_all(&row, "th"))
            .map(|c| text_content(&c))
            .collect();
        if cells.is_empty() {
            continue;
        }
        page.add_text(&cells.join(" | "));
        page.add_break();
    }
}

fn find_all(node: &Handle, tag: &str) -> Vec<Handle> {
    let mut out = Vec::new();
    find_all_rec(node, tag, &mut out);
    out
}

fn find_all_rec(node: &Handle, tag: &str, out: &mut Vec<Handle>) {
    if tag_name(node).as_deref() == Some(tag) {
        out.push(node.clone());
        return;
    }
    for child in children(node) {
        find_all_rec(&child, tag, out);
    }
}

fn media_stub(page: &mut Page, label: &str) {
    page.add_text(label);
    page.add_break();
}

fn walk_form(node: &Handle, state: &mut WalkState, page: &mut Page, ctx: &TranscodeContext) {
    let action = attr(node, "action")
        .map(|a| resolve(ctx, &a))
        .unwrap_or_else(|| "1".to_string());
    page.add_form_start(&action);
    state.form_stack.push(FormContext { action: action.clone() });
    recurse_children(node, state, page, ctx);
    state.form_stack.pop();
}

pub fn walk_form_controls(node: &Handle, page: &mut Page, form: &FormContext) {
    let Some(tag) = tag_name(node) else { return };
    match tag.as_str() {
        "input" => {
            let input_type = attr(node, "type").unwrap_or_else(|| "text".to_string());
            let name = attr(node, "name").unwrap_or_default();
            let value = attr(node, "value").unwrap_or_default();
            let checked = attr(node, "checked").is_some();
            forms::emit_input(page, form, &input_type, &name, &value, checked, false);
        }
        "textarea" => {
            let name = attr(node, "name").unwrap_or_default();
            let value = text_content(node);
            forms::emit_input(page, form, "textarea", &name, &value, false, true);
        }
        "select" => {
            let name = attr(node, "name").unwrap_or_default();
            let multiple = attr(node, "multiple").is_some();
            let options: Vec<(String, String, bool)> = find_all(node, "option")
                .into_iter()
                .map(|opt| {
                    let value = attr(&opt, "value").unwrap_or_else(|| text_content(&opt));
                    let label = text_content(&opt);
                    let selected = attr(&opt, "selected").is_some();
                    (value, label, selected)
                })
                .collect();
            forms::emit_select(page, &name, multiple, &options);
        }
        "button" => {
            let input_type = attr(node, "type").unwrap_or_else(|| "submit".to_string());
            let name = attr(node, "name").unwrap_or_default();
            let value = attr(node, "value").unwrap_or_else(|| text_content(node));
            forms::emit_input(page, form, &input_type, &name, &value, false, false);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oms::{ClientVersion, Compression};
    use html5ever::tendril::TendrilSink;
    use markup5ever_rcdom::RcDom;

    fn parse(html: &str) -> RcDom {
        html5ever::parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())
            .unwrap()
    }

    fn default_ctx(stylesheet: &Stylesheet) -> TranscodeContext<'_> {
        TranscodeContext {
            base_url: Url::parse("http://x.test/").unwrap(),
            stylesheet,
            screen: ScreenContext::default(),
            images_enabled: false,
            max_inline_kb: 12,
            images: &HashMap::new(),
        }
    }

    #[test]
    fn emits_title_as_block_text_break() {
        let dom = parse("<html><head><title>Hello</title></head><body></body></html>");
        let sheet = Stylesheet::default();
        let ctx = default_ctx(&sheet);
        let mut page = Page::new("http://x.test/", ClientVersion::V1, Compression::None);
        transcode(&dom.document, &ctx, &mut page);
        page.finish_body();
        let scanned = crate::oms::scanner::scan(&page.data);
        assert!(scanned.tag_count >= 3);
    }

    #[test]
    fn anchor_emits_link_start_text_end_break() {
        let dom = parse(r#"<html><body><a href="/x">go</a></body></html>"#);
        let sheet = Stylesheet::default();
        let ctx = default_ctx(&sheet);
        let mut page = Page::new("http://x.test/", ClientVersion::V1, Compression::None);
        transcode(&dom.document, &ctx, &mut page);
        page.finish_body();
        let text = String::from_utf8_lossy(&page.data);
        assert!(text.contains("0/http://x.test/x"));
        assert!(text.contains("go"));
    }

    #[test]
    fn image_without_fetch_falls_back_to_alt_text() {
        let dom = parse(r#"<html><body><img src="a.png" alt="pic"></body></html>"#);
        let sheet = Stylesheet::default();
        let ctx = default_ctx(&sheet);
        let mut page = Page::new("http://x.test/", ClientVersion::V1, Compression::None);
        transcode(&dom.document, &ctx, &mut page);
        let text = String::from_utf8_lossy(&page.data);
        assert!(text.contains("[pic]"));
    }

    #[test]
    fn list_items_get_bullet_markers() {
        let dom = parse("<html><body><ul><li>a</li><li>b</li></ul></body></html>");
        let sheet = Stylesheet::default();
        let ctx = default_ctx(&sheet);
        let mut page = Page::new("http://x.test/", ClientVersion::V1, Compression::None);
        transcode(&dom.document, &ctx, &mut page);
        let text = String::from_utf8_lossy(&page.data);
        assert!(text.contains('\u{2022}'));
    }

    #[test]
    fn background_image_gating_rejects_oversized_box() {
        let dom = parse(r#"<html><body><div style="width:200px;height:16px;background-image:url(tiny.png)"></div></body></html>"#);
        let sheet = Stylesheet::default();
        let ctx = TranscodeContext {
            images_enabled: true,
            ..default_ctx(&sheet)
        };
        let mut page = Page::new("http://x.test/", ClientVersion::V1, Compression::None);
        transcode(&dom.document, &ctx, &mut page);
        let text = String::from_utf8_lossy(&page.data);
        assert!(!text.contains('I'));
    }

    #[test]
    fn background_image_gating_accepts_small_box_when_prefetched() {
        let dom = parse(r#"<html><body><div style="width:32px;height:16px;background-image:url(tiny.png)"></div></body></html>"#);
        let sheet = Stylesheet::default();
        let mut images = HashMap::new();
        images.insert(
            "http://x.test/tiny.png#rect=0,0,32,16".to_string(),
            CachedImage { width: 32, height: 16, bytes: vec![0xAB] },
        );
        let ctx = TranscodeContext {
            images_enabled: true,
            images: &images,
            ..default_ctx(&sheet)
        };
        let mut page = Page::new("http://x.test/", ClientVersion::V1, Compression::None);
        transcode(&dom.document, &ctx, &mut page);
        page.finish_body();
        let scanned = crate::oms::scanner::scan(&page.data);
        assert!(scanned.tag_count >= 1);
    }

    #[test]
    fn background_image_skipped_when_images_disabled() {
        let dom = parse(r#"<html><body><div style="width:32px;height:16px;background-image:url(tiny.png)"></div></body></html>"#);
        let sheet = Stylesheet::default();
        let mut images = HashMap::new();
        images.insert(
            "http://x.test/tiny.png#rect=0,0,32,16".to_string(),
            CachedImage { width: 32, height: 16, bytes: vec![0xAB] },
        );
        let ctx = TranscodeContext {
            images_enabled: false,
            images: &images,
            ..default_ctx(&sheet)
        };
        let mut page = Page::new("http://x.test/", ClientVersion::V1, Compression::None);
        transcode(&dom.document, &ctx, &mut page);
        assert!(!page.data.contains(&crate::oms::tags::byte::IMG_INLINE));
    }

    #[test]
    fn form_controls_are_dispatched_during_a_real_walk() {
        let dom = parse(
            r#"<html><body><form action="/go">
                <input type="text" name="q" value="hi">
                <input type="hidden" name="csrf" value="abc">
                <select name="color"><option value="r">Red</option></select>
                <button name="go" value="1">Go</button>
            </form></body></html>"#,
        );
        let sheet = Stylesheet::default();
        let ctx = default_ctx(&sheet);
        let mut page = Page::new("http://x.test/", ClientVersion::V1, Compression::None);
        transcode(&dom.document, &ctx, &mut page);
        assert!(page.form_hidden.values().any(|m| m.get("csrf") == Some(&"abc".to_string())));
        let scanned = crate::oms::scanner::scan(&page.data);
        assert!(scanned.tag_count >= 5);
    }

    #[test]
    fn script_and_style_text_is_skipped() {
        let dom = parse("<html><head><style>body{color:red}</style></head><body><script>evil()</script>visible</body></html>");
        let sheet = Stylesheet::default();
        let ctx = default_ctx(&sheet);
        let mut page = Page::new("http://x.test/", ClientVersion::V1, Compression::None);
        transcode(&dom.document, &ctx, &mut page);
        let text = String::from_utf8_lossy(&page.data);
        assert!(!text.contains("evil"));
        assert!(!text.contains("color:red"));
        assert!(text.contains("visible"));
    }
}
