//! CSS cascade engine (C6): stylesheet collection, media-query-aware
//! rule activation, and per-element cascaded style computation
//! (spec.md §4.5).

use super::selector::{self, ElementInfo, Selector};
use super::value::{
    expand_background_shorthand, px_value, resolve_url_value, should_drop_for_palette_economy,
    Declaration, Specificity,
};
use std::collections::HashMap;
use tracing::{debug, warn};
use url::Url;

/// Viewport context media queries are evaluated against (spec.md §4.5).
#[derive(Debug, Clone, Copy)]
pub struct ScreenContext {
    pub width: u32,
    pub height: u32,
    pub num_colors: u32,
}

impl Default for ScreenContext {
    fn default() -> Self {
        Self {
            width: 240,
            height: 320,
            num_colors: 256,
        }
    }
}

const DEFAULT_SHEET_BUDGET: usize = 16;
const IMPORT_DEPTH_CAP: u32 = 16;

#[derive(Debug, Clone)]
pub struct Rule {
    pub selector: Selector,
    pub specificity: Specificity,
    pub declarations: Vec<Declaration>,
    pub order: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

/// One `<style>` block or `<link rel=stylesheet>` href discovered by a
/// DFS of the document, in document order.
pub enum StyleSource {
    Inline(String),
    Linked(String),
}

/// Parse all of a document's stylesheet text (already collected by the
/// transcoder's DFS per spec.md §4.5) into a cascade-ready rule set,
/// fetching linked sheets through `fetch` up to `max_sheets` and
/// following `@import` up to a depth of 16.
pub async fn build_stylesheet<F, Fut>(
    sources: Vec<StyleSource>,
    base_url: &Url,
    screen: ScreenContext,
    max_sheets: usize,
    fetch: F,
) -> Stylesheet
where
    F: Fn(Url) -> Fut,
    Fut: std::future::Future<Output = Option<String>>,
{
    let max_sheets = if max_sheets == 0 { DEFAULT_SHEET_BUDGET } else { max_sheets };
    let mut visited: std::collections::HashSet<String> = std::collections::HashSet::new();
    let mut fetched = 0usize;
    let mut order = 0u32;
    let mut rules = Vec::new();

    for source in sources {
        match source {
            StyleSource::Inline(text) => {
                collect_rules(&text, base_url, screen, 0, &mut order, &mut rules);
            }
            StyleSource::Linked(href) => {
                if fetched >= max_sheets {
                    warn!(href, "stylesheet budget exhausted, skipping");
                    continue;
                }
                let Ok(abs) = base_url.join(&href) else { continue };
                if !visited.insert(abs.to_string()) {
                    continue;
                }
                fetched += 1;
                if let Some(text) = fetch(abs.clone()).await {
                    collect_rules_with_imports(&text, &abs, screen, 0, &mut order, &mut rules, &fetch, &mut visited, &mut fetched, max_sheets)
                        .await;
                }
            }
        }
    }

    debug!(rule_count = rules.len(), "built stylesheet");
    Stylesheet { rules }
}

#[allow(clippy::too_many_arguments)]
fn collect_rules_with_imports<'a, F, Fut>(
    text: &'a str,
    base_url: &'a Url,
    screen: ScreenContext,
    depth: u32,
    order: &'a mut u32,
    rules: &'a mut Vec<Rule>,
    fetch: &'a F,
    visited: &'a mut std::collections::HashSet<String>,
    fetched: &'a mut usize,
    max_sheets: usize,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + 'a>>
where
    F: Fn(Url) -> Fut,
    Fut: std::future::Future<Output = Option<String>>,
{
    Box::pin(async move {
        let (imports, body) = split_imports(text);
        if depth < IMPORT_DEPTH_CAP {
            for import_url in imports {
                if *fetched >= max_sheets {
                    break;
                }
                let Ok(abs) = base_url.join(&import_url) else { continue };
                if !visited.insert(abs.to_string()) {
                    continue;
                }
                *fetched += 1;
                if let Some(imported) = fetch(abs.clone()).await {
                    collect_rules_with_imports(
                        &imported, &abs, screen, depth + 1, order, rules, fetch, visited, fetched,
                        max_sheets,
                    )
                    .await;
                }
            }
        } else {
            warn!("@import depth cap reached, ignoring further imports");
        }
        collect_rules(&body, base_url, screen, 0, order, rules);
    })
}

/// Extract `@import` preludes from the top of a stylesheet, returning
/// `(import_urls, remaining_text)`.
fn split_imports(css: &str) -> (Vec<String>, String) {
    let mut imports = Vec::new();
    let mut rest = String::new();
    for stmt in css.split(';') {
        let trimmed = stmt.trim_start();
        if let Some(prelude) = trimmed.strip_prefix("@import") {
            if let Some(url) = extract_quoted_or_url(prelude) {
                imports.push(url);
                continue;
            }
        }
        if !rest.is_empty() {
            rest.push(';');
        }
        rest.push_str(stmt);
    }
    (imports, rest)
}

fn extract_quoted_or_url(text: &str) -> Option<String> {
    let text = text.trim();
    if let Some(inner) = text.strip_prefix("url(") {
        let inner = inner.split(')').next()?;
        return Some(inner.trim_matches(['"', '\'']).to_string());
    }
    for quote in ['"', '\''] {
        if let Some(start) = text.find(quote) {
            let after = &text[start + 1..];
            if let Some(end) = after.find(quote) {
                return Some(after[..end].to_string());
            }
        }
    }
    None
}

/// Parse a block of stylesheet text (no top-level `@import`s) into
/// rules, recursing into `@media` blocks whose prelude is active for
/// `screen`. A conservative hand-rolled quote-aware brace scanner, per
/// spec.md §4.5's sanctioned selector-matching fallback extended to
/// sheet structure.
fn collect_rules(
    css: &str,
    base_url: &Url,
    screen: ScreenContext,
    _depth: u32,
    order: &mut u32,
    rules: &mut Vec<Rule>,
) {
    let css = strip_comments(css);
    let bytes = css.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        let Some(brace) = find_top_level_brace(&css[i..]) else { break };
        let prelude = css[i..i + brace].trim().to_string();
        let Some(block_end) = find_matching_brace(&css[i + brace..]) else { break };
        let block = &css[i + brace + 1..i + brace + block_end];

        if let Some(media_prelude) = prelude.strip_prefix("@media") {
            if media_active(media_prelude, screen) {
                collect_rules(block, base_url, screen, 0, order, rules);
            }
        } else if prelude.starts_with('@') {
            // unsupported at-rule (@font-face, @keyframes, ...): skip its body
        } else if !prelude.is_empty() {
            for selector_text in selector::split_top_level_commas(&prelude) {
                let Some(selector) = super::selector::parse_selector(&selector_text) else {
                    continue;
                };
                let specificity = super::selector::specificity(&selector);
                let declarations = parse_declarations(block, base_url);
                if declarations.is_empty() {
                    continue;
                }
                *order += 1;
                rules.push(Rule {
                    selector,
                    specificity,
                    declarations,
                    order: *order,
                });
            }
        }

        i += brace + block_end + 1;
    }
}

fn find_top_level_brace(s: &str) -> Option<usize> {
    let mut in_quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match in_quote {
            Some(q) if c == q => in_quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => in_quote = Some(c),
            None if c == '{' => return Some(i),
            None => {}
        }
    }
    None
}

fn find_matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0i32;
    let mut in_quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match in_quote {
            Some(q) if c == q => in_quote = None,
            Some(_) => continue,
            None if c == '"' || c == '\'' => in_quote = Some(c),
            None if c == '{' => depth += 1,
            None if c == '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            None => {}
        }
    }
    None
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        rest = match rest[start + 2..].find("*/") {
            Some(end) => &rest[start + 2 + end + 2..],
            None => "",
        };
    }
    out.push_str(rest);
    out
}

fn parse_declarations(block: &str, base_url: &Url) -> Vec<Declaration> {
    let mut out = Vec::new();
    for stmt in split_top_level(block, ';') {
        let Some((prop, value)) = stmt.split_once(':') else { continue };
        let prop = prop.trim().to_ascii_lowercase();
        let mut value = value.trim().to_string();
        let important = value.to_ascii_lowercase().ends_with("!important");
        if important {
            value = value[..value.len() - "!important".len()].trim().to_string();
        }
        if value.is_empty() || prop.is_empty() {
            continue;
        }
        if value.contains("url(") {
            value = resolve_url_value(&value, base_url);
        }

        if prop == "background" {
            for mut decl in expand_background_shorthand(&value) {
                if decl.property == "background-image" && decl.value.contains("url(") {
                    decl.value = resolve_url_value(&decl.value, base_url);
                }
                decl.important = important;
                if !should_drop_for_palette_economy(&decl.property, &decl.value) {
                    out.push(decl);
                }
            }
            continue;
        }
        if should_drop_for_palette_economy(&prop, &value) {
            continue;
        }
        out.push(Declaration {
            property: prop,
            value,
            important,
        });
    }
    out
}

fn split_top_level(s: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for c in s.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                current.push(c);
            }
            c if c == sep && depth == 0 => {
                if !current.trim().is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current);
    }
    parts
}

/// Evaluate a `@media` prelude against `screen` (spec.md §4.5).
fn media_active(prelude: &str, screen: ScreenContext) -> bool {
    let prelude = prelude.trim().trim_end_matches(',');
    if prelude.is_empty() {
        return true;
    }
    prelude.split(',').any(|query| media_query_active(query.trim(), screen))
}

fn media_query_active(query: &str, screen: ScreenContext) -> bool {
    const ACTIVE_TYPES: &[&str] = &["all", "screen", "handheld", "projection"];
    const INACTIVE_TYPES: &[&str] = &["print", "speech", "aural", "braille", "embossed", "tty", "tv"];

    for clause in query.split("and") {
        let clause = clause.trim();
        if clause.is_empty() {
            continue;
        }
        if let Some(inner) = clause.strip_prefix('(').and_then(|c| c.strip_suffix(')')) {
            if !feature_active(inner, screen) {
                return false;
            }
        } else {
            let keyword = clause.to_ascii_lowercase();
            if INACTIVE_TYPES.contains(&keyword.as_str()) {
                return false;
            }
            if !ACTIVE_TYPES.contains(&keyword.as_str()) {
                return false;
            }
        }
    }
    true
}

fn feature_active(feature: &str, screen: ScreenContext) -> bool {
    let Some((name, value)) = feature.split_once(':') else {
        return true;
    };
    let name = name.trim().to_ascii_lowercase();
    let value = value.trim().to_ascii_lowercase();

    match name.as_str() {
        "orientation" => {
            let orientation = if screen.height >= screen.width { "portrait" } else { "landscape" };
            value == orientation
        }
        "min-width" => px_value(&value).is_some_and(|v| f64::from(screen.width) >= v),
        "max-width" => px_value(&value).is_some_and(|v| f64::from(screen.width) <= v),
        "min-height" => px_value(&value).is_some_and(|v| f64::from(screen.height) >= v),
        "max-height" => px_value(&value).is_some_and(|v| f64::from(screen.height) <= v),
        "prefers-color-scheme" => {
            let is_color = screen.num_colors >= 256;
            (value == "dark") == is_color
        }
        _ => true,
    }
}

/// Compute the cascaded style for `element`, overlaying its inline
/// `style=` attribute at specificity `(1<<12,0,0)` (spec.md §4.5).
pub fn compute_style<E: ElementInfo>(
    element: &E,
    stylesheet: &Stylesheet,
    base_url: &Url,
) -> HashMap<String, String> {
    let mut applicable: Vec<(Specificity, u32, bool, &Declaration)> = Vec::new();
    for rule in &stylesheet.rules {
        if selector::matches(&rule.selector, element) {
            for decl in &rule.declarations {
                applicable.push((rule.specificity, rule.order, decl.important, decl));
            }
        }
    }

    let inline_declarations: Vec<Declaration> = element
        .inline_style()
        .map(|text| parse_declarations(&text, base_url))
        .unwrap_or_default();
    let inline_specificity = Specificity(1 << 12, 0, 0);
    let inline_order = (1u32 << 30).wrapping_add(applicable.len() as u32);
    for decl in &inline_declarations {
        applicable.push((inline_specificity, inline_order, decl.important, decl));
    }

    applicable.sort_by(|a, b| (a.2, a.0, a.1).cmp(&(b.2, b.0, b.1)));

    let mut computed = HashMap::new();
    for (_, _, _, decl) in applicable {
        computed.insert(decl.property.clone(), decl.value.clone());
    }
    computed
}

const INHERITED_PROPERTIES: &[&str] = &[
    "color",
    "text-align",
    "font-weight",
    "font-style",
    "text-decoration",
    "list-style-type",
];

/// `cssEffectiveProp`: look up an inherited property on `element`,
/// climbing up to 12 ancestors if it is not set directly (spec.md
/// §4.5).
pub fn effective_property<E: ElementInfo>(
    element: &E,
    stylesheet: &Stylesheet,
    base_url: &Url,
    property: &str,
) -> Option<String> {
    debug_assert!(INHERITED_PROPERTIES.contains(&property));
    let mut current = element.clone();
    for _ in 0..=12 {
        let style = compute_style(&current, stylesheet, base_url);
        if let Some(value) = style.get(property) {
            return Some(value.clone());
        }
        match current.parent() {
            Some(p) => current = p,
            None => break,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct El {
        tag: String,
        classes: Vec<String>,
        style: Option<String>,
        parent: Option<Box<El>>,
    }

    impl ElementInfo for El {
        fn tag_name(&self) -> String {
            self.tag.clone()
        }
        fn id(&self) -> Option<String> {
            None
        }
        fn classes(&self) -> Vec<String> {
            self.classes.clone()
        }
        fn parent(&self) -> Option<Self> {
            self.parent.as_deref().cloned()
        }
        fn inline_style(&self) -> Option<String> {
            self.style.clone()
        }
    }

    fn base() -> Url {
        Url::parse("http://x.test/page.html").unwrap()
    }

    #[test]
    fn media_screen_is_active_print_is_not() {
        assert!(media_active("screen", ScreenContext::default()));
        assert!(!media_active("print", ScreenContext::default()));
        assert!(media_active("", ScreenContext::default()));
    }

    #[test]
    fn media_max_width_feature() {
        let screen = ScreenContext { width: 240, ..Default::default() };
        assert!(media_active("screen and (max-width: 480px)", screen));
        assert!(!media_active("screen and (min-width: 480px)", screen));
    }

    #[test]
    fn higher_specificity_wins_over_order() {
        let mut order = 0u32;
        let mut rules = Vec::new();
        collect_rules(".x { color: red; }", &base(), ScreenContext::default(), 0, &mut order, &mut rules);
        collect_rules("div.x { color: blue; }", &base(), ScreenContext::default(), 0, &mut order, &mut rules);
        let sheet = Stylesheet { rules };
        let el = El { tag: "div".into(), classes: vec!["x".into()], style: None, parent: None };
        let style = compute_style(&el, &sheet, &base());
        assert_eq!(style.get("color"), Some(&"blue".to_string()));
    }

    #[test]
    fn inline_style_overlays_author_rules() {
        let mut order = 0u32;
        let mut rules = Vec::new();
        collect_rules("div { color: red; }", &base(), ScreenContext::default(), 0, &mut order, &mut rules);
        let sheet = Stylesheet { rules };
        let el = El {
            tag: "div".into(),
            classes: vec![],
            style: Some("color: green".into()),
            parent: None,
        };
        let style = compute_style(&el, &sheet, &base());
        assert_eq!(style.get("color"), Some(&"green".to_string()));
    }

    #[test]
    fn important_beats_inline() {
        let mut order = 0u32;
        let mut rules = Vec::new();
        collect_rules("div { color: red !important; }", &base(), ScreenContext::default(), 0, &mut order, &mut rules);
        let sheet = Stylesheet { rules };
        let el = El {
            tag: "div".into(),
            classes: vec![],
            style: Some("color: green".into()),
            parent: None,
        };
        let style = compute_style(&el, &sheet, &base());
        assert_eq!(style.get("color"), Some(&"red".to_string()));
    }

    #[test]
    fn inherited_property_climbs_ancestors() {
        let parent = El {
            tag: "div".into(),
            classes: vec![],
            style: Some("color: green".into()),
            parent: None,
        };
        let child = El {
            tag: "span".into(),
            classes: vec![],
            style: None,
            parent: Some(Box::new(parent)),
        };
        let sheet = Stylesheet::default();
        let value = effective_property(&child, &sheet, &base(), "color");
        assert_eq!(value, Some("green".to_string()));
    }

    #[test]
    fn at_media_block_only_applies_when_active() {
        let mut order = 0u32;
        let mut rules = Vec::new();
        collect_rules(
            "@media print { div { color: red; } }",
            &base(),
            ScreenContext::default(),
            0,
            &mut order,
            &mut rules,
        );
        assert!(rules.is_empty());
    }
}
