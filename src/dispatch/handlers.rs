//! Endpoint handlers (C11, spec.md §4.10, §6.3).
//!
//! Each handler is a plain async function over `&AppState` rather than
//! a `Service` impl — the router in [`super::mod`] is the thin
//! composition point; these do the actual work and are easy to call
//! directly from `/fetch`'s debug path and the legacy `/` POST path
//! alike.

use crate::config::TagCountMode;
use crate::css::{self, ScreenContext, StyleSource};
use crate::dispatch::options::{build_render_options, fingerprint, RenderOptions, SiteMode};
use crate::dispatch::request::{build_url, find, normalize_target, parse_null_kv};
use crate::error::{BoxError, ErrorContext};
use crate::fetch;
use crate::image::{self, FetchContext, ImageCache, OutputFormat};
use crate::oms::writer::{ClientVersion, Compression, Page};
use crate::session::cache::{pack_body, CachedPage};
use crate::state::AppState;
use crate::transcode::{self, walk::TranscodeContext};
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::RcDom;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

const BOOTSTRAP_URL: &str = "http://opera-mini.ru/bndex.php";
const AUTH_COOKIE_NAME: &str = "OPERETTA_AUTH";
const MAX_INLINE_KB: u64 = 12;

pub struct RenderedResponse {
    pub body: Vec<u8>,
    pub set_cookies: Vec<String>,
    pub part_cur: u32,
    pub part_cnt: u32,
}

pub fn ping() -> Vec<u8> {
    b"pong\n".to_vec()
}

/// Minimal bootstrap page served when the legacy client's `u` field is
/// empty (spec.md §4.10 step 4, §8 scenario 1).
pub fn bootstrap_page() -> Vec<u8> {
    let mut page = Page::new(BOOTSTRAP_URL, ClientVersion::V1, Compression::None);
    page.add_block();
    page.add_text("OK");
    page.finalize(TagCountMode::Plus1, 0)
}

/// Outcome of running the fetch-and-transcode pipeline: either a page
/// still awaiting finalize/paginate, or a fully framed wire payload
/// that must pass through untouched (an already-OMS upstream body, or
/// a synthesized `[Download]`/`[Play]` attachment stub).
pub enum RenderOutcome {
    Page(Page),
    Framed(Vec<u8>),
}

/// Render a canned page for an internal `server:<command>` about URL
/// (spec.md §4.10 step 8). These never leave the process, so there is
/// no upstream fetch to do — just echo the command back inside a
/// minimal page the legacy client can display.
fn canned_about_page(command: &str, target_url: &str, client_version: ClientVersion) -> Vec<u8> {
    let mut page = Page::new(target_url, client_version, Compression::None);
    page.add_block();
    page.add_text(match command {
        "" | "about" => "Operetta",
        "exit" => "Goodbye",
        other => other,
    });
    page.finalize(TagCountMode::Plus1, 0)
}

/// Does `target` resolve to the bookmarks portal host/path (spec.md
/// §4.10 step 8, `opera-mini.ru/bndex.php|/index.php`)?
fn is_bookmarks_portal(target: &str) -> bool {
    let Ok(parsed) = Url::parse(target) else {
        return false;
    };
    parsed.host_str() == Some("opera-mini.ru") && matches!(parsed.path(), "/bndex.php" | "/index.php")
}

/// Decide whether the bookmarks portal should be served locally
/// (spec.md §4.10 step 8, `OMS_BOOKMARKS_MODE`). Returns `None` when the
/// caller should fall through to the ordinary upstream fetch/render
/// path (remote mode, or auto mode with no local file available).
fn resolve_bookmarks_portal(state: &AppState, target_url: &str, client_version: ClientVersion) -> Option<Vec<u8>> {
    use crate::config::BookmarksMode;

    let path = state.config.bookmarks_path.as_deref()?;
    match state.config.bookmarks_mode {
        BookmarksMode::Remote => None,
        BookmarksMode::Local => Some(render_bookmarks_page(path, target_url, client_version)),
        BookmarksMode::Auto => {
            if path.is_file() {
                Some(render_bookmarks_page(path, target_url, client_version))
            } else {
                None
            }
        }
    }
}

/// Render the `OMS_BOOKMARKS` file (one `label|url` entry per line,
/// blank lines and `#`-prefixed comments ignored) as a simple linked
/// list page.
fn render_bookmarks_page(path: &std::path::Path, target_url: &str, client_version: ClientVersion) -> Vec<u8> {
    let mut page = Page::new(target_url, client_version, Compression::None);
    page.add_block();
    page.add_text("Bookmarks");
    page.add_break();

    let contents = std::fs::read_to_string(path).unwrap_or_default();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (label, href) = line.split_once('|').unwrap_or((line, line));
        page.begin_link(href.trim());
        page.add_text(label.trim());
        page.end_link();
        page.add_break();
    }

    page.finalize(TagCountMode::Plus1, 0)
}

/// Run the full fetch-and-transcode pipeline for `plan` (spec.md §4.8: a
/// GET-with-merged-query or POST-with-encoded-body resolved by the
/// submission planner, or a plain GET built by callers with nothing to
/// submit), honoring `opts`.
pub async fn render_page(
    state: &AppState,
    plan: &crate::fetch::SubmitPlan,
    opts: &RenderOptions,
    user_agent: &str,
    accept_language: &str,
    cookie_header: Option<&str>,
) -> Result<(RenderOutcome, Vec<String>), BoxError> {
    let target_url = plan.url.as_str();
    let base = Url::parse(target_url).context("parsing target URL")?;

    let timeout = state.config.client_timeout();
    let fetched = fetch::fetch(&state.http_client, plan, user_agent, accept_language, cookie_header, timeout).await?;

    if fetch::looks_like_oms(&fetched.body) {
        return Ok((RenderOutcome::Framed(fetched.body.clone()), fetched.set_cookies));
    }

    if fetch::is_attachment(fetched.content_type.as_deref(), fetched.content_disposition.as_deref()) {
        let download_url = format!(
            "/download?url={}",
            percent_encoding::utf8_percent_encode(target_url, percent_encoding::NON_ALPHANUMERIC)
        );
        let framed = fetch::attachment_page(target_url, &download_url, fetched.content_type.as_deref());
        return Ok((RenderOutcome::Framed(framed), fetched.set_cookies));
    }

    let html = transcode::charset::decode_body(&fetched.body, fetched.content_type.as_deref());
    let dom = html5ever::parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .context("parsing HTML")?;

    let mut style_sources: Vec<StyleSource> = Vec::new();
    transcode::collect_style_sources(&dom.document, &mut style_sources);

    let screen = ScreenContext {
        width: opts.screen_width,
        height: opts.screen_height,
        num_colors: opts.num_colors,
    };

    let client = state.http_client.clone();
    let stylesheet = css::build_stylesheet(style_sources, &base, screen, 16, move |sheet_url| {
        let client = client.clone();
        async move {
            let resp = client.get(sheet_url).timeout(Duration::from_secs(8)).send().await.ok()?;
            resp.text().await.ok()
        }
    })
    .await;

    let mut images: HashMap<String, crate::image::CachedImage> = HashMap::new();
    if opts.images_on {
        let mut urls = Vec::new();
        transcode::collect_image_sources(&dom.document, &base, &mut urls);
        let fetch_ctx = FetchContext {
            user_agent: user_agent.to_string(),
            accept_language: accept_language.to_string(),
            cookie_header: cookie_header.map(str::to_string),
            referer: Some(target_url.to_string()),
        };
        let format = match opts.image_mime.as_deref() {
            Some("image/png") => OutputFormat::Png,
            _ => OutputFormat::Jpeg,
        };
        for url in urls.into_iter().take(40) {
            if let Some(img) =
                resolve_image(&state.images, &state.http_client, &url, format, opts.screen_width, opts.high_quality, &fetch_ctx).await
            {
                images.insert(url, img);
            }
        }

        let mut backgrounds = Vec::new();
        transcode::collect_background_sources(&dom.document, &stylesheet, &base, &mut backgrounds);
        for bg in backgrounds.into_iter().take(40) {
            if let Some(img) = resolve_background_image(
                &state.images,
                &state.http_client,
                &bg,
                format,
                opts.high_quality,
                &fetch_ctx,
            )
            .await
            {
                if (img.bytes.len() as u64) <= MAX_INLINE_KB * 1024 {
                    images.insert(bg.key, img);
                }
            }
        }
    }

    let ctx = TranscodeContext {
        base_url: base.clone(),
        stylesheet: &stylesheet,
        screen,
        images_enabled: opts.images_on,
        max_inline_kb: MAX_INLINE_KB,
        images: &images,
    };

    let mut page = Page::new(target_url, opts.client_version, Compression::None);
    transcode::transcode(&dom.document, &ctx, &mut page);
    page.finish_body();

    Ok((RenderOutcome::Page(page), fetched.set_cookies))
}

async fn resolve_image(
    cache: &ImageCache,
    client: &reqwest::Client,
    url: &str,
    format: OutputFormat,
    screen_width: u32,
    high_quality: bool,
    fetch_ctx: &FetchContext,
) -> Option<crate::image::CachedImage> {
    let key = image::cache_key(format.label(), if high_quality { 85 } else { 40 }, url);
    if let Some(hit) = cache.get(&key) {
        return Some((*hit).clone());
    }
    let raw = image::pipeline::fetch_image(client, url, fetch_ctx).await.ok()?;
    let (_, encoded) = image::transcode_image(&raw, format, screen_width, high_quality).ok()?;
    cache.put(&key, encoded.clone());
    Some(encoded)
}

/// Region-fetch variant of [`resolve_image`] for CSS background-image
/// inlining (spec.md §4.6 "Region fetch"): the full sprite sheet is
/// fetched once per `bg.url` and cropped to `bg.rect`, cached under the
/// rect-augmented key so repeated sprite cells reuse the same fetch.
async fn resolve_background_image(
    cache: &ImageCache,
    client: &reqwest::Client,
    bg: &transcode::BackgroundSource,
    format: OutputFormat,
    high_quality: bool,
    fetch_ctx: &FetchContext,
) -> Option<crate::image::CachedImage> {
    let cache_key = image::cache_key(format.label(), if high_quality { 85 } else { 40 }, &bg.key);
    if let Some(hit) = cache.get(&cache_key) {
        return Some((*hit).clone());
    }
    let raw = image::pipeline::fetch_image(client, &bg.url, fetch_ctx).await.ok()?;
    let (_, encoded) = image::pipeline::transcode_image_region(&raw, bg.rect, format, high_quality).ok()?;
    cache.put(&cache_key, encoded.clone());
    Some(encoded)
}

/// Turn a [`RenderOutcome`] into a [`CachedPage`]: `Page` variants still
/// need `PageCache::select`'s pagination pass, `Framed` variants are
/// already a complete wire response and are stored as a single part.
fn pack_outcome(outcome: RenderOutcome, target: &str, opts: &RenderOptions, set_cookies: Vec<String>) -> CachedPage {
    match outcome {
        RenderOutcome::Page(mut page) => {
            page.finish_body();
            let url_str_len = u16::from_be_bytes([page.data[0], page.data[1]]) as usize;
            let tag_region = page.data[2 + url_str_len..].to_vec();
            CachedPage {
                url: target.to_string(),
                body: pack_body(target, &tag_region),
                client_version: opts.client_version,
                compression: Compression::None,
                set_cookies,
            }
        }
        RenderOutcome::Framed(framed) => CachedPage {
            url: target.to_string(),
            body: framed,
            client_version: opts.client_version,
            compression: Compression::None,
            set_cookies,
        },
    }
}

/// Full legacy `POST /` handling (spec.md §4.10 steps 1-9), minus the
/// HTTP-layer response framing (headers/status), which the router adds.
pub async fn handle_legacy_post(state: &AppState, body: &[u8]) -> RenderedResponse {
    let fields = parse_null_kv(body);

    let h = find(&fields, "h").unwrap_or("");
    let c = find(&fields, "c").unwrap_or("");
    let (h, c) = if h.contains('.') && c.is_empty() {
        crate::session::auth::split_combined_h(h).unwrap_or((h.to_string(), c.to_string()))
    } else {
        (h.to_string(), c.to_string())
    };

    let token = if !h.is_empty() && !c.is_empty() {
        state.session.auth.ensure_by_code(&h, &c)
    } else {
        let client_key = find(&fields, "i").or_else(|| find(&fields, "v")).unwrap_or("unknown-client");
        state.session.auth.ensure(client_key)
    };
    let session_key = crate::session::auth::AuthStore::session_key(&token);

    let u = find(&fields, "u").unwrap_or("");
    if u.is_empty() {
        return RenderedResponse {
            body: bootstrap_page(),
            set_cookies: vec![format!("{AUTH_COOKIE_NAME}={}.{}", token.prefix, token.code)],
            part_cur: 1,
            part_cnt: 1,
        };
    }

    let target = normalize_target(u);
    let host = Url::parse(&target)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default();
    let user_agent = find(&fields, "i").or_else(|| find(&fields, "v")).unwrap_or("Opera Mini");
    let accept_language = find(&fields, "q").or_else(|| find(&fields, "y")).or_else(|| find(&fields, "D")).unwrap_or("en");

    let jar_key = crate::session::derive_jar_key(
        Some(&h),
        Some(&c),
        Some(&token.prefix),
        Some(&token.code),
        &host,
        user_agent,
    );

    let mut opts = build_render_options(
        find(&fields, "d"),
        find(&fields, "e"),
        find(&fields, "o"),
        find(&fields, "version"),
        find(&fields, "k"),
        find(&fields, "w"),
    );
    if let Some(profile) = state.sites.get(&host) {
        if let Some(mode) = &profile.mode {
            opts.mode = match mode {
                crate::siteprofile::SiteProfileMode::Rich => SiteMode::Rich,
                crate::siteprofile::SiteProfileMode::Compact => SiteMode::Compact,
            };
        }
    }
    state.session.prefs.remember(&session_key, opts.clone());

    let submit_plan = if let Some(raw_form) = find(&fields, "j") {
        let mut body_fields = crate::fetch::submit::parse_form_body(raw_form);
        if !state.session.hidden.has_action(&session_key, &target) {
            let _ = fetch::fetch(
                &state.http_client,
                &crate::fetch::SubmitPlan {
                    method: crate::fetch::Method::Get,
                    url: target.clone(),
                    body: None,
                    content_type: None,
                },
                user_agent,
                accept_language,
                state.session.cookies.header_value(&jar_key).as_deref(),
                state.config.client_timeout(),
            )
            .await;
        }
        state.session.hidden.augment(&session_key, &target, &mut body_fields);

        Url::parse(&target).ok().map(|base| {
            let raw_merged = crate::fetch::submit::encode_form(&body_fields);
            crate::fetch::submit::plan_submission(&target, &raw_merged, &base)
        })
    } else {
        None
    };

    let plan = submit_plan.unwrap_or_else(|| crate::fetch::SubmitPlan {
        method: crate::fetch::Method::Get,
        url: target.clone(),
        body: None,
        content_type: None,
    });

    if let Some(command) = u.strip_prefix("server:") {
        return RenderedResponse {
            body: canned_about_page(command, &target, opts.client_version),
            set_cookies: Vec::new(),
            part_cur: 1,
            part_cnt: 1,
        };
    }

    if is_bookmarks_portal(&target) {
        if let Some(body) = resolve_bookmarks_portal(state, &target, opts.client_version) {
            return RenderedResponse {
                body,
                set_cookies: Vec::new(),
                part_cur: 1,
                part_cnt: 1,
            };
        }
    }

    let cookie_header = state.session.cookies.header_value(&jar_key);
    let render_fp = fingerprint(&opts);
    let cache_key = crate::session::PageCache::cache_key(&plan.url, &render_fp, &jar_key);

    let cached: Arc<CachedPage> = if let Some(hit) = state.pages.get(&cache_key) {
        hit
    } else {
        let cached = match render_page(state, &plan, &opts, user_agent, accept_language, cookie_header.as_deref()).await {
            Ok((outcome, upstream_cookies)) => {
                state.session.cookies.store_set_cookies(&jar_key, &upstream_cookies);
                if let RenderOutcome::Page(ref page) = outcome {
                    for (action, fields) in &page.form_hidden {
                        state.session.hidden.record(&session_key, action, fields.clone());
                    }
                }
                pack_outcome(outcome, &plan.url, &opts, upstream_cookies)
            }
            Err(_) => {
                let mut err_page = Page::new(&plan.url, opts.client_version, Compression::None);
                err_page.add_para();
                err_page.add_text("Internal server error");
                err_page.add_break();
                err_page.add_text(&plan.url);
                pack_outcome(RenderOutcome::Page(err_page), &plan.url, &opts, Vec::new())
            }
        };
        let arc = Arc::new(cached);
        state.pages.put(&cache_key, (*arc).clone());
        arc
    };

    let (framed, part_cnt) = crate::session::PageCache::select(
        &cached,
        opts.page as usize,
        state.config.paginate_tags,
        state.config.paginate_bytes,
        state.config.tagcount_mode,
        state.config.tagcount_delta,
    );

    RenderedResponse {
        body: framed,
        set_cookies: cached.set_cookies.clone(),
        part_cur: opts.page.max(1),
        part_cnt: part_cnt as u32,
    }
}

/// `GET|POST /fetch` debug endpoint (spec.md §6.3): same pipeline as
/// the legacy POST, driven by query parameters instead of a session.
pub async fn handle_fetch_debug(state: &AppState, query: &HashMap<String, String>) -> RenderedResponse {
    let Some(url) = query.get("url") else {
        return RenderedResponse {
            body: Vec::new(),
            set_cookies: Vec::new(),
            part_cur: 0,
            part_cnt: 0,
        };
    };
    let target = normalize_target(url);
    let mut opts = RenderOptions::default();
    if let Some(img) = query.get("img") {
        opts.images_on = img != "0";
    }
    if let Some(hq) = query.get("hq") {
        opts.high_quality = hq == "1";
    }
    if let Some(w) = query.get("w").and_then(|v| v.parse().ok()) {
        opts.screen_width = w;
    }
    if let Some(h) = query.get("h").and_then(|v| v.parse().ok()) {
        opts.screen_height = h;
    }
    if let Some(page) = query.get("page").and_then(|v| v.parse().ok()) {
        opts.page = page;
    }
    opts.image_mime = query.get("mime").cloned();

    let plan = crate::fetch::SubmitPlan {
        method: crate::fetch::Method::Get,
        url: target.clone(),
        body: None,
        content_type: None,
    };
    let outcome = match render_page(state, &plan, &opts, "Operetta-Debug/1.0", "en", None).await {
        Ok((outcome, _)) => outcome,
        Err(err) => {
            let mut err_page = Page::new(&target, opts.client_version, Compression::None);
            err_page.add_text(&format!("fetch failed: {err}"));
            RenderOutcome::Page(err_page)
        }
    };
    let framed = match outcome {
        RenderOutcome::Page(mut page) => page.finalize(TagCountMode::Plus1, state.config.tagcount_delta),
        RenderOutcome::Framed(framed) => framed,
    };
    RenderedResponse {
        body: framed,
        set_cookies: Vec::new(),
        part_cur: 1,
        part_cnt: 1,
    }
}

/// `GET /validate` (spec.md §6.3): decode the framing/preheader of an
/// OMS stream for a given URL and report the analyses as JSON.
pub async fn validate_oms(state: &AppState, url: &str) -> serde_json::Value {
    let mut opts = RenderOptions::default();
    opts.images_on = false;
    let plan = crate::fetch::SubmitPlan {
        method: crate::fetch::Method::Get,
        url: url.to_string(),
        body: None,
        content_type: None,
    };
    let outcome = match render_page(state, &plan, &opts, "Operetta-Validate/1.0", "en", None).await {
        Ok((outcome, _)) => outcome,
        Err(err) => return serde_json::json!({ "url": url, "error": err.to_string() }),
    };

    let mut page = match outcome {
        RenderOutcome::Page(page) => page,
        RenderOutcome::Framed(framed) => {
            return serde_json::json!({
                "url": url,
                "full": framed.len(),
                "compact": framed.len(),
                "passthrough": true,
            });
        }
    };
    let full = page.finalize(TagCountMode::Plus1, state.config.tagcount_delta);
    let scanned = crate::oms::scanner::scan(&page.data);

    let mut histogram: HashMap<char, u32> = HashMap::new();
    for byte in &page.data {
        *histogram.entry(*byte as char).or_insert(0) += 1;
    }

    if state.config.debug_scan {
        debug!(
            url,
            tag_count = scanned.tag_count,
            str_count = scanned.str_count,
            ended_with_q = scanned.ended_with_q,
            consumed = scanned.consumed,
            compact_len = page.data.len(),
            "scan diagnostics (OMS_DEBUG_SCAN)",
        );
    }

    serde_json::json!({
        "url": url,
        "full": full.len(),
        "compact": page.data.len(),
        "tagCount": scanned.tag_count,
        "strCount": scanned.str_count,
        "endedWithQ": scanned.ended_with_q,
        "histogram": histogram.into_iter().map(|(k, v)| (k.to_string(), v)).collect::<HashMap<_, _>>(),
    })
}

/// Build the absolute target used by a `/fetch` href following an
/// internal `0/<url>` link the transcoder emitted (spec.md §8 scenario 4).
pub fn resolve_link_target(page_url: &str, link: &str, query: &str) -> String {
    let raw = link.strip_prefix("0/").unwrap_or(link);
    build_url(page_url, raw, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_page_decodes_to_expected_shape() {
        let framed = bootstrap_page();
        let header_len = ClientVersion::V1.header_len();
        let payload = &framed[6..];
        let body = &payload[header_len..];
        let text = String::from_utf8_lossy(body);
        assert!(text.contains(BOOTSTRAP_URL));
        assert!(text.contains("OK"));
        assert_eq!(*body.last().unwrap(), b'Q');
    }

    #[test]
    fn resolve_link_target_strips_the_internal_prefix() {
        assert_eq!(resolve_link_target("http://x.test/", "0/http://x.test/page", ""), "http://x.test/page");
    }

    #[test]
    fn canned_about_page_echoes_the_command() {
        let framed = canned_about_page("about", "server:about", ClientVersion::V1);
        let header_len = ClientVersion::V1.header_len();
        let text = String::from_utf8_lossy(&framed[6 + header_len..]);
        assert!(text.contains("Operetta"));
        assert_eq!(*framed.last().unwrap(), b'Q');
    }

    #[test]
    fn bookmarks_portal_host_and_path_are_recognized() {
        assert!(is_bookmarks_portal("http://opera-mini.ru/bndex.php"));
        assert!(is_bookmarks_portal("http://opera-mini.ru/index.php?x=1"));
        assert!(!is_bookmarks_portal("http://opera-mini.ru/other.php"));
        assert!(!is_bookmarks_portal("http://example.com/bndex.php"));
    }

    fn test_config(bookmarks_mode: crate::config::BookmarksMode, bookmarks_path: Option<std::path::PathBuf>) -> crate::config::Config {
        crate::config::Config {
            port: 0,
            http_debug: false,
            css_debug: false,
            img_debug: false,
            img_cache_dir: std::env::temp_dir().join(format!("oms-handlers-test-img-{}", std::process::id())),
            img_cache_mb: 1,
            sites_dir: None,
            bookmarks_mode,
            bookmarks_path,
            paginate_tags: 1200,
            paginate_bytes: 32 * 1024,
            tagcount_mode: TagCountMode::Plus1,
            tagcount_delta: 0,
            debug_scan: false,
        }
    }

    #[test]
    fn local_bookmarks_mode_renders_entries_from_the_file() {
        let path = std::env::temp_dir().join(format!("oms-bookmarks-test-{}.txt", std::process::id()));
        std::fs::write(&path, "# a comment\nNews|http://news.test/\nBlank\n").unwrap();

        let state = AppState::new(test_config(crate::config::BookmarksMode::Local, Some(path.clone())));
        let body = resolve_bookmarks_portal(&state, "http://opera-mini.ru/bndex.php", ClientVersion::V1).unwrap();
        let header_len = ClientVersion::V1.header_len();
        let text = String::from_utf8_lossy(&body[6 + header_len..]);
        assert!(text.contains("News"));
        assert!(text.contains("http://news.test/"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn remote_bookmarks_mode_falls_through() {
        let state = AppState::new(test_config(crate::config::BookmarksMode::Remote, None));
        assert!(resolve_bookmarks_portal(&state, "http://opera-mini.ru/bndex.php", ClientVersion::V1).is_none());
    }

    #[test]
    fn auto_bookmarks_mode_falls_through_when_file_is_absent() {
        let missing = std::env::temp_dir().join("oms-bookmarks-definitely-absent.txt");
        std::fs::remove_file(&missing).ok();
        let state = AppState::new(test_config(crate::config::BookmarksMode::Auto, Some(missing)));
        assert!(resolve_bookmarks_portal(&state, "http://opera-mini.ru/bndex.php", ClientVersion::V1).is_none());
    }
}
