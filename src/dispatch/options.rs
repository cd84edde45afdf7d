//! `RenderOptions`: the legacy client's per-request rendering dials,
//! assembled from the `d=`, `e=`, `o=`, `version=`, `k=`, `w=` POST
//! fields (spec.md §4.10 step 7, §6.2). Parsed once at the edge into
//! this enumerated record rather than kept as a dynamic string map
//! (spec.md §9 "Dynamic parameter bag").

use crate::oms::ClientVersion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteMode {
    Compact,
    Rich,
}

/// Screen/quality/behavior dials decoded from the `d=i:…;q:…;w:…;h:…;
/// c:…;m:…;l:…` sub-fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub images_on: bool,
    pub high_quality: bool,
    pub screen_width: u32,
    pub screen_height: u32,
    pub num_colors: u32,
    pub mode: SiteMode,
    pub lang: Option<String>,
    pub compression_hint: Option<String>,
    pub client_version: ClientVersion,
    pub image_mime: Option<String>,
    pub page: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            images_on: true,
            high_quality: false,
            screen_width: 240,
            screen_height: 320,
            num_colors: 256,
            mode: SiteMode::Compact,
            lang: None,
            compression_hint: None,
            client_version: ClientVersion::V1,
            image_mime: None,
            page: 1,
        }
    }
}

/// Gateway port → client-version heuristic (spec.md §4.10 step 7,
/// §9 open question (a)): `280 -> v2`, `285 -> v3`, anything smaller
/// falls back to v1. An explicit `version=` field always wins.
fn client_version_from_gateway(o: Option<&str>, version: Option<&str>) -> ClientVersion {
    if let Some(v) = version {
        return match v.trim() {
            "2" => ClientVersion::V2,
            "3" => ClientVersion::V3,
            _ => ClientVersion::V1,
        };
    }
    match o.and_then(|v| v.parse::<u32>().ok()) {
        Some(285) => ClientVersion::V3,
        Some(280) => ClientVersion::V2,
        _ => ClientVersion::V1,
    }
}

/// Parse the `d=` sub-field bag: semicolon-separated `key:value` pairs.
fn parse_d(d: &str) -> (bool, bool, u32, u32, u32, SiteMode, Option<String>) {
    let mut images_on = true;
    let mut high_quality = false;
    let mut width = 240u32;
    let mut height = 320u32;
    let mut colors = 256u32;
    let mut mode = SiteMode::Compact;
    let mut lang = None;

    for part in d.split(';') {
        let Some((key, value)) = part.split_once(':') else { continue };
        match key {
            "i" => images_on = value != "0",
            "q" => high_quality = value == "1" || value.eq_ignore_ascii_case("hq"),
            "w" => width = value.parse().unwrap_or(width),
            "h" => height = value.parse().unwrap_or(height),
            "c" => colors = value.parse().unwrap_or(colors),
            "m" => {
                mode = if value.eq_ignore_ascii_case("rich") {
                    SiteMode::Rich
                } else {
                    SiteMode::Compact
                }
            }
            "l" => lang = Some(value.to_string()),
            _ => {}
        }
    }
    (images_on, high_quality, width, height, colors, mode, lang)
}

/// Assemble `RenderOptions` from the raw POST field values (spec.md
/// §4.10 step 7). `w_field` is the combined page-index/screen-width
/// field (`w=<page>;<width>` per §6.2); only the leading page index is
/// consumed here, the trailing width (if present) falls back to `d`'s
/// own `w:` sub-field when `d` omits it.
#[allow(clippy::too_many_arguments)]
pub fn build_render_options(
    d: Option<&str>,
    e: Option<&str>,
    o: Option<&str>,
    version: Option<&str>,
    k: Option<&str>,
    w_field: Option<&str>,
) -> RenderOptions {
    let mut opts = RenderOptions::default();
    if let Some(d) = d {
        let (images_on, high_quality, width, height, colors, mode, lang) = parse_d(d);
        opts.images_on = images_on;
        opts.high_quality = high_quality;
        opts.screen_width = width;
        opts.screen_height = height;
        opts.num_colors = colors;
        opts.mode = mode;
        opts.lang = lang;
    }
    opts.compression_hint = e.map(str::to_string);
    opts.client_version = client_version_from_gateway(o, version);
    opts.image_mime = k.map(str::to_string);
    if let Some(w) = w_field {
        let page_part = w.split(';').next().unwrap_or(w);
        opts.page = page_part.parse().unwrap_or(1).max(1);
    }
    opts
}

/// Stable fingerprint of every option that influences the encoded
/// bytes, used as part of the pagination page-cache key (spec.md
/// §4.9's "canonical fingerprint").
pub fn fingerprint(opts: &RenderOptions) -> String {
    format!(
        "{}|{}|{}x{}|{}|{:?}|{:?}|{:?}",
        u8::from(opts.images_on),
        u8::from(opts.high_quality),
        opts.screen_width,
        opts.screen_height,
        opts.num_colors,
        opts.mode,
        opts.client_version,
        opts.image_mime,
    )
}
