//! Upstream fetcher (C9, spec.md §4.8): performs the resolved
//! `SubmitPlan`/GET request, decodes compressed bodies, and detects
//! responses that should bypass transcoding entirely (an OMS stream
//! already, or a binary attachment).

use crate::error::{BoxError, ErrorContext};
use crate::fetch::submit::{Method, SubmitPlan};
use crate::oms::writer::{ClientVersion, Compression, Page};
use reqwest::Client;
use std::io::Read;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FetchedBody {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub set_cookies: Vec<String>,
    pub content_disposition: Option<String>,
}

pub async fn fetch(
    client: &Client,
    plan: &SubmitPlan,
    user_agent: &str,
    accept_language: &str,
    cookie_header: Option<&str>,
    timeout: Duration,
) -> Result<FetchedBody, BoxError> {
    let mut req = match plan.method {
        Method::Get => client.get(&plan.url),
        Method::Post => client.post(&plan.url),
    }
    .timeout(timeout)
    .header("User-Agent", user_agent)
    .header("Accept-Language", accept_language);

    if let Some(cookie) = cookie_header {
        req = req.header("Cookie", cookie);
    }
    if let (Some(body), Some(ct)) = (&plan.body, plan.content_type) {
        req = req.header("Content-Type", ct).body(body.clone());
    }

    let resp = req.send().await.context("sending upstream request")?;
    let status = resp.status().as_u16();
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let content_disposition = resp
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let content_encoding = resp
        .headers()
        .get("content-encoding")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let set_cookies: Vec<String> = resp
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect();

    let raw = resp.bytes().await.context("reading upstream body")?.to_vec();
    let body = decode_content_encoding(content_encoding.as_deref(), raw)?;

    Ok(FetchedBody {
        status,
        content_type,
        body,
        set_cookies,
        content_disposition,
    })
}

/// `reqwest`'s gzip/deflate/brotli features already transparently
/// decode most responses; this covers the case of a server that sends
/// `Content-Encoding` without `reqwest` having negotiated it (e.g. a
/// raw zlib stream behind a proxy that strips `Accept-Encoding`).
fn decode_content_encoding(encoding: Option<&str>, body: Vec<u8>) -> Result<Vec<u8>, BoxError> {
    match encoding {
        Some("gzip") => {
            let mut out = Vec::new();
            flate2::read::GzDecoder::new(&body[..])
                .read_to_end(&mut out)
                .context("decoding gzip body")?;
            Ok(out)
        }
        Some("deflate") => {
            let mut out = Vec::new();
            flate2::read::DeflateDecoder::new(&body[..])
                .read_to_end(&mut out)
                .context("decoding deflate body")?;
            Ok(out)
        }
        _ => Ok(body),
    }
}

/// Does `body` already look like a valid OMS stream (spec.md §4.8
/// "looksLikeOMS")? A recognized version byte up front and a
/// compressed body that decompresses and ends in `Q`.
pub fn looks_like_oms(body: &[u8]) -> bool {
    if body.len() < 6 {
        return false;
    }
    let version_word = u16::from_le_bytes([body[0], body[1]]);
    let version_byte = (version_word & 0xFF) as u8;
    let compression_byte = (version_word >> 8) as u8;
    let Some(compression) = compression_from_byte(compression_byte) else {
        return false;
    };
    if !matches!(version_byte, 0x0D | 0x18 | 0x1A) {
        return false;
    }
    let total_size = u32::from_be_bytes([body[2], body[3], body[4], body[5]]) as usize;
    if total_size != body.len() {
        return false;
    }
    let Ok(decompressed) = crate::oms::writer::decompress(compression, &body[6..]) else {
        return false;
    };
    decompressed.last() == Some(&b'Q')
}

fn compression_from_byte(b: u8) -> Option<Compression> {
    match b {
        0x31 => Some(Compression::Gzip),
        0x32 => Some(Compression::Deflate),
        0x33 => Some(Compression::None),
        _ => None,
    }
}

/// Is this response a binary attachment that should short-circuit
/// transcoding (spec.md §4.8)?
pub fn is_attachment(content_type: Option<&str>, content_disposition: Option<&str>) -> bool {
    if let Some(cd) = content_disposition {
        if cd.to_ascii_lowercase().contains("attachment") {
            return true;
        }
    }
    match content_type {
        Some(ct) => {
            let ct = ct.to_ascii_lowercase();
            !(ct.starts_with("text/") || ct.contains("html") || ct.contains("xml"))
                && (ct.starts_with("application/") || ct.starts_with("audio/") || ct.starts_with("video/"))
        }
        None => false,
    }
}

/// Synthesize a `[Download]`/`[Play]` OMS page pointing at the proxy's
/// `/download` endpoint, instead of trying to transcode a binary body.
pub fn attachment_page(page_url: &str, download_url: &str, content_type: Option<&str>) -> Vec<u8> {
    let mut page = Page::new(page_url, ClientVersion::V1, Compression::None);
    let is_media = content_type
        .map(|ct| ct.starts_with("audio/") || ct.starts_with("video/"))
        .unwrap_or(false);
    let label = if is_media { "[Play]" } else { "[Download]" };
    page.add_block();
    page.begin_link(download_url);
    page.add_text(label);
    page.end_link();
    page.finalize(crate::config::TagCountMode::Plus1, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_detection_honors_content_disposition() {
        assert!(is_attachment(Some("text/html"), Some("attachment; filename=x.zip")));
    }

    #[test]
    fn attachment_detection_from_binary_content_type() {
        assert!(is_attachment(Some("application/zip"), None));
        assert!(!is_attachment(Some("text/html"), None));
    }

    #[test]
    fn attachment_page_uses_play_label_for_media() {
        let framed = attachment_page("http://x.test/a.mp3", "http://proxy/download?url=a", Some("audio/mpeg"));
        let text = String::from_utf8_lossy(&framed);
        assert!(text.contains("[Play]"));
    }

    #[test]
    fn looks_like_oms_rejects_short_or_malformed_bodies() {
        assert!(!looks_like_oms(&[0u8; 3]));
        assert!(!looks_like_oms(&[0xFF, 0xFF, 0, 0, 0, 6]));
    }
}
