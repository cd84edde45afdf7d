//! Legacy request parsing helpers (C11, spec.md §4.10, §6.2).

use percent_encoding::percent_decode_str;
use url::Url;

/// Parse a NUL-delimited `key=value` body (spec.md §6.2). Liberal on
/// parse: a segment with no `=` is kept with an empty value rather than
/// dropped (spec.md §9 open question (b)).
pub fn parse_null_kv(body: &[u8]) -> Vec<(String, String)> {
    body.split(|b| *b == 0)
        .filter(|seg| !seg.is_empty())
        .map(|seg| {
            let text = String::from_utf8_lossy(seg);
            match text.split_once('=') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (text.to_string(), String::new()),
            }
        })
        .collect()
}

pub fn find<'a>(fields: &'a [(String, String)], key: &str) -> Option<&'a str> {
    fields.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

/// Decode `/obml/<n>/<percent-encoded-url>` into the plain target URL
/// (spec.md §4.10 step 5), applying percent-decoding twice as legacy
/// clients double-encode the embedded URL.
pub fn normalize_obml_url(path: &str) -> Option<String> {
    let rest = path.strip_prefix("/obml/")?;
    let (_, encoded) = rest.split_once('/')?;
    let once = percent_decode_str(encoded).decode_utf8_lossy().into_owned();
    let twice = percent_decode_str(&once).decode_utf8_lossy().into_owned();
    Some(twice)
}

/// Normalize a raw target: run it through [`normalize_obml_url`] if it
/// matches that shape, default to an `http://` scheme if none is
/// present, otherwise pass through unchanged.
pub fn normalize_target(raw: &str) -> String {
    if raw.starts_with("/obml/") {
        if let Some(decoded) = normalize_obml_url(raw) {
            return decoded;
        }
    }
    if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    }
}

/// Resolve a relative href/query against a base URL the way the
/// legacy client's own navigation would (spec.md §8 scenario 4).
pub fn build_url(base: &str, href: &str, extra_query: &str) -> String {
    let Ok(base_url) = Url::parse(base) else {
        return href.to_string();
    };
    let Ok(mut resolved) = base_url.join(href) else {
        return href.to_string();
    };
    if !extra_query.is_empty() {
        let existing = resolved.query().unwrap_or("").to_string();
        let merged = if existing.is_empty() {
            extra_query.to_string()
        } else {
            format!("{existing}&{extra_query}")
        };
        resolved.set_query(Some(&merged));
    }
    resolved.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_null_delimited_pairs() {
        let body = b"u=http://x.test/\0h=t19-14\0c=abc";
        let fields = parse_null_kv(body);
        assert_eq!(find(&fields, "u"), Some("http://x.test/"));
        assert_eq!(find(&fields, "h"), Some("t19-14"));
        assert_eq!(find(&fields, "c"), Some("abc"));
    }

    #[test]
    fn normalizes_obml_with_double_percent_decode() {
        // https%3A%2F%2Fexample.com%2Fp, percent-decoded once still has
        // a literal `%3A` etc. that a client may have encoded twice.
        let once_encoded = "/obml/0/https%3A%2F%2Fexample.com%2Fp";
        assert_eq!(
            normalize_obml_url(once_encoded),
            Some("https://example.com/p".to_string())
        );
    }

    #[test]
    fn build_url_resolves_relative_path() {
        assert_eq!(
            build_url("https://example.com/a/b", "c", ""),
            "https://example.com/a/c"
        );
        assert_eq!(
            build_url("https://example.com/", "/x", "a=1"),
            "https://example.com/x?a=1"
        );
    }

    #[test]
    fn normalize_target_defaults_to_http_scheme() {
        assert_eq!(normalize_target("example.com/page"), "http://example.com/page");
        assert_eq!(normalize_target("https://example.com/page"), "https://example.com/page");
    }
}
