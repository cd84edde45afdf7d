//! Form submission planner (C9, spec.md §4.8): turns a parsed `FormBody`
//! plus the page's recorded action into a concrete `{method, url, body}`.

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct SubmitPlan {
    pub method: Method,
    pub url: String,
    pub body: Option<String>,
    pub content_type: Option<&'static str>,
}

const SENSITIVE_PREFIXES: &[&str] = &["pass", "pwd", "token"];

/// Parse an ampersand-separated, URL-encoded `key=value` body, preserving
/// insertion order (later duplicate keys overwrite earlier ones, matching
/// how a browser's own form serialization would be read back).
pub fn parse_form_body(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let mut it = pair.splitn(2, '=');
            let key = it.next().unwrap_or("");
            let value = it.next().unwrap_or("");
            (url_decode(key), url_decode(value))
        })
        .collect()
}

fn url_decode(s: &str) -> String {
    percent_encoding::percent_decode_str(&s.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

fn is_implicit_action(value: &str) -> bool {
    value.starts_with("http://")
        || value.starts_with("https://")
        || value.starts_with("//")
        || value.starts_with('/')
}

fn is_sensitive_field(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    SENSITIVE_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Plan a submission: `form_action` is the action URL recorded when the
/// page was rendered (already absolute); `raw_body` is the client's
/// `FormBody` as received.
pub fn plan_submission(form_action: &str, raw_body: &str, base_url: &Url) -> SubmitPlan {
    let fields = parse_form_body(raw_body);

    let mut explicit_action: Option<String> = None;
    let mut implicit_action: Option<String> = None;
    let mut opf: Option<String> = None;
    let mut has_sensitive = false;

    for (key, value) in &fields {
        match key.as_str() {
            "opf" => opf = Some(value.clone()),
            "opa" | "action" => explicit_action = Some(value.clone()),
            _ => {
                if implicit_action.is_none() && is_implicit_action(value) {
                    implicit_action = Some(value.clone());
                }
                if !value.is_empty() && is_sensitive_field(key) {
                    has_sensitive = true;
                }
            }
        }
    }

    let action = explicit_action
        .or(implicit_action)
        .unwrap_or_else(|| form_action.to_string());
    let action_url = base_url.join(&action).map(|u| u.to_string()).unwrap_or(action);

    let use_post = match &opf {
        Some(v) => !matches!(v.as_str(), "" | "0" | "1"),
        None => has_sensitive,
    };

    let submit_fields: Vec<(String, String)> = fields
        .into_iter()
        .filter(|(k, _)| !matches!(k.as_str(), "opf" | "opa" | "action"))
        .collect();

    if use_post {
        let body = encode_form(&submit_fields);
        SubmitPlan {
            method: Method::Post,
            url: action_url,
            body: Some(body),
            content_type: Some("application/x-www-form-urlencoded"),
        }
    } else {
        let merged = merge_query(&action_url, &submit_fields);
        SubmitPlan {
            method: Method::Get,
            url: merged,
            body: None,
            content_type: None,
        }
    }
}

pub(crate) fn encode_form(fields: &[(String, String)]) -> String {
    fields
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                percent_encoding::utf8_percent_encode(k, percent_encoding::NON_ALPHANUMERIC),
                percent_encoding::utf8_percent_encode(v, percent_encoding::NON_ALPHANUMERIC)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn merge_query(url: &str, fields: &[(String, String)]) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };
    {
        let mut qp = parsed.query_pairs_mut();
        for (k, v) in fields {
            qp.append_pair(k, v);
        }
    }
    parsed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/search").unwrap()
    }

    #[test]
    fn opf_one_forces_get_with_merged_query() {
        let plan = plan_submission("https://example.com/search", "opf=1&q=opera", &base());
        assert_eq!(plan.method, Method::Get);
        assert_eq!(plan.url, "https://example.com/search?q=opera");
        assert!(plan.body.is_none());
    }

    #[test]
    fn sensitive_field_without_opf_forces_post() {
        let plan = plan_submission("https://example.com/login", "pass=secret&user=a", &base());
        assert_eq!(plan.method, Method::Post);
        assert_eq!(plan.content_type, Some("application/x-www-form-urlencoded"));
        let body = plan.body.unwrap();
        assert!(body.contains("pass=secret"));
        assert!(body.contains("user=a"));
    }

    #[test]
    fn explicit_action_override_wins() {
        let plan = plan_submission(
            "https://example.com/default",
            "opa=https%3A%2F%2Fexample.com%2Fother&q=1",
            &base(),
        );
        assert!(plan.url.starts_with("https://example.com/other"));
    }

    #[test]
    fn implicit_absolute_value_becomes_action_when_no_override() {
        let plan = plan_submission(
            "https://example.com/default",
            "go=https%3A%2F%2Fexample.com%2Felsewhere",
            &base(),
        );
        assert!(plan.url.starts_with("https://example.com/elsewhere"));
    }
}
