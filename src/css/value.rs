//! Declaration normalization: shorthand expansion, `url()` resolution,
//! and the palette-economy drop rule (spec.md §4.5).

use crate::oms::color::is_pure_white;
use url::Url;

/// Selector specificity as `(id_count, class_count, type_count)`,
/// compared lexicographically (spec.md §4.5).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity(pub u32, pub u32, pub u32);

/// One cascaded declaration.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

const FILL_PROPERTIES: &[&str] = &[
    "background",
    "background-color",
    "background-image",
    "color",
    "fill",
];

/// Drop declarations whose value resolves to pure white on a fill or
/// background property — OMS has no alpha/white distinction worth the
/// wire bytes (spec.md §4.5 "palette economy").
pub fn should_drop_for_palette_economy(property: &str, value: &str) -> bool {
    FILL_PROPERTIES.contains(&property) && is_pure_white(value)
}

/// Expand the `background` shorthand into its longhand components.
/// Unrecognized tokens are treated as a color if they parse as one,
/// otherwise ignored (conservative, not a full CSS grammar).
pub fn expand_background_shorthand(value: &str) -> Vec<Declaration> {
    let mut image = None;
    let mut repeat = None;
    let mut position_parts: Vec<&str> = Vec::new();
    let mut color = None;

    for token in value.split_whitespace() {
        if let Some(inner) = token.strip_prefix("url(") {
            let inner = inner.trim_end_matches(')').trim_matches(['"', '\'']);
            image = Some(inner.to_string());
        } else if matches!(
            token,
            "repeat" | "repeat-x" | "repeat-y" | "no-repeat" | "space" | "round"
        ) {
            repeat = Some(token.to_string());
        } else if matches!(
            token,
            "left" | "right" | "top" | "bottom" | "center" | "fixed" | "scroll"
        ) || token.ends_with('%')
            || token.chars().next().is_some_and(|c| c.is_ascii_digit())
        {
            position_parts.push(token);
        } else if crate::oms::color::parse_color(token).is_some() || token.starts_with('#') {
            color = Some(token.to_string());
        }
    }

    let mut decls = Vec::new();
    if let Some(image) = image {
        decls.push(Declaration {
            property: "background-image".into(),
            value: format!("url({image})"),
            important: false,
        });
    }
    if let Some(repeat) = repeat {
        decls.push(Declaration {
            property: "background-repeat".into(),
            value: repeat,
            important: false,
        });
    }
    if !position_parts.is_empty() {
        decls.push(Declaration {
            property: "background-position".into(),
            value: position_parts.join(" "),
            important: false,
        });
    }
    if let Some(color) = color {
        decls.push(Declaration {
            property: "background-color".into(),
            value: color,
            important: false,
        });
    }
    decls
}

/// Parse a plain pixel length (`"200px"` or bare `"200"`), ignoring any
/// other unit.
pub fn px_value(s: &str) -> Option<f64> {
    s.trim().trim_end_matches("px").trim().parse::<f64>().ok()
}

/// Extract the URL inside a `url(...)` value.
pub fn extract_url(value: &str) -> Option<String> {
    let inner = value.trim().strip_prefix("url(")?.strip_suffix(')')?;
    Some(inner.trim_matches(['"', '\'']).to_string())
}

/// Parse a `background-position` value's two space-separated parts into
/// pixel offsets. Keyword (`left`/`center`/`right`/...) and percentage
/// components fall back to 0 — resolving them exactly needs the source
/// image's natural size, which isn't known at cascade time.
pub fn parse_position_px(value: &str) -> (f64, f64) {
    let mut parts = value.split_whitespace();
    let x = parts.next().map(position_component).unwrap_or(0.0);
    let y = parts.next().map(position_component).unwrap_or(0.0);
    (x, y)
}

fn position_component(token: &str) -> f64 {
    px_value(token).unwrap_or(0.0)
}

/// Resolve a `url(...)` value found in a declaration against the
/// stylesheet's base URL, returning the absolute URL string unchanged
/// if it cannot be resolved.
pub fn resolve_url_value(value: &str, base_url: &Url) -> String {
    let Some(inner) = value
        .trim()
        .strip_prefix("url(")
        .and_then(|rest| rest.strip_suffix(')'))
    else {
        return value.to_string();
    };
    let inner = inner.trim_matches(['"', '\'']);
    match base_url.join(inner) {
        Ok(resolved) => format!("url({resolved})"),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_background_shorthand_into_longhands() {
        let decls = expand_background_shorthand("url(bg.png) no-repeat center #fff");
        let props: Vec<&str> = decls.iter().map(|d| d.property.as_str()).collect();
        assert!(props.contains(&"background-image"));
        assert!(props.contains(&"background-repeat"));
        assert!(props.contains(&"background-position"));
        assert!(props.contains(&"background-color"));
    }

    #[test]
    fn drops_pure_white_fill_declarations() {
        assert!(should_drop_for_palette_economy("color", "#ffffff"));
        assert!(!should_drop_for_palette_economy("color", "#eeeeee"));
        assert!(!should_drop_for_palette_economy("margin", "#ffffff"));
    }

    #[test]
    fn resolves_relative_url_against_base() {
        let base = Url::parse("http://x.test/a/b.html").unwrap();
        assert_eq!(
            resolve_url_value("url(img.png)", &base),
            "url(http://x.test/a/img.png)"
        );
    }

    #[test]
    fn extracts_url_from_wrapped_value() {
        assert_eq!(extract_url("url(tiny.png)"), Some("tiny.png".to_string()));
        assert_eq!(extract_url(r#"url("a b.png")"#), Some("a b.png".to_string()));
        assert_eq!(extract_url("none"), None);
    }

    #[test]
    fn parses_background_position_pixels_and_falls_back_on_keywords() {
        assert_eq!(parse_position_px("10px 20px"), (10.0, 20.0));
        assert_eq!(parse_position_px("center"), (0.0, 0.0));
        assert_eq!(parse_position_px(""), (0.0, 0.0));
    }
}
