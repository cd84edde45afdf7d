//! Form-tag emission helpers (part of C8, spec.md §4.7): input-to-tag
//! mapping and hidden-field bookkeeping on `Page::form_hidden`.

use crate::oms::writer::Page;

/// `INPUT_TEXT`'s 1-byte config field: bit 0 marks a multi-line
/// textarea, bit 1 marks the field as password-masked-on-echo.
pub mod input_cfg {
    pub const MULTILINE: u8 = 0x01;
    pub const SENSITIVE: u8 = 0x02;
}

/// The form currently open during the DFS (`walkState.formStack`'s top).
#[derive(Debug, Clone)]
pub struct FormContext {
    pub action: String,
}

/// Emit the input tag matching `input_type`, recording hidden fields on
/// `page.form_hidden[action][name]` as spec.md §4.7 requires.
#[allow(clippy::too_many_arguments)]
pub fn emit_input(
    page: &mut Page,
    form: &FormContext,
    input_type: &str,
    name: &str,
    value: &str,
    checked: bool,
    multiline: bool,
) {
    match input_type {
        "password" => page.add_input_password(name, value),
        "hidden" => {
            page.add_input_hidden(name, value);
            page.form_hidden
                .entry(form.action.clone())
                .or_default()
                .insert(name.to_string(), value.to_string());
        }
        "submit" | "image" => page.add_input_submit(name, value),
        "button" => page.add_input_button(name, value),
        "reset" => page.add_input_reset(name, value),
        "checkbox" => page.add_checkbox(name, value, checked),
        "radio" => page.add_radio(name, value, checked),
        _ => {
            let cfg = if multiline { input_cfg::MULTILINE } else { 0 };
            page.add_input_text(cfg, name, value);
        }
    }
}

/// Emit a `select`/`option*`/`selectEnd` group.
pub fn emit_select(page: &mut Page, name: &str, multiple: bool, options: &[(String, String, bool)]) {
    page.begin_select(name, multiple, options.len().min(usize::from(u16::MAX)) as u16);
    for (value, label, selected) in options {
        page.add_option(value, label, *selected);
    }
    page.end_select();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oms::{ClientVersion, Compression};

    #[test]
    fn hidden_input_is_recorded_on_page_form_hidden() {
        let mut page = Page::new("http://x.test/", ClientVersion::V1, Compression::None);
        let form = FormContext { action: "http://x.test/submit".into() };
        emit_input(&mut page, &form, "hidden", "csrf", "abc123", false, false);
        assert_eq!(
            page.form_hidden.get("http://x.test/submit").and_then(|m| m.get("csrf")),
            Some(&"abc123".to_string())
        );
    }

    #[test]
    fn select_emits_start_options_and_end() {
        let mut page = Page::new("http://x.test/", ClientVersion::V1, Compression::None);
        let before = page.tag_count;
        emit_select(
            &mut page,
            "color",
            false,
            &[("r".into(), "Red".into(), true), ("g".into(), "Green".into(), false)],
        );
        // select-start + 2 options + select-end
        assert_eq!(page.tag_count - before, 4);
    }
}
