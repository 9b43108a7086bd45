use log::debug;

use crate::text::unescape_entities;

const BLOCKED_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

/// True for hrefs that must never be rendered, whatever the options say.
pub fn is_script_href(href: &str) -> bool {
    href.trim_start()
        .get(..11)
        .map(|scheme| scheme.eq_ignore_ascii_case("javascript:"))
        .unwrap_or(false)
}

/// Returns the href unchanged when it is safe to show, `None` when it is a
/// blocked scheme or cannot be percent-decoded.
pub fn sanitize_href(href: &str) -> Option<&str> {
    let decoded = match urlencoding::decode(href) {
        Ok(decoded) => decoded,
        Err(err) => {
            debug!("dropping link, href {href:?} does not decode: {err}");
            return None;
        }
    };
    let scheme: String = unescape_entities(&decoded)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == ':')
        .collect::<String>()
        .to_ascii_lowercase();
    if BLOCKED_SCHEMES.iter().any(|blocked| scheme.starts_with(blocked)) {
        debug!("dropping link with blocked scheme: {href:?}");
        return None;
    }
    Some(href)
}

/// OSC-8 hyperlink: `label` shown, `url` followed on click.
pub fn hyperlink(label: &str, url: &str) -> String {
    format!("\x1b]8;;{url}\x07{label}\x1b]8;;\x07")
}
