use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Stands in for `:` inside code spans so shortcode expansion leaves them
/// alone. Restored by [`undo_colon`].
pub const COLON_REPLACER: &str = "*#COLON|*";

static SHORTCODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":([A-Za-z0-9_\-+]+?):").expect("shortcode pattern compiles"));

/// Replaces `:shortcode:` with its emoji followed by a space. Unknown
/// shortcodes are left as written.
pub fn insert_emojis(text: &str) -> Cow<'_, str> {
    SHORTCODE_RE.replace_all(text, |caps: &Captures<'_>| {
        match emojis::get_by_shortcode(&caps[1]) {
            Some(emoji) => format!("{} ", emoji.as_str()),
            None => caps[0].to_string(),
        }
    })
}

pub fn unescape_entities(html: &str) -> String {
    html.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

pub fn escape_colons(text: &str) -> String {
    text.replace(':', COLON_REPLACER)
}

pub fn undo_colon(text: &str) -> String {
    text.replace(COLON_REPLACER, ":")
}

/// The semantic clean-up every block applies to its inline content before
/// styling: emoji expansion, entity unescaping, then colon restoration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextTransform {
    pub unescape: bool,
    pub emoji: bool,
}

impl TextTransform {
    pub fn apply(&self, text: &str) -> String {
        let text = if self.emoji {
            insert_emojis(text)
        } else {
            Cow::Borrowed(text)
        };
        let text = if self.unescape {
            Cow::Owned(unescape_entities(&text))
        } else {
            text
        };
        undo_colon(&text)
    }

    pub fn emoji(&self, text: &str) -> String {
        if self.emoji {
            insert_emojis(text).into_owned()
        } else {
            text.to_string()
        }
    }
}
