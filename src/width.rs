use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// SGR sequences (`ESC [ n ; n m`) and OSC-8 hyperlink brackets. Both are
/// zero-width and must never be split.
static ESCAPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1b\[[0-9]+(?:;[0-9]+)*m|\x1b\]8;[^\x07\x1b]*;[^\x07\x1b]*(?:\x07|\x1b\\)")
        .expect("escape pattern compiles")
});

/// One run of a styled string: either a whole escape sequence or plain text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fragment<'a> {
    Escape(&'a str),
    Plain(&'a str),
}

impl<'a> Fragment<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            Fragment::Escape(seq) => seq,
            Fragment::Plain(text) => text,
        }
    }

    pub fn width(&self) -> usize {
        match self {
            Fragment::Escape(_) => 0,
            Fragment::Plain(text) => UnicodeWidthStr::width(*text),
        }
    }
}

/// Splits `text` into alternating escape and plain runs, preserving order.
/// Concatenating the fragments yields `text` again.
pub fn fragments(text: &str) -> Vec<Fragment<'_>> {
    let mut out = Vec::new();
    let mut last = 0;
    for found in ESCAPE_RE.find_iter(text) {
        if found.start() > last {
            out.push(Fragment::Plain(&text[last..found.start()]));
        }
        out.push(Fragment::Escape(found.as_str()));
        last = found.end();
    }
    if last < text.len() {
        out.push(Fragment::Plain(&text[last..]));
    }
    out
}

/// Number of terminal columns `text` occupies once escapes are ignored.
pub fn visible_width(text: &str) -> usize {
    fragments(text).iter().map(Fragment::width).sum()
}

pub fn strip_escapes(text: &str) -> Cow<'_, str> {
    ESCAPE_RE.replace_all(text, "")
}

/// Cuts `text` after at most `width` visible columns. Escape sequences travel
/// whole with the head; the head never exceeds `width`.
pub fn split_at_width(text: &str, width: usize) -> (&str, &str) {
    let mut used = 0usize;
    let mut offset = 0usize;
    for fragment in fragments(text) {
        if let Fragment::Plain(plain) = fragment {
            for (idx, ch) in plain.char_indices() {
                let ch_width = ch.width().unwrap_or(0);
                if used + ch_width > width {
                    return text.split_at(offset + idx);
                }
                used += ch_width;
            }
        }
        offset += fragment.as_str().len();
    }
    (text, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_do_not_count_towards_width() {
        let tokens = [
            "\x1b[38;5;128mfoo\x1b[0m",
            "\x1b[33mfoo\x1b[22m\x1b[24m\x1b[39m",
            "\x1b[35m\x1b[4m\x1b[1mfoo",
            "\x1b[33mfo\x1b[39mo\x1b[0m",
        ];
        for token in tokens {
            assert_eq!(visible_width(token), 3, "{token:?}");
        }
    }

    #[test]
    fn plain_ascii_width_is_its_length() {
        for text in ["", "a", "hello world", "1. item", "| x |"] {
            assert_eq!(visible_width(text), text.len());
        }
    }

    #[test]
    fn wide_glyphs_take_two_columns() {
        assert_eq!(visible_width("日本"), 4);
        assert_eq!(visible_width("\x1b[1m日本\x1b[22m"), 4);
    }

    #[test]
    fn combining_marks_take_no_column() {
        assert_eq!(visible_width("e\u{301}"), 1);
        assert_eq!(visible_width("cafe\u{301} 日"), 7);
    }

    #[test]
    fn only_ascii_digits_form_an_sgr_code() {
        let arabic = "\x1b[\u{663}mfoo";
        assert_eq!(fragments(arabic), vec![Fragment::Plain(arabic)]);
        assert_eq!(strip_escapes(arabic), arabic);
        assert_eq!(
            fragments("\x1b[3mfoo"),
            vec![Fragment::Escape("\x1b[3m"), Fragment::Plain("foo")]
        );
    }

    #[test]
    fn hyperlink_brackets_are_zero_width() {
        let link = "\x1b]8;;https://example.com\x07site\x1b]8;;\x07";
        assert_eq!(visible_width(link), 4);
        let st = "\x1b]8;;https://example.com\x1b\\site\x1b]8;;\x1b\\";
        assert_eq!(visible_width(st), 4);
    }

    #[test]
    fn fragments_round_trip_the_input() {
        let text = "a \x1b[31mred\x1b[39m word";
        let parts = fragments(text);
        assert_eq!(
            parts,
            vec![
                Fragment::Plain("a "),
                Fragment::Escape("\x1b[31m"),
                Fragment::Plain("red"),
                Fragment::Escape("\x1b[39m"),
                Fragment::Plain(" word"),
            ]
        );
        let joined: String = parts.iter().map(Fragment::as_str).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn strip_removes_only_escapes() {
        assert_eq!(strip_escapes("\x1b[1mbold\x1b[22m text"), "bold text");
        assert_eq!(strip_escapes("no escapes"), "no escapes");
    }

    #[test]
    fn split_keeps_escapes_whole() {
        let (head, tail) = split_at_width("\x1b[31mabcdef\x1b[39m", 3);
        assert_eq!(head, "\x1b[31mabc");
        assert_eq!(tail, "def\x1b[39m");
        assert_eq!(visible_width(head), 3);
    }

    #[test]
    fn split_short_text_returns_everything() {
        assert_eq!(split_at_width("abc", 10), ("abc", ""));
    }

    #[test]
    fn split_never_overshoots_on_wide_glyphs() {
        assert_eq!(split_at_width("日本", 1), ("", "日本"));
        assert_eq!(split_at_width("日本", 3), ("日", "本"));
    }
}
