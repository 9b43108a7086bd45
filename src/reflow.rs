use std::mem;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::width::{fragments, split_at_width, visible_width, Fragment};

/// Stands in for an explicit line break inside a paragraph until the
/// paragraph has been reflowed.
pub const HARD_BREAK: char = '\r';

static WORD_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t\n]+").expect("separator pattern compiles"));

/// Rewraps `text` so that no line is wider than `width` visible columns.
///
/// `hard_break` splits the input into sections that are wrapped on their
/// own and always end a line. Escape sequences are never split and take no
/// room. A word wider than `width` is sliced across lines.
pub fn reflow(text: &str, width: usize, hard_break: char) -> String {
    let width = width.max(1);
    let mut lines = Vec::new();
    for section in text.split(hard_break) {
        reflow_section(section, width, &mut lines);
    }
    lines.join("\n")
}

/// Turns leftover hard-break sentinels into real newlines, for content that
/// never goes through [`reflow`].
pub fn fix_hard_break(text: &str) -> String {
    text.replace(HARD_BREAK, "\n")
}

#[derive(Default)]
struct LineBuffer {
    text: String,
    column: usize,
}

impl LineBuffer {
    fn push(&mut self, word: &str, word_width: usize) {
        self.text.push_str(word);
        self.column += word_width;
    }

    fn push_space(&mut self) {
        self.text.push(' ');
        self.column += 1;
    }

    /// Escape-only buffers are kept so their codes prefix the next line.
    fn flush(&mut self, lines: &mut Vec<String>) {
        if self.column > 0 {
            lines.push(mem::take(&mut self.text));
            self.column = 0;
        }
    }
}

fn reflow_section(section: &str, width: usize, lines: &mut Vec<String>) {
    let mut line = LineBuffer::default();
    let mut after_escape = false;

    for fragment in fragments(section) {
        let plain = match fragment {
            Fragment::Escape(seq) => {
                line.text.push_str(seq);
                after_escape = true;
                continue;
            }
            Fragment::Plain(plain) => plain,
        };

        for word in WORD_SEPARATOR.split(plain) {
            let space = usize::from(line.column > 0 && !after_escape);
            let word_width = visible_width(word);

            if line.column + space + word_width <= width {
                if space == 1 {
                    line.push_space();
                }
                line.push(word, word_width);
            } else if word_width <= width {
                line.flush(lines);
                line.push(word, word_width);
            } else {
                push_long_word(&mut line, word, space, width, lines);
            }
            after_escape = false;
        }
    }

    if line.column > 0 {
        lines.push(line.text);
    } else if !line.text.is_empty() {
        if let Some(last) = lines.last_mut() {
            last.push_str(&line.text);
        }
    }
}

fn push_long_word(
    line: &mut LineBuffer,
    word: &str,
    space: usize,
    width: usize,
    lines: &mut Vec<String>,
) {
    let mut rest = word;
    let room = width.saturating_sub(line.column + space);
    if room > 0 {
        let (head, tail) = split_at_width(rest, room);
        if !head.is_empty() {
            if space == 1 {
                line.push_space();
            }
            line.push(head, visible_width(head));
            rest = tail;
        }
    }
    line.flush(lines);

    while !rest.is_empty() {
        let (chunk, tail) = take_chunk(rest, width);
        let chunk_width = visible_width(chunk);
        line.push(chunk, chunk_width);
        rest = tail;
        if rest.is_empty() && chunk_width < width {
            break;
        }
        line.flush(lines);
    }
}

/// Like [`split_at_width`], but always consumes at least one character so a
/// glyph wider than the whole line still lands somewhere.
fn take_chunk(text: &str, width: usize) -> (&str, &str) {
    let (head, tail) = split_at_width(text, width);
    if !head.is_empty() || tail.is_empty() {
        return (head, tail);
    }
    let end = tail.chars().next().map(char::len_utf8).unwrap_or(0);
    tail.split_at(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_bounded(output: &str, width: usize) {
        for line in output.lines() {
            assert!(
                visible_width(line) <= width,
                "line {line:?} is wider than {width}"
            );
        }
    }

    #[test]
    fn short_input_is_unchanged() {
        assert_eq!(reflow("hello world", 80, HARD_BREAK), "hello world");
    }

    #[test]
    fn wraps_on_word_boundaries() {
        let text = "the quick brown fox jumps over the lazy dog";
        let out = reflow(text, 10, HARD_BREAK);
        assert_eq!(out, "the quick\nbrown fox\njumps over\nthe lazy\ndog");
        assert_bounded(&out, 10);
    }

    #[test]
    fn word_exactly_as_wide_as_the_line_is_not_split() {
        assert_eq!(reflow("abcd efgh", 4, HARD_BREAK), "abcd\nefgh");
    }

    #[test]
    fn long_word_is_sliced_into_full_width_chunks() {
        assert_eq!(reflow("abcdefghij", 4, HARD_BREAK), "abcd\nefgh\nij");
    }

    #[test]
    fn long_word_first_fills_the_current_line() {
        let out = reflow("ab cdefghij", 4, HARD_BREAK);
        assert_eq!(out, "ab c\ndefg\nhij");
        assert_bounded(&out, 4);
    }

    #[test]
    fn long_word_after_a_full_line_starts_fresh() {
        let out = reflow("abcd efghijklm", 4, HARD_BREAK);
        assert_eq!(out, "abcd\nefgh\nijkl\nm");
    }

    #[test]
    fn escapes_are_kept_whole_and_take_no_room() {
        let text = "\x1b[31mred\x1b[39m text";
        let out = reflow(text, 5, HARD_BREAK);
        assert_eq!(out, "\x1b[31mred\x1b[39m\ntext");
        assert_bounded(&out, 5);
    }

    #[test]
    fn no_space_is_inserted_right_after_an_escape() {
        let text = "say \x1b[1mbold\x1b[22m now";
        assert_eq!(reflow(text, 80, HARD_BREAK), "say \x1b[1mbold\x1b[22m now");
    }

    #[test]
    fn hard_breaks_force_new_lines() {
        let text = format!("one{HARD_BREAK}two three");
        assert_eq!(reflow(&text, 80, HARD_BREAK), "one\ntwo three");
    }

    #[test]
    fn empty_sections_produce_no_line() {
        let text = format!("a{HARD_BREAK}{HARD_BREAK}b");
        assert_eq!(reflow(&text, 80, HARD_BREAK), "a\nb");
        assert_eq!(reflow("", 80, HARD_BREAK), "");
    }

    #[test]
    fn newlines_inside_a_section_are_plain_whitespace() {
        assert_eq!(reflow("a\nb\tc", 80, HARD_BREAK), "a b c");
    }

    #[test]
    fn wide_glyphs_respect_the_bound() {
        let out = reflow("日本語のテキスト", 5, HARD_BREAK);
        assert_bounded(&out, 5);
        assert_eq!(out.replace('\n', ""), "日本語のテキスト");
    }

    #[test]
    fn width_bound_holds_for_mixed_input() {
        let text = "Lorem \x1b[1mipsum\x1b[22m dolor sit amet, consecteturadipiscingelit \
                    sed do \x1b[3meiusmod tempor\x1b[23m incididunt";
        for width in 1..30 {
            assert_bounded(&reflow(text, width, HARD_BREAK), width);
        }
    }

    #[test]
    fn fix_hard_break_restores_newlines() {
        assert_eq!(fix_hard_break("a\rb"), "a\nb");
    }
}
