use std::fmt;

use crate::{
    layout::{section, semi_section},
    reflow::fix_hard_break,
    width::{strip_escapes, visible_width},
};

pub const BULLET_POINT: &str = "• ";
pub const BULLET_DONE: &str = "✓";
pub const BULLET_UNDONE: &str = "✗";

/// What a line of list output already carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    /// First line of an item, waiting for its bullet or ordinal.
    Lead,
    /// First line of a task item. It starts with its checkbox and gets no
    /// bullet or ordinal.
    Task,
    /// More text belonging to the item above.
    Continuation,
    /// Output of a nested list's own formatting pass. Never re-decorated,
    /// only shifted right.
    Marked,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutLine {
    pub text: String,
    pub kind: LineKind,
}

impl LayoutLine {
    pub fn new(text: impl Into<String>, kind: LineKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    fn is_blank(&self) -> bool {
        strip_escapes(&self.text).trim().is_empty()
    }
}

/// A piece of a list item's body, in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemPart {
    /// Inline content still to be cleaned up and wrapped.
    Inline(String),
    /// An already rendered block (paragraph, code, quote, ...).
    Block(String),
    /// A nested list that has been through its own formatting pass.
    List(RenderedList),
}

/// Collects the body of one list item as the walker produces it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemContent {
    parts: Vec<ItemPart>,
}

impl ItemContent {
    pub fn push_inline(&mut self, text: &str) {
        if let Some(ItemPart::Inline(buffer)) = self.parts.last_mut() {
            buffer.push_str(text);
        } else {
            self.parts.push(ItemPart::Inline(text.to_string()));
        }
    }

    /// Inline content of its own paragraph: wrapped like inline text but
    /// never merged with the text before it.
    pub fn push_paragraph(&mut self, text: &str) {
        self.parts.push(ItemPart::Inline(text.to_string()));
    }

    pub fn push_block(&mut self, text: String) {
        self.parts.push(ItemPart::Block(text));
    }

    pub fn push_list(&mut self, list: RenderedList) {
        self.parts.push(ItemPart::List(list));
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Flattens the body into lines. `inline` turns raw inline content into
    /// its final (possibly wrapped) form.
    pub fn into_lines(self, mut inline: impl FnMut(&str) -> String) -> Vec<LayoutLine> {
        let mut lines = Vec::new();
        for part in self.parts {
            match part {
                ItemPart::Inline(text) => push_text_lines(&mut lines, &inline(&text)),
                ItemPart::Block(text) => push_text_lines(&mut lines, &fix_hard_break(&text)),
                ItemPart::List(list) => lines.extend(list.into_lines()),
            }
        }
        lines
    }
}

fn push_text_lines(lines: &mut Vec<LayoutLine>, text: &str) {
    lines.extend(
        text.split('\n')
            .map(|line| LayoutLine::new(line, LineKind::Continuation)),
    );
}

/// One rendered item: its first line is always a [`LineKind::Lead`] or
/// [`LineKind::Task`], blank lines are gone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListItem {
    lines: Vec<LayoutLine>,
}

impl ListItem {
    pub fn new(lines: Vec<LayoutLine>, task: bool) -> Self {
        let mut lines: Vec<LayoutLine> = lines.into_iter().filter(|l| !l.is_blank()).collect();
        match lines.first_mut() {
            Some(first) if first.kind == LineKind::Continuation => {
                first.kind = if task { LineKind::Task } else { LineKind::Lead };
            }
            Some(first) if matches!(first.kind, LineKind::Lead | LineKind::Task) => {}
            _ => lines.insert(0, LayoutLine::new("", LineKind::Lead)),
        }
        Self { lines }
    }

    pub fn lines(&self) -> &[LayoutLine] {
        &self.lines
    }

    pub fn is_task(&self) -> bool {
        self.lines
            .first()
            .map_or(false, |line| line.kind == LineKind::Task)
    }
}

impl fmt::Display for ListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&semi_section(&join_lines(&self.lines)))
    }
}

/// A fully formatted list. Every line is [`LineKind::Marked`], ready to be
/// nested into a parent item or printed as a section.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedList {
    lines: Vec<LayoutLine>,
}

impl RenderedList {
    pub fn lines(&self) -> &[LayoutLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<LayoutLine> {
        self.lines
    }
}

impl fmt::Display for RenderedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&section(&join_lines(&self.lines)))
    }
}

fn join_lines(lines: &[LayoutLine]) -> String {
    lines
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListStyle {
    /// Every item gets the same glyph.
    Bullet(String),
    /// Items are numbered from `start`.
    Ordered { start: u64 },
}

impl ListStyle {
    /// Bulleted without a start number, numbered from it otherwise.
    pub fn for_start(start: Option<u64>) -> Self {
        match start {
            Some(start) => ListStyle::Ordered { start },
            None => ListStyle::Bullet(BULLET_POINT.to_string()),
        }
    }

    fn first_number(&self) -> u64 {
        match self {
            ListStyle::Ordered { start } => *start,
            ListStyle::Bullet(_) => 1,
        }
    }

    fn marker(&self, number: u64) -> String {
        match self {
            ListStyle::Bullet(glyph) => glyph.clone(),
            ListStyle::Ordered { .. } => format!("{number}. "),
        }
    }

    /// Numbered lists pad nested lines to the ordinal's width. Bulleted
    /// lists only indent them.
    fn hangs_nested(&self) -> bool {
        matches!(self, ListStyle::Ordered { .. })
    }
}

fn task_hang() -> usize {
    visible_width(BULLET_DONE) + 1
}

/// One open list item, seen from the text of an item nested inside it (or
/// from its own text, for the innermost level).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListLevel {
    pub style: ListStyle,
    /// Number the item gets, ignored for bullets.
    pub ordinal: u64,
    pub task: bool,
}

impl ListLevel {
    /// The level of the next item of a list that already holds `items`.
    pub fn next(style: ListStyle, items: &[ListItem], task: bool) -> Self {
        let numbered = items.iter().filter(|item| !item.is_task()).count() as u64;
        let ordinal = style.first_number() + numbered;
        Self {
            style,
            ordinal,
            task,
        }
    }

    fn hang(&self) -> usize {
        if self.task {
            task_hang()
        } else {
            visible_width(&self.style.marker(self.ordinal))
        }
    }
}

/// Column where the innermost item's text starts once every level has been
/// through [`format_list`] with `indent`. `levels` runs outermost first.
pub fn text_column(levels: &[ListLevel], indent: &str) -> usize {
    let Some((own, enclosing)) = levels.split_last() else {
        return 0;
    };
    let unit = visible_width(indent);
    let shift: usize = enclosing
        .iter()
        .map(|level| {
            if level.style.hangs_nested() {
                unit + level.hang()
            } else {
                unit
            }
        })
        .sum();
    shift + unit + own.hang()
}

/// Decorates each item's lead line with its bullet or ordinal, shifts the
/// rest of the item under the item text, and indents the whole list by one
/// `indent` unit. `paint` styles the marker.
pub fn format_list(
    items: &[ListItem],
    style: &ListStyle,
    indent: &str,
    paint: impl Fn(&str) -> String,
) -> RenderedList {
    let mut number = style.first_number();
    let mut lines = Vec::new();

    for item in items {
        let mut hang = 0usize;
        for line in item.lines() {
            let text = match line.kind {
                LineKind::Lead => {
                    let marker = paint(&style.marker(number));
                    number += 1;
                    hang = visible_width(&marker);
                    format!("{marker}{}", line.text)
                }
                LineKind::Task => {
                    hang = task_hang();
                    line.text.clone()
                }
                LineKind::Continuation => format!("{}{}", " ".repeat(hang), line.text),
                LineKind::Marked if style.hangs_nested() => {
                    format!("{}{}", " ".repeat(hang), line.text)
                }
                LineKind::Marked => line.text.clone(),
            };
            lines.push(LayoutLine::new(format!("{indent}{text}"), LineKind::Marked));
        }
    }

    RenderedList { lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bullets() -> ListStyle {
        ListStyle::Bullet(BULLET_POINT.to_string())
    }

    fn ordered() -> ListStyle {
        ListStyle::Ordered { start: 1 }
    }

    fn item(text: &str) -> ListItem {
        let mut content = ItemContent::default();
        content.push_inline(text);
        ListItem::new(content.into_lines(str::to_string), false)
    }

    fn item_with(text: &str, nested: RenderedList) -> ListItem {
        let mut content = ItemContent::default();
        content.push_inline(text);
        content.push_list(nested);
        ListItem::new(content.into_lines(str::to_string), false)
    }

    fn format(items: &[ListItem], style: &ListStyle) -> RenderedList {
        format_list(items, style, "  ", str::to_string)
    }

    #[test]
    fn unordered_items_get_bullets() {
        let list = format(&[item("ul item"), item("ul item")], &bullets());
        assert_eq!(list.to_string(), "\n  • ul item\n  • ul item\n");
    }

    #[test]
    fn ordered_and_unordered_lists_frame_alike() {
        let ul = format(&[item("a"), item("b")], &bullets()).to_string();
        let ol = format(&[item("a"), item("b")], &ordered()).to_string();
        assert_eq!(ol, "\n  1. a\n  2. b\n");
        assert_eq!(ul.lines().count(), ol.lines().count());
        assert!(ul.starts_with('\n') && ul.ends_with("b\n"));
        assert!(ol.starts_with('\n') && ol.ends_with("b\n"));
    }

    #[test]
    fn nested_list_sits_one_indent_right_of_parent_text() {
        let inner = format(&[item("ul item")], &bullets());
        let outer = format(&[item_with("ul item", inner)], &bullets());
        assert_eq!(outer.to_string(), "\n  • ul item\n    • ul item\n");
    }

    #[test]
    fn nested_lists_keep_their_own_numbering() {
        let inner = format(&[item("x"), item("y")], &ordered());
        let outer = format(&[item_with("a", inner), item("b")], &ordered());
        assert_eq!(
            outer.to_string(),
            "\n  1. a\n       1. x\n       2. y\n  2. b\n"
        );
    }

    #[test]
    fn mixed_nesting_keeps_each_scheme() {
        let inner = format(&[item("ul item")], &bullets());
        let outer = format(&[item_with("ol item", inner)], &ordered());
        assert_eq!(outer.to_string(), "\n  1. ol item\n       • ul item\n");

        let inner = format(&[item("ol item")], &ordered());
        let outer = format(&[item_with("ul item", inner)], &bullets());
        assert_eq!(outer.to_string(), "\n  • ul item\n    1. ol item\n");
    }

    #[test]
    fn three_levels_indent_by_depth() {
        let deepest = format(&[item("c")], &bullets());
        let middle = format(&[item_with("b", deepest)], &bullets());
        let top = format(&[item_with("a", middle)], &bullets());
        let text = top.to_string();
        let lines: Vec<&str> = text.trim_matches('\n').lines().collect();
        assert_eq!(lines, vec!["  • a", "    • b", "      • c"]);
    }

    #[test]
    fn continuation_lines_hang_under_the_text() {
        let list = format(&[item("line one\nline two")], &bullets());
        assert_eq!(list.to_string(), "\n  • line one\n    line two\n");
    }

    #[test]
    fn task_items_are_not_bulleted() {
        let mut content = ItemContent::default();
        content.push_inline("✓ done\nmore");
        let task = ListItem::new(content.into_lines(str::to_string), true);
        let list = format(&[task, item("plain")], &ordered());
        assert_eq!(list.to_string(), "\n  ✓ done\n    more\n  1. plain\n");
    }

    #[test]
    fn ordered_lists_honor_their_start() {
        let list = format(&[item("a"), item("b")], &ListStyle::Ordered { start: 9 });
        assert_eq!(list.to_string(), "\n  9. a\n  10. b\n");
    }

    #[test]
    fn blank_lines_are_dropped() {
        let mut content = ItemContent::default();
        content.push_block("\npara one\n".to_string());
        content.push_block("\npara two\n".to_string());
        let loose = ListItem::new(content.into_lines(str::to_string), false);
        let list = format(&[loose], &bullets());
        assert_eq!(list.to_string(), "\n  • para one\n    para two\n");
    }

    #[test]
    fn item_starting_with_a_nested_list_still_gets_a_marker() {
        let inner = format(&[item("x")], &bullets());
        let mut content = ItemContent::default();
        content.push_list(inner);
        let lead_less = ListItem::new(content.into_lines(str::to_string), false);
        assert_eq!(lead_less.lines()[0], LayoutLine::new("", LineKind::Lead));
        let list = format(&[lead_less], &bullets());
        assert_eq!(list.lines()[1].text, "    • x");
    }

    #[test]
    fn formatted_lines_are_all_marked() {
        let list = format(&[item("a\nb")], &bullets());
        assert!(list.lines().iter().all(|line| line.kind == LineKind::Marked));
    }

    #[test]
    fn bulleted_lists_only_indent_nested_lines() {
        let inner = format(&[item("x\nmore")], &ordered());
        let outer = format(&[item_with("a\nb", inner)], &bullets());
        let text = outer.to_string();
        let lines: Vec<&str> = text.trim_matches('\n').lines().collect();
        assert_eq!(lines, vec!["  • a", "    b", "    1. x", "       more"]);
    }

    #[test]
    fn text_column_follows_the_formatted_layout() {
        let bullet = |task| ListLevel::next(bullets(), &[], task);
        let numbered = |start, task| ListLevel::next(ListStyle::Ordered { start }, &[], task);

        assert_eq!(text_column(&[], "  "), 0);
        assert_eq!(text_column(&[bullet(false)], "  "), 4);
        assert_eq!(text_column(&[bullet(false), bullet(false)], "  "), 6);
        assert_eq!(text_column(&[numbered(1, false), bullet(false)], "  "), 9);
        assert_eq!(text_column(&[numbered(10, false)], "  "), 6);
        assert_eq!(text_column(&[bullet(true)], "  "), 4);

        let inner = format(&[item("x")], &bullets());
        let outer = format(&[item_with("a", inner)], &ordered());
        let nested = &outer.lines()[1].text;
        let column = text_column(&[numbered(1, false), bullet(false)], "  ");
        assert_eq!(visible_width(nested) - visible_width("x"), column);
    }

    #[test]
    fn next_level_skips_task_items_when_numbering() {
        let mut content = ItemContent::default();
        content.push_inline("✓ done");
        let task = ListItem::new(content.into_lines(str::to_string), true);
        assert!(task.is_task());
        let items = [item("a"), task];
        let level = ListLevel::next(ordered(), &items, false);
        assert_eq!(level.ordinal, 2);
    }

    #[test]
    fn painted_markers_are_measured_without_escapes() {
        let list = format_list(
            &[item("a\nb")],
            &bullets(),
            "  ",
            |marker: &str| format!("\x1b[35m{marker}\x1b[39m"),
        );
        assert_eq!(list.lines()[0].text, "  \x1b[35m• \x1b[39ma");
        assert_eq!(list.lines()[1].text, "    b");
    }

    #[test]
    fn items_display_as_semi_sections() {
        assert_eq!(item("a").to_string(), "\na");
    }
}
