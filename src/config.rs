use std::fmt;

use crate::{
    highlight::{Highlighter, SyntectHighlighter},
    layout::{IndentPolicy, IndentToken},
    style::{Stylist, Theme},
    table::TableOptions,
};

pub const DEFAULT_WIDTH: usize = 80;
pub const DEFAULT_INDENT: usize = 2;
pub const DEFAULT_TAB: usize = 4;

/// Everything a [`NodeRenderer`](crate::renderer::NodeRenderer) can be told.
/// Fixed once the renderer is built.
pub struct Options {
    pub stylist: Box<dyn Stylist>,
    /// One nesting level of a list.
    pub indent: IndentToken,
    /// Indent in front of every code block line.
    pub tab: IndentToken,
    pub indent_policy: IndentPolicy,
    /// Reflow target and `hr` length, in columns.
    pub width: usize,
    pub reflow_text: bool,
    pub unescape: bool,
    pub emoji: bool,
    pub show_section_prefix: bool,
    pub section_prefix: String,
    pub table_options: TableOptions,
    pub sanitize: bool,
    /// The terminal understands OSC-8 hyperlinks.
    pub hyperlinks: bool,
    /// `None` paints code blocks with the plain `Code` style.
    pub highlighter: Option<Box<dyn Highlighter>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            stylist: Box::new(Theme::default()),
            indent: IndentToken::Spaces(DEFAULT_INDENT),
            tab: IndentToken::Spaces(DEFAULT_TAB),
            indent_policy: IndentPolicy::default(),
            width: DEFAULT_WIDTH,
            reflow_text: false,
            unescape: true,
            emoji: true,
            show_section_prefix: true,
            section_prefix: "§".to_string(),
            table_options: TableOptions::default(),
            sanitize: false,
            hyperlinks: false,
            highlighter: Some(Box::new(SyntectHighlighter::default())),
        }
    }
}

impl Options {
    /// No colours and no highlighter: output is the bare layout.
    pub fn plain() -> Self {
        Self {
            stylist: Box::new(Theme::plain()),
            highlighter: None,
            ..Self::default()
        }
    }

    pub fn table_width(&self) -> usize {
        self.table_options.max_width.unwrap_or(self.width)
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("indent", &self.indent)
            .field("tab", &self.tab)
            .field("indent_policy", &self.indent_policy)
            .field("width", &self.width)
            .field("reflow_text", &self.reflow_text)
            .field("unescape", &self.unescape)
            .field("emoji", &self.emoji)
            .field("show_section_prefix", &self.show_section_prefix)
            .field("section_prefix", &self.section_prefix)
            .field("table_options", &self.table_options)
            .field("sanitize", &self.sanitize)
            .field("hyperlinks", &self.hyperlinks)
            .field("highlighter", &self.highlighter.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Element;

    #[test]
    fn plain_options_paint_nothing() {
        let options = Options::plain();
        assert!(options.highlighter.is_none());
        assert_eq!(options.stylist.paint(Element::Heading(1), "Title"), "Title");
        assert_eq!(options.width, DEFAULT_WIDTH);
    }

    #[test]
    fn table_width_falls_back_to_width() {
        let mut options = Options::plain();
        options.width = 42;
        assert_eq!(options.table_width(), 42);
        options.table_options.max_width = Some(100);
        assert_eq!(options.table_width(), 100);
    }

    #[test]
    fn debug_skips_trait_objects() {
        let rendered = format!("{:?}", Options::default());
        assert!(rendered.contains("width: 80"));
        assert!(rendered.contains("highlighter: true"));
    }
}
