use log::debug;

use crate::{
    config::{Options, DEFAULT_INDENT, DEFAULT_TAB},
    error::RenderError,
    layout::{indentify, sanitize_indent, section},
    link::{hyperlink, is_script_href, sanitize_href},
    list::{
        format_list, text_column, ItemContent, ListItem, ListLevel, ListStyle, RenderedList, BULLET_DONE,
        BULLET_UNDONE,
    },
    reflow::{fix_hard_break, reflow, HARD_BREAK},
    style::Element,
    table::{CellAlign, TableBuilder},
    text::{escape_colons, unescape_entities, TextTransform},
};

/// Mutable state of one document render. Only tables need any: cells and
/// rows arrive one call at a time and are drawn when the table closes.
#[derive(Clone, Debug, Default)]
pub struct RenderSession {
    table: TableBuilder,
}

impl RenderSession {
    pub fn reset(&mut self) {
        self.table.reset();
    }
}

/// One method per markdown construct. Each call takes the already rendered
/// children of the node and returns the node's output.
///
/// A renderer holds at most one open table. Use one renderer per concurrent
/// document.
#[derive(Debug)]
pub struct NodeRenderer {
    options: Options,
    indent: String,
    tab: String,
    transform: TextTransform,
    session: RenderSession,
}

impl Default for NodeRenderer {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl NodeRenderer {
    pub fn new(options: Options) -> Self {
        let indent = sanitize_indent(&options.indent, options.indent_policy, DEFAULT_INDENT);
        let tab = sanitize_indent(&options.tab, options.indent_policy, DEFAULT_TAB);
        let transform = TextTransform {
            unescape: options.unescape,
            emoji: options.emoji,
        };
        Self {
            options,
            indent,
            tab,
            transform,
            session: RenderSession::default(),
        }
    }

    /// Drops a half-collected table, if any.
    pub fn reset(&mut self) {
        self.session.reset();
    }

    fn paint(&self, element: Element, text: &str) -> String {
        self.options.stylist.paint(element, text)
    }

    /// Wraps to `width` when reflow is on, otherwise only resolves hard
    /// breaks.
    fn fit(&self, text: &str) -> String {
        self.fit_to(text, self.options.width)
    }

    fn fit_to(&self, text: &str, width: usize) -> String {
        if self.options.reflow_text {
            reflow(text, width, HARD_BREAK)
        } else {
            fix_hard_break(text)
        }
    }

    pub fn text(&self, text: &str) -> String {
        self.paint(Element::Text, text)
    }

    pub fn paragraph(&self, text: &str) -> String {
        let text = self.fit(&self.transform.apply(text));
        section(&self.paint(Element::Paragraph, &text))
    }

    pub fn heading(&self, text: &str, level: u8) -> String {
        let text = self.transform.apply(text);
        let text = if self.options.show_section_prefix {
            format!("{} {text}", self.options.section_prefix)
        } else {
            text
        };
        let painted = self.paint(Element::Heading(level), &text);
        section(&self.fit(&painted))
    }

    pub fn blockquote(&self, quote: &str) -> String {
        let bar = self.paint(Element::Blockquote, "│ ");
        let body = self.paint(Element::BlockquoteText, &fix_hard_break(quote.trim()));
        section(&indentify(&bar, &body))
    }

    /// Indents a code block by one `tab` and colours it. A highlighter
    /// failure falls back to the plain `Code` style.
    pub fn code(&self, code: &str, language: &str) -> String {
        let code = fix_hard_break(code.trim_end_matches('\n'));
        let coloured = match (&self.options.highlighter, language.trim()) {
            (Some(highlighter), language) if !language.is_empty() => {
                match highlighter.highlight(&code, language) {
                    Ok(highlighted) => highlighted,
                    Err(err) => {
                        debug!("highlighting fell back to plain code: {err}");
                        self.paint(Element::Code, &code)
                    }
                }
            }
            _ => self.paint(Element::Code, &code),
        };
        section(&indentify(&self.tab, &coloured))
    }

    /// Colons are hidden behind a sentinel until the enclosing block's
    /// transform, so shortcodes inside code are never expanded.
    pub fn codespan(&self, text: &str) -> String {
        let text = if self.options.unescape {
            unescape_entities(text)
        } else {
            text.to_string()
        };
        self.paint(Element::Codespan, &escape_colons(&text))
    }

    pub fn html(&self, html: &str) -> String {
        self.paint(Element::Html, html)
    }

    pub fn hr(&self) -> String {
        section(&self.paint(Element::Hr, &"─".repeat(self.options.width)))
    }

    pub fn br(&self) -> String {
        if self.options.reflow_text {
            HARD_BREAK.to_string()
        } else {
            "\n".to_string()
        }
    }

    /// Bulleted when `start` is `None`, numbered from `start` otherwise.
    /// The result nests into a parent item as is, or prints as a section.
    pub fn list(&self, items: &[ListItem], start: Option<u64>) -> RenderedList {
        let style = ListStyle::for_start(start);
        format_list(items, &style, &self.indent, |marker| {
            self.paint(Element::Listitem, marker)
        })
    }

    /// `column` is where the item's text will start once it and every
    /// enclosing list are formatted. Reflow fills what is left of `width`.
    pub fn listitem(&self, content: ItemContent, task: bool, column: usize) -> ListItem {
        let width = self.options.width.saturating_sub(column).max(1);
        let lines = content.into_lines(|text| self.fit_to(&self.transform.apply(text), width));
        ListItem::new(lines, task)
    }

    /// Text column of the innermost of `levels`, outermost first.
    pub fn item_column(&self, levels: &[ListLevel]) -> usize {
        text_column(levels, &self.indent)
    }

    pub fn checkbox(&self, checked: bool) -> String {
        let mark = if checked {
            self.paint(Element::DoneMark, BULLET_DONE)
        } else {
            self.paint(Element::UndoneMark, BULLET_UNDONE)
        };
        format!("{mark} ")
    }

    pub fn tablecell(&mut self, content: &str, align: Option<CellAlign>) {
        let content = self.transform.apply(content);
        self.session.table.push_cell(&content, align);
    }

    pub fn tablerow(&mut self) {
        self.session.table.end_row();
    }

    /// Draws every row collected since the last table, the first as the
    /// header. The session is empty afterwards even on error.
    pub fn table(&mut self) -> Result<String, RenderError> {
        let width = self.options.table_width();
        let grid = self.session.table.finish(&self.options.table_options, width)?;
        Ok(section(&self.paint(Element::Table, &grid)))
    }

    /// `javascript:` hrefs render as nothing, whatever the options.
    pub fn link(&self, href: &str, title: Option<&str>, text: &str) -> String {
        if is_script_href(href) {
            return String::new();
        }
        let href = if self.options.sanitize {
            match sanitize_href(href) {
                Some(href) => href,
                None => return String::new(),
            }
        } else {
            href
        };

        if self.options.hyperlinks {
            let mut label = if text.is_empty() {
                href.to_string()
            } else {
                self.transform.emoji(text)
            };
            if let Some(title) = title.filter(|title| !title.is_empty()) {
                label.push_str(" – ");
                label.push_str(title);
            }
            return self.paint(Element::Href, &hyperlink(&label, href));
        }

        let href_text = self.paint(Element::Href, href);
        if text.is_empty() || text == href {
            href_text
        } else {
            let label = self.paint(Element::Link, &self.transform.emoji(text));
            format!("{label} ({href_text})")
        }
    }

    pub fn image(&self, href: &str, title: Option<&str>, text: &str) -> String {
        let mut label = format!("![{text}");
        if let Some(title) = title.filter(|title| !title.is_empty()) {
            label.push_str(" – ");
            label.push_str(title);
        }
        label.push(']');
        if self.options.hyperlinks && !is_script_href(href) && !href.is_empty() {
            label = hyperlink(&label, href);
        }
        self.paint(Element::Image, &label)
    }

    pub fn strong(&self, text: &str) -> String {
        self.paint(Element::Strong, text)
    }

    pub fn em(&self, text: &str) -> String {
        self.paint(Element::Em, text)
    }

    pub fn del(&self, text: &str) -> String {
        self.paint(Element::Del, text)
    }

    pub fn footnote_reference(&self, name: &str) -> String {
        self.paint(Element::Link, &format!("[^{name}]"))
    }

    pub fn footnote_definition(&self, name: &str, body: &str) -> String {
        let body = fix_hard_break(body.trim());
        section(&format!("{}: {body}", self.footnote_reference(name)))
    }
}
