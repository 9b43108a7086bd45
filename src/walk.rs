//! Drives a [`NodeRenderer`] from `pulldown-cmark` events.
//!
//! Events arrive outside-in, the renderer wants children first, so every open
//! node gets a frame on a stack that collects its rendered children until the
//! matching `End` arrives.

use log::trace;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options as ParserOptions, Parser, Tag};

use crate::{
    config::Options,
    error::RenderError,
    list::{ItemContent, ListItem, ListLevel, ListStyle},
    renderer::NodeRenderer,
    table::CellAlign,
};

/// Renders a whole document with a fresh renderer.
pub fn render_markdown(markdown: &str, options: Options) -> Result<String, RenderError> {
    let mut renderer = NodeRenderer::new(options);
    render_with(&mut renderer, markdown)
}

/// Renders with an existing renderer. Any table left half-collected by an
/// earlier render is dropped first.
pub fn render_with(renderer: &mut NodeRenderer, markdown: &str) -> Result<String, RenderError> {
    let parser = Parser::new_ext(
        markdown,
        ParserOptions::ENABLE_STRIKETHROUGH
            | ParserOptions::ENABLE_TABLES
            | ParserOptions::ENABLE_TASKLISTS
            | ParserOptions::ENABLE_FOOTNOTES,
    );
    render_events(renderer, parser)
}

pub fn render_events<'a>(
    renderer: &mut NodeRenderer,
    events: impl IntoIterator<Item = Event<'a>>,
) -> Result<String, RenderError> {
    renderer.reset();
    let mut walker = Walker::new(renderer);
    for event in events {
        walker.handle_event(event)?;
    }
    walker.finish()
}

enum Block<'a> {
    Document,
    Paragraph,
    Heading(u8),
    BlockQuote,
    CodeBlock(CowStr<'a>),
    Emphasis,
    Strong,
    Strikethrough,
    Link { dest: CowStr<'a>, title: CowStr<'a> },
    Image { dest: CowStr<'a>, title: CowStr<'a> },
    TableCell,
    FootnoteDefinition(CowStr<'a>),
}

enum Frame<'a> {
    Block { kind: Block<'a>, text: String },
    List { start: Option<u64>, items: Vec<ListItem> },
    Item { content: ItemContent, task: bool },
    Table { alignments: Vec<Option<CellAlign>>, column: usize },
}

struct Walker<'r, 'a> {
    renderer: &'r mut NodeRenderer,
    stack: Vec<Frame<'a>>,
}

impl<'r, 'a> Walker<'r, 'a> {
    fn new(renderer: &'r mut NodeRenderer) -> Self {
        Self {
            renderer,
            stack: vec![Frame::Block {
                kind: Block::Document,
                text: String::new(),
            }],
        }
    }

    fn handle_event(&mut self, event: Event<'a>) -> Result<(), RenderError> {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => return self.end_tag(tag),
            Event::Text(text) => {
                if self.in_code_block() {
                    self.push_text(&text);
                } else {
                    let text = self.renderer.text(&text);
                    self.push_text(&text);
                }
            }
            Event::Code(code) => {
                let code = self.renderer.codespan(&code);
                self.push_text(&code);
            }
            Event::Html(html) => {
                let html = if self.in_table_cell() && is_html_break(&html) {
                    self.renderer.br()
                } else {
                    self.renderer.html(&html)
                };
                self.push_text(&html);
            }
            Event::SoftBreak => self.push_text("\n"),
            Event::HardBreak => {
                let br = self.renderer.br();
                self.push_text(&br);
            }
            Event::Rule => {
                let hr = self.renderer.hr();
                self.push_block(hr);
            }
            Event::FootnoteReference(name) => {
                let reference = self.renderer.footnote_reference(&name);
                self.push_text(&reference);
            }
            Event::TaskListMarker(done) => {
                let checkbox = self.renderer.checkbox(done);
                self.push_text(&checkbox);
                self.mark_task();
            }
        }
        Ok(())
    }

    fn start_tag(&mut self, tag: Tag<'a>) {
        let kind = match tag {
            Tag::Paragraph => Block::Paragraph,
            Tag::Heading(level, _, _) => Block::Heading(level as u8),
            Tag::BlockQuote => Block::BlockQuote,
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => Block::CodeBlock(info),
            Tag::CodeBlock(CodeBlockKind::Indented) => Block::CodeBlock(CowStr::Borrowed("")),
            Tag::Emphasis => Block::Emphasis,
            Tag::Strong => Block::Strong,
            Tag::Strikethrough => Block::Strikethrough,
            Tag::Link(_, dest, title) => Block::Link { dest, title },
            Tag::Image(_, dest, title) => Block::Image { dest, title },
            Tag::TableCell => Block::TableCell,
            Tag::FootnoteDefinition(name) => Block::FootnoteDefinition(name),
            Tag::List(start) => {
                self.stack.push(Frame::List {
                    start,
                    items: Vec::new(),
                });
                return;
            }
            Tag::Item => {
                self.stack.push(Frame::Item {
                    content: ItemContent::default(),
                    task: false,
                });
                return;
            }
            Tag::Table(alignments) => {
                self.renderer.reset();
                self.stack.push(Frame::Table {
                    alignments: alignments.into_iter().map(CellAlign::from_markdown).collect(),
                    column: 0,
                });
                return;
            }
            Tag::TableHead | Tag::TableRow => {
                self.reset_column();
                return;
            }
        };
        self.stack.push(Frame::Block {
            kind,
            text: String::new(),
        });
    }

    fn end_tag(&mut self, tag: Tag<'a>) -> Result<(), RenderError> {
        match tag {
            Tag::List(_) => {
                let Some(Frame::List { start, items }) = self.stack.pop() else {
                    return Err(RenderError::UnbalancedEvent("list"));
                };
                let list = self.renderer.list(&items, start);
                if let Some(Frame::Item { content, .. }) = self.stack.last_mut() {
                    content.push_list(list);
                } else {
                    self.push_text(&list.to_string());
                }
            }
            Tag::Item => {
                let Some(Frame::Item { content, task }) = self.stack.pop() else {
                    return Err(RenderError::UnbalancedEvent("item"));
                };
                let column = self.renderer.item_column(&self.list_levels(task));
                let item = self.renderer.listitem(content, task, column);
                match self.stack.last_mut() {
                    Some(Frame::List { items, .. }) => items.push(item),
                    _ => return Err(RenderError::UnbalancedEvent("item")),
                }
            }
            Tag::Table(_) => {
                let Some(Frame::Table { .. }) = self.stack.pop() else {
                    return Err(RenderError::UnbalancedEvent("table"));
                };
                let table = self.renderer.table()?;
                self.push_block(table);
            }
            Tag::TableHead | Tag::TableRow => {
                self.renderer.tablerow();
                self.reset_column();
            }
            _ => return self.end_block(),
        }
        Ok(())
    }

    fn end_block(&mut self) -> Result<(), RenderError> {
        let (kind, text) = match self.stack.pop() {
            Some(Frame::Block { kind, text }) => (kind, text),
            Some(frame) => {
                self.stack.push(frame);
                return Err(RenderError::UnbalancedEvent("block"));
            }
            None => return Err(RenderError::UnbalancedEvent("block")),
        };

        match kind {
            Block::Document => {
                self.stack.push(Frame::Block { kind, text });
                return Err(RenderError::UnbalancedEvent("block"));
            }
            Block::Paragraph => {
                if let Some(Frame::Item { content, .. }) = self.stack.last_mut() {
                    content.push_paragraph(&text);
                } else {
                    let paragraph = self.renderer.paragraph(&text);
                    self.push_block(paragraph);
                }
            }
            Block::Heading(level) => {
                let heading = self.renderer.heading(&text, level);
                self.push_block(heading);
            }
            Block::BlockQuote => {
                let quote = self.renderer.blockquote(&text);
                self.push_block(quote);
            }
            Block::CodeBlock(info) => {
                let code = self.renderer.code(&text, code_language(&info));
                self.push_block(code);
            }
            Block::Emphasis => {
                let em = self.renderer.em(&text);
                self.push_text(&em);
            }
            Block::Strong => {
                let strong = self.renderer.strong(&text);
                self.push_text(&strong);
            }
            Block::Strikethrough => {
                let del = self.renderer.del(&text);
                self.push_text(&del);
            }
            Block::Link { dest, title } => {
                let link = self.renderer.link(&dest, non_empty(&title), &text);
                self.push_text(&link);
            }
            Block::Image { dest, title } => {
                let image = self.renderer.image(&dest, non_empty(&title), &text);
                self.push_text(&image);
            }
            Block::TableCell => {
                let align = match self.stack.last_mut() {
                    Some(Frame::Table { alignments, column }) => {
                        let align = alignments.get(*column).copied().flatten();
                        *column += 1;
                        align
                    }
                    _ => return Err(RenderError::UnbalancedEvent("table cell")),
                };
                self.renderer.tablecell(&text, align);
            }
            Block::FootnoteDefinition(name) => {
                let footnote = self.renderer.footnote_definition(&name, &text);
                self.push_block(footnote);
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<String, RenderError> {
        if self.stack.len() != 1 {
            trace!("{} frames left open at end of input", self.stack.len() - 1);
            return Err(RenderError::UnbalancedEvent("document"));
        }
        match self.stack.pop() {
            Some(Frame::Block {
                kind: Block::Document,
                text,
            }) => Ok(text),
            _ => Err(RenderError::UnbalancedEvent("document")),
        }
    }

    /// Inline output goes to the innermost open node.
    fn push_text(&mut self, value: &str) {
        match self.stack.last_mut() {
            Some(Frame::Block { text, .. }) => text.push_str(value),
            Some(Frame::Item { content, .. }) => content.push_inline(value),
            Some(Frame::List { .. } | Frame::Table { .. }) | None => {
                trace!("dropping stray text {value:?}");
            }
        }
    }

    /// Block output inside a list item stays a separate part of the item.
    fn push_block(&mut self, value: String) {
        if let Some(Frame::Item { content, .. }) = self.stack.last_mut() {
            content.push_block(value);
        } else {
            self.push_text(&value);
        }
    }

    /// Open list items, outermost first. The innermost is the item being
    /// closed, which is no longer on the stack.
    fn list_levels(&self, own_task: bool) -> Vec<ListLevel> {
        let mut levels: Vec<ListLevel> = Vec::new();
        for frame in &self.stack {
            match frame {
                Frame::List { start, items } => {
                    levels.push(ListLevel::next(ListStyle::for_start(*start), items, false));
                }
                Frame::Item { task, .. } => {
                    if let Some(level) = levels.last_mut() {
                        level.task = *task;
                    }
                }
                Frame::Block { .. } | Frame::Table { .. } => {}
            }
        }
        if let Some(level) = levels.last_mut() {
            level.task = own_task;
        }
        levels
    }

    fn mark_task(&mut self) {
        let item = self.stack.iter_mut().rev().find_map(|frame| match frame {
            Frame::Item { task, .. } => Some(task),
            _ => None,
        });
        if let Some(task) = item {
            *task = true;
        }
    }

    fn reset_column(&mut self) {
        if let Some(Frame::Table { column, .. }) = self.stack.last_mut() {
            *column = 0;
        }
    }

    fn in_code_block(&self) -> bool {
        matches!(
            self.stack.last(),
            Some(Frame::Block {
                kind: Block::CodeBlock(_),
                ..
            })
        )
    }

    fn in_table_cell(&self) -> bool {
        matches!(
            self.stack.last(),
            Some(Frame::Block {
                kind: Block::TableCell,
                ..
            })
        )
    }
}

fn code_language(info: &str) -> &str {
    info.split(|c: char| c.is_whitespace() || c == ',')
        .next()
        .unwrap_or("")
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn is_html_break(value: &str) -> bool {
    let normalized: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    matches!(normalized.as_str(), "<br>" | "<br/>")
}
