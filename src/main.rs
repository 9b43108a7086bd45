use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Parser;
use log::debug;
use mdterm::{
    config::{Options, DEFAULT_WIDTH},
    highlight::SyntectHighlighter,
    layout::{IndentPolicy, IndentToken},
    walk::render_markdown,
};

/// Renders markdown for the terminal.
#[derive(Parser, Debug)]
#[command(name = "mdterm", version)]
struct Cli {
    /// Markdown file to render; standard input when omitted.
    path: Option<PathBuf>,

    /// Target width in columns. Defaults to the terminal width.
    #[arg(short, long)]
    width: Option<usize>,

    /// Rewrap paragraphs and headings to the target width.
    #[arg(long)]
    reflow: bool,

    /// Leave `:shortcode:` text alone.
    #[arg(long)]
    no_emoji: bool,

    /// Leave HTML entities escaped.
    #[arg(long)]
    no_unescape: bool,

    /// Drop the `§` in front of headings.
    #[arg(long)]
    no_section_prefix: bool,

    /// One list nesting level: a number of spaces, or tabs such as "\t".
    #[arg(long, default_value = "2")]
    indent: IndentToken,

    /// Indent of code blocks: a number of spaces, or tabs such as "\t".
    #[arg(long, default_value = "4")]
    tab: IndentToken,

    /// Accept any literal string for --indent and --tab, not only tabs.
    #[arg(long)]
    any_indent: bool,

    /// Emit OSC-8 hyperlinks instead of `text (url)`.
    #[arg(long)]
    hyperlinks: bool,

    /// Drop links whose scheme could run script.
    #[arg(long)]
    sanitize: bool,

    /// No colours and no syntax highlighting.
    #[arg(long)]
    plain: bool,

    /// Syntax highlighting theme for fenced code.
    #[arg(long)]
    syntax_theme: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let markdown = read_input(cli.path.as_deref())?;
    let options = options_from(cli);
    debug!("rendering with {options:?}");

    let rendered = render_markdown(&markdown, options).context("failed to render markdown")?;
    let mut out = io::BufWriter::new(io::stdout());
    out.write_all(rendered.as_bytes())
        .context("failed to write rendered output")?;
    out.flush().context("failed to flush output")?;
    Ok(())
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut markdown = String::new();
            io::stdin()
                .read_to_string(&mut markdown)
                .context("failed to read standard input")?;
            Ok(markdown)
        }
    }
}

fn options_from(cli: Cli) -> Options {
    let mut options = if cli.plain {
        Options::plain()
    } else {
        Options::default()
    };
    if let Some(theme) = cli.syntax_theme.filter(|_| !cli.plain) {
        options.highlighter = Some(Box::new(SyntectHighlighter::new(theme)));
    }
    options.width = cli.width.unwrap_or_else(term_width);
    options.reflow_text = cli.reflow;
    options.emoji = !cli.no_emoji;
    options.unescape = !cli.no_unescape;
    options.show_section_prefix = !cli.no_section_prefix;
    options.indent = cli.indent;
    options.tab = cli.tab;
    if cli.any_indent {
        options.indent_policy = IndentPolicy::Permissive;
    }
    options.hyperlinks = cli.hyperlinks;
    options.sanitize = cli.sanitize;
    options
}

fn term_width() -> usize {
    crossterm::terminal::size()
        .map(|(w, _)| w as usize)
        .unwrap_or(DEFAULT_WIDTH)
}
