use std::mem;

use log::trace;
use textwrap::{wrap, Options as WrapOptions};

use crate::{error::RenderError, reflow::fix_hard_break, width::visible_width};

const MIN_COLUMN_WIDTH: usize = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl CellAlign {
    /// Maps the walker's alignment; `None` means the markdown gave none.
    pub fn from_markdown(alignment: pulldown_cmark::Alignment) -> Option<Self> {
        match alignment {
            pulldown_cmark::Alignment::None => None,
            pulldown_cmark::Alignment::Left => Some(CellAlign::Left),
            pulldown_cmark::Alignment::Center => Some(CellAlign::Center),
            pulldown_cmark::Alignment::Right => Some(CellAlign::Right),
        }
    }
}

/// Glyphs used to draw the box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableChars {
    pub top_left: char,
    pub top_mid: char,
    pub top_right: char,
    pub mid_left: char,
    pub mid_mid: char,
    pub mid_right: char,
    pub bottom_left: char,
    pub bottom_mid: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl Default for TableChars {
    fn default() -> Self {
        Self {
            top_left: '┌',
            top_mid: '┬',
            top_right: '┐',
            mid_left: '├',
            mid_mid: '┼',
            mid_right: '┤',
            bottom_left: '└',
            bottom_mid: '┴',
            bottom_right: '┘',
            horizontal: '─',
            vertical: '│',
        }
    }
}

impl TableChars {
    pub fn ascii() -> Self {
        Self {
            top_left: '+',
            top_mid: '+',
            top_right: '+',
            mid_left: '+',
            mid_mid: '+',
            mid_right: '+',
            bottom_left: '+',
            bottom_mid: '+',
            bottom_right: '+',
            horizontal: '-',
            vertical: '|',
        }
    }
}

/// Grid options passed through from the renderer configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableOptions {
    pub chars: TableChars,
    /// Spaces on each side of a cell's content.
    pub padding: usize,
    /// Total width budget; `None` uses the renderer's `width`.
    pub max_width: Option<usize>,
    /// Draw a rule between body rows, not only under the header.
    pub row_separators: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            chars: TableChars::default(),
            padding: 1,
            max_width: None,
            row_separators: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    lines: Vec<String>,
    align: Option<CellAlign>,
}

impl Cell {
    pub fn new(content: &str, align: Option<CellAlign>) -> Self {
        let content = fix_hard_break(content);
        let trimmed = content.trim();
        let lines = if trimmed.is_empty() {
            vec![String::new()]
        } else {
            trimmed
                .split('\n')
                .map(|segment| segment.trim().to_string())
                .collect()
        };
        Self { lines, align }
    }

    fn width(&self) -> usize {
        self.lines
            .iter()
            .map(|line| visible_width(line))
            .max()
            .unwrap_or(0)
    }
}

/// Collects cells and rows as the walker hands them over, one at a time,
/// until `finish` turns them into a box. Holds one table at a time.
#[derive(Clone, Debug, Default)]
pub struct TableBuilder {
    rows: Vec<Vec<Cell>>,
    current_row: Vec<Cell>,
}

impl TableBuilder {
    pub fn push_cell(&mut self, content: &str, align: Option<CellAlign>) {
        self.current_row.push(Cell::new(content, align));
    }

    pub fn end_row(&mut self) {
        if self.current_row.is_empty() {
            return;
        }
        let row = mem::take(&mut self.current_row);
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn reset(&mut self) {
        self.rows.clear();
        self.current_row.clear();
    }

    /// Renders the collected rows, the first one as the header, and clears
    /// the builder whatever the outcome.
    pub fn finish(&mut self, options: &TableOptions, max_width: usize) -> Result<String, RenderError> {
        self.end_row();
        let mut rows = mem::take(&mut self.rows).into_iter();
        self.reset();
        let header = rows.next().ok_or(RenderError::EmptyTable)?;
        let body: Vec<Vec<Cell>> = rows.collect();
        trace!("rendering table with {} body rows", body.len());
        Ok(render_grid(&header, &body, options, max_width).join("\n"))
    }
}

fn render_grid(
    header: &[Cell],
    body: &[Vec<Cell>],
    options: &TableOptions,
    max_width: usize,
) -> Vec<String> {
    let col_count = body
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);
    if col_count == 0 {
        return Vec::new();
    }

    let alignments = column_alignments(header, body, col_count);
    let mut widths = vec![MIN_COLUMN_WIDTH; col_count];
    update_widths(&mut widths, header);
    for row in body {
        update_widths(&mut widths, row);
    }
    clamp_column_widths(&mut widths, max_width, options.padding);

    let chars = &options.chars;
    let mut lines = Vec::new();
    lines.push(border(chars.top_left, chars.top_mid, chars.top_right, &widths, options));
    lines.extend(build_row_lines(header, &widths, &alignments, options));
    if !body.is_empty() {
        lines.push(border(chars.mid_left, chars.mid_mid, chars.mid_right, &widths, options));
    }
    for (idx, row) in body.iter().enumerate() {
        lines.extend(build_row_lines(row, &widths, &alignments, options));
        if options.row_separators && idx + 1 < body.len() {
            lines.push(border(chars.mid_left, chars.mid_mid, chars.mid_right, &widths, options));
        }
    }
    lines.push(border(chars.bottom_left, chars.bottom_mid, chars.bottom_right, &widths, options));
    lines
}

/// A column takes the first alignment any of its cells declares.
fn column_alignments(header: &[Cell], body: &[Vec<Cell>], col_count: usize) -> Vec<CellAlign> {
    (0..col_count)
        .map(|idx| {
            std::iter::once(header)
                .chain(body.iter().map(Vec::as_slice))
                .find_map(|row| row.get(idx).and_then(|cell| cell.align))
                .unwrap_or_default()
        })
        .collect()
}

fn update_widths(widths: &mut [usize], row: &[Cell]) {
    for (idx, cell) in row.iter().enumerate() {
        if idx < widths.len() {
            widths[idx] = widths[idx].max(cell.width());
        }
    }
}

fn build_row_lines(
    row: &[Cell],
    widths: &[usize],
    alignments: &[CellAlign],
    options: &TableOptions,
) -> Vec<String> {
    let mut column_lines: Vec<Vec<String>> = widths
        .iter()
        .enumerate()
        .map(|(idx, width)| render_cell_lines(row.get(idx), *width, alignments[idx]))
        .collect();
    let height = column_lines.iter().map(Vec::len).max().unwrap_or(1);
    for (col_idx, lines) in column_lines.iter_mut().enumerate() {
        while lines.len() < height {
            lines.push(pad_cell("", widths[col_idx], alignments[col_idx]));
        }
    }
    let gap = " ".repeat(options.padding);
    (0..height)
        .map(|line_idx| {
            let mut line = String::new();
            line.push(options.chars.vertical);
            for lines in &column_lines {
                line.push_str(&gap);
                line.push_str(&lines[line_idx]);
                line.push_str(&gap);
                line.push(options.chars.vertical);
            }
            line
        })
        .collect()
}

fn pad_cell(text: &str, width: usize, alignment: CellAlign) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return " ".repeat(width);
    }
    let display = visible_width(trimmed);
    if display >= width {
        return trimmed.to_string();
    }
    let padding = width - display;
    match alignment {
        CellAlign::Right => format!("{}{}", " ".repeat(padding), trimmed),
        CellAlign::Center => {
            let left = padding / 2;
            let right = padding - left;
            format!("{}{}{}", " ".repeat(left), trimmed, " ".repeat(right))
        }
        CellAlign::Left => format!("{}{}", trimmed, " ".repeat(padding)),
    }
}

fn border(left: char, junction: char, right: char, widths: &[usize], options: &TableOptions) -> String {
    let mut line = String::new();
    line.push(left);
    let horizontal = options.chars.horizontal.to_string();
    for (idx, width) in widths.iter().enumerate() {
        line.push_str(&horizontal.repeat(width + 2 * options.padding));
        if idx + 1 == widths.len() {
            line.push(right);
        } else {
            line.push(junction);
        }
    }
    line
}

fn clamp_column_widths(widths: &mut [usize], max_width: usize, padding: usize) {
    if widths.is_empty() {
        return;
    }
    let border_space = (2 * padding + 1) * widths.len() + 1;
    if border_space >= max_width {
        widths.fill(MIN_COLUMN_WIDTH);
        return;
    }
    let max_content = max_width - border_space;
    let min_total = MIN_COLUMN_WIDTH * widths.len();
    if max_content <= min_total {
        widths.fill(MIN_COLUMN_WIDTH);
        return;
    }
    let total: usize = widths.iter().sum();
    if total <= max_content {
        return;
    }
    let scale = max_content as f64 / total as f64;
    for width in widths.iter_mut() {
        let scaled = (*width as f64 * scale).floor() as usize;
        *width = scaled.max(MIN_COLUMN_WIDTH);
    }
    adjust_widths(widths, max_content);
}

fn adjust_widths(widths: &mut [usize], target: usize) {
    let mut total: usize = widths.iter().sum();
    while total > target {
        let Some((idx, _)) = widths
            .iter()
            .enumerate()
            .filter(|(_, &w)| w > MIN_COLUMN_WIDTH)
            .max_by_key(|(_, &w)| w)
        else {
            break;
        };
        widths[idx] -= 1;
        total -= 1;
    }
    let mut idx = 0usize;
    while total < target {
        widths[idx % widths.len()] += 1;
        total += 1;
        idx += 1;
    }
}

fn render_cell_lines(cell: Option<&Cell>, width: usize, alignment: CellAlign) -> Vec<String> {
    let mut rendered = Vec::new();
    if let Some(cell) = cell {
        for raw_line in &cell.lines {
            for segment in wrap_cell_text(raw_line, width) {
                rendered.push(pad_cell(&segment, width, alignment));
            }
        }
    }
    if rendered.is_empty() {
        rendered.push(pad_cell("", width, alignment));
    }
    rendered
}

fn wrap_cell_text(text: &str, width: usize) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return vec![String::new()];
    }
    if visible_width(trimmed) <= width {
        return vec![trimmed.to_string()];
    }
    wrap(trimmed, WrapOptions::new(width.max(1)).break_words(true))
        .into_iter()
        .map(|segment| segment.into_owned())
        .collect()
}
